//! Search filter construction.
//!
//! Account names and search tokens are inserted verbatim, so they may carry `*`
//! wildcards, and anything else that is meaningful in a filter. DNs taken from
//! the directory are escaped before they are placed in an assertion.

use ldap3::ldap_escape;
use msad_proto::constants::{
    OID_MATCHING_RULE_BIT_AND, OID_MATCHING_RULE_IN_CHAIN, UAC_ACCOUNTDISABLE,
    UAC_DONT_EXPIRE_PASSWORD,
};

pub const ANY_OBJECT: &str = "(objectClass=*)";

pub fn account_name(name: &str) -> String {
    format!("(sAMAccountName={})", name)
}

pub fn users(token: &str) -> String {
    format!(
        "(&(objectClass=user)(|(sAMAccountName={t})(mail={t})(cn={t})(userPrincipalName={t})))",
        t = token
    )
}

fn uac_flag_set(flag: u32) -> String {
    format!("(userAccountControl:{}:={})", OID_MATCHING_RULE_BIT_AND, flag)
}

fn member_of_chain(group_dn: &str) -> String {
    format!(
        "(memberOf:{}:={})",
        OID_MATCHING_RULE_IN_CHAIN,
        ldap_escape(group_dn)
    )
}

pub fn disabled_users(sub_filter: &str) -> String {
    format!(
        "(&(objectCategory=Person)(objectClass=User){}{})",
        sub_filter,
        uac_flag_set(UAC_ACCOUNTDISABLE)
    )
}

pub fn locked_users(sub_filter: &str) -> String {
    format!(
        "(&(objectCategory=Person)(objectClass=User){}(lockoutTime>=1))",
        sub_filter
    )
}

pub fn never_expires_password(sub_filter: &str) -> String {
    format!(
        "(&(objectClass=user){}{})",
        uac_flag_set(UAC_DONT_EXPIRE_PASSWORD),
        sub_filter
    )
}

/// Every person below the group, following nested groups.
pub fn flat_members(group_dn: &str) -> String {
    format!(
        "(&(objectClass=person)(sAMAccountName=*){})",
        member_of_chain(group_dn)
    )
}

/// Matches the user entry itself, and only if it is a transitive member of the group.
pub fn group_member(group_dn: &str, user_dn: &str) -> String {
    format!(
        "(&{}(objectCategory=person)(objectClass=user)(distinguishedName={}))",
        member_of_chain(group_dn),
        ldap_escape(user_dn)
    )
}

pub fn direct_members(group_dn: &str) -> String {
    format!("(distinguishedName={})", ldap_escape(group_dn))
}

/// Every group that contains the user, directly or through nesting.
pub fn nested_user_groups(user_dn: &str) -> String {
    format!(
        "(member:{}:={})",
        OID_MATCHING_RULE_IN_CHAIN,
        ldap_escape(user_dn)
    )
}
