/// Location of the per user configuration file.
pub const DEFAULT_CONFIG_PATH_HOME: &str = "~/.msad.toml";

pub const DEFAULT_SEARCH_LIMIT: i32 = 2000;

/// LDAP_MATCHING_RULE_IN_CHAIN, walks nested group membership on the server.
pub const OID_MATCHING_RULE_IN_CHAIN: &str = "1.2.840.113556.1.4.1941";
/// LDAP_MATCHING_RULE_BIT_AND
pub const OID_MATCHING_RULE_BIT_AND: &str = "1.2.840.113556.1.4.803";

// userAccountControl flags
pub const UAC_ACCOUNTDISABLE: u32 = 0x0000_0002;
pub const UAC_DONT_EXPIRE_PASSWORD: u32 = 0x0001_0000;

/// Request no attributes at all, only the entry DN.
pub const ATTR_NONE: &str = "1.1";
pub const ATTR_DISTINGUISHEDNAME: &str = "distinguishedName";
pub const ATTR_MEMBER: &str = "member";
pub const ATTR_MEMBEROF: &str = "memberOf";
pub const ATTR_PWDLASTSET: &str = "pwdLastSet";
pub const ATTR_SAMACCOUNTNAME: &str = "sAMAccountName";
pub const ATTR_UNICODEPWD: &str = "unicodePwd";

// check-user fact labels
pub const FACT_IS_DISABLED: &str = "is_disabled";
pub const FACT_IS_LOCKED: &str = "is_locked";
pub const FACT_NEVER_EXPIRES_PASSWORD: &str = "has_never_expires_password";
pub const FACT_PASSWORD_CHANGED_IN_DAYS: &str = "password_changed_in_days";
pub const FACT_EXPIRED_PASSWORD: &str = "has_expired_password";
pub const FACT_MEMBERSHIP_PREFIX: &str = "membership_";
