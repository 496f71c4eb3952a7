//! The ldap3 backed implementation of `Directory`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;

use ldap3::{
    LdapConn, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry, SearchOptions, SearchResult,
};
use msad_proto::constants::{ATTR_MEMBER, ATTR_NONE, ATTR_UNICODEPWD};
use msad_proto::v1::{AttrValue, AttributeRecord, OperationOutcome};

use crate::config::DomainProfile;
use crate::{ClientError, Directory};

const RC_SUCCESS: u32 = 0;
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;

pub struct LdapDirectory {
    ldap: LdapConn,
    url: String,
}

impl fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("url", &self.url)
            .finish()
    }
}

impl LdapDirectory {
    /// Connect and bind. With credentials in the profile this is a simple bind,
    /// otherwise a SASL GSSAPI bind using the kerberos ticket of the caller.
    pub fn connect(profile: &DomainProfile) -> Result<Self, ClientError> {
        let url = profile.url();

        let mut settings = LdapConnSettings::new().set_no_tls_verify(!profile.verify_ca);
        if let Some(secs) = profile.connect_timeout {
            settings = settings.set_conn_timeout(Duration::from_secs(secs));
        }
        if profile.use_ssl && !profile.verify_ca {
            warn!("Certificate validation is disabled for {}", url);
        }

        debug!("Connecting to {}", url);
        let mut ldap = LdapConn::with_settings(settings, url.as_str()).map_err(|e| {
            error!("Unable to connect to {} - {:?}", url, e);
            e
        })?;

        match &profile.credentials {
            Some(creds) => {
                let res = ldap.simple_bind(creds.user.as_str(), creds.password.as_str())?;
                check_bind(creds.user.as_str(), res)?;
            }
            None => kerberos_bind(&mut ldap, profile.host.as_str())?,
        }

        info!("Bound to {}", url);
        Ok(LdapDirectory { ldap, url })
    }

    fn modify_groups(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
        add: bool,
    ) -> Result<OperationOutcome, ClientError> {
        for group_dn in group_dns {
            let members: HashSet<&str> = member_dns.iter().copied().collect();
            let m = if add {
                Mod::Add(ATTR_MEMBER, members)
            } else {
                Mod::Delete(ATTR_MEMBER, members)
            };
            debug!(
                "{} {:?} on {}",
                if add { "adding" } else { "removing" },
                member_dns,
                group_dn
            );
            let res = self.ldap.modify(group_dn, vec![m])?;
            let outcome = to_outcome(res);
            if !outcome.is_success() {
                return Ok(outcome);
            }
        }
        Ok(OperationOutcome::Success)
    }
}

fn check_bind(who: &str, res: LdapResult) -> Result<(), ClientError> {
    if res.rc == RC_SUCCESS {
        Ok(())
    } else {
        error!("Bind as {} failed rc={} {}", who, res.rc, res.text);
        Err(ClientError::Bind(
            who.to_string(),
            format!("rc={} {}", res.rc, res.text),
        ))
    }
}

#[cfg(feature = "gssapi")]
fn kerberos_bind(ldap: &mut LdapConn, host: &str) -> Result<(), ClientError> {
    debug!("Binding to {} with the kerberos ticket cache", host);
    let res = ldap.sasl_gssapi_bind(host)?;
    check_bind("kerberos principal", res)
}

#[cfg(not(feature = "gssapi"))]
fn kerberos_bind(_ldap: &mut LdapConn, host: &str) -> Result<(), ClientError> {
    error!(
        "No user/password configured for {} and kerberos support is not built in",
        host
    );
    Err(ClientError::KerberosUnsupported)
}

fn to_outcome(res: LdapResult) -> OperationOutcome {
    if res.rc == RC_SUCCESS {
        OperationOutcome::Success
    } else {
        warn!("Directory rejected the operation rc={} {}", res.rc, res.text);
        OperationOutcome::Rejected {
            rc: res.rc,
            message: res.text,
        }
    }
}

fn to_record(entry: SearchEntry) -> AttributeRecord {
    if !entry.bin_attrs.is_empty() {
        debug!(
            "Skipping binary attributes {:?} of {}",
            entry.bin_attrs.keys().collect::<Vec<_>>(),
            entry.dn
        );
    }
    let attrs: BTreeMap<String, AttrValue> = entry
        .attrs
        .into_iter()
        .map(|(k, vs)| (k, AttrValue::from_values(vs)))
        .collect();
    AttributeRecord {
        dn: entry.dn,
        attrs,
    }
}

/// Keep the entries of a finished search. A size limit hit still hands back the
/// entries that arrived, referrals and intermediate messages are dropped.
fn into_records(
    result: SearchResult,
    base: &str,
    limit: i32,
) -> Result<Vec<AttributeRecord>, ClientError> {
    let SearchResult(entries, res) = result;

    match res.rc {
        RC_SUCCESS => {}
        RC_SIZE_LIMIT_EXCEEDED => {
            debug!("Size limit of {} reached, returning the first page", limit)
        }
        rc => {
            error!("Search below {} failed rc={} {}", base, rc, res.text);
            return Err(ClientError::Search(rc, res.text));
        }
    }

    Ok(entries
        .into_iter()
        .filter(|re| !re.is_ref() && !re.is_intermediate())
        .map(SearchEntry::construct)
        .filter(|se| !se.dn.is_empty())
        .map(to_record)
        .collect())
}

/// unicodePwd takes the password in double quotes, encoded as UTF-16LE.
pub(crate) fn encode_ad_password(password: &str) -> Vec<u8> {
    format!("\"{}\"", password)
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect()
}

impl Directory for LdapDirectory {
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError> {
        let attrs: Vec<&str> = if attrs.is_empty() {
            vec![ATTR_NONE]
        } else {
            attrs.to_vec()
        };

        let result = self
            .ldap
            .with_search_options(SearchOptions::new().sizelimit(limit))
            .search(base, Scope::Subtree, filter, attrs)?;

        into_records(result, base, limit)
    }

    fn modify_password(
        &mut self,
        user_dn: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<OperationOutcome, ClientError> {
        let attr = ATTR_UNICODEPWD.as_bytes().to_vec();
        let mods = vec![
            Mod::Delete(
                attr.clone(),
                HashSet::from([encode_ad_password(old_password)]),
            ),
            Mod::Add(attr, HashSet::from([encode_ad_password(new_password)])),
        ];
        debug!("Changing password of {}", user_dn);
        let res = self.ldap.modify(user_dn, mods)?;
        Ok(to_outcome(res))
    }

    fn add_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError> {
        self.modify_groups(member_dns, group_dns, true)
    }

    fn remove_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError> {
        self.modify_groups(member_dns, group_dns, false)
    }

    fn unbind(&mut self) -> Result<(), ClientError> {
        debug!("Unbinding from {}", self.url);
        self.ldap.unbind().map_err(ClientError::from)
    }
}
