#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

#[macro_use]
extern crate tracing;

use msad_proto::constants::{ATTR_DISTINGUISHEDNAME, ATTR_NONE};
pub use msad_proto::v1::{AttrValue, AttributeRecord, OperationOutcome, UserCheckReport};

pub mod config;
pub mod filter;
mod group;
pub mod ldap;
mod user;

pub use crate::config::{ConfigError, Credentials, DomainProfile};
pub use crate::ldap::LdapDirectory;
pub use crate::user::PasswordSource;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("ldap failure: {0}")]
    Ldap(#[from] ldap3::LdapError),
    #[error("bind as {0} failed: {1}")]
    Bind(String, String),
    #[error("kerberos bind requested, but msad was built without the gssapi feature")]
    KerberosUnsupported,
    #[error("search failed (rc={0}): {1}")]
    Search(u32, String),
    #[error("unable to parse {0} value '{1}'")]
    AttributeParse(String, String),
    #[error("unable to read password: {0}")]
    PasswordInput(String),
}

/// The set of directory capabilities msad relies on. Binding happens when the
/// implementation is constructed, so every value of this trait is an authenticated
/// session.
pub trait Directory {
    /// Subtree search below `base`. `limit` of 0 leaves the size limit to the
    /// server. An empty `attrs` asks for no attributes. Referrals are never
    /// returned.
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError>;

    /// Change a password as the account itself, proving knowledge of the old one.
    fn modify_password(
        &mut self,
        user_dn: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<OperationOutcome, ClientError>;

    fn add_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError>;

    fn remove_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError>;

    fn unbind(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

/// A session against one domain. Every query is rooted at the domain search base
/// unless stated otherwise.
#[derive(Debug)]
pub struct MsadClient<D: Directory> {
    pub(crate) directory: D,
    pub(crate) search_base: String,
}

impl MsadClient<LdapDirectory> {
    /// Open and bind a connection for the profile. Failing to bind is fatal for
    /// the caller, there is no retry.
    pub fn connect(profile: &DomainProfile) -> Result<Self, ClientError> {
        let directory = LdapDirectory::connect(profile)?;
        Ok(MsadClient::new(directory, profile.search_base.as_str()))
    }
}

impl<D: Directory> MsadClient<D> {
    pub fn new(directory: D, search_base: &str) -> Self {
        MsadClient {
            directory,
            search_base: search_base.to_string(),
        }
    }

    pub fn search_base(&self) -> &str {
        self.search_base.as_str()
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn into_directory(self) -> D {
        self.directory
    }

    pub fn close(mut self) -> Result<(), ClientError> {
        self.directory.unbind()
    }

    /// Search below the domain search base.
    pub fn search(
        &mut self,
        filter: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError> {
        let base = self.search_base.clone();
        self.search_in(base.as_str(), filter, limit, attrs)
    }

    pub fn search_in(
        &mut self,
        base: &str,
        filter: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError> {
        debug!(%base, %filter, limit, "searching");
        let records = self.directory.search(base, filter, limit, attrs)?;
        trace!(?records);
        Ok(records)
    }

    /// Resolve a sAMAccountName to a DN.
    ///
    /// When several entries share the name the first one in server response order
    /// wins. This is not reported as an error.
    pub fn get_dn(&mut self, account_name: &str) -> Result<Option<String>, ClientError> {
        let filter = filter::account_name(account_name);
        let mut records = self.search(filter.as_str(), 0, &[ATTR_DISTINGUISHEDNAME])?;

        if records.len() > 1 {
            warn!(
                "{} entries match sAMAccountName={}, using the first one",
                records.len(),
                account_name
            );
        }

        if records.is_empty() {
            debug!("No entry has sAMAccountName={}", account_name);
            return Ok(None);
        }

        let first = records.swap_remove(0);
        let dn = first
            .first(ATTR_DISTINGUISHEDNAME)
            .map(str::to_string)
            .unwrap_or(first.dn);
        debug!("{} resolved to {}", account_name, dn);
        Ok(Some(dn))
    }

    /// Search user accounts by sAMAccountName, mail, cn or userPrincipalName. The
    /// token may contain `*` wildcards.
    pub fn users(
        &mut self,
        token: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError> {
        let filter = filter::users(token);
        self.search(filter.as_str(), limit, attrs)
    }

    /// True when the filter matches exactly one entry, more than one is false.
    pub(crate) fn matches_exactly_one(
        &mut self,
        filter: &str,
        limit: i32,
    ) -> Result<bool, ClientError> {
        let records = self.search(filter, limit, &[ATTR_NONE])?;
        Ok(records.len() == 1)
    }
}
