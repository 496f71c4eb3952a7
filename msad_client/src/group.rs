use msad_proto::constants::ATTR_MEMBER;
use msad_proto::v1::{AttributeRecord, OperationOutcome};

use crate::{filter, ClientError, Directory, MsadClient};

impl<D: Directory> MsadClient<D> {
    /// Resolve a group and a user, group first. Stops at the first name that does
    /// not resolve.
    fn resolve_pair(
        &mut self,
        group: &str,
        user: &str,
    ) -> Result<Option<(String, String)>, ClientError> {
        let group_dn = match self.get_dn(group)? {
            Some(dn) => dn,
            None => {
                error!("Missing group DN for {}", group);
                return Ok(None);
            }
        };
        let user_dn = match self.get_dn(user)? {
            Some(dn) => dn,
            None => {
                error!("Missing user DN for {}", user);
                return Ok(None);
            }
        };
        Ok(Some((group_dn, user_dn)))
    }

    /// `None` when either name does not resolve, in which case the directory is
    /// not modified.
    pub fn add_member(
        &mut self,
        group: &str,
        user: &str,
    ) -> Result<Option<OperationOutcome>, ClientError> {
        let (group_dn, user_dn) = match self.resolve_pair(group, user)? {
            Some(pair) => pair,
            None => return Ok(None),
        };
        info!("Adding {} to {}", user_dn, group_dn);
        self.directory
            .add_group_members(&[user_dn.as_str()], &[group_dn.as_str()])
            .map(Some)
    }

    /// `None` when either name does not resolve, in which case the directory is
    /// not modified.
    pub fn remove_member(
        &mut self,
        group: &str,
        user: &str,
    ) -> Result<Option<OperationOutcome>, ClientError> {
        let (group_dn, user_dn) = match self.resolve_pair(group, user)? {
            Some(pair) => pair,
            None => return Ok(None),
        };
        info!("Removing {} from {}", user_dn, group_dn);
        self.directory
            .remove_group_members(&[user_dn.as_str()], &[group_dn.as_str()])
            .map(Some)
    }

    /// The group entry itself with its direct `member` values.
    pub fn group_members(
        &mut self,
        group: &str,
    ) -> Result<Option<Vec<AttributeRecord>>, ClientError> {
        let group_dn = match self.get_dn(group)? {
            Some(dn) => dn,
            None => return Ok(None),
        };
        let f = filter::direct_members(group_dn.as_str());
        self.search_in(group_dn.as_str(), f.as_str(), 1, &[ATTR_MEMBER])
            .map(Some)
    }

    /// Every person in the group, including the members of nested groups.
    pub fn group_flat_members(
        &mut self,
        group: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Option<Vec<AttributeRecord>>, ClientError> {
        let group_dn = match self.get_dn(group)? {
            Some(dn) => dn,
            None => return Ok(None),
        };
        let f = filter::flat_members(group_dn.as_str());
        self.search(f.as_str(), limit, attrs).map(Some)
    }

    /// Transitive membership check. `None` when either name does not resolve.
    pub fn is_group_member(
        &mut self,
        group: &str,
        user: &str,
    ) -> Result<Option<bool>, ClientError> {
        let (group_dn, user_dn) = match self.resolve_pair(group, user)? {
            Some(pair) => pair,
            None => return Ok(None),
        };
        let f = filter::group_member(group_dn.as_str(), user_dn.as_str());
        self.matches_exactly_one(f.as_str(), 0).map(Some)
    }
}
