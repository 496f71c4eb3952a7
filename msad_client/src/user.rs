use msad_proto::constants::{
    ATTR_MEMBEROF, ATTR_PWDLASTSET, ATTR_SAMACCOUNTNAME, FACT_EXPIRED_PASSWORD,
    FACT_IS_DISABLED, FACT_IS_LOCKED, FACT_MEMBERSHIP_PREFIX, FACT_NEVER_EXPIRES_PASSWORD,
    FACT_PASSWORD_CHANGED_IN_DAYS,
};
use msad_proto::v1::{AttributeRecord, OperationOutcome, UserCheckReport};
use time::OffsetDateTime;

use crate::{filter, ClientError, Directory, MsadClient};

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH_DELTA: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: i64 = 10_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Where interactive passwords come from. The cli reads them from the terminal
/// without echo.
pub trait PasswordSource {
    fn read_password(&mut self, prompt: &str) -> std::io::Result<String>;
}

enum PasswordSet {
    MustChange,
    At(OffsetDateTime),
    /// The attribute is absent from the entry, usually hidden by access rights.
    Unreadable,
}

/// When the password was last set, or `None` for the zero value that forces a
/// change at next logon.
pub(crate) fn parse_pwd_last_set(value: &str) -> Result<Option<OffsetDateTime>, ClientError> {
    let parse_err = || ClientError::AttributeParse(ATTR_PWDLASTSET.to_string(), value.to_string());

    let ticks: i64 = value.trim().parse().map_err(|_| parse_err())?;
    if ticks == 0 {
        return Ok(None);
    }
    let unix = ticks / FILETIME_TICKS_PER_SECOND - FILETIME_UNIX_EPOCH_DELTA;
    OffsetDateTime::from_unix_timestamp(unix)
        .map(Some)
        .map_err(|_| parse_err())
}

/// Whole days between two instants, rounded down.
pub(crate) fn days_between(earlier: OffsetDateTime, later: OffsetDateTime) -> i64 {
    (later - earlier).whole_seconds().div_euclid(SECONDS_PER_DAY)
}

impl<D: Directory> MsadClient<D> {
    fn account_flag(&mut self, filter: &str) -> Result<bool, ClientError> {
        self.matches_exactly_one(filter, 1)
    }

    pub fn is_disabled(&mut self, user: &str) -> Result<bool, ClientError> {
        let f = filter::disabled_users(filter::account_name(user).as_str());
        self.account_flag(f.as_str())
    }

    pub fn is_locked(&mut self, user: &str) -> Result<bool, ClientError> {
        let f = filter::locked_users(filter::account_name(user).as_str());
        self.account_flag(f.as_str())
    }

    pub fn has_never_expires_password(&mut self, user: &str) -> Result<bool, ClientError> {
        let f = filter::never_expires_password(filter::account_name(user).as_str());
        self.account_flag(f.as_str())
    }

    /// `Ok(None)` when the user does not exist.
    fn pwd_last_set(&mut self, user: &str) -> Result<Option<PasswordSet>, ClientError> {
        let f = filter::account_name(user);
        let records = self.search(f.as_str(), 1, &[ATTR_PWDLASTSET])?;

        let record = match records.first() {
            Some(r) => r,
            None => {
                debug!("User {} not found", user);
                return Ok(None);
            }
        };

        match record.first(ATTR_PWDLASTSET) {
            Some(v) => {
                let set_at = parse_pwd_last_set(v)?;
                info!("Password of {} changed at {:?}", user, set_at);
                Ok(Some(set_at.map_or(PasswordSet::MustChange, PasswordSet::At)))
            }
            None => {
                warn!("{} is not readable for {}", ATTR_PWDLASTSET, record.dn);
                Ok(Some(PasswordSet::Unreadable))
            }
        }
    }

    pub fn password_changed_in_days(&mut self, user: &str) -> Result<Option<i64>, ClientError> {
        #[allow(clippy::disallowed_methods)]
        let now = OffsetDateTime::now_utc();
        self.password_changed_in_days_at(user, now)
    }

    pub fn password_changed_in_days_at(
        &mut self,
        user: &str,
        now: OffsetDateTime,
    ) -> Result<Option<i64>, ClientError> {
        Ok(match self.pwd_last_set(user)? {
            Some(PasswordSet::At(set_at)) => Some(days_between(set_at, now)),
            _ => None,
        })
    }

    /// True when the password is older than `max_age_days`, or has to be changed at
    /// next logon. `None` when the user does not exist or pwdLastSet is not
    /// readable.
    pub fn password_age_exceeds(
        &mut self,
        user: &str,
        max_age_days: i64,
    ) -> Result<Option<bool>, ClientError> {
        #[allow(clippy::disallowed_methods)]
        let now = OffsetDateTime::now_utc();
        self.password_age_exceeds_at(user, max_age_days, now)
    }

    pub fn password_age_exceeds_at(
        &mut self,
        user: &str,
        max_age_days: i64,
        now: OffsetDateTime,
    ) -> Result<Option<bool>, ClientError> {
        Ok(match self.pwd_last_set(user)? {
            Some(PasswordSet::MustChange) => Some(true),
            Some(PasswordSet::At(set_at)) => Some(days_between(set_at, now) > max_age_days),
            Some(PasswordSet::Unreadable) | None => None,
        })
    }

    /// Run every health check for the user, one fact per check, in a fixed order.
    pub fn check_user(
        &mut self,
        user: &str,
        max_age_days: i64,
        groups: &[String],
    ) -> Result<UserCheckReport, ClientError> {
        #[allow(clippy::disallowed_methods)]
        let now = OffsetDateTime::now_utc();
        self.check_user_at(user, max_age_days, groups, now)
    }

    pub fn check_user_at(
        &mut self,
        user: &str,
        max_age_days: i64,
        groups: &[String],
        now: OffsetDateTime,
    ) -> Result<UserCheckReport, ClientError> {
        let mut report = UserCheckReport::new(user);

        report.push(FACT_IS_DISABLED, self.is_disabled(user)?);
        report.push(FACT_IS_LOCKED, self.is_locked(user)?);
        report.push(
            FACT_NEVER_EXPIRES_PASSWORD,
            self.has_never_expires_password(user)?,
        );
        report.push(
            FACT_PASSWORD_CHANGED_IN_DAYS,
            self.password_changed_in_days_at(user, now)?,
        );
        report.push(
            FACT_EXPIRED_PASSWORD,
            self.password_age_exceeds_at(user, max_age_days, now)?,
        );

        for group in groups {
            let label = format!("{}{}", FACT_MEMBERSHIP_PREFIX, group);
            report.push(label.as_str(), self.is_group_member(group, user)?);
        }

        Ok(report)
    }

    /// Groups of the user. Nested lists every group reached through membership
    /// chains by its sAMAccountName, otherwise the single user record carries its
    /// direct memberOf values. `None` when the user does not resolve.
    pub fn user_groups(
        &mut self,
        user: &str,
        limit: i32,
        nested: bool,
    ) -> Result<Option<Vec<AttributeRecord>>, ClientError> {
        let user_dn = match self.get_dn(user)? {
            Some(dn) => dn,
            None => return Ok(None),
        };

        let records = if nested {
            let f = filter::nested_user_groups(user_dn.as_str());
            self.search(f.as_str(), limit, &[ATTR_SAMACCOUNTNAME])?
        } else {
            self.search_in(
                user_dn.as_str(),
                filter::ANY_OBJECT,
                limit,
                &[ATTR_MEMBEROF],
            )?
        };
        Ok(Some(records))
    }

    /// Interactive password change. The directory is only asked to change the
    /// password when both entries of the new password agree. `None` when the user
    /// does not resolve.
    pub fn change_password<P: PasswordSource + ?Sized>(
        &mut self,
        user: &str,
        source: &mut P,
    ) -> Result<Option<OperationOutcome>, ClientError> {
        let user_dn = match self.get_dn(user)? {
            Some(dn) => dn,
            None => return Ok(None),
        };

        let read = |source: &mut P, prompt: &str| {
            source
                .read_password(prompt)
                .map_err(|e| ClientError::PasswordInput(e.to_string()))
        };

        let old_password = read(source, "Old password: ")?;
        let new_password = read(source, "New password: ")?;
        let new_password_check = read(source, "New password (check): ")?;

        if new_password != new_password_check {
            error!("Passwords do not match");
            return Ok(Some(OperationOutcome::PasswordMismatch));
        }

        self.directory
            .modify_password(user_dn.as_str(), old_password.as_str(), new_password.as_str())
            .map(Some)
    }
}
