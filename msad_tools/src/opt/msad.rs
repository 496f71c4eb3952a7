use clap::{Args, Parser, Subcommand};
use msad_proto::constants::DEFAULT_SEARCH_LIMIT;
use std::path::PathBuf;

#[derive(Debug, Args, Clone)]
pub struct CommonOpt {
    /// The domain section of the config file to use, defaults to defaults.domain
    #[clap(short = 'd', long = "domain", env = "MSAD_DOMAIN")]
    pub domain: Option<String>,
    /// Path to the config file
    #[clap(short = 'c', long = "config-file", env = "MSAD_CONFIG")]
    pub config_file: Option<PathBuf>,
    /// Maximum number of entries requested from the server, 0 for the server limit
    #[clap(short = 'z', long = "limit", default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: i32,
    /// Output format
    #[clap(
        short = 'o',
        long = "output",
        default_value = "json",
        value_parser = ["default", "json1", "json", "csv"]
    )]
    pub output: String,
    /// Field separator of the csv output
    #[clap(long = "sep", default_value = "\t")]
    pub sep: String,
    /// Attributes to return, may be repeated
    #[clap(short = 'a', long = "attributes", default_value = "distinguishedName")]
    pub attributes: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct AccountNamed {
    pub name: String,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct SearchOpt {
    /// A raw ldap filter, for example "(objectClass=group)"
    pub filter: String,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct UsersOpt {
    /// Matched against sAMAccountName, mail, cn and userPrincipalName. May contain *
    pub token: String,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct UserGroupsOpt {
    pub name: String,
    /// Follow nested group membership
    #[clap(long = "nested")]
    pub nested: bool,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct UserCheckOpt {
    pub name: String,
    /// Maximum password age in days
    #[clap(long = "max-age")]
    pub max_age: i64,
    /// Groups the user is expected to belong to, may be repeated
    #[clap(short = 'g', long = "group")]
    pub groups: Vec<String>,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct GroupMembersOpt {
    pub group: String,
    /// List every person of the group, including members of nested groups
    #[clap(long = "nested")]
    pub nested: bool,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Args, Clone)]
pub struct GroupUserOpt {
    pub group: String,
    pub user: String,
    #[clap(flatten)]
    pub copt: CommonOpt,
}

#[derive(Debug, Subcommand, Clone)]
pub enum UserOpt {
    /// Show the distinguished name of an account
    #[clap(name = "dn")]
    Dn(AccountNamed),
    /// List the groups of a user
    #[clap(name = "groups")]
    Groups(UserGroupsOpt),
    /// Check the health of an account: disabled, locked, password age and memberships
    #[clap(name = "check")]
    Check(UserCheckOpt),
    /// Change the password of a user, prompting for the old and new one
    #[clap(name = "change-password")]
    ChangePassword(AccountNamed),
}

#[derive(Debug, Subcommand, Clone)]
pub enum GroupOpt {
    /// List the members of a group
    #[clap(name = "members")]
    Members(GroupMembersOpt),
    /// Add a user to a group
    #[clap(name = "add-member")]
    AddMember(GroupUserOpt),
    /// Remove a user from a group
    #[clap(name = "remove-member")]
    RemoveMember(GroupUserOpt),
    /// Check if a user is a member of a group, following nested groups
    #[clap(name = "is-member")]
    IsMember(GroupUserOpt),
}

#[derive(Debug, Subcommand, Clone)]
#[clap(about = "Active Directory command line tool")]
pub enum MsadClientOpt {
    /// Search the domain with a raw ldap filter
    #[clap(name = "search")]
    Search(SearchOpt),
    /// Find user accounts
    #[clap(name = "users")]
    Users(UsersOpt),
    /// Actions on a single user
    #[clap(name = "user")]
    User {
        #[clap(subcommand)]
        commands: UserOpt,
    },
    /// Group membership actions
    #[clap(name = "group")]
    Group {
        #[clap(subcommand)]
        commands: GroupOpt,
    },
    /// Print a sample config file
    #[clap(name = "sample-config")]
    SampleConfig,
    /// Print the program version and exit
    #[clap(name = "version")]
    Version,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "msad", version)]
pub struct MsadClientParser {
    #[clap(subcommand)]
    pub commands: MsadClientOpt,

    /// Enable debugging of the msad tool
    #[clap(long, env = "MSAD_DEBUG", global = true)]
    pub debug: bool,
}
