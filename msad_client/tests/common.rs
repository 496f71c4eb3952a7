#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;

use msad_client::filter;
use msad_client::{ClientError, Directory, MsadClient, PasswordSource};
use msad_proto::v1::{AttributeRecord, OperationOutcome};
use time::OffsetDateTime;

pub const BASE: &str = "DC=example,DC=com";
pub const JDOE_DN: &str = "CN=John Doe,OU=Users,DC=example,DC=com";
pub const ASMITH_DN: &str = "CN=Anna Smith,OU=Users,DC=example,DC=com";
pub const ADMINS_DN: &str = "CN=admins,OU=Groups,DC=example,DC=com";
pub const SALES_DN: &str = "CN=sales,OU=Groups,DC=example,DC=com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub base: String,
    pub filter: String,
    pub limit: i32,
    pub attrs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Password {
        dn: String,
        old: String,
        new: String,
    },
    AddMembers {
        members: Vec<String>,
        groups: Vec<String>,
    },
    RemoveMembers {
        members: Vec<String>,
        groups: Vec<String>,
    },
}

/// An in memory directory answering searches from canned responses keyed by
/// base and filter. A positive limit truncates the answer like a server size
/// limit would.
#[derive(Debug)]
pub struct MockDirectory {
    responses: HashMap<(String, String), Vec<AttributeRecord>>,
    pub searches: Vec<SearchCall>,
    pub mutations: Vec<Mutation>,
    pub outcome: OperationOutcome,
    pub unbound: bool,
}

impl Default for MockDirectory {
    fn default() -> Self {
        MockDirectory {
            responses: HashMap::new(),
            searches: Vec::new(),
            mutations: Vec::new(),
            outcome: OperationOutcome::Success,
            unbound: false,
        }
    }
}

impl MockDirectory {
    pub fn respond(&mut self, base: &str, filter: &str, records: Vec<AttributeRecord>) {
        self.responses
            .insert((base.to_string(), filter.to_string()), records);
    }

    pub fn account(&mut self, name: &str, dn: &str) {
        let record = AttributeRecord::new(dn).with_attr("distinguishedName", dn);
        self.respond(BASE, filter::account_name(name).as_str(), vec![record]);
    }

    pub fn searched(&self, filter: &str) -> bool {
        self.searches.iter().any(|s| s.filter == filter)
    }
}

impl Directory for MockDirectory {
    fn search(
        &mut self,
        base: &str,
        filter: &str,
        limit: i32,
        attrs: &[&str],
    ) -> Result<Vec<AttributeRecord>, ClientError> {
        self.searches.push(SearchCall {
            base: base.to_string(),
            filter: filter.to_string(),
            limit,
            attrs: attrs.iter().map(|a| a.to_string()).collect(),
        });
        let mut records = self
            .responses
            .get(&(base.to_string(), filter.to_string()))
            .cloned()
            .unwrap_or_default();
        if limit > 0 {
            records.truncate(limit as usize);
        }
        Ok(records)
    }

    fn modify_password(
        &mut self,
        user_dn: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<OperationOutcome, ClientError> {
        self.mutations.push(Mutation::Password {
            dn: user_dn.to_string(),
            old: old_password.to_string(),
            new: new_password.to_string(),
        });
        Ok(self.outcome.clone())
    }

    fn add_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError> {
        self.mutations.push(Mutation::AddMembers {
            members: member_dns.iter().map(|s| s.to_string()).collect(),
            groups: group_dns.iter().map(|s| s.to_string()).collect(),
        });
        Ok(self.outcome.clone())
    }

    fn remove_group_members(
        &mut self,
        member_dns: &[&str],
        group_dns: &[&str],
    ) -> Result<OperationOutcome, ClientError> {
        self.mutations.push(Mutation::RemoveMembers {
            members: member_dns.iter().map(|s| s.to_string()).collect(),
            groups: group_dns.iter().map(|s| s.to_string()).collect(),
        });
        Ok(self.outcome.clone())
    }

    fn unbind(&mut self) -> Result<(), ClientError> {
        self.unbound = true;
        Ok(())
    }
}

/// Answers prompts from a fixed script.
pub struct ScriptedPasswords {
    pub answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedPasswords {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPasswords {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl PasswordSource for ScriptedPasswords {
    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more answers"))
    }
}

/// jdoe and asmith in the users OU, admins and sales in the groups OU.
pub fn example_domain() -> MockDirectory {
    let mut d = MockDirectory::default();
    d.account("jdoe", JDOE_DN);
    d.account("asmith", ASMITH_DN);
    d.account("admins", ADMINS_DN);
    d.account("sales", SALES_DN);
    d
}

pub fn client(directory: MockDirectory) -> MsadClient<MockDirectory> {
    init_logging();
    MsadClient::new(directory, BASE)
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// The pwdLastSet representation of an instant.
pub fn filetime(t: OffsetDateTime) -> String {
    ((t.unix_timestamp() + 11_644_473_600) * 10_000_000).to_string()
}
