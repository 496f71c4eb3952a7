use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/* ===== search results ===== */

/// The value of one attribute of a directory entry. Directory attributes may hold
/// several values, in which case the server order is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Single(String),
    Multi(Vec<String>),
}

impl AttrValue {
    pub fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            if let Some(v) = values.pop() {
                return AttrValue::Single(v);
            }
        }
        AttrValue::Multi(values)
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            AttrValue::Single(v) => vec![v.as_str()],
            AttrValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            AttrValue::Single(v) => Some(v.as_str()),
            AttrValue::Multi(vs) => vs.first().map(String::as_str),
        }
    }

    pub fn join(&self, sep: &str) -> String {
        match self {
            AttrValue::Single(v) => v.clone(),
            AttrValue::Multi(vs) => vs.join(sep),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Single(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Single(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(vs: Vec<String>) -> Self {
        AttrValue::from_values(vs)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(vs: Vec<&str>) -> Self {
        AttrValue::from_values(vs.into_iter().map(str::to_string).collect())
    }
}

/// One entry returned by a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub dn: String,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl AttributeRecord {
    pub fn new(dn: &str) -> Self {
        AttributeRecord {
            dn: dn.to_string(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr<V: Into<AttrValue>>(mut self, name: &str, value: V) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    /// Attribute names are case insensitive, and the server answers with its own
    /// casing rather than the one that was requested.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name).or_else(|| {
            self.attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::first)
    }
}

impl fmt::Display for AttributeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---")?;
        writeln!(f, "dn: {}", self.dn)?;
        self.attrs.iter().try_for_each(|(k, vs)| {
            vs.values()
                .into_iter()
                .try_for_each(|v| writeln!(f, "{}: {}", k, v))
        })
    }
}

/* ===== mutations ===== */

/// What the directory made of a modification request. A rejection is a normal
/// answer from the server and not a client failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationOutcome {
    Success,
    Rejected { rc: u32, message: String },
    /// The two entries of the new password differed, nothing was sent.
    PasswordMismatch,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success)
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationOutcome::Success => write!(f, "success"),
            OperationOutcome::Rejected { rc, message } if message.is_empty() => {
                write!(f, "rejected (rc={})", rc)
            }
            OperationOutcome::Rejected { rc, message } => {
                write!(f, "rejected (rc={}): {}", rc, message)
            }
            OperationOutcome::PasswordMismatch => write!(f, "new passwords do not match"),
        }
    }
}

/* ===== user health ===== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Flag(bool),
    Days(i64),
    /// The fact could not be established, usually because a name did not resolve.
    Unknown,
}

impl From<bool> for FactValue {
    fn from(b: bool) -> Self {
        FactValue::Flag(b)
    }
}

impl From<Option<bool>> for FactValue {
    fn from(b: Option<bool>) -> Self {
        b.map(FactValue::Flag).unwrap_or(FactValue::Unknown)
    }
}

impl From<Option<i64>> for FactValue {
    fn from(d: Option<i64>) -> Self {
        d.map(FactValue::Days).unwrap_or(FactValue::Unknown)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Flag(b) => write!(f, "{}", b),
            FactValue::Days(d) => write!(f, "{}", d),
            FactValue::Unknown => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFact {
    pub name: String,
    pub value: FactValue,
}

/// The ordered list of facts gathered about one account. Reading a prefix of
/// `facts` is the same as stopping the checks early.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserCheckReport {
    pub user: String,
    pub facts: Vec<UserFact>,
}

impl UserCheckReport {
    pub fn new(user: &str) -> Self {
        UserCheckReport {
            user: user.to_string(),
            facts: Vec::new(),
        }
    }

    pub fn push<V: Into<FactValue>>(&mut self, name: &str, value: V) {
        self.facts.push(UserFact {
            name: name.to_string(),
            value: value.into(),
        })
    }

    pub fn get(&self, name: &str) -> Option<FactValue> {
        self.facts.iter().find(|f| f.name == name).map(|f| f.value)
    }
}

impl Serialize for UserCheckReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Emitted as a map so the check order survives into json.
        let mut map = serializer.serialize_map(Some(self.facts.len()))?;
        for fact in &self.facts {
            map.serialize_entry(&fact.name, &fact.value)?;
        }
        map.end()
    }
}

impl fmt::Display for UserCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---")?;
        writeln!(f, "user: {}", self.user)?;
        self.facts
            .iter()
            .try_for_each(|fact| writeln!(f, "{}: {}", fact.name, fact.value))
    }
}
