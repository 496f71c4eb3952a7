use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use msad_proto::constants::DEFAULT_CONFIG_PATH_HOME;
use serde::Deserialize;

pub const SAMPLE_CONFIG: &str = r#"
[defaults]

domain = "mydomain"

[domains]

[domains.mydomain]

host = "example.com"
search_base = "dc=example,dc=com"

port = 636
use_ssl = true
#port = 389
#use_ssl = false

# Leave user and password unset to bind with your kerberos ticket.
# user = "EXAMPLE\\jdoe"
# password = ""

# verify_ca = true
# connect_timeout = 10
"#;

/// Each variant maps to its own process exit code, see `exit_code`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing file {0}")]
    MissingFile(String),
    #[error("File {0} is not readable: {1}")]
    Unreadable(String, String),
    #[error("Unable to parse config from {0}: {1}")]
    Parse(String, String),
    #[error("Missing entry 'defaults' in config file")]
    MissingDefaults,
    #[error("Missing entry 'domain' in section 'defaults' in config file")]
    MissingDefaultDomain,
    #[error("Missing section 'domains' in config file")]
    MissingDomains,
    #[error("Missing section '{0}' in section 'domains' in config file (the default domain)")]
    MissingDefaultDomainSection(String),
    #[error("Missing section '{0}' in section 'domains' in config file")]
    MissingDomainSection(String),
    #[error("Missing required field '{field}' in section 'domains.{domain}' in config file")]
    MissingField { domain: String, field: &'static str },
}

impl ConfigError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::MissingFile(_) => 1,
            ConfigError::Unreadable(..) => 2,
            ConfigError::Parse(..) => 3,
            ConfigError::MissingDefaults => 100,
            ConfigError::MissingDefaultDomain => 101,
            ConfigError::MissingDomains => 102,
            ConfigError::MissingDefaultDomainSection(_) => 103,
            ConfigError::MissingDomainSection(_) => 104,
            ConfigError::MissingField { field, .. } => match *field {
                "host" => 105,
                "port" => 106,
                "search_base" => 107,
                "use_ssl" => 108,
                _ => 109,
            },
        }
    }
}

/// A file that vanished between the existence check and the read is still a
/// missing file, anything else is unreadable.
fn read_error(path_str: &str, e: &io::Error) -> ConfigError {
    match e.kind() {
        ErrorKind::NotFound => ConfigError::MissingFile(path_str.to_string()),
        _ => ConfigError::Unreadable(path_str.to_string(), e.to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    defaults: Option<DefaultsSection>,
    domains: Option<BTreeMap<String, DomainSection>>,
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsSection {
    domain: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct DomainSection {
    host: Option<String>,
    port: Option<u16>,
    search_base: Option<String>,
    use_ssl: Option<bool>,
    user: Option<String>,
    password: Option<String>,
    verify_ca: Option<bool>,
    connect_timeout: Option<u64>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

/// Connection settings for one directory, as read from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProfile {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub search_base: String,
    /// When absent the bind uses the kerberos ticket of the caller.
    pub credentials: Option<Credentials>,
    pub verify_ca: bool,
    pub connect_timeout: Option<u64>,
}

impl DomainProfile {
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Load the profile from `config_path`, or `~/.msad.toml` when no path is given.
    /// `domain` selects a section of `domains`, defaulting to `defaults.domain`.
    pub fn load<P: AsRef<Path>>(
        config_path: Option<P>,
        domain: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match config_path {
            Some(p) => Self::read_from_file(p.as_ref(), domain),
            None => {
                let home_path: String = shellexpand::tilde(DEFAULT_CONFIG_PATH_HOME).into_owned();
                Self::read_from_file(Path::new(&home_path), domain)
            }
        }
    }

    pub fn read_from_file(config_path: &Path, domain: Option<&str>) -> Result<Self, ConfigError> {
        let path_str = config_path.display().to_string();
        debug!("Attempting to load configuration from {}", path_str);

        if !config_path.is_file() {
            return Err(ConfigError::MissingFile(path_str));
        }

        let mut f = File::open(config_path).map_err(|e| {
            error!("{:?}", e);
            read_error(path_str.as_str(), &e)
        })?;

        let mut contents = String::new();
        f.read_to_string(&mut contents).map_err(|e| {
            error!("{:?}", e);
            read_error(path_str.as_str(), &e)
        })?;

        Self::from_toml(contents.as_str(), path_str.as_str(), domain)
    }

    pub fn from_toml(contents: &str, source: &str, domain: Option<&str>) -> Result<Self, ConfigError> {
        let document: ConfigDocument = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(source.to_string(), e.to_string()))?;

        let default_domain = document
            .defaults
            .ok_or(ConfigError::MissingDefaults)?
            .domain
            .ok_or(ConfigError::MissingDefaultDomain)?;

        let mut domains = document.domains.ok_or(ConfigError::MissingDomains)?;

        if !domains.contains_key(&default_domain) {
            return Err(ConfigError::MissingDefaultDomainSection(default_domain));
        }

        let name = match domain {
            Some(d) if !domains.contains_key(d) => {
                return Err(ConfigError::MissingDomainSection(d.to_string()))
            }
            Some(d) => d.to_string(),
            None => default_domain,
        };

        let section = domains
            .remove(&name)
            .ok_or_else(|| ConfigError::MissingDomainSection(name.clone()))?;

        let missing = |field: &'static str| ConfigError::MissingField {
            domain: name.clone(),
            field,
        };

        let host = section.host.ok_or_else(|| missing("host"))?;
        let port = section.port.ok_or_else(|| missing("port"))?;
        let search_base = section.search_base.ok_or_else(|| missing("search_base"))?;
        let use_ssl = section.use_ssl.ok_or_else(|| missing("use_ssl"))?;

        let credentials = match (section.user, section.password) {
            (Some(user), Some(password)) => Some(Credentials { user, password }),
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "Only one of user and password is set in 'domains.{}', using kerberos",
                    name
                );
                None
            }
            (None, None) => None,
        };

        Ok(DomainProfile {
            name,
            host,
            port,
            use_ssl,
            search_base,
            credentials,
            verify_ca: section.verify_ca.unwrap_or(true),
            connect_timeout: section.connect_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{read_error, ConfigError, DomainProfile, SAMPLE_CONFIG};
    use std::io::{self, ErrorKind};

    const TWO_DOMAINS: &str = r#"
[defaults]
domain = "corp"

[domains.corp]
host = "dc1.corp.example.com"
port = 636
use_ssl = true
search_base = "dc=corp,dc=example,dc=com"
user = "CORP\\svc_msad"
password = "hunter2"

[domains.lab]
host = "dc.lab.example.com"
port = 389
use_ssl = false
search_base = "dc=lab,dc=example,dc=com"
verify_ca = false
connect_timeout = 5
"#;

    #[test]
    fn test_default_domain() {
        let p = DomainProfile::from_toml(TWO_DOMAINS, "test", None).expect("parse failure");
        assert_eq!(p.name, "corp");
        assert_eq!(p.url(), "ldaps://dc1.corp.example.com:636");
        assert_eq!(p.search_base, "dc=corp,dc=example,dc=com");
        let creds = p.credentials.expect("no credentials");
        assert_eq!(creds.user, r"CORP\svc_msad");
        assert!(!format!("{:?}", creds).contains("hunter2"));
        assert!(p.verify_ca);
        assert_eq!(p.connect_timeout, None);
    }

    #[test]
    fn test_selected_domain() {
        let p = DomainProfile::from_toml(TWO_DOMAINS, "test", Some("lab")).expect("parse failure");
        assert_eq!(p.url(), "ldap://dc.lab.example.com:389");
        assert_eq!(p.credentials, None);
        assert!(!p.verify_ca);
        assert_eq!(p.connect_timeout, Some(5));
    }

    #[test]
    fn test_sample_config_parses() {
        let p = DomainProfile::from_toml(SAMPLE_CONFIG, "sample", None).expect("parse failure");
        assert_eq!(p.name, "mydomain");
        assert_eq!(p.port, 636);
        assert_eq!(p.credentials, None);
    }

    #[test]
    fn test_missing_sections() {
        let e = DomainProfile::from_toml("[domains.a]\nhost = \"x\"\n", "t", None)
            .expect_err("should fail");
        assert_eq!(e, ConfigError::MissingDefaults);
        assert_eq!(e.exit_code(), 100);

        let e = DomainProfile::from_toml("[defaults]\n", "t", None).expect_err("should fail");
        assert_eq!(e.exit_code(), 101);

        let e = DomainProfile::from_toml("[defaults]\ndomain = \"a\"\n", "t", None)
            .expect_err("should fail");
        assert_eq!(e, ConfigError::MissingDomains);
        assert_eq!(e.exit_code(), 102);

        let e = DomainProfile::from_toml(
            "[defaults]\ndomain = \"a\"\n[domains.b]\nhost = \"x\"\n",
            "t",
            None,
        )
        .expect_err("should fail");
        assert_eq!(e.exit_code(), 103);

        let e = DomainProfile::from_toml(TWO_DOMAINS, "t", Some("nope")).expect_err("should fail");
        assert_eq!(e, ConfigError::MissingDomainSection("nope".to_string()));
        assert_eq!(e.exit_code(), 104);
    }

    #[test]
    fn test_missing_fields_have_distinct_codes() {
        let full = [
            ("host", "host = \"x\""),
            ("port", "port = 389"),
            ("search_base", "search_base = \"dc=x\""),
            ("use_ssl", "use_ssl = false"),
        ];
        let mut codes = Vec::new();
        for (skip, _) in full.iter() {
            let body: Vec<&str> = full
                .iter()
                .filter(|(name, _)| name != skip)
                .map(|(_, line)| *line)
                .collect();
            let doc = format!("[defaults]\ndomain = \"a\"\n[domains.a]\n{}\n", body.join("\n"));
            let e = DomainProfile::from_toml(&doc, "t", None).expect_err("should fail");
            assert_eq!(
                e,
                ConfigError::MissingField {
                    domain: "a".to_string(),
                    field: *skip,
                }
            );
            codes.push(e.exit_code());
        }
        assert_eq!(codes, vec![105, 106, 107, 108]);
    }

    #[test]
    fn test_read_error_codes() {
        let denied = io::Error::new(ErrorKind::PermissionDenied, "permission denied");
        let e = read_error("/etc/msad.toml", &denied);
        assert!(matches!(e, ConfigError::Unreadable(ref p, _) if p == "/etc/msad.toml"));
        assert_eq!(e.exit_code(), 2);

        let gone = io::Error::new(ErrorKind::NotFound, "no such file");
        assert_eq!(read_error("/etc/msad.toml", &gone).exit_code(), 1);

        let garbled = io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8");
        assert_eq!(read_error("/etc/msad.toml", &garbled).exit_code(), 2);
    }

    #[test]
    fn test_parse_error() {
        let e = DomainProfile::from_toml("[defaults\n", "t", None).expect_err("should fail");
        assert_eq!(e.exit_code(), 3);
    }
}
