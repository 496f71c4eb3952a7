use std::io;
use std::process::ExitCode;

use msad_client::{ClientError, DomainProfile, LdapDirectory, MsadClient, PasswordSource};
use msad_proto::output::{render_records, render_report, OutputFormat};
use msad_proto::v1::{AttributeRecord, OperationOutcome, UserCheckReport};

use crate::CommonOpt;

pub type LdapClient = MsadClient<LdapDirectory>;

/// Reads passwords from the controlling terminal without echo.
pub struct TtyPasswords;

impl PasswordSource for TtyPasswords {
    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

impl CommonOpt {
    pub fn to_profile(&self) -> DomainProfile {
        match DomainProfile::load(self.config_file.as_ref(), self.domain.as_deref()) {
            Ok(p) => p,
            Err(e) => {
                error!("{}. Bye!", e);
                std::process::exit(e.exit_code());
            }
        }
    }

    pub fn to_client(&self) -> LdapClient {
        let profile = self.to_profile();
        debug!(?profile, "connecting");

        match MsadClient::connect(&profile) {
            Ok(c) => c,
            Err(e) => {
                error!("Unable to connect to {} -- {}", profile.url(), e);
                std::process::exit(1);
            }
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        // clap only lets the known names through.
        self.output.parse().unwrap_or_default()
    }

    pub fn attrs(&self) -> Vec<&str> {
        self.attributes.iter().map(String::as_str).collect()
    }

    pub fn print_records(&self, records: &[AttributeRecord]) {
        match render_records(records, self.output_format(), self.sep.as_str()) {
            Some(text) => print!("{}", text),
            None => records.iter().for_each(|r| print!("{}", r)),
        }
    }

    pub fn print_report(&self, report: &UserCheckReport) {
        match render_report(report, self.output_format(), self.sep.as_str()) {
            Some(text) => print!("{}", text),
            None => print!("{}", report),
        }
    }
}

/// Unbind and hand back the exit code of the command.
pub fn finish(client: LdapClient, code: ExitCode) -> ExitCode {
    if let Err(e) = client.close() {
        warn!("Error during unbind -- {}", e);
    }
    code
}

pub fn handle_client_error(client: LdapClient, e: &ClientError) -> ExitCode {
    error!("Error -> {}", e);
    finish(client, ExitCode::FAILURE)
}

pub fn handle_outcome(outcome: &OperationOutcome) -> ExitCode {
    if outcome.is_success() {
        println!("{}", outcome);
        ExitCode::SUCCESS
    } else {
        error!("{}", outcome);
        ExitCode::FAILURE
    }
}
