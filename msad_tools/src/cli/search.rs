use std::process::ExitCode;

use crate::common::{finish, handle_client_error};
use crate::{SearchOpt, UsersOpt};

impl SearchOpt {
    pub fn exec(&self) -> ExitCode {
        let mut client = self.copt.to_client();
        match client.search(self.filter.as_str(), self.copt.limit, &self.copt.attrs()) {
            Ok(records) => {
                self.copt.print_records(&records);
                finish(client, ExitCode::SUCCESS)
            }
            Err(e) => handle_client_error(client, &e),
        }
    }
}

impl UsersOpt {
    pub fn exec(&self) -> ExitCode {
        let mut client = self.copt.to_client();
        match client.users(self.token.as_str(), self.copt.limit, &self.copt.attrs()) {
            Ok(records) => {
                if records.is_empty() {
                    info!("No user matches '{}'", self.token);
                }
                self.copt.print_records(&records);
                finish(client, ExitCode::SUCCESS)
            }
            Err(e) => handle_client_error(client, &e),
        }
    }
}
