use std::process::ExitCode;

use crate::common::{finish, handle_client_error, handle_outcome, TtyPasswords};
use crate::UserOpt;

impl UserOpt {
    pub fn exec(&self) -> ExitCode {
        match self {
            UserOpt::Dn(aopt) => {
                let mut client = aopt.copt.to_client();
                match client.get_dn(aopt.name.as_str()) {
                    Ok(Some(dn)) => {
                        println!("{}", dn);
                        finish(client, ExitCode::SUCCESS)
                    }
                    Ok(None) => {
                        error!("No account named '{}'", aopt.name);
                        finish(client, ExitCode::FAILURE)
                    }
                    Err(e) => handle_client_error(client, &e),
                }
            }
            UserOpt::Groups(gopt) => {
                let mut client = gopt.copt.to_client();
                match client.user_groups(gopt.name.as_str(), gopt.copt.limit, gopt.nested) {
                    Ok(Some(records)) => {
                        gopt.copt.print_records(&records);
                        finish(client, ExitCode::SUCCESS)
                    }
                    Ok(None) => {
                        error!("No user named '{}'", gopt.name);
                        finish(client, ExitCode::FAILURE)
                    }
                    Err(e) => handle_client_error(client, &e),
                }
            }
            UserOpt::Check(copt) => {
                let mut client = copt.copt.to_client();
                match client.check_user(copt.name.as_str(), copt.max_age, &copt.groups) {
                    Ok(report) => {
                        copt.copt.print_report(&report);
                        finish(client, ExitCode::SUCCESS)
                    }
                    Err(e) => handle_client_error(client, &e),
                }
            }
            UserOpt::ChangePassword(aopt) => {
                let mut client = aopt.copt.to_client();
                match client.change_password(aopt.name.as_str(), &mut TtyPasswords) {
                    Ok(Some(outcome)) => {
                        let code = handle_outcome(&outcome);
                        finish(client, code)
                    }
                    Ok(None) => {
                        error!("No user named '{}'", aopt.name);
                        finish(client, ExitCode::FAILURE)
                    }
                    Err(e) => handle_client_error(client, &e),
                }
            }
        }
    }
}
