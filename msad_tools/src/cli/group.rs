use std::process::ExitCode;

use crate::common::{finish, handle_client_error, handle_outcome, LdapClient};
use crate::GroupOpt;
use msad_client::{ClientError, OperationOutcome};

fn report_mutation(
    client: LdapClient,
    result: Result<Option<OperationOutcome>, ClientError>,
) -> ExitCode {
    match result {
        Ok(Some(outcome)) => {
            let code = handle_outcome(&outcome);
            finish(client, code)
        }
        // The missing name has been logged already.
        Ok(None) => finish(client, ExitCode::FAILURE),
        Err(e) => handle_client_error(client, &e),
    }
}

impl GroupOpt {
    pub fn exec(&self) -> ExitCode {
        match self {
            GroupOpt::Members(gopt) => {
                let mut client = gopt.copt.to_client();
                let result = if gopt.nested {
                    client.group_flat_members(
                        gopt.group.as_str(),
                        gopt.copt.limit,
                        &gopt.copt.attrs(),
                    )
                } else {
                    client.group_members(gopt.group.as_str())
                };
                match result {
                    Ok(Some(records)) => {
                        gopt.copt.print_records(&records);
                        finish(client, ExitCode::SUCCESS)
                    }
                    Ok(None) => {
                        error!("No group named '{}'", gopt.group);
                        finish(client, ExitCode::FAILURE)
                    }
                    Err(e) => handle_client_error(client, &e),
                }
            }
            GroupOpt::AddMember(gopt) => {
                let mut client = gopt.copt.to_client();
                let result = client.add_member(gopt.group.as_str(), gopt.user.as_str());
                report_mutation(client, result)
            }
            GroupOpt::RemoveMember(gopt) => {
                let mut client = gopt.copt.to_client();
                let result = client.remove_member(gopt.group.as_str(), gopt.user.as_str());
                report_mutation(client, result)
            }
            GroupOpt::IsMember(gopt) => {
                let mut client = gopt.copt.to_client();
                match client.is_group_member(gopt.group.as_str(), gopt.user.as_str()) {
                    Ok(Some(is_member)) => {
                        println!("{}", is_member);
                        finish(client, ExitCode::SUCCESS)
                    }
                    Ok(None) => finish(client, ExitCode::FAILURE),
                    Err(e) => handle_client_error(client, &e),
                }
            }
        }
    }
}
