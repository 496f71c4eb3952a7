#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]
// We allow expect since it forces good error messages at the least.
#![allow(clippy::expect_used)]

#[macro_use]
extern crate tracing;

use std::process::ExitCode;

use msad_client::config::SAMPLE_CONFIG;
use msad_proto::utils::get_version;

include!("../opt/msad.rs");

pub mod common;
pub mod group;
pub mod search;
pub mod user;

/// The version string printed by `msad version`.
pub fn version() -> String {
    get_version("msad", env!("CARGO_PKG_VERSION"))
}

impl MsadClientOpt {
    pub fn exec(&self) -> ExitCode {
        match self {
            MsadClientOpt::Search(sopt) => sopt.exec(),
            MsadClientOpt::Users(uopt) => uopt.exec(),
            MsadClientOpt::User { commands } => commands.exec(),
            MsadClientOpt::Group { commands } => commands.exec(),
            MsadClientOpt::SampleConfig => {
                println!("{}", SAMPLE_CONFIG.trim());
                ExitCode::SUCCESS
            }
            MsadClientOpt::Version => {
                println!("{}", version());
                ExitCode::SUCCESS
            }
        }
    }
}
