//! The msad_proto crate is the data model shared between the msad client library
//! and the command line tools. It contains the shape of search results, the outcome
//! of directory mutations, the user health facts and the renderers that turn them
//! into line oriented text.

#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]

pub mod constants;
pub mod output;
pub mod utils;
pub mod v1;
