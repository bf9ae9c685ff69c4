//! Code shared between the dashboard clients, the session core and the test
//! helpers

#![warn(unused_crate_dependencies)]

pub mod const_config;
pub mod errors;
mod macros;
pub mod nav;
pub mod notification;
pub mod req_args;
pub mod responses;
pub mod time;
pub mod uac;

#[cfg(not(target_arch = "wasm32"))]
pub mod telemetry;
