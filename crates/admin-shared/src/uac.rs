//! Shared items related to who is signed in and what they may see

mod errors;
mod identity;
mod role;

pub use errors::LoginError;
pub use identity::Identity;
pub use role::Role;
