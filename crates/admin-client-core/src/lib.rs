//! Stores the session handling and backend access that should be shared
//! between different dashboard clients
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]


mod client;
mod configuration;
mod storage;

pub use client::{BootstrapOutcome, Client, Session, UiCallBack};
pub use configuration::{
    get_configuration, ApiSettings, ClientConfiguration, Environment, StorageSettings,
};
pub use storage::{
    CredentialStore, FileStore, LoadedSession, MemoryStore, SessionStorage, StorageError,
    StoredSession,
};
