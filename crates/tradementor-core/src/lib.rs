//! Core library for the TradeMentor client.
//!
//! Owns everything between the screens and the network:
//!
//! - `api`: the `ApiClient` gateway and its route wrappers
//! - `auth`: the in-memory `CredentialStore`, the durable `SecureStore`
//!   backends, and the observable `SessionManager`
//! - `config`: base URL resolution from the config file and environment
//! - `models`: typed request payloads for route bodies

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiRequest, ErrorKind};
pub use auth::{
    AuthError, CredentialStore, KeyringStore, MemoryStore, SecureStore, Session, SessionManager,
    StoreError, Token,
};
pub use config::Config;

#[cfg(test)]
pub(crate) mod test_support;
