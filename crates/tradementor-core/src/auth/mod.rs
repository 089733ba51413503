//! Authentication module for managing the session and its credential.
//!
//! This module provides:
//! - `CredentialStore`: the in-memory slot holding the live bearer `Token`
//! - `SecureStore`: durable token storage, backed by the OS keychain
//! - `SessionManager`: the observable `Session` state machine
//!
//! The two stores are separate copies of the token. `SessionManager` is the
//! only component that writes either, and it always writes both.

pub mod credentials;
pub mod error;
pub mod session;
pub mod token;

pub use credentials::{KeyringStore, MemoryStore, SecureStore, StoreError};
pub use error::AuthError;
pub use session::{Session, SessionManager, TOKEN_KEY};
pub use token::{CredentialStore, Token};
