//! REST API gateway for the TradeMentor backend.
//!
//! This module provides the `ApiClient` through which every outbound call
//! passes, plus one route wrapper per backend endpoint (`routes`).
//!
//! Authenticated routes carry the bearer token held in the shared
//! `CredentialStore`; sign-in and sign-up explicitly send none.

pub mod client;
pub mod error;
mod routes;

pub use client::{ApiClient, ApiRequest};
pub use error::{ApiError, ErrorKind, FALLBACK_MESSAGE};
