use thiserror::Error;

use crate::api::ApiError;

use super::StoreError;

/// Failures surfaced by session operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The gateway call failed; carried unchanged for display
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The token could not be written to durable storage
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not signed in")]
    NotAuthenticated,
}
