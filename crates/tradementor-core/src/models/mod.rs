//! Typed request payloads for the TradeMentor routes.
//!
//! Responses are passed through as `serde_json::Value`; only the bodies this
//! client sends are modelled. Field names follow the backend's camelCase.
//!
//! - `auth`: sign-in / sign-up credentials and the token response
//! - `market`: watchlist, IPO, learn and AI payloads
//! - `trading`: orders and stop-loss payloads

pub mod auth;
pub mod market;
pub mod trading;

pub use auth::{AuthResponse, SignInRequest, SignUpRequest};
pub use market::{
    ChatRequest, IpoApplication, NewsQuery, RecommendationsRequest, WatchlistAddRequest,
    DEFAULT_LEARN_LEVEL,
};
pub use trading::{OrderRequest, OrderSide, StopLossRequest, StopLossUpdate};

/// Page/limit pair for paginated history routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}
