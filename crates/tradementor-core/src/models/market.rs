use serde::Serialize;
use serde_json::Value;

/// Level used by the learn routes when none is given
pub const DEFAULT_LEARN_LEVEL: &str = "beginner";

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistAddRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpoApplication {
    pub user_id: String,
    pub applied_lots: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    pub market_data: Value,
}

/// Paging and free-text filter for the news feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub page: u32,
    pub limit: u32,
    pub query: String,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            query: String::new(),
        }
    }
}
