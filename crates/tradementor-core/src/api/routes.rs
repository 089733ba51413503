//! Route wrappers: one function per backend endpoint.
//!
//! Each wrapper only translates its arguments into an [`ApiRequest`] and
//! hands it to [`ApiClient::request`]. Responses come back as the parsed
//! JSON body, unmodified.

use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;
use urlencoding::encode;

use crate::models::{
    ChatRequest, IpoApplication, NewsQuery, OrderRequest, Page, RecommendationsRequest,
    SignInRequest, SignUpRequest, StopLossRequest, StopLossUpdate, WatchlistAddRequest,
};

use super::{ApiClient, ApiError, ApiRequest};

/// Header carrying the shared secret for admin-only routes
const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

impl ApiClient {
    // ===== Health =====

    pub async fn health_check(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/")).await
    }

    // ===== Authentication & Profile =====

    /// Create an account. Always sent without credentials.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Value, ApiError> {
        let body = SignUpRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.request(ApiRequest::post("/api/auth/signup").without_auth().json(&body)?)
            .await
    }

    /// Exchange credentials for a token. Always sent without credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        let body = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.request(ApiRequest::post("/api/auth/signin").without_auth().json(&body)?)
            .await
    }

    pub async fn get_profile(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/auth/profile")).await
    }

    pub async fn update_profile(&self, payload: &Value) -> Result<Value, ApiError> {
        self.request(ApiRequest::put("/api/auth/profile").json(payload)?)
            .await
    }

    // ===== Stocks & Market =====

    pub async fn get_market_overview(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/stocks/market-overview"))
            .await
    }

    pub async fn get_watchlist(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/stocks/watchlist")).await
    }

    pub async fn add_to_watchlist(&self, symbol: &str) -> Result<Value, ApiError> {
        let body = WatchlistAddRequest {
            symbol: symbol.to_string(),
        };
        self.request(ApiRequest::post("/api/stocks/watchlist/add").json(&body)?)
            .await
    }

    pub async fn remove_from_watchlist(&self, symbol: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stocks/watchlist/remove/{}", encode(symbol));
        self.request(ApiRequest::delete(path)).await
    }

    pub async fn get_stock_data(&self, symbol: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stocks/{}", encode(symbol));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_stock_history(&self, symbol: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stocks/{}/history", encode(symbol));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn search_stocks(&self, query: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stocks/search?query={}", encode(query));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_sector_stocks(&self, sector: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stocks/sector/{}", encode(sector));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_company_info(&self, symbol: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stock-details/company/{}", encode(symbol));
        self.request(ApiRequest::get(path)).await
    }

    // ===== Portfolio =====

    pub async fn get_portfolio_summary(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/portfolio/summary")).await
    }

    pub async fn get_portfolio_holdings(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/portfolio/holdings")).await
    }

    pub async fn get_portfolio_transactions(&self, page: Page) -> Result<Value, ApiError> {
        let path = format!(
            "/api/portfolio/transactions?page={}&limit={}",
            page.page, page.limit
        );
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_portfolio_performance(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/portfolio/performance"))
            .await
    }

    // ===== News =====

    pub async fn get_news(&self, query: &NewsQuery) -> Result<Value, ApiError> {
        let path = format!(
            "/api/news?page={}&limit={}&q={}",
            query.page,
            query.limit,
            encode(&query.query)
        );
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_news_by_id(&self, id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/news/{}", encode(id));
        self.request(ApiRequest::get(path)).await
    }

    /// Ask the backend to re-ingest news. Requires the admin secret.
    pub async fn refresh_news_admin(
        &self,
        admin_secret: &str,
        payload: &Value,
    ) -> Result<Value, ApiError> {
        let mut secret =
            HeaderValue::from_str(admin_secret).map_err(|_| ApiError::InvalidRequest {
                message: "Admin secret is not a valid header value".to_string(),
            })?;
        secret.set_sensitive(true);
        let request = ApiRequest::post("/api/news/admin/refresh")
            .header(HeaderName::from_static(ADMIN_SECRET_HEADER), secret)
            .json(payload)?;
        self.request(request).await
    }

    // ===== IPO =====

    pub async fn get_all_ipos(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/ipos")).await
    }

    pub async fn get_ipo_by_id(&self, ipo_id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/ipos/{}", encode(ipo_id));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_ipo_by_symbol(&self, symbol: &str) -> Result<Value, ApiError> {
        let path = format!("/api/ipos/symbol/{}", encode(symbol));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn apply_for_ipo(
        &self,
        ipo_id: &str,
        application: &IpoApplication,
    ) -> Result<Value, ApiError> {
        let path = format!("/api/ipos/{}/apply", encode(ipo_id));
        self.request(ApiRequest::post(path).json(application)?)
            .await
    }

    pub async fn get_ipo_applications(&self, ipo_id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/ipos/{}/applications", encode(ipo_id));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn get_ipo_allotment(&self, ipo_id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/ipos/{}/allotment", encode(ipo_id));
        self.request(ApiRequest::get(path)).await
    }

    // ===== Learn & AI chat =====

    pub async fn chat_with_ai(&self, message: &str) -> Result<Value, ApiError> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        self.request(ApiRequest::post("/api/learn/chat").json(&body)?)
            .await
    }

    pub async fn get_learn_content(&self, level: &str) -> Result<Value, ApiError> {
        let path = format!("/api/learn/content/{}", encode(level));
        self.request(ApiRequest::get(path)).await
    }

    pub async fn search_learn_content(&self, level: &str, query: &str) -> Result<Value, ApiError> {
        let path = format!(
            "/api/learn/content/{}/search?q={}",
            encode(level),
            encode(query)
        );
        self.request(ApiRequest::get(path)).await
    }

    pub async fn reset_learn_chat(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::post("/api/learn/reset")).await
    }

    // ===== Trading =====

    pub async fn place_order(&self, order: &OrderRequest) -> Result<Value, ApiError> {
        let response = self
            .request(ApiRequest::post("/api/trade/place").json(order)?)
            .await?;
        tracing::info!(symbol = %order.symbol, side = %order.side, qty = order.qty, "Order placed");
        Ok(response)
    }

    pub async fn get_trading_history(&self, page: Page) -> Result<Value, ApiError> {
        let path = format!("/api/trade/history?page={}&limit={}", page.page, page.limit);
        self.request(ApiRequest::get(path)).await
    }

    // ===== Stop loss =====

    pub async fn create_stop_loss(&self, stop_loss: &StopLossRequest) -> Result<Value, ApiError> {
        self.request(ApiRequest::post("/api/stop-loss").json(stop_loss)?)
            .await
    }

    pub async fn get_stop_loss_orders(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/stop-loss")).await
    }

    pub async fn update_stop_loss(
        &self,
        stop_loss_id: &str,
        update: &StopLossUpdate,
    ) -> Result<Value, ApiError> {
        let path = format!("/api/stop-loss/{}", encode(stop_loss_id));
        self.request(ApiRequest::put(path).json(update)?).await
    }

    pub async fn delete_stop_loss(&self, stop_loss_id: &str) -> Result<Value, ApiError> {
        let path = format!("/api/stop-loss/{}", encode(stop_loss_id));
        self.request(ApiRequest::delete(path)).await
    }

    // ===== AI portfolio =====

    pub async fn analyze_portfolio(&self) -> Result<Value, ApiError> {
        self.request(ApiRequest::get("/api/ai/portfolio/analyze"))
            .await
    }

    pub async fn get_ai_recommendations(&self, market_data: Value) -> Result<Value, ApiError> {
        let body = RecommendationsRequest { market_data };
        self.request(ApiRequest::post("/api/ai/recommendations").json(&body)?)
            .await
    }

    /// Insights for a comma-separated list of symbols
    pub async fn get_market_insights(&self, symbols: &[&str]) -> Result<Value, ApiError> {
        let path = format!(
            "/api/ai/market-insights?symbols={}",
            encode(&symbols.join(","))
        );
        self.request(ApiRequest::get(path)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderMap, Method, Uri};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::auth::{CredentialStore, Token};
    use crate::models::{OrderSide, DEFAULT_LEARN_LEVEL};
    use crate::test_support::spawn_backend;

    /// Reflect what the backend received
    async fn record(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
        let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "authorization": headers.get("authorization").and_then(|v| v.to_str().ok()),
            "adminSecret": headers.get("x-admin-secret").and_then(|v| v.to_str().ok()),
            "body": body,
        }))
    }

    async fn signed_in_client() -> ApiClient {
        let base = spawn_backend(Router::new().fallback(record)).await;
        let credentials = Arc::new(CredentialStore::new());
        credentials.set(Token::new("T"));
        ApiClient::new(base, credentials).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_route_is_unauthenticated() {
        let api = signed_in_client().await;

        let seen = api.sign_in("a@b.co", "pw").await.unwrap();
        assert_eq!(seen["method"], "POST");
        assert_eq!(seen["path"], "/api/auth/signin");
        assert_eq!(seen["authorization"], Value::Null);
        assert_eq!(seen["body"], json!({"email": "a@b.co", "password": "pw"}));

        let seen = api.sign_up("A", "a@b.co", "pw").await.unwrap();
        assert_eq!(seen["path"], "/api/auth/signup");
        assert_eq!(seen["authorization"], Value::Null);
        assert_eq!(seen["body"]["name"], "A");
    }

    #[tokio::test]
    async fn test_authenticated_routes_carry_bearer() {
        let api = signed_in_client().await;

        let seen = api.get_profile().await.unwrap();
        assert_eq!(seen["method"], "GET");
        assert_eq!(seen["path"], "/api/auth/profile");
        assert_eq!(seen["authorization"], "Bearer T");

        let seen = api.update_profile(&json!({"name": "B"})).await.unwrap();
        assert_eq!(seen["method"], "PUT");
        assert_eq!(seen["body"], json!({"name": "B"}));
    }

    #[tokio::test]
    async fn test_stock_routes_encode_segments() {
        let api = signed_in_client().await;

        let seen = api.remove_from_watchlist("M&M").await.unwrap();
        assert_eq!(seen["method"], "DELETE");
        assert_eq!(seen["path"], "/api/stocks/watchlist/remove/M%26M");

        let seen = api.search_stocks("tata motors").await.unwrap();
        assert_eq!(seen["path"], "/api/stocks/search");
        assert_eq!(seen["query"], "query=tata%20motors");

        let seen = api.get_stock_history("RELIANCE").await.unwrap();
        assert_eq!(seen["path"], "/api/stocks/RELIANCE/history");

        let seen = api.add_to_watchlist("INFY").await.unwrap();
        assert_eq!(seen["path"], "/api/stocks/watchlist/add");
        assert_eq!(seen["body"], json!({"symbol": "INFY"}));
    }

    #[tokio::test]
    async fn test_paged_routes() {
        let api = signed_in_client().await;

        let seen = api.get_portfolio_transactions(Page::default()).await.unwrap();
        assert_eq!(seen["path"], "/api/portfolio/transactions");
        assert_eq!(seen["query"], "page=1&limit=20");

        let seen = api.get_trading_history(Page::new(3, 50)).await.unwrap();
        assert_eq!(seen["path"], "/api/trade/history");
        assert_eq!(seen["query"], "page=3&limit=50");

        let seen = api.get_news(&NewsQuery::default()).await.unwrap();
        assert_eq!(seen["path"], "/api/news");
        assert_eq!(seen["query"], "page=1&limit=10&q=");
    }

    #[tokio::test]
    async fn test_ipo_and_trade_bodies() {
        let api = signed_in_client().await;

        let application = IpoApplication {
            user_id: "u1".to_string(),
            applied_lots: 2,
        };
        let seen = api.apply_for_ipo("ipo-9", &application).await.unwrap();
        assert_eq!(seen["method"], "POST");
        assert_eq!(seen["path"], "/api/ipos/ipo-9/apply");
        assert_eq!(seen["body"], json!({"userId": "u1", "appliedLots": 2}));

        let order = OrderRequest {
            symbol: "TCS".to_string(),
            side: OrderSide::Buy,
            qty: 1,
            price: 10.0,
        };
        let seen = api.place_order(&order).await.unwrap();
        assert_eq!(seen["path"], "/api/trade/place");
        assert_eq!(seen["body"]["type"], "buy");
    }

    #[tokio::test]
    async fn test_stop_loss_crud() {
        let api = signed_in_client().await;

        let update = StopLossUpdate {
            stop_loss_price: 99.5,
            quantity: 4,
        };
        let seen = api.update_stop_loss("sl1", &update).await.unwrap();
        assert_eq!(seen["method"], "PUT");
        assert_eq!(seen["path"], "/api/stop-loss/sl1");
        assert_eq!(seen["body"], json!({"stopLossPrice": 99.5, "quantity": 4}));

        let seen = api.delete_stop_loss("sl1").await.unwrap();
        assert_eq!(seen["method"], "DELETE");

        let seen = api.get_stop_loss_orders().await.unwrap();
        assert_eq!(seen["path"], "/api/stop-loss");
    }

    #[tokio::test]
    async fn test_learn_and_ai_routes() {
        let api = signed_in_client().await;

        let seen = api.get_learn_content(DEFAULT_LEARN_LEVEL).await.unwrap();
        assert_eq!(seen["path"], "/api/learn/content/beginner");

        let seen = api.search_learn_content("beginner", "p/e ratio").await.unwrap();
        assert_eq!(seen["path"], "/api/learn/content/beginner/search");
        assert_eq!(seen["query"], "q=p%2Fe%20ratio");

        let seen = api.chat_with_ai("what is an IPO?").await.unwrap();
        assert_eq!(seen["body"], json!({"message": "what is an IPO?"}));

        let seen = api.get_market_insights(&["TCS", "INFY"]).await.unwrap();
        assert_eq!(seen["query"], "symbols=TCS%2CINFY");
    }

    #[tokio::test]
    async fn test_admin_refresh_sends_secret() {
        let api = signed_in_client().await;

        let seen = api
            .refresh_news_admin("s3cret", &json!({"sources": ["rss"]}))
            .await
            .unwrap();
        assert_eq!(seen["adminSecret"], "s3cret");
        assert_eq!(seen["body"], json!({"sources": ["rss"]}));

        let err = api
            .refresh_news_admin("bad\nsecret", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::api::ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_repeated_profile_calls_are_independent() {
        let api = signed_in_client().await;

        let first = api.get_profile().await.unwrap();
        let second = api.get_profile().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.credentials().get().as_str(), "T");
    }
}
