//! Shared helpers for tests that need a live backend.

use axum::Router;
use tokio::net::TcpListener;

use crate::auth::{MemoryStore, SecureStore, StoreError};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Memory store whose deletes always fail, for the sign-out path.
#[derive(Debug, Default)]
pub struct FailingDeleteStore {
    inner: MemoryStore,
}

impl SecureStore for FailingDeleteStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.save(key, value)
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("keychain locked".to_string()))
    }
}

/// Memory store whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingSaveStore;

impl SecureStore for FailingSaveStore {
    fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("keychain locked".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
