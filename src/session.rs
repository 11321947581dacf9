use crate::error::Result;
use crate::locator::Locator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque reference to an element found by [`Session::query`].
///
/// A handle stays valid until the page re-renders the element; after that
/// every operation on it fails with `StaleElement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Capabilities consumed from a browser driver.
///
/// `query` is raw and unsynchronized; only the wait engine calls it.
#[async_trait]
pub trait Session: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn current_url(&self) -> Result<String>;
    async fn title(&self) -> Result<String>;
    async fn query(&self, locator: &Locator) -> Result<Vec<ElementHandle>>;

    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool>;
    async fn is_enabled(&self, handle: &ElementHandle) -> Result<bool>;
    async fn text(&self, handle: &ElementHandle) -> Result<String>;
    async fn attribute(&self, handle: &ElementHandle, name: &str) -> Result<Option<String>>;
    async fn click(&self, handle: &ElementHandle) -> Result<()>;
    async fn clear(&self, handle: &ElementHandle) -> Result<()>;
    async fn send_keys(&self, handle: &ElementHandle, text: &str) -> Result<()>;
    async fn select_by_text(&self, handle: &ElementHandle, text: &str) -> Result<()>;
    async fn select_by_value(&self, handle: &ElementHandle, value: &str) -> Result<()>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn close(&self) -> Result<()>;
}

/// Run `body` against `session`, closing the session afterwards on both the
/// success and the failure path.
pub async fn with_session<S, F, Fut, T>(session: Arc<S>, body: F) -> Result<T>
where
    S: Session + ?Sized,
    F: FnOnce(Arc<S>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let outcome = body(Arc::clone(&session)).await;

    match session.close().await {
        Ok(()) => debug!("Session closed"),
        Err(e) => {
            warn!("Failed to close session: {}", e);
            // a body failure is more useful to the caller than a teardown failure
            if outcome.is_ok() {
                return Err(e);
            }
        }
    }

    outcome
}
