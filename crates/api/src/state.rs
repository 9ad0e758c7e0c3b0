use std::sync::Arc;

use charvid_core::store::JobStore;
use charvid_svd::{RetryConfig, SvdClient};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Job registry. Injectable so tests (or a future deployment) can
    /// swap the in-memory backend without touching handlers.
    pub store: Arc<dyn JobStore>,
    /// Inference API client; `None` when no token is configured, in
    /// which case jobs run through the fallback generator.
    pub svd: Option<Arc<SvdClient>>,
    /// Retry/backoff policy for inference calls.
    pub retry: Arc<RetryConfig>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
