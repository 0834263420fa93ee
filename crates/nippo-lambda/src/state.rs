use std::sync::Arc;

use nippo_pipeline::Pipeline;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Bearer token expected on every protected route.
    pub api_token: String,
}
