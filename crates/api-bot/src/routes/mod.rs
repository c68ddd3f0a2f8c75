pub(crate) mod sessions;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::BotApiConfig;

pub fn router(config: BotApiConfig) -> Router {
    Router::new()
        .route("/sessions", post(sessions::invite))
        .route(
            "/sessions/{session_id}/transcript",
            get(sessions::transcript),
        )
        .with_state(Arc::new(config))
}
