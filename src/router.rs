use crate::db::PersonalityStore;
use crate::handlers::personalities::{get_personality_by_id, hello, list_personalities};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersonalityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PersonalityStore>) -> Self {
        Self { store }
    }
}

pub fn personality_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/personalities", get(list_personalities))
        .route("/personalities/{id}", get(get_personality_by_id))
        .with_state(state)
        // A panicking handler becomes a 500 instead of a dropped connection.
        .layer(CatchPanicLayer::new())
        // One access-log line per request at the default `info` filter.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
