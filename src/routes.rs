use axum::{
    Router,
    http::{HeaderValue, header},
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::{AppState, SERVER_HEADER};

/// Every path goes through one handler; resolution happens there, not in the router.
pub fn overlay_routes() -> Router<AppState> {
    Router::new().fallback(handlers::serve_path)
}

/// Build the complete application with tracing and the `Server` header.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(overlay_routes())
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_HEADER),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
