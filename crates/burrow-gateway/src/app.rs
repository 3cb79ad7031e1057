use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_generated_handler, create_requested_handler, delete_link_handler, favicon_handler,
    health_handler, index_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler).post(create_generated_handler))
            // Two segments, so it can never shadow a token.
            .route("/api/health", get(health_handler))
            .route("/favicon.ico", get(favicon_handler))
            .route(
                "/{token}",
                get(redirect_handler)
                    .post(create_requested_handler)
                    .delete(delete_link_handler),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
