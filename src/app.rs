use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    db::Database,
    handlers::{create_hero, delete_hero, get_hero, healthcheck, list_heroes, update_hero},
    state::AppState,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/heroes", post(create_hero).get(list_heroes))
        .route("/heroes/", post(create_hero).get(list_heroes))
        .route(
            "/heroes/{hero_id}",
            get(get_hero).patch(update_hero).delete(delete_hero),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until `shutdown` resolves, drains in-flight requests, then
/// closes the database pool.
pub async fn serve<F>(listener: TcpListener, db: Database, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(db.clone()));

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    db.close().await;
    info!(backend = db.backend().as_str(), "database closed");

    result
}
