// [apps/oracle/src/routes.rs]
/*!
 * =================================================================
 * APARATO: ORACLE ROUTING MATRIX
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA HTTP Y CAPAS TRANSVERSALES
 * =================================================================
 */

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Cota del cuerpo de petición admitido (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Compone el enrutador completo del Oráculo con sus capas.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/passwords/:hash", get(handlers::handle_password_check))
        .route("/status", get(handlers::handle_status))
        .route("/metrics", get(handlers::handle_metrics))
        .route("/robots.txt", get(handlers::handle_robots))
        .fallback(handlers::handle_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), pageview_audit))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Contabiliza cada petición antes de delegarla; nunca la bloquea.
async fn pageview_audit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.nexus.record_pageview();
    next.run(request).await
}
