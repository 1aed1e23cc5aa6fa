// [apps/oracle/src/handlers.rs]
/*!
 * =================================================================
 * APARATO: ORACLE API HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: TRADUCCIÓN HTTP <-> CONTRATO DEL DOMINIO
 *
 * La superficie pública es deliberadamente mínima: la consulta de una
 * huella, la placa de identidad, los contadores y un robots.txt que
 * excluye todo rastreo. Toda respuesta de fallo viaja con el sobre
 * JSON '{"message", "code"}'.
 * =================================================================
 */

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use centinela_domain_passwords::Sha1Digest;

use crate::state::{AppState, SERVICE_NAME};

/// Respuesta de la consulta de una huella.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PasswordResponse {
    /// Verdadero cuando la huella consta en el censo.
    pub compromised: bool,
    /// Recuento de apariciones; omitido cuando es cero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Fallos de la superficie HTTP, serializados con el sobre JSON común.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiFailure {
    /// Recurso o huella inexistente.
    NotFound,
    /// Colapso interno al resolver la consulta.
    Internal,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        let body = Json(json!({ "message": message, "code": status.as_u16() }));
        (status, body).into_response()
    }
}

/**
 * Endpoint: GET /v1/passwords/{hash}
 *
 * La huella debe medir exactamente 40 cifras hexadecimales; cualquier
 * otra forma responde 404 sin consultar la bóveda. La consulta corre
 * bajo 'spawn_blocking': las lecturas posicionales son breves pero
 * físicas, y la cancelación del cliente se resuelve en esa frontera.
 */
pub async fn handle_password_check(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<PasswordResponse>, ApiFailure> {
    let sum: Sha1Digest = hash.parse().map_err(|_| ApiFailure::NotFound)?;

    let service = Arc::clone(&state.passwords);
    let outcome = tokio::task::spawn_blocking(move || service.is_password_compromised(&sum)).await;

    let count = match outcome {
        Ok(Ok(count)) => count,
        Ok(Err(failure)) => {
            error!(hash = %sum, "❌ [ORACLE]: lookup failed: {failure}");
            return Err(ApiFailure::Internal);
        }
        Err(join_failure) => {
            error!(hash = %sum, "❌ [ORACLE]: lookup task collapsed: {join_failure}");
            return Err(ApiFailure::Internal);
        }
    };

    Ok(Json(PasswordResponse {
        compromised: count > 0,
        count: (count > 0).then_some(count),
    }))
}

/// Placa de identidad del servicio.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// Nombre nominal del servicio.
    pub service: &'static str,
    /// Versión del binario desplegado.
    pub version: &'static str,
    /// Segundos desde el arranque.
    pub uptime_seconds: u64,
    /// Fragmentación de la base servida.
    pub shard_count: usize,
    /// Entradas totales del censo servido.
    pub corpus_count: u64,
}

/// Endpoint: GET /status
pub async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.nexus.uptime_seconds(),
        shard_count: state.nexus.shard_count,
        corpus_count: state.nexus.corpus_count,
    })
}

/// Contadores del servicio y de la bóveda.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MetricsReport {
    /// Peticiones HTTP atendidas.
    pub pageview_count: u64,
    /// Consultas resueltas por la bóveda.
    pub checked_count: u64,
    /// Consultas con recuento positivo.
    pub compromised_count: u64,
}

/// Endpoint: GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    let vault = state.nexus.vault_snapshot();
    Json(MetricsReport {
        pageview_count: state.nexus.pageviews(),
        checked_count: vault.checked_count,
        compromised_count: vault.compromised_count,
    })
}

/// Endpoint: GET /robots.txt. El censo no se rastrea.
pub async fn handle_robots() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "User-agent: *\nDisallow: /\n",
    )
}

/// Ruta por defecto para todo camino desconocido.
pub async fn handle_not_found() -> ApiFailure {
    ApiFailure::NotFound
}
