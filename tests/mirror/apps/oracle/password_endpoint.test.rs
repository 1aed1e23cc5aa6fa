// [tests/mirror/apps/oracle/password_endpoint.test.rs]
/*!
 * =================================================================
 * APARATO: ORACLE ENDPOINT AUDIT
 * CLASIFICACIÓN: PROVING GROUNDS // ESTRATO L3-APPS
 * RESPONSABILIDAD: CONTRATO HTTP CONTRA EL DOBLE DEL DOMINIO
 * =================================================================
 */

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;

use centinela_core_hashdb::MetricsSnapshot;
use centinela_domain_passwords::mock::MockService;
use centinela_domain_passwords::{ServiceError, Sha1Digest};
use centinela_oracle::handlers::{
    handle_metrics, handle_password_check, handle_robots, handle_status, ApiFailure,
    PasswordResponse,
};
use centinela_oracle::{AppState, OperationalNexus};

const KNOWN_HASH: &str = "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8";

fn state_with_mock(mock: MockService) -> AppState {
    AppState::new(
        Arc::new(mock),
        OperationalNexus::new(32, 1_000_000, || MetricsSnapshot {
            checked_count: 41,
            compromised_count: 13,
        }),
    )
}

fn compromised_aware_state() -> AppState {
    let known = Sha1Digest::from_str(KNOWN_HASH).unwrap();
    state_with_mock(MockService::new(move |sum: &Sha1Digest| {
        if *sum == known {
            Ok(1954)
        } else {
            Ok(0)
        }
    }))
}

#[tokio::test]
async fn certify_compromised_hash_reports_count() {
    let state = compromised_aware_state();
    let response = handle_password_check(State(state), Path(KNOWN_HASH.to_string()))
        .await
        .expect("respuesta 200 esperada");

    assert_eq!(
        response.0,
        PasswordResponse {
            compromised: true,
            count: Some(1954),
        }
    );
}

#[tokio::test]
async fn certify_clean_hash_omits_count() {
    let state = compromised_aware_state();
    let clean = "00".repeat(20);
    let response = handle_password_check(State(state), Path(clean))
        .await
        .expect("respuesta 200 esperada");

    assert_eq!(
        response.0,
        PasswordResponse {
            compromised: false,
            count: None,
        }
    );
}

#[tokio::test]
async fn certify_short_and_non_hex_hashes_are_not_found() {
    for malformed in ["abc".to_string(), "zz".repeat(20), "aa".repeat(21)] {
        let state = compromised_aware_state();
        let failure = handle_password_check(State(state), Path(malformed.clone()))
            .await
            .unwrap_err();
        assert_eq!(failure, ApiFailure::NotFound, "huella '{malformed}'");
    }
}

#[tokio::test]
async fn certify_service_collapse_maps_to_internal_error() {
    let state = state_with_mock(MockService::new(|_: &Sha1Digest| {
        Err(ServiceError::lookup(std::io::Error::other(
            "shard inaccesible",
        )))
    }));

    let failure = handle_password_check(State(state), Path(KNOWN_HASH.to_string()))
        .await
        .unwrap_err();
    assert_eq!(failure, ApiFailure::Internal);
}

#[tokio::test]
async fn certify_status_plate() {
    let state = compromised_aware_state();
    let status = handle_status(State(state)).await.0;

    assert_eq!(status.service, "centinela-oracle");
    assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(status.shard_count, 32);
    assert_eq!(status.corpus_count, 1_000_000);
}

#[tokio::test]
async fn certify_metrics_passthrough() {
    let state = compromised_aware_state();
    state.nexus.record_pageview();
    state.nexus.record_pageview();

    let report = handle_metrics(State(state)).await.0;
    assert_eq!(report.pageview_count, 2);
    assert_eq!(report.checked_count, 41);
    assert_eq!(report.compromised_count, 13);
}

#[tokio::test]
async fn certify_robots_denies_crawling() {
    let response = handle_robots().await.into_response();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap(),
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn certify_failure_envelopes() {
    let not_found = ApiFailure::NotFound.into_response();
    assert_eq!(not_found.status(), axum::http::StatusCode::NOT_FOUND);

    let internal = ApiFailure::Internal.into_response();
    assert_eq!(
        internal.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}
