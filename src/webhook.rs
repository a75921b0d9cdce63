//! Inbound webhook for Epistola generation-complete callbacks.
//!
//! The push-based counterpart to the poller. Epistola calls this endpoint
//! when a job reaches a terminal state; since the caller does not know which
//! execution is waiting, delivery goes through broadcast correlation. The
//! endpoint always acknowledges structurally valid input with `200 OK` —
//! "nobody was waiting" is an operational log line, not something the
//! external service should retry over.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::dispatch::{CompletionOutcome, MessageDispatcher};
use crate::engine::ProcessEngine;
use crate::epistola::GenerationJobStatus;
use crate::job_path::JobPath;

/// Optional HMAC signature header. Currently advisory: absence is logged,
/// presence is not verified.
pub const SIGNATURE_HEADER: &str = "X-Epistola-Signature";

/// Callback payload sent by Epistola when a generation job completes.
///
/// The newer shape carries `tenantId`; the legacy shape omits it and is
/// correlated on the bare request id instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationCompletePayload {
    pub request_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub status: GenerationJobStatus,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Router exposing the generation-complete callback, for the host
/// application to mount alongside its own routes.
pub fn callback_router<E: ProcessEngine + 'static>(dispatcher: MessageDispatcher<E>) -> Router {
    Router::new()
        .route(
            "/api/v1/epistola/callback/generation-complete",
            post(generation_complete::<E>),
        )
        .with_state(dispatcher)
}

async fn generation_complete<E: ProcessEngine>(
    State(dispatcher): State<MessageDispatcher<E>>,
    headers: HeaderMap,
    Json(payload): Json<GenerationCompletePayload>,
) -> StatusCode {
    info!(
        request_id = %payload.request_id,
        status = %payload.status,
        document_id = payload.document_id.as_deref(),
        correlation_id = payload.correlation_id.as_deref(),
        "received generation complete callback"
    );

    let signature_missing = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_none_or(str::is_empty);
    if signature_missing {
        warn!("callback received without signature verification");
    }

    let outcome = CompletionOutcome {
        status: payload.status,
        document_id: payload.document_id.clone(),
        error_message: payload.error_message.clone(),
    };

    let correlated = match &payload.tenant_id {
        Some(tenant_id) => match JobPath::new(tenant_id.clone(), payload.request_id.clone()) {
            Ok(job_path) => dispatcher.correlate_by_job_path(&job_path, &outcome).await,
            Err(e) => {
                warn!(
                    request_id = %payload.request_id,
                    error = %e,
                    "callback carries an unusable tenant/request pair"
                );
                return StatusCode::OK;
            }
        },
        None => {
            dispatcher
                .correlate_by_request_id(&payload.request_id, &outcome)
                .await
        }
    };

    match correlated {
        Ok(0) => warn!(
            request_id = %payload.request_id,
            "no waiting process instances found for callback"
        ),
        Ok(count) => info!(
            request_id = %payload.request_id,
            count,
            "callback correlated to waiting instance(s)"
        ),
        Err(e) => warn!(
            request_id = %payload.request_id,
            error = %e,
            "failed to correlate callback"
        ),
    }

    // Always acknowledge receipt; the inbound channel is not used to signal
    // internal mismatches back to the caller.
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dispatch::tests::FakeEngine;
    use crate::dispatch::{VAR_ERROR_MESSAGE, VAR_JOB_PATH, VAR_REQUEST_ID, VAR_STATUS};

    /// Serve the callback router on an ephemeral port and return its base URL.
    async fn spawn_app(engine: Arc<FakeEngine>) -> String {
        let app = callback_router(MessageDispatcher::new(engine));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn callback_url(base: &str) -> String {
        format!("{base}/api/v1/epistola/callback/generation-complete")
    }

    #[tokio::test]
    async fn acknowledges_and_correlates_by_job_path() {
        let engine = Arc::new(FakeEngine::with_broadcast_matches(Some(1)));
        let base = spawn_app(Arc::clone(&engine)).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .header(SIGNATURE_HEADER, "sig")
            .json(&serde_json::json!({
                "requestId": "r-1",
                "tenantId": "acme",
                "status": "COMPLETED",
                "documentId": "doc-9"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let broadcasts = engine.broadcasts.lock().unwrap();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].0, VAR_JOB_PATH);
        assert_eq!(broadcasts[0].1, "job:acme/r-1");
        assert_eq!(broadcasts[0].2[VAR_STATUS], "COMPLETED");
        assert_eq!(broadcasts[0].2[VAR_ERROR_MESSAGE], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn legacy_payload_without_tenant_correlates_by_request_id() {
        let engine = Arc::new(FakeEngine::with_broadcast_matches(Some(1)));
        let base = spawn_app(Arc::clone(&engine)).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .json(&serde_json::json!({
                "requestId": "req-legacy",
                "status": "FAILED",
                "errorMessage": "Template rendering error"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let broadcasts = engine.broadcasts.lock().unwrap();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].0, VAR_REQUEST_ID);
        assert_eq!(broadcasts[0].1, "req-legacy");
        assert_eq!(broadcasts[0].2[VAR_ERROR_MESSAGE], "Template rendering error");
    }

    #[tokio::test]
    async fn acknowledges_even_when_nothing_is_waiting() {
        let engine = Arc::new(FakeEngine::with_broadcast_matches(None));
        let base = spawn_app(engine).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .json(&serde_json::json!({
                "requestId": "r-nobody",
                "tenantId": "acme",
                "status": "CANCELLED"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn acknowledges_without_signature_header() {
        let engine = Arc::new(FakeEngine::with_broadcast_matches(Some(0)));
        let base = spawn_app(engine).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .json(&serde_json::json!({
                "requestId": "r-1",
                "tenantId": "acme",
                "status": "COMPLETED"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn acknowledges_payload_with_unusable_tenant_pair() {
        // Empty tenant makes the job path invalid; the callback is still
        // acknowledged and nothing is correlated.
        let engine = Arc::new(FakeEngine::with_broadcast_matches(Some(0)));
        let base = spawn_app(Arc::clone(&engine)).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .json(&serde_json::json!({
                "requestId": "r-1",
                "tenantId": "",
                "status": "COMPLETED"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(engine.broadcasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_undeserializable_body() {
        let engine = Arc::new(FakeEngine::with_broadcast_matches(Some(0)));
        let base = spawn_app(Arc::clone(&engine)).await;

        let response = reqwest::Client::new()
            .post(callback_url(&base))
            .json(&serde_json::json!({ "status": "COMPLETED" }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert!(engine.broadcasts.lock().unwrap().is_empty());
    }
}
