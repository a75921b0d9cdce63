use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::credentials::TenantCredentials;

use super::error::EpistolaError;
use super::types::GenerationJobDetail;

const API_KEY_HEADER: &str = "X-API-Key";

/// Source of generation-job status snapshots.
///
/// The poller depends on this trait rather than on [`EpistolaClient`]
/// directly so cycles can be tested without a live API.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    /// Current status of the job identified by `request_id`, queried with
    /// the given tenant's credentials.
    async fn get_job_status(
        &self,
        credentials: &TenantCredentials,
        request_id: &str,
    ) -> Result<GenerationJobDetail, EpistolaError>;
}

/// HTTP client for the Epistola generation API.
///
/// One reqwest client is shared across tenants; the base URL and API key
/// come from the per-tenant credentials on every call.
pub struct EpistolaClient {
    client: Client,
}

impl EpistolaClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl Default for EpistolaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStatusSource for EpistolaClient {
    async fn get_job_status(
        &self,
        credentials: &TenantCredentials,
        request_id: &str,
    ) -> Result<GenerationJobDetail, EpistolaError> {
        // Epistola request ids are server-generated UUIDs; reject anything
        // else before issuing a request.
        let request_uuid = Uuid::parse_str(request_id)
            .map_err(|_| EpistolaError::InvalidRequestId(request_id.to_string()))?;

        let url = format!(
            "{}/v1/tenants/{}/generation-jobs/{}",
            credentials.base_url.trim_end_matches('/'),
            credentials.tenant_id,
            request_uuid
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &credentials.api_key)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EpistolaError::JobNotFound(request_id.to_string()));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EpistolaError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let detail = response.json::<GenerationJobDetail>().await?;
        Ok(detail)
    }
}
