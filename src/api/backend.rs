//! Summarization backend client
//!
//! The backend exposes job submission (`POST /`), status lookup
//! (`GET /status/{id}`) and the caller's history (`GET /all`). Every call
//! carries a bearer token supplied by the caller.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::AppConfig;
use crate::core::models::{
    HistoryEntry, StatusResponse, SubmitResponse, SummaryRequest, TaskId,
};
use crate::errors::SummaryError;

#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns `SubmissionError` on transport failure, a non-2xx answer or a
    /// body without a task id, and `AuthError` when the token is rejected.
    async fn submit(&self, token: &str, request: &SummaryRequest) -> Result<TaskId, SummaryError>;

    /// # Errors
    ///
    /// Returns `PollingError` on transport failure, a non-2xx answer or a
    /// non-JSON body, `InvalidResponse` for JSON that is not a status, and
    /// `AuthError` when the token is rejected.
    async fn status(&self, token: &str, task_id: &TaskId) -> Result<StatusResponse, SummaryError>;

    /// # Errors
    ///
    /// Returns `HttpError` when the history cannot be fetched or decoded.
    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, SummaryError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ConfigError` for an unusable base URL and `HttpError` if the
    /// HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, SummaryError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SummaryError::HttpError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.api_url)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SummaryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SummaryError::ConfigError(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SummaryError> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(SummaryError::ConfigError(format!("{raw} cannot be a base URL")));
    }
    Ok(url)
}

/// Reads the body of a failed response for logging; never fails.
async fn error_body(response: Response) -> String {
    let status = response.status();
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error response body (status {status}): {e}"))
}

fn rejected_credentials(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl SummaryBackend for HttpBackend {
    async fn submit(&self, token: &str, request: &SummaryRequest) -> Result<TaskId, SummaryError> {
        // Trailing empty segment keeps the trailing slash: POST {base}/
        let url = self.endpoint(&[""])?;
        info!(
            correlation_id = %request.correlation_id(),
            isbn = request.isbn(),
            "Submitting summary request to {url}"
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| SummaryError::SubmissionError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            warn!("Submission rejected with status {status}: {body}");
            if rejected_credentials(status) {
                return Err(SummaryError::AuthError(format!("backend returned {status}")));
            }
            return Err(SummaryError::SubmissionError(format!(
                "backend returned {status}: {body}"
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::SubmissionError(format!("invalid response body: {e}")))?;
        Ok(submitted.id)
    }

    async fn status(&self, token: &str, task_id: &TaskId) -> Result<StatusResponse, SummaryError> {
        let url = self.endpoint(&["status", task_id.as_str()])?;
        debug!("Polling {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SummaryError::PollingError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            warn!(task_id = %task_id, "Status query failed with {status}: {body}");
            if rejected_credentials(status) {
                return Err(SummaryError::AuthError(format!("backend returned {status}")));
            }
            return Err(SummaryError::PollingError(format!(
                "backend returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SummaryError::PollingError(format!("invalid response body: {e}")))?;

        #[cfg(feature = "debug-logs")]
        debug!(task_id = %task_id, "Status body: {body}");

        StatusResponse::from_value(body)
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, SummaryError> {
        let url = self.endpoint(&["all"])?;
        debug!("Fetching history from {url}");

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            if rejected_credentials(status) {
                return Err(SummaryError::AuthError(format!("backend returned {status}")));
            }
            return Err(SummaryError::HttpError(format!(
                "history request returned {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }
}
