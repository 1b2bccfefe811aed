use thiserror::Error;

/// Shown when the backend refuses or cannot accept a new job.
pub const SUBMISSION_FAILURE_MESSAGE: &str =
    "Failed to start summarization. Please try again.";

/// Shown when a status query fails and the task is abandoned.
pub const CONNECTION_FAILURE_MESSAGE: &str =
    "Connection error while checking the summary status. Please try again.";

/// Shown when the backend reports `failed` for a task.
pub const JOB_FAILURE_MESSAGE: &str =
    "Book not found. Please check the ISBN and try again.";

/// Shown when no bearer credential can be obtained.
pub const AUTH_FAILURE_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Shown when the status endpoint answers with something undecodable.
pub const INVALID_RESPONSE_MESSAGE: &str =
    "The summary service sent an unexpected response. Please try again.";

/// Shown when polling hits the configured ceiling.
pub const TIMEOUT_MESSAGE: &str =
    "The summary is taking longer than expected. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Failed to submit summary job: {0}")]
    SubmissionError(String),

    #[error("Failed to query task status: {0}")]
    PollingError(String),

    #[error("Unexpected status response: {0}")]
    InvalidResponse(String),

    #[error("Summary job failed: {0}")]
    JobFailure(String),

    #[error("Failed to obtain credentials: {0}")]
    AuthError(String),

    #[error("A summary is already in progress")]
    TaskInProgress,

    #[error("Gave up after {0} status checks")]
    PollTimeout(u32),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),
}

impl SummaryError {
    /// The fixed message surfaced to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationError(msg) | Self::ConfigError(msg) => msg.clone(),
            Self::SubmissionError(_) => SUBMISSION_FAILURE_MESSAGE.to_string(),
            Self::PollingError(_) | Self::HttpError(_) => CONNECTION_FAILURE_MESSAGE.to_string(),
            Self::InvalidResponse(_) => INVALID_RESPONSE_MESSAGE.to_string(),
            Self::JobFailure(_) => JOB_FAILURE_MESSAGE.to_string(),
            Self::AuthError(_) => AUTH_FAILURE_MESSAGE.to_string(),
            Self::TaskInProgress => self.to_string(),
            Self::PollTimeout(_) => TIMEOUT_MESSAGE.to_string(),
        }
    }

    /// Whether a status query that failed this way may be attempted again.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::PollingError(_))
    }
}

impl From<reqwest::Error> for SummaryError {
    fn from(error: reqwest::Error) -> Self {
        SummaryError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for SummaryError {
    fn from(error: serde_json::Error) -> Self {
        SummaryError::HttpError(format!("invalid JSON payload: {error}"))
    }
}

impl From<url::ParseError> for SummaryError {
    fn from(error: url::ParseError) -> Self {
        SummaryError::ConfigError(format!("invalid backend URL: {error}"))
    }
}
