//! Bearer credential providers.
//!
//! A token is requested before every backend call and never cached by the
//! caller, so a credential refreshed mid-poll is picked up on the next tick.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::core::config::AppConfig;
use crate::errors::SummaryError;

pub const ACCESS_TOKEN_VAR: &str = "BOOKSUM_ACCESS_TOKEN";

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError` when no usable credential is available.
    async fn bearer_token(&self) -> Result<String, SummaryError>;
}

/// Fixed token, mostly for tests and one-off scripts.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, SummaryError> {
        non_empty(self.token.clone(), "static token")
    }
}

/// Reads an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(ACCESS_TOKEN_VAR)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<String, SummaryError> {
        let value = std::env::var(&self.var)
            .map_err(|e| SummaryError::AuthError(format!("{}: {e}", self.var)))?;
        non_empty(value, &self.var)
    }
}

/// Re-reads a token file on every call, so an external login helper can
/// rotate it while a task is being polled.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn bearer_token(&self) -> Result<String, SummaryError> {
        debug!("Reading bearer token from {}", self.path.display());
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SummaryError::AuthError(format!("cannot read {}: {e}", self.path.display()))
        })?;
        non_empty(contents, &self.path.display().to_string())
    }
}

fn non_empty(token: String, origin: &str) -> Result<String, SummaryError> {
    let token = token.trim();
    if token.is_empty() {
        Err(SummaryError::AuthError(format!("{origin} is empty")))
    } else {
        Ok(token.to_string())
    }
}

/// Picks the provider the configuration asks for.
#[must_use]
pub fn provider_from_config(config: &AppConfig) -> Box<dyn TokenProvider> {
    match &config.token_file {
        Some(path) => Box::new(FileTokenProvider::new(path.clone())),
        None => Box::new(EnvTokenProvider::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_trims_and_rejects_blank() {
        let ok = StaticTokenProvider::new("  abc \n");
        assert_eq!(ok.bearer_token().await.unwrap(), "abc");

        let blank = StaticTokenProvider::new("   ");
        assert!(matches!(
            blank.bearer_token().await,
            Err(SummaryError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn test_env_provider_missing_variable_is_auth_error() {
        let provider = EnvTokenProvider::new("BOOKSUM_TEST_TOKEN_THAT_IS_NEVER_SET");
        let err = provider.bearer_token().await.unwrap_err();
        assert!(matches!(err, SummaryError::AuthError(_)));
        assert!(err.user_message().contains("log in again"));
    }

    #[tokio::test]
    async fn test_file_provider_rereads_file_each_call() {
        let path = std::env::temp_dir().join(format!("booksum-token-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "first\n").await.unwrap();

        let provider = FileTokenProvider::new(&path);
        assert_eq!(provider.bearer_token().await.unwrap(), "first");

        tokio::fs::write(&path, "second").await.unwrap();
        assert_eq!(provider.bearer_token().await.unwrap(), "second");

        tokio::fs::remove_file(&path).await.unwrap();
        assert!(matches!(
            provider.bearer_token().await,
            Err(SummaryError::AuthError(_))
        ));
    }
}
