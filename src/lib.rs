/// booksum - a client for an AI book summarization backend.
///
/// A user submits an ISBN together with a language and a model profile. The
/// backend runs the job asynchronously; this crate submits it, polls its
/// status until it completes, fails or is cancelled, and exposes the result
/// and the user's summary history.
///
/// # Architecture
///
/// - `api` talks HTTP to the backend (reqwest) and supplies bearer tokens
/// - `poller` owns one in-flight task: submission, polling, cancellation
/// - `history` fetches and paginates past summaries
/// - `views` renders progress, results and history as plain text
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use booksum::api::{EnvTokenProvider, HttpBackend};
/// use booksum::core::config::AppConfig;
/// use booksum::core::models::SummaryRequest;
/// use booksum::poller::{PollerPhase, TaskPoller};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     booksum::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let poller = TaskPoller::new(
///         Arc::new(HttpBackend::new(&config)?),
///         Arc::new(EnvTokenProvider::default()),
///         config.poller_config(),
///     );
///
///     let request = SummaryRequest::parse("978-0061120084", "en", "mistral_latest__300")?;
///     let attempt = poller.submit(request)?;
///     let outcome = poller.wait(attempt).await;
///
///     match outcome.phase {
///         PollerPhase::Completed => {
///             if let Some(result) = &outcome.result {
///                 println!("{}", booksum::views::render_result(result));
///             }
///         }
///         _ => println!("{}", outcome.error_message().unwrap_or_default()),
///     }
///
///     Ok(())
/// }
/// ```
pub mod api;
pub mod core;
pub mod errors;
pub mod history;
pub mod poller;
pub mod views;

/// Configure structured logging with JSON format on stderr.
///
/// Verbosity follows `RUST_LOG` and defaults to `warn` so stdout stays
/// readable. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// booksum::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
