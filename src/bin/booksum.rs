use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use booksum::api::auth::provider_from_config;
use booksum::api::{HttpBackend, SummaryBackend, TokenProvider};
use booksum::core::config::AppConfig;
use booksum::core::models::{Language, ModelProfile, SummaryRequest};
use booksum::history::{HISTORY_PAGE_SIZE, fetch_history, page_count, select};
use booksum::poller::{PollerPhase, PollerSnapshot, TaskPoller};
use booksum::views::{render_history_entry, render_history_page, render_progress, render_result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

/// Command-line client for the book summarization service.
#[derive(Parser, Debug)]
#[command(name = "booksum", version, about)]
struct Cli {
    /// Backend base URL (overrides BOOKSUM_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a book and wait for the result. Ctrl-C cancels.
    Summarize {
        /// 10 or 13 digit ISBN; hyphens and spaces are ignored
        isbn: String,

        /// Summary language: en, de, fr, es, it
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Model profile, e.g. mistral_latest__300
        #[arg(short, long, default_value = "mistral_latest__300")]
        model: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List past summaries
    History {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one past summary by its page and row in `history`
    Show { page: usize, row: usize },
    /// List supported languages and model profiles
    Options,
}

struct Clients {
    backend: Arc<dyn SummaryBackend>,
    tokens: Arc<dyn TokenProvider>,
}

fn clients(config: &AppConfig) -> Result<Clients> {
    let backend = HttpBackend::new(config).context("Failed to initialize backend client")?;
    Ok(Clients {
        backend: Arc::new(backend),
        tokens: Arc::from(provider_from_config(config)),
    })
}

async fn summarize(config: &AppConfig, request: SummaryRequest, json: bool) -> Result<ExitCode> {
    let Clients { backend, tokens } = clients(config)?;
    let poller = TaskPoller::new(backend, tokens, config.poller_config());

    let attempt = poller.submit(request)?;
    let outcome = follow(&poller, attempt).await;

    match outcome.phase {
        PollerPhase::Completed => {
            let Some(result) = outcome.result else {
                return Err(anyhow!("task completed without a result"));
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_result(&result));
            }
            Ok(ExitCode::SUCCESS)
        }
        PollerPhase::Cancelled => {
            eprintln!("Cancelled.");
            Ok(ExitCode::from(130))
        }
        _ => {
            if let Some(err) = &outcome.error {
                error!("Summary failed: {err}");
            }
            eprintln!("{}", outcome.error_message().unwrap_or_default());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Prints progress until `attempt` ends. The first Ctrl-C cancels the task.
async fn follow(poller: &TaskPoller, attempt: u64) -> PollerSnapshot {
    let mut updates = poller.subscribe();
    let mut last_line = String::new();

    loop {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.attempt != attempt || snapshot.phase.is_terminal() {
            return snapshot;
        }

        let line = render_progress(&snapshot);
        if line != last_line {
            eprintln!("{line}");
            last_line = line;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return poller.snapshot();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, cancelling");
                poller.cancel();
            }
        }
    }
}

async fn history(config: &AppConfig, page_number: usize) -> Result<ExitCode> {
    let Clients { backend, tokens } = clients(config)?;
    let entries = fetch_history(backend.as_ref(), tokens.as_ref()).await?;

    let pages = page_count(entries.len(), HISTORY_PAGE_SIZE);
    if pages > 0 && (page_number == 0 || page_number > pages) {
        eprintln!("Page {page_number} does not exist; there are {pages} pages.");
        return Ok(ExitCode::FAILURE);
    }

    print!("{}", render_history_page(&entries, page_number, HISTORY_PAGE_SIZE));
    Ok(ExitCode::SUCCESS)
}

async fn show(config: &AppConfig, page_number: usize, row: usize) -> Result<ExitCode> {
    let Clients { backend, tokens } = clients(config)?;
    let entries = fetch_history(backend.as_ref(), tokens.as_ref()).await?;

    match select(&entries, page_number, row, HISTORY_PAGE_SIZE) {
        Some(entry) => {
            print!("{}", render_history_entry(entry));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No summary at page {page_number}, row {row}.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn options() -> ExitCode {
    println!("Languages:");
    for language in Language::ALL {
        println!("  {:<4}{}", language.code(), language.display_name());
    }
    println!("Models:");
    for profile in ModelProfile::ALL {
        println!("  {:<24}{profile}", profile.key());
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::from_env().map_err(|e| anyhow!("Config error: {e}"))?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    match cli.command {
        Command::Summarize {
            isbn,
            language,
            model,
            json,
        } => {
            let request = match SummaryRequest::parse(&isbn, &language, &model) {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Ok(ExitCode::from(2));
                }
            };
            summarize(&config, request, json).await
        }
        Command::History { page } => history(&config, page).await,
        Command::Show { page, row } => show(&config, page, row).await,
        Command::Options => Ok(options()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    booksum::setup_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("booksum failed: {e:#}");
            match e.downcast_ref::<booksum::errors::SummaryError>() {
                Some(summary_error) => eprintln!("{}", summary_error.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
