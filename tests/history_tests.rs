use async_trait::async_trait;
use booksum::api::{StaticTokenProvider, SummaryBackend, TokenProvider};
use booksum::core::models::{HistoryEntry, StatusResponse, SummaryRequest, TaskId};
use booksum::errors::SummaryError;
use booksum::history::{HISTORY_PAGE_SIZE, fetch_history, page, page_count, select};
use booksum::views::{render_history_entry, render_history_page};
use serde_json::json;
use std::sync::Mutex;

struct HistoryBackend {
    entries: Vec<HistoryEntry>,
    tokens_seen: Mutex<Vec<String>>,
}

#[async_trait]
impl SummaryBackend for HistoryBackend {
    async fn submit(&self, _token: &str, _request: &SummaryRequest) -> Result<TaskId, SummaryError> {
        Err(SummaryError::SubmissionError("not used".into()))
    }

    async fn status(&self, _token: &str, _task_id: &TaskId) -> Result<StatusResponse, SummaryError> {
        Err(SummaryError::PollingError("not used".into()))
    }

    async fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, SummaryError> {
        self.tokens_seen.lock().unwrap().push(token.to_string());
        Ok(self.entries.clone())
    }
}

struct NoSession;

#[async_trait]
impl TokenProvider for NoSession {
    async fn bearer_token(&self) -> Result<String, SummaryError> {
        Err(SummaryError::AuthError("no session".into()))
    }
}

fn entries(n: usize) -> Vec<HistoryEntry> {
    (1..=n)
        .map(|i| {
            let language = if i % 2 == 0 { "de" } else { "en" };
            serde_json::from_value(json!({
                "id": i,
                "isbn": format!("978000000{i:04}"),
                "model": "mistral_latest__300",
                "language": language,
                "creation_date": "2025-07-27T10:18:44.604204",
                "title": format!("Book {i}"),
                "authors": ["A. Author", "B. Author"],
                "generated_summary": "One.\n\nTwo.",
                "source_reliability": 90,
                "content_coverage": 70,
                "cross_reference": 85,
                "medium_confidence": 60 + i,
                "sources": [{"type": "openlibrary", "url": "https://openlibrary.org", "reliability": 70}]
            }))
            .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_fetch_history_uses_bearer_token() {
    let backend = HistoryBackend {
        entries: entries(3),
        tokens_seen: Mutex::new(Vec::new()),
    };
    let tokens = StaticTokenProvider::new("abc");

    let fetched = fetch_history(&backend, &tokens).await.unwrap();

    assert_eq!(fetched.len(), 3);
    assert_eq!(fetched[0].id, TaskId::new("1"));
    assert_eq!(*backend.tokens_seen.lock().unwrap(), vec!["abc"]);
}

#[tokio::test]
async fn test_fetch_history_surfaces_auth_error() {
    let backend = HistoryBackend {
        entries: entries(3),
        tokens_seen: Mutex::new(Vec::new()),
    };

    let err = fetch_history(&backend, &NoSession).await.unwrap_err();

    assert!(matches!(err, SummaryError::AuthError(_)));
    assert!(backend.tokens_seen.lock().unwrap().is_empty());
}

#[test]
fn test_pagination_over_history_entries() {
    let all = entries(12);

    assert_eq!(page_count(all.len(), HISTORY_PAGE_SIZE), 3);
    for k in 1..=3 {
        let expected_start = (k - 1) * HISTORY_PAGE_SIZE;
        let expected_end = (k * HISTORY_PAGE_SIZE).min(all.len());
        assert_eq!(page(&all, k, HISTORY_PAGE_SIZE), &all[expected_start..expected_end]);
    }

    let picked = select(&all, 3, 2, HISTORY_PAGE_SIZE).unwrap();
    assert_eq!(picked.summary.title, "Book 12");
}

#[test]
fn test_history_page_rendering() {
    let all = entries(7);
    let rendered = render_history_page(&all, 2, HISTORY_PAGE_SIZE);

    assert!(rendered.starts_with("Page 2 of 2 (7 summaries)"));
    assert!(rendered.contains(" 1. Book 6 by A. Author, B. Author"));
    assert!(rendered.contains("Deutsch"));
    assert!(rendered.contains("Jul 27, 2025"));
    assert!(!rendered.contains("Book 5 "));
    assert_eq!(rendered.lines().count(), 3);

    assert_eq!(render_history_page(&[], 1, HISTORY_PAGE_SIZE), "No summaries yet.\n");
}

#[test]
fn test_history_detail_rendering() {
    let all = entries(1);
    let rendered = render_history_entry(&all[0]);

    assert!(rendered.contains("ISBN: 9780000000001"));
    assert!(rendered.contains("Language: English"));
    assert!(rendered.contains("Low Confidence (61%)"));
    assert!(rendered.contains("openlibrary (70% reliable) https://openlibrary.org"));
}
