//! Summary history: one bulk fetch, paginated on the client.

use tracing::info;

use crate::api::{SummaryBackend, TokenProvider};
use crate::core::models::HistoryEntry;
use crate::errors::SummaryError;

/// Rows per history page.
pub const HISTORY_PAGE_SIZE: usize = 5;

/// Fetches every past summary of the authenticated user.
///
/// # Errors
///
/// Returns `AuthError` when no token is available and `HttpError` when the
/// backend call fails.
pub async fn fetch_history(
    backend: &dyn SummaryBackend,
    tokens: &dyn TokenProvider,
) -> Result<Vec<HistoryEntry>, SummaryError> {
    let token = tokens.bearer_token().await?;
    let entries = backend.history(&token).await?;
    info!("Fetched {} history entries", entries.len());
    Ok(entries)
}

/// `ceil(total / page_size)`; zero when either is zero.
#[must_use]
pub const fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Entries on 1-indexed `page`. Out-of-range pages are empty.
#[must_use]
pub fn page<T>(entries: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page > page_count(entries.len(), page_size) {
        return &[];
    }
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(entries.len());
    &entries[start..end]
}

/// The entry behind row `row` (1-indexed) of `page`, for the detail view.
#[must_use]
pub fn select<T>(entries: &[T], page_number: usize, row: usize, page_size: usize) -> Option<&T> {
    row.checked_sub(1)
        .and_then(|index| page(entries, page_number, page_size).get(index))
}
