//! Plain-text rendering of progress, results and history.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write as _;

use crate::core::models::{HistoryEntry, SummaryResult};
use crate::history::{page, page_count};
use crate::poller::{PollerPhase, PollerSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::High
        } else if score >= 75.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Scores are shown as whole percentages within 0..=100.
#[must_use]
pub fn format_score(score: f64) -> String {
    let clamped = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    };
    format!("{clamped:.0}%")
}

/// `Jul 27, 2025` for the timestamp shapes the backend emits; the raw text
/// otherwise.
#[must_use]
pub fn format_creation_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[must_use]
pub fn render_progress(snapshot: &PollerSnapshot) -> String {
    match snapshot.phase {
        PollerPhase::Idle => String::new(),
        PollerPhase::Cancelled => "Cancelled.".to_string(),
        PollerPhase::Failed => format!(
            "[{:>3}%] {}",
            snapshot.progress,
            snapshot.error_message().unwrap_or_default()
        ),
        _ => format!("[{:>3}%] {}", snapshot.progress, snapshot.step),
    }
}

#[must_use]
pub fn render_result(result: &SummaryResult) -> String {
    let band = ConfidenceBand::for_score(result.medium_confidence);
    let mut out = String::new();

    let _ = writeln!(out, "{}", result.title);
    if !result.authors.is_empty() {
        let _ = writeln!(out, "by {}", result.authors.join(", "));
    }
    let _ = writeln!(
        out,
        "{} Confidence ({})",
        band.label(),
        format_score(result.medium_confidence)
    );
    out.push('\n');

    let _ = writeln!(out, "Source Reliability  {}", format_score(result.source_reliability));
    let _ = writeln!(out, "Content Coverage    {}", format_score(result.content_coverage));
    let _ = writeln!(out, "Cross-Reference     {}", format_score(result.cross_reference));
    out.push('\n');

    for paragraph in result.paragraphs() {
        let _ = writeln!(out, "{paragraph}\n");
    }

    if !result.sources.is_empty() {
        out.push_str("Sources:\n");
        for source in &result.sources {
            let _ = write!(out, "  - {} ({} reliable)", source.kind, format_score(source.reliability));
            if !source.url.is_empty() {
                let _ = write!(out, " {}", source.url);
            }
            out.push('\n');
        }
    }

    out
}

/// One page of the history table, rows numbered from 1.
#[must_use]
pub fn render_history_page(entries: &[HistoryEntry], page_number: usize, page_size: usize) -> String {
    let total_pages = page_count(entries.len(), page_size);
    if total_pages == 0 {
        return "No summaries yet.\n".to_string();
    }

    let rows = page(entries, page_number, page_size);
    let mut out = String::new();
    let _ = writeln!(out, "Page {page_number} of {total_pages} ({} summaries)", entries.len());
    for (index, entry) in rows.iter().enumerate() {
        let band = ConfidenceBand::for_score(entry.summary.medium_confidence);
        let _ = writeln!(
            out,
            "{:>2}. {} by {} | ISBN {} | {} | {} | {} ({}) | {}",
            index + 1,
            entry.summary.title,
            entry.summary.authors.join(", "),
            entry.isbn,
            entry.model,
            entry.language_name(),
            band.label(),
            format_score(entry.summary.medium_confidence),
            format_creation_date(&entry.creation_date),
        );
    }
    out
}

/// Detail view for one history entry.
#[must_use]
pub fn render_history_entry(entry: &HistoryEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ISBN: {}", entry.isbn);
    let _ = writeln!(out, "Model: {}", entry.model);
    let _ = writeln!(out, "Language: {}", entry.language_name());
    let _ = writeln!(out, "Created: {}", format_creation_date(&entry.creation_date));
    out.push('\n');
    out.push_str(&render_result(&entry.summary));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_band_thresholds() {
        assert_eq!(ConfidenceBand::for_score(95.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::for_score(90.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::for_score(89.9), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::for_score(75.0), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::for_score(74.0), ConfidenceBand::Low);
    }

    #[test]
    fn test_format_score_clamps() {
        assert_eq!(format_score(87.4), "87%");
        assert_eq!(format_score(120.0), "100%");
        assert_eq!(format_score(-3.0), "0%");
        assert_eq!(format_score(f64::NAN), "0%");
    }

    #[test]
    fn test_format_creation_date_shapes() {
        assert_eq!(format_creation_date("2025-07-27T10:18:44.604204"), "Jul 27, 2025");
        assert_eq!(format_creation_date("2025-07-27T10:18:44Z"), "Jul 27, 2025");
        assert_eq!(format_creation_date("2025-01-05"), "Jan 5, 2025");
        assert_eq!(format_creation_date("yesterday"), "yesterday");
    }
}
