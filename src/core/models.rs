use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::validation::normalize_isbn;
use crate::errors::SummaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    Es,
    It,
}

impl Language {
    pub const ALL: [Language; 5] = [Self::En, Self::De, Self::Fr, Self::Es, Self::It];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::It => "it",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::De => "Deutsch",
            Self::Fr => "Français",
            Self::Es => "Español",
            Self::It => "Italiano",
        }
    }
}

impl FromStr for Language {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == s.trim())
            .ok_or_else(|| SummaryError::ValidationError(format!("Unsupported language: {s}")))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A (model, output length) pair offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelProfile {
    #[serde(rename = "mistral_latest__300")]
    MistralLatest300,
    #[serde(rename = "gemma3n_e2b__300")]
    Gemma3nE2b300,
    #[serde(rename = "llama3_1_latest__300")]
    Llama31Latest300,
    #[serde(rename = "mistral_latest__1000")]
    MistralLatest1000,
    #[serde(rename = "gemma3n_e2b__1000")]
    Gemma3nE2b1000,
    #[serde(rename = "llama3_1_latest__1000")]
    Llama31Latest1000,
}

impl ModelProfile {
    pub const ALL: [ModelProfile; 6] = [
        Self::MistralLatest300,
        Self::Gemma3nE2b300,
        Self::Llama31Latest300,
        Self::MistralLatest1000,
        Self::Gemma3nE2b1000,
        Self::Llama31Latest1000,
    ];

    /// Identifier used on the wire, e.g. `mistral_latest__300`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MistralLatest300 => "mistral_latest__300",
            Self::Gemma3nE2b300 => "gemma3n_e2b__300",
            Self::Llama31Latest300 => "llama3_1_latest__300",
            Self::MistralLatest1000 => "mistral_latest__1000",
            Self::Gemma3nE2b1000 => "gemma3n_e2b__1000",
            Self::Llama31Latest1000 => "llama3_1_latest__1000",
        }
    }

    #[must_use]
    pub const fn model_name(self) -> &'static str {
        match self {
            Self::MistralLatest300 | Self::MistralLatest1000 => "mistral:latest",
            Self::Gemma3nE2b300 | Self::Gemma3nE2b1000 => "gemma3n:e2b",
            Self::Llama31Latest300 | Self::Llama31Latest1000 => "llama3.1:latest",
        }
    }

    /// Target summary length in characters.
    #[must_use]
    pub const fn output_length(self) -> u32 {
        match self {
            Self::MistralLatest300 | Self::Gemma3nE2b300 | Self::Llama31Latest300 => 300,
            Self::MistralLatest1000 | Self::Gemma3nE2b1000 | Self::Llama31Latest1000 => 1000,
        }
    }
}

impl FromStr for ModelProfile {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.key() == s.trim())
            .ok_or_else(|| SummaryError::ValidationError(format!("Unsupported model: {s}")))
    }
}

impl fmt::Display for ModelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} chars)", self.model_name(), self.output_length())
    }
}

/// A validated summary request. Immutable once built; resubmitting means
/// building a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRequest {
    isbn: String,
    language: Language,
    model: ModelProfile,
    #[serde(skip)]
    correlation_id: Uuid,
}

impl SummaryRequest {
    /// # Errors
    ///
    /// Returns `ValidationError` when the ISBN is not 10 or 13 digits after
    /// stripping hyphens and spaces.
    pub fn new(isbn: &str, language: Language, model: ModelProfile) -> Result<Self, SummaryError> {
        Ok(Self {
            isbn: normalize_isbn(isbn)?,
            language,
            model,
            correlation_id: Uuid::new_v4(),
        })
    }

    /// Builds a request from raw user input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a malformed ISBN or an unknown language
    /// or model key.
    pub fn parse(isbn: &str, language: &str, model: &str) -> Result<Self, SummaryError> {
        Self::new(isbn, language.parse()?, model.parse()?)
    }

    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn model(&self) -> ModelProfile {
        self.model
    }

    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Opaque server-assigned task handle. The backend may send it as a JSON
/// string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if !s.trim().is_empty() => Ok(Self(s)),
            RawId::Text(_) => Err(serde::de::Error::custom("empty task id")),
            RawId::Number(n) => Ok(Self(n.to_string())),
        }
    }
}

/// Body returned by the submission endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub id: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    ValidatingIsbn,
    CollectingData,
    DataCollected,
    GeneratingSummary,
    Completed,
    Failed,
    /// Anything the client does not recognise.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    pub reliability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub generated_summary: String,
    pub source_reliability: f64,
    pub content_coverage: f64,
    pub cross_reference: f64,
    pub medium_confidence: f64,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl SummaryResult {
    /// Summary paragraphs, split on blank lines.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.generated_summary
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// One decoded status lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub status: TaskStatus,
    /// Present only for `completed`.
    pub result: Option<SummaryResult>,
}

impl StatusResponse {
    #[must_use]
    pub const fn pending(status: TaskStatus) -> Self {
        Self {
            status,
            result: None,
        }
    }

    /// Decodes the status endpoint body. The summary fields are only read
    /// when the status is `completed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` when the status is missing or a completed
    /// payload lacks the result fields.
    pub fn from_value(body: Value) -> Result<Self, SummaryError> {
        let status = body
            .get("status")
            .cloned()
            .ok_or_else(|| SummaryError::InvalidResponse("status field missing".to_string()))
            .and_then(|raw| {
                serde_json::from_value::<TaskStatus>(raw)
                    .map_err(|e| SummaryError::InvalidResponse(format!("invalid status: {e}")))
            })?;

        if status != TaskStatus::Completed {
            return Ok(Self::pending(status));
        }

        let result = serde_json::from_value::<SummaryResult>(body)
            .map_err(|e| SummaryError::InvalidResponse(format!("malformed summary payload: {e}")))?;

        Ok(Self {
            status,
            result: Some(result),
        })
    }
}

/// A past summary as returned by `GET /all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: TaskId,
    pub isbn: String,
    pub model: String,
    pub language: String,
    pub creation_date: String,
    #[serde(flatten)]
    pub summary: SummaryResult,
}

impl HistoryEntry {
    /// Display name for the stored language code, or the raw code when it
    /// is not one we know.
    #[must_use]
    pub fn language_name(&self) -> &str {
        self.language
            .parse::<Language>()
            .map_or(self.language.as_str(), |l| l.display_name())
    }
}
