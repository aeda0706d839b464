use serde::{Deserialize, Serialize};
use uuid::Uuid;
// Use the interfaces crate for core types
pub use interfaces::defs::{
    AdvancedFilterOptions, BooleanOperator, DocumentStatus, InsightCategory, SavedSearch,
    SearchOptions, SearchResult, SourceKind, SourceSelection, UploadedDocument,
};
pub use interfaces::defs::DEFAULT_MAX_RESULTS;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_response_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Market-Intel/1.0".to_string(),
            timeout_seconds: 30,
            max_response_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug)]
pub struct ParsedEntry {
    pub guid: Option<String>,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of one adapter inside a fan-out search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source: SourceKind,
    pub records: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub results: Vec<SearchResult>,
    pub outcomes: Vec<SourceOutcome>,
}

impl SearchReport {
    pub fn failed_sources(&self) -> Vec<SourceKind> {
        self.outcomes.iter().filter(|o| o.error.is_some()).map(|o| o.source).collect()
    }

    /// True when at least one source ran and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.error.is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{source_name} is not configured: {reason}")]
    NotConfigured { source_name: String, reason: String },

    #[error("Saved search not found: {id}")]
    SearchNotFound { id: Uuid },

    #[error("Document not found: {id}")]
    DocumentNotFound { id: Uuid },

    #[error("Unsupported document type: {mime_type}")]
    UnsupportedDocument { mime_type: String },

    #[error("Response size exceeds limit: {size_mb}MB")]
    ResponseTooLarge { size_mb: usize },

    #[error("AI rate limit exceeded")]
    AiRateLimited,

    #[error("AI quota exceeded")]
    AiQuotaExceeded,

    #[error("AI analysis failed: {0}")]
    AiFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

impl AggregatorError {
    /// Text shown to the user when an AI call fails.
    pub fn user_message(&self) -> String {
        match self {
            AggregatorError::AiRateLimited => {
                "Rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            AggregatorError::AiQuotaExceeded => {
                "AI credits exhausted. Please add credits to your workspace to continue.".to_string()
            }
            AggregatorError::AiFailed(_) => "Analysis failed. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
