use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which external provider a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Academic,
    Patent,
    Clinical,
    Preprint,
    News,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Academic,
        SourceKind::Patent,
        SourceKind::Clinical,
        SourceKind::Preprint,
        SourceKind::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Academic => "academic",
            SourceKind::Patent => "patent",
            SourceKind::Clinical => "clinical",
            SourceKind::Preprint => "preprint",
            SourceKind::News => "news",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Academic => "Academic Research",
            SourceKind::Patent => "Patents",
            SourceKind::Clinical => "Clinical Trials",
            SourceKind::Preprint => "Preprints",
            SourceKind::News => "News",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "academic" | "scholar" => Ok(SourceKind::Academic),
            "patent" | "patents" => Ok(SourceKind::Patent),
            "clinical" | "clinical_trials" | "clinical-trials" | "trials" => {
                Ok(SourceKind::Clinical)
            }
            "preprint" | "preprints" | "arxiv" => Ok(SourceKind::Preprint),
            "news" => Ok(SourceKind::News),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

/// The eight fixed business labels a result can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InsightCategory {
    #[serde(rename = "Business Updates")]
    BusinessUpdates,
    #[serde(rename = "Patent & IP Activity")]
    PatentActivity,
    #[serde(rename = "Academic Research & Tie-ups")]
    AcademicResearch,
    #[serde(rename = "Partnerships & Collaborations")]
    Partnerships,
    #[serde(rename = "Investments & Funding")]
    InvestmentsFunding,
    #[serde(rename = "Startup & Innovation News")]
    StartupInnovation,
    #[serde(rename = "Product / Project Announcements")]
    ProductAnnouncements,
    #[serde(rename = "Suppliers, Logistics & Raw Materials")]
    SupplyChain,
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 8] = [
        InsightCategory::BusinessUpdates,
        InsightCategory::PatentActivity,
        InsightCategory::AcademicResearch,
        InsightCategory::Partnerships,
        InsightCategory::InvestmentsFunding,
        InsightCategory::StartupInnovation,
        InsightCategory::ProductAnnouncements,
        InsightCategory::SupplyChain,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InsightCategory::BusinessUpdates => "Business Updates",
            InsightCategory::PatentActivity => "Patent & IP Activity",
            InsightCategory::AcademicResearch => "Academic Research & Tie-ups",
            InsightCategory::Partnerships => "Partnerships & Collaborations",
            InsightCategory::InvestmentsFunding => "Investments & Funding",
            InsightCategory::StartupInnovation => "Startup & Innovation News",
            InsightCategory::ProductAnnouncements => "Product / Project Announcements",
            InsightCategory::SupplyChain => "Suppliers, Logistics & Raw Materials",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InsightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        InsightCategory::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown insight category '{}'", wanted))
    }
}

/// A single record returned by a source adapter.
///
/// Provider-assigned fields are never edited after fetch. Only
/// `insight_categories` is filled in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source: SourceKind,
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insight_categories: Vec<InsightCategory>,
}

impl SearchResult {
    pub fn new(
        source: SourceKind,
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            id: id.into(),
            title: title.into(),
            abstract_text: None,
            authors: None,
            date: None,
            status: None,
            phase: None,
            enrollment: None,
            url: url.into(),
            insight_categories: Vec::new(),
        }
    }

    pub fn with_abstract(mut self, abstract_text: Option<String>) -> Self {
        self.abstract_text = abstract_text.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn with_authors(mut self, authors: Option<String>) -> Self {
        self.authors = authors.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    pub fn with_trial_details(
        mut self,
        status: Option<String>,
        phase: Option<String>,
        enrollment: Option<String>,
    ) -> Self {
        self.status = status;
        self.phase = phase;
        self.enrollment = enrollment;
        self
    }

    /// Title and abstract joined, the text the categorizer and filters look at.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text.as_deref().unwrap_or(""))
    }

    pub fn has_category(&self, category: InsightCategory) -> bool {
        self.insight_categories.contains(&category)
    }
}

/// Which adapters a search should invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub academic: bool,
    pub patents: bool,
    pub clinical_trials: bool,
    pub preprints: bool,
    pub news: bool,
}

impl SourceSelection {
    pub fn none() -> Self {
        Self {
            academic: false,
            patents: false,
            clinical_trials: false,
            preprints: false,
            news: false,
        }
    }

    pub fn only(kinds: &[SourceKind]) -> Self {
        let mut selection = Self::none();
        for kind in kinds {
            selection.set(*kind, true);
        }
        selection
    }

    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Academic => self.academic,
            SourceKind::Patent => self.patents,
            SourceKind::Clinical => self.clinical_trials,
            SourceKind::Preprint => self.preprints,
            SourceKind::News => self.news,
        }
    }

    pub fn set(&mut self, kind: SourceKind, enabled: bool) {
        match kind {
            SourceKind::Academic => self.academic = enabled,
            SourceKind::Patent => self.patents = enabled,
            SourceKind::Clinical => self.clinical_trials = enabled,
            SourceKind::Preprint => self.preprints = enabled,
            SourceKind::News => self.news = enabled,
        }
    }

    pub fn enabled(&self) -> Vec<SourceKind> {
        SourceKind::ALL.iter().copied().filter(|kind| self.is_enabled(*kind)).collect()
    }
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            academic: true,
            patents: true,
            clinical_trials: true,
            preprints: true,
            news: true,
        }
    }
}

pub const DEFAULT_MAX_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub query: String,
    pub max_results: usize,
    pub sources: SourceSelection,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            sources: SourceSelection::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_sources(mut self, sources: SourceSelection) -> Self {
        self.sources = sources;
        self
    }
}

/// Snapshot of a completed search. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub query: String,
    pub sources: SourceSelection,
    pub max_results: usize,
    pub results: Vec<SearchResult>,
    pub synthesis: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    #[default]
    And,
    Or,
    Not,
}

impl FromStr for BooleanOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AND" => Ok(BooleanOperator::And),
            "OR" => Ok(BooleanOperator::Or),
            "NOT" => Ok(BooleanOperator::Not),
            other => Err(format!("unknown boolean operator '{}'", other)),
        }
    }
}

/// View-only filter state applied to an in-memory result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedFilterOptions {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub boolean_operator: BooleanOperator,
    pub terms: Vec<String>,
    pub min_market_impact: u8,
    pub categories: BTreeSet<InsightCategory>,
    pub sources: BTreeSet<SourceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploaded,
    Processed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Processed => "processed",
            DocumentStatus::Failed => "failed",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(DocumentStatus::Uploaded),
            "processed" => Ok(DocumentStatus::Processed),
            "failed" => Ok(DocumentStatus::Failed),
            other => Err(format!("unknown document status '{}'", other)),
        }
    }
}

/// Metadata for a file placed in document storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub filename: String,
    pub storage_path: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}
