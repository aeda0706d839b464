//! Rule-based insight classification.
//!
//! Rules are checked in order and the first match wins. A result mentioning
//! both a patent and a partnership is always "Patent & IP Activity".

use crate::types::{InsightCategory, SearchResult, SourceKind};

const PATENT_KEYWORDS: &[&str] = &[
    "patent",
    "intellectual property",
    "trademark",
    "invention",
    "licensing",
    "infringement",
];

const ACADEMIC_KEYWORDS: &[&str] = &[
    "research",
    "study",
    "university",
    "academic",
    "journal",
    "scientist",
    "laboratory",
    "clinical trial",
    "peer-reviewed",
];

const PARTNERSHIP_KEYWORDS: &[&str] = &[
    "partnership",
    "partner",
    "collaboration",
    "collaborate",
    "alliance",
    "joint venture",
    "teams up",
    "tie-up",
    "memorandum of understanding",
];

const FUNDING_KEYWORDS: &[&str] = &[
    "funding",
    "investment",
    "invest",
    "raises",
    "raised",
    "series a",
    "series b",
    "venture capital",
    "acquisition",
    "acquire",
    "merger",
    "valuation",
];

const STARTUP_KEYWORDS: &[&str] = &[
    "startup",
    "start-up",
    "founder",
    "incubator",
    "accelerator",
    "spin-off",
    "spinout",
    "emerging",
    "innovation",
];

const ANNOUNCEMENT_KEYWORDS: &[&str] = &[
    "launch",
    "announce",
    "unveil",
    "introduce",
    "release",
    "rollout",
    "debut",
    "new product",
    "project",
];

const SUPPLY_CHAIN_KEYWORDS: &[&str] = &[
    "supplier",
    "supply chain",
    "logistics",
    "raw material",
    "manufacturing",
    "procurement",
    "shortage",
    "shipping",
    "sourcing",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Classify one result into exactly one category.
pub fn categorize_result(result: &SearchResult) -> InsightCategory {
    let text = result.searchable_text().to_lowercase();

    if result.source == SourceKind::Patent || contains_any(&text, PATENT_KEYWORDS) {
        InsightCategory::PatentActivity
    } else if matches!(result.source, SourceKind::Academic | SourceKind::Preprint)
        || contains_any(&text, ACADEMIC_KEYWORDS)
    {
        InsightCategory::AcademicResearch
    } else if contains_any(&text, PARTNERSHIP_KEYWORDS) {
        InsightCategory::Partnerships
    } else if contains_any(&text, FUNDING_KEYWORDS) {
        InsightCategory::InvestmentsFunding
    } else if contains_any(&text, STARTUP_KEYWORDS) {
        InsightCategory::StartupInnovation
    } else if contains_any(&text, ANNOUNCEMENT_KEYWORDS) {
        InsightCategory::ProductAnnouncements
    } else if contains_any(&text, SUPPLY_CHAIN_KEYWORDS) {
        InsightCategory::SupplyChain
    } else {
        InsightCategory::BusinessUpdates
    }
}

/// Tag every uncategorized result; already-tagged results are left as they are.
pub fn categorize_missing(results: &mut [SearchResult]) {
    for result in results.iter_mut().filter(|r| r.insight_categories.is_empty()) {
        let category = categorize_result(result);
        result.insight_categories.push(category);
    }
}
