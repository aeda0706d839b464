use crate::types::{AggregatorError, Result, SearchResult};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};

const HEADER: [&str; 11] = [
    "Source",
    "ID",
    "Title",
    "Authors",
    "Date",
    "Abstract",
    "Status",
    "Phase",
    "Enrollment",
    "URL",
    "Insight Categories",
];

/// Header plus one record per result. Every field is quoted and inner
/// quotes are doubled.
pub fn to_csv(results: &[SearchResult]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;

    for r in results {
        let categories = r
            .insight_categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join("; ");
        wtr.write_record([
            r.source.as_str(),
            r.id.as_str(),
            r.title.as_str(),
            r.authors.as_deref().unwrap_or(""),
            r.date.as_deref().unwrap_or(""),
            r.abstract_text.as_deref().unwrap_or(""),
            r.status.as_deref().unwrap_or(""),
            r.phase.as_deref().unwrap_or(""),
            r.enrollment.as_deref().unwrap_or(""),
            r.url.as_str(),
            categories.as_str(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AggregatorError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AggregatorError::Parse(format!("CSV output: {}", e)))
}
