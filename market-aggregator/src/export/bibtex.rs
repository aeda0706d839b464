use super::{split_authors, year_field};
use crate::types::{SearchResult, SourceKind};

pub fn entry_type(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Academic => "article",
        SourceKind::Patent => "patent",
        SourceKind::Clinical | SourceKind::Preprint | SourceKind::News => "misc",
    }
}

// Braces would unbalance the entry.
fn clean(value: &str) -> String {
    value
        .replace(['{', '}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn entry(result: &SearchResult, index: usize) -> String {
    let mut fields = vec![("title", clean(&result.title))];

    let authors = split_authors(result);
    if !authors.is_empty() {
        fields.push(("author", clean(&authors.join(" and "))));
    }
    if let Some(year) = year_field(result) {
        fields.push(("year", year));
    }
    match result.source {
        SourceKind::Patent => fields.push(("number", clean(&result.id))),
        SourceKind::Clinical => {
            fields.push(("note", format!("ClinicalTrials.gov {}", clean(&result.id))));
        }
        SourceKind::Preprint => fields.push(("eprint", clean(&result.id))),
        SourceKind::News => {
            fields.push(("howpublished", "News article".to_string()));
        }
        SourceKind::Academic => {}
    }
    if let Some(abstract_text) = &result.abstract_text {
        fields.push(("abstract", clean(abstract_text)));
    }
    fields.push(("url", result.url.clone()));

    let body = fields
        .iter()
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("@{}{{{}{},\n{}\n}}", entry_type(result.source), result.source.as_str(), index, body)
}

/// One entry per record, keyed `<source><index>` from 1.
pub fn to_bibtex(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| entry(r, i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}
