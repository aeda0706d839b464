use super::{split_authors, year_field};
use crate::types::{SearchResult, SourceKind};

pub fn reference_type(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Academic => "JOUR",
        SourceKind::Preprint => "UNPB",
        SourceKind::Clinical => "DATA",
        SourceKind::Patent => "PAT",
        SourceKind::News => "NEWS",
    }
}

fn tag(lines: &mut Vec<String>, name: &str, value: &str) {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if !value.is_empty() {
        lines.push(format!("{}  - {}", name, value));
    }
}

fn entry(result: &SearchResult) -> String {
    let mut lines = vec![format!("TY  - {}", reference_type(result.source))];
    tag(&mut lines, "TI", &result.title);
    for author in split_authors(result) {
        tag(&mut lines, "AU", &author);
    }
    if let Some(year) = year_field(result) {
        tag(&mut lines, "PY", &year);
    }
    if let Some(date) = &result.date {
        tag(&mut lines, "DA", date);
    }
    if let Some(abstract_text) = &result.abstract_text {
        tag(&mut lines, "AB", abstract_text);
    }
    tag(&mut lines, "ID", &result.id);
    tag(&mut lines, "UR", &result.url);
    for category in &result.insight_categories {
        tag(&mut lines, "KW", category.label());
    }
    lines.push("ER  - ".to_string());
    lines.join("\n")
}

pub fn to_ris(results: &[SearchResult]) -> String {
    results.iter().map(entry).collect::<Vec<_>>().join("\n\n")
}
