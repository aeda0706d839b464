use super::{split_authors, year_field};
use crate::types::{SearchResult, SourceKind};

pub fn reference_type(source: SourceKind) -> &'static str {
    match source {
        SourceKind::Academic => "Journal Article",
        SourceKind::Preprint => "Unpublished Work",
        SourceKind::Clinical => "Dataset",
        SourceKind::Patent => "Patent",
        SourceKind::News => "Newspaper Article",
    }
}

fn entry(result: &SearchResult) -> String {
    let mut lines = vec![format!("%0 {}", reference_type(result.source))];
    let mut push = |tag: &str, value: &str| {
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if !value.is_empty() {
            lines.push(format!("{} {}", tag, value));
        }
    };

    push("%T", &result.title);
    for author in split_authors(result) {
        push("%A", &author);
    }
    if let Some(year) = year_field(result) {
        push("%D", &year);
    }
    if let Some(abstract_text) = &result.abstract_text {
        push("%X", abstract_text);
    }
    push("%M", &result.id);
    push("%U", &result.url);
    if let Some(status) = &result.status {
        push("%Z", status);
    }

    lines.join("\n")
}

/// `%`-tagged records separated by a blank line.
pub fn to_endnote(results: &[SearchResult]) -> String {
    results.iter().map(entry).collect::<Vec<_>>().join("\n\n")
}
