pub mod bibtex;
pub mod csv;
pub mod endnote;
pub mod html;
pub mod ris;

use crate::types::{Result, SearchResult};
use crate::utils::text::slugify;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

pub use bibtex::to_bibtex;
pub use csv::to_csv;
pub use endnote::to_endnote;
pub use html::{to_html_report, ReportContext};
pub use ris::to_ris;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Bibtex,
    Ris,
    Endnote,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Bibtex => "bib",
            ExportFormat::Ris => "ris",
            ExportFormat::Endnote => "enw",
            ExportFormat::Html => "html",
        }
    }

    /// `market-intel-<query-slug>.<ext>`
    pub fn file_name(&self, query: &str) -> String {
        format!("market-intel-{}.{}", slugify(query), self.extension())
    }

    pub fn render(
        &self,
        query: &str,
        results: &[SearchResult],
        synthesis: Option<&str>,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let body = match self {
            ExportFormat::Csv => to_csv(results)?,
            ExportFormat::Bibtex => to_bibtex(results),
            ExportFormat::Ris => to_ris(results),
            ExportFormat::Endnote => to_endnote(results),
            ExportFormat::Html => to_html_report(&ReportContext {
                query,
                results,
                synthesis,
                generated_at,
            }),
        };
        Ok(body)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Bibtex => "bibtex",
            ExportFormat::Ris => "ris",
            ExportFormat::Endnote => "endnote",
            ExportFormat::Html => "html",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "bibtex" | "bib" => Ok(ExportFormat::Bibtex),
            "ris" => Ok(ExportFormat::Ris),
            "endnote" | "enw" => Ok(ExportFormat::Endnote),
            "html" | "pdf" => Ok(ExportFormat::Html),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// Authors split on `,` or `;` with blanks dropped.
pub(crate) fn split_authors(result: &SearchResult) -> Vec<String> {
    result
        .authors
        .as_deref()
        .map(|authors| {
            authors
                .split([',', ';'])
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Year as written in the date, when one can be read.
pub(crate) fn year_field(result: &SearchResult) -> Option<String> {
    crate::dates::year_of(result.date.as_deref()).map(|y| y.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    #[test]
    fn file_names_use_query_slug() {
        assert_eq!(
            ExportFormat::Csv.file_name("Hydrogen Storage"),
            "market-intel-hydrogen-storage.csv"
        );
        assert_eq!(ExportFormat::Bibtex.file_name("  "), "market-intel-search.bib");
        assert_eq!("enw".parse::<ExportFormat>(), Ok(ExportFormat::Endnote));
    }

    #[test]
    fn splits_author_lists() {
        let result = SearchResult::new(SourceKind::Patent, "1", "t", "u")
            .with_authors(Some("Acme Corp; Jane Doe, ".to_string()));
        assert_eq!(split_authors(&result), vec!["Acme Corp", "Jane Doe"]);
    }
}
