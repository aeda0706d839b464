use crate::dates::year_of;
use crate::types::{InsightCategory, SearchResult, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts behind the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Every category in display order, zero counts included.
    pub by_category: Vec<(InsightCategory, usize)>,
    /// Only sources that produced at least one record.
    pub by_source: Vec<(SourceKind, usize)>,
    /// Ascending years; undated records are left out.
    pub by_year: Vec<(i32, usize)>,
    pub total: usize,
}

impl ChartData {
    pub fn from_results(results: &[SearchResult]) -> Self {
        let by_category = InsightCategory::ALL
            .iter()
            .map(|category| {
                let count = results.iter().filter(|r| r.has_category(*category)).count();
                (*category, count)
            })
            .collect();

        let by_source = SourceKind::ALL
            .iter()
            .map(|kind| (*kind, results.iter().filter(|r| r.source == *kind).count()))
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut years: BTreeMap<i32, usize> = BTreeMap::new();
        for result in results {
            if let Some(year) = year_of(result.date.as_deref()) {
                *years.entry(year).or_insert(0) += 1;
            }
        }

        Self {
            by_category,
            by_source,
            by_year: years.into_iter().collect(),
            total: results.len(),
        }
    }

    /// Plain-text rendering used in prompts and on the terminal.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Total records: {}", self.total), "By category:".to_string()];
        for (category, count) in &self.by_category {
            lines.push(format!("- {}: {}", category, count));
        }
        lines.push("By source:".to_string());
        for (source, count) in &self.by_source {
            lines.push(format!("- {}: {}", source.display_name(), count));
        }
        if !self.by_year.is_empty() {
            lines.push("By year:".to_string());
            for (year, count) in &self.by_year {
                lines.push(format!("- {}: {}", year, count));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(source: SourceKind, date: &str, category: InsightCategory) -> SearchResult {
        let mut r = SearchResult::new(source, "x", "t", "https://example.com")
            .with_date(Some(date.to_string()));
        r.insight_categories.push(category);
        r
    }

    #[test]
    fn counts_every_axis() {
        let results = vec![
            tagged(SourceKind::Patent, "2024-03-01", InsightCategory::PatentActivity),
            tagged(SourceKind::Patent, "2023-01-10", InsightCategory::PatentActivity),
            tagged(SourceKind::News, "Unknown", InsightCategory::BusinessUpdates),
        ];
        let data = ChartData::from_results(&results);

        assert_eq!(data.total, 3);
        assert_eq!(data.by_category.len(), 8);
        assert_eq!(data.by_category[0], (InsightCategory::BusinessUpdates, 1));
        assert_eq!(data.by_category[1], (InsightCategory::PatentActivity, 2));
        assert_eq!(data.by_source, vec![(SourceKind::Patent, 2), (SourceKind::News, 1)]);
        assert_eq!(data.by_year, vec![(2023, 1), (2024, 1)]);
    }

    #[test]
    fn empty_input_keeps_category_axis() {
        let data = ChartData::from_results(&[]);
        assert!(data.by_category.iter().all(|(_, count)| *count == 0));
        assert!(data.by_source.is_empty());
        assert!(data.summary().contains("Total records: 0"));
    }
}
