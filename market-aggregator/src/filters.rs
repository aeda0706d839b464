use crate::dates::{parse_date, passes_date_filter};
use crate::types::{AdvancedFilterOptions, BooleanOperator, InsightCategory, SearchResult};
use chrono::{DateTime, Utc};

fn category_weight(category: InsightCategory) -> u8 {
    match category {
        InsightCategory::InvestmentsFunding => 80,
        InsightCategory::PatentActivity => 70,
        InsightCategory::Partnerships => 70,
        InsightCategory::ProductAnnouncements => 60,
        InsightCategory::StartupInnovation => 55,
        InsightCategory::SupplyChain => 50,
        InsightCategory::AcademicResearch => 40,
        InsightCategory::BusinessUpdates => 30,
    }
}

/// Heuristic 0-100 score: strongest category weight plus a recency bonus.
pub fn market_impact_score(result: &SearchResult, now: DateTime<Utc>) -> u8 {
    let base = result
        .insight_categories
        .iter()
        .map(|c| category_weight(*c))
        .max()
        .unwrap_or(category_weight(InsightCategory::BusinessUpdates));

    let bonus = match result.date.as_deref().and_then(parse_date) {
        Some(date) => {
            let age_days = (now.date_naive() - date).num_days();
            match age_days {
                0..=90 => 15,
                91..=365 => 5,
                _ => 0,
            }
        }
        None => 0,
    };

    base.saturating_add(bonus).min(100)
}

fn matches_terms(result: &SearchResult, operator: BooleanOperator, terms: &[String]) -> bool {
    let terms: Vec<String> = terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return true;
    }

    let text = result.searchable_text().to_lowercase();
    match operator {
        BooleanOperator::And => terms.iter().all(|t| text.contains(t.as_str())),
        BooleanOperator::Or => terms.iter().any(|t| text.contains(t.as_str())),
        BooleanOperator::Not => !terms.iter().any(|t| text.contains(t.as_str())),
    }
}

/// Whether one result survives the advanced filters.
pub fn matches_filters(
    result: &SearchResult,
    options: &AdvancedFilterOptions,
    now: DateTime<Utc>,
) -> bool {
    if !passes_date_filter(result.date.as_deref(), options.date_from, options.date_to, now) {
        return false;
    }

    if !options.categories.is_empty()
        && !result.insight_categories.iter().any(|c| options.categories.contains(c))
    {
        return false;
    }

    if !options.sources.is_empty() && !options.sources.contains(&result.source) {
        return false;
    }

    if !matches_terms(result, options.boolean_operator, &options.terms) {
        return false;
    }

    options.min_market_impact == 0 || market_impact_score(result, now) >= options.min_market_impact
}

/// Filter a result set for display. The input is left untouched.
pub fn apply_filters(
    results: &[SearchResult],
    options: &AdvancedFilterOptions,
    now: DateTime<Utc>,
) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|result| matches_filters(result, options, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn result(id: &str, title: &str, date: &str, category: InsightCategory) -> SearchResult {
        let url = format!("https://example.com/{}", id);
        let mut r =
            SearchResult::new(SourceKind::News, id, title, url).with_date(Some(date.to_string()));
        r.insight_categories.push(category);
        r
    }

    fn sample() -> Vec<SearchResult> {
        vec![
            result(
                "1",
                "Acme raises funding for hydrogen tanks",
                "2025-06-01",
                InsightCategory::InvestmentsFunding,
            ),
            result(
                "2",
                "Hydrogen research update",
                "2022-01-01",
                InsightCategory::AcademicResearch,
            ),
            result("3", "Fabricated future item", "2031-01-01", InsightCategory::BusinessUpdates),
            result("4", "Undated hydrogen note", "Q2 2024", InsightCategory::BusinessUpdates),
        ]
    }

    #[test]
    fn default_options_only_drop_future_dates() {
        let kept = apply_filters(&sample(), &AdvancedFilterOptions::default(), now());
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn date_range_keeps_unparseable_dates() {
        let options = AdvancedFilterOptions {
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 12, 31),
            ..Default::default()
        };
        let ids: Vec<String> = apply_filters(&sample(), &options, now())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn categories_and_terms() {
        let mut options = AdvancedFilterOptions::default();
        options.categories.insert(InsightCategory::AcademicResearch);
        options.categories.insert(InsightCategory::InvestmentsFunding);
        assert_eq!(apply_filters(&sample(), &options, now()).len(), 2);

        let options = AdvancedFilterOptions {
            boolean_operator: BooleanOperator::And,
            terms: vec!["hydrogen".into(), "tanks".into()],
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &options, now())[0].id, "1");

        let options = AdvancedFilterOptions {
            boolean_operator: BooleanOperator::Not,
            terms: vec!["hydrogen".into()],
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &options, now()).is_empty());
    }

    #[test]
    fn impact_threshold() {
        let recent_funding = &sample()[0];
        assert_eq!(market_impact_score(recent_funding, now()), 95);
        assert_eq!(market_impact_score(&sample()[1], now()), 40);

        let options = AdvancedFilterOptions {
            min_market_impact: 50,
            ..Default::default()
        };
        let ids: Vec<String> = apply_filters(&sample(), &options, now())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1"]);
    }
}
