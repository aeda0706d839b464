use crate::charts::ChartData;
use crate::types::SearchResult;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub struct ReportContext<'a> {
    pub query: &'a str,
    pub results: &'a [SearchResult],
    pub synthesis: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
}

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:32px;color:#1f2933}\
h1{font-size:24px;margin-bottom:4px}\
.meta{color:#616e7c;font-size:13px;margin-bottom:24px}\
.counts{display:flex;flex-wrap:wrap;gap:8px;margin-bottom:24px}\
.count{border:1px solid #cbd2d9;border-radius:4px;padding:6px 10px;font-size:13px}\
.synthesis{white-space:pre-wrap;background:#f5f7fa;padding:16px;border-radius:4px;margin-bottom:24px}\
table{border-collapse:collapse;width:100%;font-size:12px}\
th,td{border:1px solid #cbd2d9;padding:6px;text-align:left;vertical-align:top}\
th{background:#e4e7eb}\
@media print{body{margin:0}.synthesis{background:none}}";

fn result_row(index: usize, r: &SearchResult) -> String {
    let categories = r
        .insight_categories
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<tr><td>{}</td><td>{}</td><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
        index,
        encode_text(r.source.display_name()),
        encode_double_quoted_attribute(&r.url),
        encode_text(&r.title),
        encode_text(r.authors.as_deref().unwrap_or("")),
        encode_text(r.date.as_deref().unwrap_or("")),
        encode_text(&categories),
    )
}

/// Standalone printable report. Every interpolated value is escaped.
pub fn to_html_report(context: &ReportContext<'_>) -> String {
    let chart = ChartData::from_results(context.results);
    let query = encode_text(context.query);

    let counts = chart
        .by_category
        .iter()
        .map(|(category, count)| {
            format!(
                "<div class=\"count\">{}: <strong>{}</strong></div>",
                encode_text(category.label()),
                count
            )
        })
        .collect::<Vec<_>>()
        .join("");

    let synthesis = context
        .synthesis
        .map(|text| {
            format!(
                "<h2>AI Synthesis</h2>\n<div class=\"synthesis\">{}</div>\n",
                encode_text(text)
            )
        })
        .unwrap_or_default();

    let rows = context
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| result_row(i + 1, r))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>Market Intelligence Report: {query}</title>\n<style>{style}</style>\n</head>\n<body>\n\
<h1>Market Intelligence Report</h1>\n\
<div class=\"meta\">Query: <strong>{query}</strong> | Generated {generated} | {total} results</div>\n\
<div class=\"counts\">{counts}</div>\n\
{synthesis}\
<h2>Results</h2>\n\
<table>\n<thead><tr><th>#</th><th>Source</th><th>Title</th><th>Authors</th><th>Date</th><th>Categories</th></tr></thead>\n\
<tbody>\n{rows}\n</tbody>\n</table>\n</body>\n</html>\n",
        query = query,
        style = STYLE,
        generated = context.generated_at.format("%Y-%m-%d %H:%M UTC"),
        total = chart.total,
        counts = counts,
        synthesis = synthesis,
        rows = rows,
    )
}
