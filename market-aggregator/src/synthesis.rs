use crate::charts::ChartData;
use crate::config::AiConfig;
use crate::llm_adapter::{ChatMessage, CompletionModel, CompletionRequest};
use crate::types::{Result, SearchResult, UploadedDocument};
use crate::utils::text::truncate;
use std::sync::Arc;
use tracing::info;

pub const SYNTHESIS_RECORD_LIMIT: usize = 50;
pub const CHART_RECORD_LIMIT: usize = 20;
const ABSTRACT_PREVIEW_CHARS: usize = 300;
const DOCUMENT_PREVIEW_CHARS: usize = 8000;

const SYNTHESIS_INSTRUCTIONS: &str = "You are a senior market-intelligence analyst. \
Write an executive synthesis of the research results below for a business audience. \
Use markdown with these sections:
## Executive Summary
Three to five sentences on the overall state of the field.
## Key Trends
Bullet points naming concrete developments, citing result numbers in brackets.
## Competitive Landscape
Companies, institutions and applicants that appear repeatedly.
## Patent & IP Activity
What the patent records suggest about where protection is being sought.
## Clinical & Regulatory Signals
Only if clinical trial records are present.
## Opportunities & Risks
Bullet points.
## Recommended Next Steps
Three concrete actions.
Base every statement on the results provided. Say so when the evidence is thin.";

const CHART_INSTRUCTIONS: &str = "You are a data analyst explaining dashboard charts to an executive. \
Using the category, source and year counts plus the sample records, write a short markdown commentary with:
## Distribution Insights
What the category and source mix says about the topic.
## Temporal Patterns
Growth or decline visible in the yearly counts.
## Notable Signals
Two to four specific records worth a closer look, cited by number.
Keep it under 400 words.";

const DOCUMENT_CHAT_INSTRUCTIONS: &str = "You answer questions about the user's uploaded documents. \
Use only the document excerpts provided. Cite the document file name for each claim. \
If the answer is not in the documents, say that it is not covered.";

/// Builds prompts over a result set and hands them to a completion model.
pub struct Synthesizer {
    model: Arc<dyn CompletionModel>,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
}

impl Synthesizer {
    pub fn new(model: Arc<dyn CompletionModel>, config: &AiConfig) -> Self {
        Self {
            model,
            model_id: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request(&self, system: &str, user: String) -> CompletionRequest {
        CompletionRequest {
            model: self.model_id.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Executive synthesis over the leading records.
    pub async fn synthesize(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        let used = results.len().min(SYNTHESIS_RECORD_LIMIT);
        info!("Synthesizing {} of {} results for '{}'", used, results.len(), query);

        let prompt = format!(
            "Search query: \"{}\"\nTotal results: {}\n\nResults:\n{}",
            query,
            results.len(),
            context_lines(results, SYNTHESIS_RECORD_LIMIT)
        );
        self.model.complete(&self.request(SYNTHESIS_INSTRUCTIONS, prompt)).await
    }

    /// Commentary on the chart counts with a sample of records.
    pub async fn analyze_charts(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        let chart = ChartData::from_results(results);
        info!("Analyzing charts for '{}' ({} results)", query, results.len());

        let prompt = format!(
            "Search query: \"{}\"\n\nChart data:\n{}\n\nSample records:\n{}",
            query,
            chart.summary(),
            context_lines(results, CHART_RECORD_LIMIT)
        );
        self.model.complete(&self.request(CHART_INSTRUCTIONS, prompt)).await
    }

    /// Answer a question from the text of uploaded documents.
    pub async fn chat_with_documents(
        &self,
        question: &str,
        documents: &[(UploadedDocument, String)],
    ) -> Result<String> {
        info!("Answering a question over {} documents", documents.len());

        let excerpts = if documents.is_empty() {
            "(no documents uploaded)".to_string()
        } else {
            documents
                .iter()
                .map(|(doc, text)| {
                    format!("### {}\n{}", doc.filename, truncate(text, DOCUMENT_PREVIEW_CHARS))
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let prompt = format!("Documents:\n\n{}\n\nQuestion: {}", excerpts, question);
        self.model.complete(&self.request(DOCUMENT_CHAT_INSTRUCTIONS, prompt)).await
    }
}

/// `1. [PATENT] Title (2024-01-01) - abstract...`, one line per record.
pub fn context_lines(results: &[SearchResult], limit: usize) -> String {
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| {
            let mut line = format!(
                "{}. [{}] {} ({})",
                i + 1,
                r.source.as_str().to_uppercase(),
                r.title,
                r.date.as_deref().unwrap_or(crate::dates::UNKNOWN_DATE)
            );
            if let Some(abstract_text) = &r.abstract_text {
                line.push_str(" - ");
                line.push_str(&truncate(abstract_text, ABSTRACT_PREVIEW_CHARS));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
