use crate::config::AiConfig;
use crate::fetcher::Fetcher;
use crate::types::{AggregatorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A chat-completion backend.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run one completion and return the assistant text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completion model behind a hosted AI gateway.
pub struct GatewayCompletionModel {
    fetcher: Fetcher,
    config: AiConfig,
}

impl GatewayCompletionModel {
    pub fn new(fetcher: Fetcher, config: AiConfig) -> Self {
        Self { fetcher, config }
    }
}

// 429 and 402 carry their own messages; everything else is a generic failure.
fn classify_gateway_error(error: AggregatorError) -> AggregatorError {
    match error {
        AggregatorError::HttpStatus { status: 429, .. } => AggregatorError::AiRateLimited,
        AggregatorError::HttpStatus { status: 402, .. } => AggregatorError::AiQuotaExceeded,
        AggregatorError::AiFailed(reason) => AggregatorError::AiFailed(reason),
        other => AggregatorError::AiFailed(other.to_string()),
    }
}

#[async_trait]
impl CompletionModel for GatewayCompletionModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("AI gateway call skipped: AI_API_KEY is not set");
            return Err(AggregatorError::AiFailed("AI_API_KEY is not set".to_string()));
        };

        debug!(
            "Sending {} messages to {} ({})",
            request.messages.len(),
            self.config.endpoint,
            request.model
        );

        let http_request = self
            .fetcher
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(request);

        let response: CompletionResponse = self
            .fetcher
            .fetch_json(http_request)
            .await
            .map_err(|e| {
                warn!("AI gateway call failed: {}", e);
                classify_gateway_error(e)
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AggregatorError::AiFailed("No content in AI response".to_string()))?;

        info!("AI gateway returned {} characters", content.len());
        Ok(content)
    }
}

/// Canned completion model for tests and offline runs.
pub struct MockCompletionModel {
    reply: std::result::Result<String, MockFailure>,
    seen: std::sync::Mutex<Vec<CompletionRequest>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    QuotaExceeded,
    Failed,
}

impl MockCompletionModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: MockFailure) -> Self {
        Self {
            reply: Err(failure),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(MockFailure::RateLimited) => Err(AggregatorError::AiRateLimited),
            Err(MockFailure::QuotaExceeded) => Err(AggregatorError::AiQuotaExceeded),
            Err(MockFailure::Failed) => Err(AggregatorError::AiFailed("mock failure".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_gateway_statuses() {
        let status = |code| AggregatorError::HttpStatus {
            status: code,
            url: "http://gateway".to_string(),
        };
        assert!(matches!(classify_gateway_error(status(429)), AggregatorError::AiRateLimited));
        assert!(matches!(classify_gateway_error(status(402)), AggregatorError::AiQuotaExceeded));
        assert!(matches!(classify_gateway_error(status(500)), AggregatorError::AiFailed(_)));
        assert!(matches!(
            classify_gateway_error(AggregatorError::Parse("bad".into())),
            AggregatorError::AiFailed(_)
        ));
    }

    #[test]
    fn request_serializes_openai_shape() {
        let request = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 100);
    }

    #[tokio::test]
    async fn mock_records_requests() {
        let model = MockCompletionModel::replying("ok");
        let request = CompletionRequest {
            model: "mock".to_string(),
            messages: vec![ChatMessage::user("question")],
            temperature: 0.0,
            max_tokens: 10,
        };
        assert_eq!(model.complete(&request).await.unwrap(), "ok");
        assert_eq!(model.requests().len(), 1);

        let failing = MockCompletionModel::failing(MockFailure::QuotaExceeded);
        let err = failing.complete(&request).await.unwrap_err();
        assert!(err.user_message().contains("add credits"));
    }
}
