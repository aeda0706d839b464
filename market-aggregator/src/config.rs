use crate::types::FetchConfig;
use std::env;
use std::path::PathBuf;

pub const SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";
pub const OPENALEX_URL: &str = "https://api.openalex.org/works";
pub const CROSSREF_URL: &str = "https://api.crossref.org/works";
pub const EPO_AUTH_URL: &str = "https://ops.epo.org/3.2/auth/accesstoken";
pub const EPO_SEARCH_URL: &str = "https://ops.epo.org/3.2/rest-services/published-data/search/biblio";
pub const CLINICAL_TRIALS_URL: &str = "https://clinicaltrials.gov/api/v2/studies";
pub const ARXIV_URL: &str = "https://export.arxiv.org/api/query";
pub const NEWS_URL: &str = "https://news.google.com/rss/search";
pub const AI_GATEWAY_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const AI_MODEL: &str = "gpt-4o-mini";

/// Endpoints and credentials for the external data providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub semantic_scholar_url: String,
    pub semantic_scholar_api_key: Option<String>,
    pub openalex_url: String,
    pub crossref_url: String,
    pub contact_email: Option<String>,
    pub epo_auth_url: String,
    pub epo_search_url: String,
    pub epo_consumer_key: Option<String>,
    pub epo_consumer_secret: Option<String>,
    pub clinical_trials_url: String,
    pub arxiv_url: String,
    pub news_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            semantic_scholar_url: SEMANTIC_SCHOLAR_URL.to_string(),
            semantic_scholar_api_key: None,
            openalex_url: OPENALEX_URL.to_string(),
            crossref_url: CROSSREF_URL.to_string(),
            contact_email: None,
            epo_auth_url: EPO_AUTH_URL.to_string(),
            epo_search_url: EPO_SEARCH_URL.to_string(),
            epo_consumer_key: None,
            epo_consumer_secret: None,
            clinical_trials_url: CLINICAL_TRIALS_URL.to_string(),
            arxiv_url: ARXIV_URL.to_string(),
            news_url: NEWS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: AI_GATEWAY_URL.to_string(),
            api_key: None,
            model: AI_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub storage_dir: PathBuf,
    pub fetch: FetchConfig,
    pub providers: ProviderConfig,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://market_intel.db?mode=rwc".to_string(),
            storage_dir: PathBuf::from("documents"),
            fetch: FetchConfig::default(),
            providers: ProviderConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let mut fetch = defaults.fetch;
        if let Some(seconds) = env_var("HTTP_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            fetch.timeout_seconds = seconds;
        }
        if let Some(agent) = env_var("HTTP_USER_AGENT") {
            fetch.user_agent = agent;
        }

        let base = defaults.providers;
        let providers = ProviderConfig {
            semantic_scholar_url: env_var("SEMANTIC_SCHOLAR_URL")
                .unwrap_or(base.semantic_scholar_url),
            semantic_scholar_api_key: env_var("SEMANTIC_SCHOLAR_API_KEY"),
            openalex_url: env_var("OPENALEX_URL").unwrap_or(base.openalex_url),
            crossref_url: env_var("CROSSREF_URL").unwrap_or(base.crossref_url),
            contact_email: env_var("CONTACT_EMAIL"),
            epo_auth_url: env_var("EPO_AUTH_URL").unwrap_or(base.epo_auth_url),
            epo_search_url: env_var("EPO_SEARCH_URL").unwrap_or(base.epo_search_url),
            epo_consumer_key: env_var("EPO_CONSUMER_KEY"),
            epo_consumer_secret: env_var("EPO_CONSUMER_SECRET"),
            clinical_trials_url: env_var("CLINICAL_TRIALS_URL").unwrap_or(base.clinical_trials_url),
            arxiv_url: env_var("ARXIV_URL").unwrap_or(base.arxiv_url),
            news_url: env_var("NEWS_URL").unwrap_or(base.news_url),
        };

        let mut ai = defaults.ai;
        if let Some(endpoint) = env_var("AI_GATEWAY_URL") {
            ai.endpoint = endpoint;
        }
        if let Some(model) = env_var("AI_MODEL") {
            ai.model = model;
        }
        ai.api_key = env_var("AI_API_KEY");

        Self {
            database_url: env_var("DATABASE_URL").unwrap_or(defaults.database_url),
            storage_dir: env_var("MARKET_INTEL_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            fetch,
            providers,
            ai,
        }
    }
}

// Empty values count as unset.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
