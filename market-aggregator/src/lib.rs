pub mod aggregator;
pub mod categorizer;
pub mod charts;
pub mod config;
pub mod database;
pub mod dates;
pub mod documents;
pub mod export;
pub mod fetcher;
pub mod filters;
pub mod llm_adapter;
pub mod parser;
pub mod search_store;
pub mod sources;
pub mod synthesis;
pub mod traits;
pub mod types;
pub mod utils;

pub use aggregator::MarketAggregator;
pub use categorizer::categorize_result;
pub use charts::ChartData;
pub use config::{AiConfig, AppConfig, ProviderConfig};
pub use documents::DocumentStore;
pub use export::ExportFormat;
pub use fetcher::Fetcher;
pub use filters::{apply_filters, market_impact_score};
pub use llm_adapter::{CompletionModel, GatewayCompletionModel, MockCompletionModel};
pub use parser::FeedParser;
pub use search_store::SearchStore;
pub use synthesis::Synthesizer;
pub use traits::SourceAdapter;
pub use types::*;
