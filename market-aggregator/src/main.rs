use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use market_aggregator::database;
use market_aggregator::{
    apply_filters, market_impact_score, AdvancedFilterOptions, AppConfig, BooleanOperator,
    ChartData, DocumentStatus, DocumentStore, ExportFormat, Fetcher, GatewayCompletionModel,
    InsightCategory, MarketAggregator, SearchOptions, SearchResult, SearchStore, SourceKind,
    SourceSelection, Synthesizer, DEFAULT_MAX_RESULTS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Market intelligence across research, patents, trials and news
#[derive(Parser)]
#[command(name = "market-intel")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every enabled source for a keyword
    Search(SearchArgs),

    /// Saved searches
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Uploaded documents
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Search keywords
    query: String,

    /// Maximum results per source
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Sources to query (academic, patent, clinical, preprint, news); all when omitted
    #[arg(long, value_delimiter = ',')]
    sources: Vec<SourceKind>,

    /// Ask the AI model for an executive synthesis
    #[arg(long)]
    synthesize: bool,

    /// Ask the AI model to comment on the chart data
    #[arg(long)]
    charts: bool,

    /// Save the search and its results
    #[arg(long)]
    save: bool,

    /// Export the displayed results
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// How --term values combine: AND, OR or NOT
    #[arg(long, default_value = "AND")]
    operator: BooleanOperator,

    /// Term matched against title and abstract
    #[arg(long = "term")]
    terms: Vec<String>,

    /// Minimum market impact score (0-100)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_impact: u8,

    /// Keep only these insight categories (by label)
    #[arg(long = "category")]
    categories: Vec<InsightCategory>,

    /// Keep only these sources in the displayed list
    #[arg(long = "only-source")]
    only_sources: Vec<SourceKind>,
}

impl FilterArgs {
    fn to_options(&self) -> AdvancedFilterOptions {
        AdvancedFilterOptions {
            date_from: self.from,
            date_to: self.to,
            boolean_operator: self.operator,
            terms: self.terms.clone(),
            min_market_impact: self.min_impact,
            categories: self.categories.iter().copied().collect(),
            sources: self.only_sources.iter().copied().collect(),
        }
    }
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved searches, newest first
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one saved search
    Show { id: Uuid },
    /// Delete a saved search
    Delete { id: Uuid },
    /// Export a saved search
    Export {
        id: Uuid,
        #[arg(short, long, value_enum)]
        format: ExportFormat,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    /// Copy a file into document storage
    Upload { path: PathBuf },
    /// List uploaded documents
    List,
    /// Delete an uploaded document
    Delete { id: Uuid },
    /// Ask a question about uploaded documents
    Chat {
        question: String,
        /// Restrict to these documents; all text documents when omitted
        #[arg(long = "document")]
        documents: Vec<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = AppConfig::from_env();

    match cli.command {
        Commands::Search(args) => run_search(&config, args).await,
        Commands::Saved { action } => run_saved(&config, action).await,
        Commands::Docs { action } => run_docs(&config, action).await,
    }
}

fn synthesizer(config: &AppConfig, fetcher: Fetcher) -> Synthesizer {
    let model = GatewayCompletionModel::new(fetcher, config.ai.clone());
    Synthesizer::new(Arc::new(model), &config.ai)
}

async fn search_store(config: &AppConfig) -> Result<SearchStore> {
    let pool = database::connect(&config.database_url).await?;
    let store = SearchStore::new(pool);
    store.setup_schema().await?;
    Ok(store)
}

async fn document_store(config: &AppConfig) -> Result<DocumentStore> {
    let pool = database::connect(&config.database_url).await?;
    let store = DocumentStore::new(pool, config.storage_dir.clone());
    store.setup_schema().await?;
    Ok(store)
}

async fn run_search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let fetcher = Fetcher::new(config.fetch.clone())?;
    let aggregator = MarketAggregator::with_default_sources(fetcher.clone(), &config.providers);

    let sources = if args.sources.is_empty() {
        SourceSelection::default()
    } else {
        SourceSelection::only(&args.sources)
    };
    let options = SearchOptions::new(args.query.clone())
        .with_max_results(args.max_results)
        .with_sources(sources);

    let report = aggregator.search_with_report(&options).await?;
    if report.all_failed() {
        bail!("Search failed: no source returned results");
    }
    for source in report.failed_sources() {
        warn!("{} failed and contributed no results", source.display_name());
    }

    let now = Utc::now();
    let displayed = apply_filters(&report.results, &args.filters.to_options(), now);
    print_results(&displayed, now);
    println!("\n{}", ChartData::from_results(&displayed).summary());

    let ai = synthesizer(config, fetcher);
    let mut synthesis = None;
    if args.synthesize {
        match ai.synthesize(&options.query, &displayed).await {
            Ok(text) => {
                println!("\n{}", text);
                synthesis = Some(text);
            }
            Err(e) => {
                error!("Synthesis failed: {}", e);
                eprintln!("{}", e.user_message());
            }
        }
    }
    if args.charts {
        match ai.analyze_charts(&options.query, &displayed).await {
            Ok(text) => println!("\n{}", text),
            Err(e) => {
                error!("Chart analysis failed: {}", e);
                eprintln!("{}", e.user_message());
            }
        }
    }

    if args.save {
        // The results above stay on screen whatever happens here.
        let saved = match search_store(config).await {
            Ok(store) => store
                .save_search(&options, &report.results, synthesis.as_deref())
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        match saved {
            Ok(saved) => println!("\nSaved search {}", saved.id),
            Err(e) => {
                error!("Failed to save search: {:#}", e);
                eprintln!("Failed to save search");
            }
        }
    }

    if let Some(format) = args.export {
        let path = write_export(
            format,
            &options.query,
            &displayed,
            synthesis.as_deref(),
            &args.output,
        )
        .await?;
        println!("Exported {}", path.display());
    }

    Ok(())
}

async fn write_export(
    format: ExportFormat,
    query: &str,
    results: &[SearchResult],
    synthesis: Option<&str>,
    dir: &Path,
) -> Result<PathBuf> {
    let body = format.render(query, results, synthesis, Utc::now())?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format.file_name(query));
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} export to {}", format, path.display());
    Ok(path)
}

fn print_results(results: &[SearchResult], now: chrono::DateTime<Utc>) {
    println!("{} results", results.len());
    for (i, r) in results.iter().enumerate() {
        let categories = r
            .insight_categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>3}. [{}] {} ({})",
            i + 1,
            r.source.display_name(),
            r.title,
            r.date.as_deref().unwrap_or(market_aggregator::dates::UNKNOWN_DATE)
        );
        println!("     {} | impact {} | {}", categories, market_impact_score(r, now), r.url);
    }
}

async fn run_saved(config: &AppConfig, action: SavedAction) -> Result<()> {
    let store = search_store(config).await?;

    match action {
        SavedAction::List { limit } => {
            let searches = store.list_searches(limit).await?;
            if searches.is_empty() {
                println!("No saved searches");
            }
            for saved in searches {
                println!(
                    "{}  {}  '{}'  {} results",
                    saved.id,
                    saved.created_at.format("%Y-%m-%d %H:%M"),
                    saved.query,
                    saved.results.len()
                );
            }
        }
        SavedAction::Show { id } => {
            let saved = store.get_search(id).await?;
            println!("'{}' saved {}", saved.query, saved.created_at.format("%Y-%m-%d %H:%M"));
            print_results(&saved.results, Utc::now());
            if let Some(synthesis) = &saved.synthesis {
                println!("\n{}", synthesis);
            }
        }
        SavedAction::Delete { id } => {
            store.delete_search(id).await?;
            println!("Deleted {}", id);
        }
        SavedAction::Export { id, format, output } => {
            let saved = store.get_search(id).await?;
            let path = write_export(
                format,
                &saved.query,
                &saved.results,
                saved.synthesis.as_deref(),
                &output,
            )
            .await?;
            println!("Exported {}", path.display());
        }
    }

    Ok(())
}

async fn run_docs(config: &AppConfig, action: DocsAction) -> Result<()> {
    let store = document_store(config).await?;

    match action {
        DocsAction::Upload { path } => {
            let document = store.upload(&path).await?;
            println!("Uploaded {} as {} ({})", document.filename, document.id, document.mime_type);
        }
        DocsAction::List => {
            for document in store.list().await? {
                println!(
                    "{}  {}  {} bytes  {}  {}",
                    document.id,
                    document.filename,
                    document.size_bytes,
                    document.mime_type,
                    document.status.as_str()
                );
            }
        }
        DocsAction::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted {}", id);
        }
        DocsAction::Chat { question, documents } => {
            let candidates = if documents.is_empty() {
                store.list().await?
            } else {
                let mut picked = Vec::with_capacity(documents.len());
                for id in documents {
                    picked.push(store.get(id).await?);
                }
                picked
            };

            let mut loaded = Vec::new();
            for document in candidates {
                match store.read_text(&document).await {
                    Ok(text) => {
                        store.set_status(document.id, DocumentStatus::Processed).await?;
                        loaded.push((document, text));
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", document.filename, e);
                        store.set_status(document.id, DocumentStatus::Failed).await?;
                    }
                }
            }

            let fetcher = Fetcher::new(config.fetch.clone())?;
            match synthesizer(config, fetcher).chat_with_documents(&question, &loaded).await {
                Ok(answer) => println!("{}", answer),
                Err(e) => bail!(e.user_message()),
            }
        }
    }

    Ok(())
}
