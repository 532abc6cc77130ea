use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kbase_mcp::corpus::CorpusFormat;
use kbase_mcp::tools::{format_preview, format_search_results, format_stats};
use kbase_mcp::tracing::LogFormat;
use kbase_mcp::{Assistant, Config, KnowledgeServer};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "kbase-mcp", version)]
#[command(about = "Answer questions from a Q&A knowledge base", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/kbase-mcp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus file, overriding config and KBASE_CORPUS
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Corpus format (default: by file extension)
    #[arg(long, global = true, value_enum)]
    format: Option<CorpusFormat>,

    /// Answer from the knowledge base only, without calling the model
    #[arg(long, global = true)]
    no_generate: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the knowledge base over MCP on stdio
    Serve,
    /// Print ranked matches for a query
    Search {
        query: String,
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Answer a question
    Ask {
        question: String,
        /// Earlier conversation, one message per line
        #[arg(long)]
        thread: Option<String>,
    },
    /// Show corpus statistics
    Stats,
    /// List the first indexed Q&A pairs
    Preview {
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },
}

impl Cli {
    fn config(&self) -> kbase_mcp::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(corpus) = &self.corpus {
            config.corpus.path = Some(corpus.clone());
        }
        if let Some(format) = self.format {
            config.corpus.format = format;
        }
        if self.no_generate {
            config.generator.enabled = false;
        }
        if let Command::Search { k, threshold, .. } = &self.command {
            if let Some(k) = k {
                config.retrieval.k = *k;
            }
            if let Some(threshold) = threshold {
                config.retrieval.threshold = *threshold;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    kbase_mcp::tracing::init_with(cli.log_format);

    let config = cli.config()?;
    let assistant = Arc::new(Assistant::from_config(&config)?);
    let kb = assistant.knowledge_base().clone();

    match cli.command {
        Command::Serve => {
            // Refuse to start with an unusable corpus.
            kb.load()
                .await
                .with_context(|| format!("Failed to load corpus {}", kb.source_description()))?;

            tracing::info!("Starting kbase-mcp MCP server");
            let server = KnowledgeServer::new(assistant);
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;

            service.waiting().await?;
        }
        Command::Search { query, .. } => {
            let index = kb.index().await?;
            let settings = assistant.settings();
            let results = index.search(&query, settings.k, settings.threshold);
            if results.is_empty() {
                println!("No results found for '{}'.", query);
            } else {
                print!("{}", format_search_results(&results, &query));
            }
        }
        Command::Ask { question, thread } => {
            println!("{}", assistant.answer(&question, thread.as_deref()).await);
        }
        Command::Stats => {
            let index = kb.index().await?;
            print!("{}", format_stats(&kb.source_description(), &index));
        }
        Command::Preview { count } => {
            let index = kb.index().await?;
            print!("{}", format_preview(index.preview(count)));
        }
    }

    Ok(())
}
