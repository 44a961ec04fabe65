//! Command-line interface for the portfolio assistant

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use portfolio_agents::build_agents;
use portfolio_core::{Agent, Context};
use portfolio_ingest::{
    ChartAnalyzer, Ingestor, PartitionClient, SummaryRecord, TableExtractor, load_summaries,
};
use portfolio_llm::LLMProvider;
use portfolio_llm::providers::{OllamaProvider, OpenAIProvider};
use portfolio_rag::{OpenAIEmbeddingProvider, RagChain, RagService};
use portfolio_utils::Settings;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "portfolio")]
#[command(about = "Multi-agent financial assistant over your portfolio PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract summary records from a PDF
    Ingest {
        /// Path to the PDF to ingest
        pdf: PathBuf,
        /// Output file for the summary records
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build (or rebuild) the vector index from summary records
    Index {
        /// Summaries file to index
        #[arg(long)]
        summaries: Option<PathBuf>,
        /// Drop the persisted index before rebuilding
        #[arg(long)]
        fresh: bool,
    },
    /// Ask the supervisor a single question
    Ask {
        /// The question to answer
        question: String,
    },
    /// Interactive chat with the supervisor
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portfolio_utils::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Ingest { pdf, out } => {
            let out = out.unwrap_or_else(|| settings.summaries_path.clone());
            let records = run_ingest(&settings, &pdf, &out).await?;
            println!("Saved {} records to {}", records.len(), out.display());
            print_records(&records);
        }
        Command::Index { summaries, fresh } => {
            let path = summaries.unwrap_or_else(|| settings.summaries_path.clone());
            let records = load_summaries(&path)
                .with_context(|| format!("cannot load summaries from {}", path.display()))?;

            let service = build_rag_service(&settings)?;
            if fresh {
                service.clear_index()?;
            }
            service.rebuild(&records).await?;
            println!(
                "Indexed {} records into {}",
                records.len(),
                settings.index_dir.display()
            );
        }
        Command::Ask { question } => {
            let supervisor = build_supervisor(&settings).await?;
            let mut context = Context::new();
            let answer = supervisor.process(question, &mut context).await?;
            println!("{answer}");
        }
        Command::Chat => {
            let supervisor = build_supervisor(&settings).await?;
            run_chat(&supervisor).await?;
        }
    }

    Ok(())
}

/// Wire up the three-stage ingestor and run it over one PDF
async fn run_ingest(
    settings: &Settings,
    pdf: &PathBuf,
    out: &PathBuf,
) -> anyhow::Result<Vec<SummaryRecord>> {
    let extraction: Arc<dyn LLMProvider> =
        Arc::new(OllamaProvider::from_env().context("ollama provider")?);
    let vision: Arc<dyn LLMProvider> =
        Arc::new(OpenAIProvider::from_env().context("openai provider")?);

    let ingestor = Ingestor::new(
        TableExtractor::new(extraction, &settings.extraction_model),
        PartitionClient::from_env(),
        ChartAnalyzer::new(vision, &settings.chat_model),
    );

    info!(pdf = %pdf.display(), "ingesting");
    let records = ingestor.ingest(pdf, out).await?;
    Ok(records)
}

/// Build the RAG service from settings
fn build_rag_service(settings: &Settings) -> anyhow::Result<Arc<RagService>> {
    let chat: Arc<dyn LLMProvider> =
        Arc::new(OpenAIProvider::from_env().context("openai provider")?);
    let embedder = Arc::new(
        OpenAIEmbeddingProvider::from_env()
            .context("openai embeddings")?
            .with_model(&settings.embedding_model),
    );

    Ok(Arc::new(RagService::new(
        RagChain::new(chat, &settings.chat_model),
        embedder,
        settings.index_dir.clone(),
        settings.top_k,
    )))
}

/// Build the supervisor, loading the index when summaries exist
async fn build_supervisor(settings: &Settings) -> anyhow::Result<impl Agent> {
    let service = build_rag_service(settings)?;
    if settings.summaries_path.is_file() {
        let records = load_summaries(&settings.summaries_path)?;
        service.rebuild(&records).await?;
    } else {
        info!(
            path = %settings.summaries_path.display(),
            "no summaries file; portfolio questions will prompt for an upload"
        );
    }

    let provider: Arc<dyn LLMProvider> =
        Arc::new(OpenAIProvider::from_env().context("openai provider")?);
    let stack = build_agents(
        provider,
        service,
        &settings.chat_model,
        Utc::now().date_naive(),
    )?;
    Ok(stack.supervisor)
}

/// Read-eval loop against the supervisor
async fn run_chat(supervisor: &impl Agent) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("Ask a portfolio question ('exit' to quit).");
    loop {
        print!("→ ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let mut context = Context::new();
        match supervisor.process(query.to_string(), &mut context).await {
            Ok(answer) => println!("{answer}\n"),
            Err(err) => eprintln!("error: {err}\n"),
        }
    }
    Ok(())
}

/// Render ingested records as a table on stdout
fn print_records(records: &[SummaryRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Summary"]);

    for record in records {
        match record {
            SummaryRecord::Text { raw, .. } => {
                table.add_row(vec!["text", &truncate(raw, 60)]);
            }
            SummaryRecord::Table { summary, .. } => {
                table.add_row(vec!["table".to_string(), summary.join("\n")]);
            }
            SummaryRecord::PurchaseEntry { summary, .. } => {
                table.add_row(vec!["purchase_entry", summary]);
            }
            SummaryRecord::Chart { extracted, .. } => {
                table.add_row(vec!["chart".to_string(), truncate(&extracted.to_string(), 60)]);
            }
        }
    }

    println!("{table}");
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}…")
    }
}
