use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    index_documents, load_documents, DiskVectorStore, IngestError, IngestionOptions,
    LopdfExtractor, OpenAiEmbedder, OpenAiGenerator, QueryResult, QueryWorkflow, Retriever,
};
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory where the vector index is persisted
    #[arg(long, default_value = "qa_index")]
    index_dir: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = pdf_qa_core::DEFAULT_API_BASE)]
    api_base: String,

    /// Embedding model
    #[arg(long, default_value = pdf_qa_core::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Chat model used to synthesize answers
    #[arg(long, default_value = pdf_qa_core::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = pdf_qa_core::DEFAULT_TOP_K)]
    top_k: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk, embed, and index every pdf in a folder.
    Build {
        /// Folder containing the pdf files (not searched recursively).
        #[arg(long)]
        folder: String,
    },
    /// Ask a single question against the persisted index.
    Ask {
        /// The question to answer
        #[arg(long)]
        question: String,
    },
    /// Interactive question-answering session.
    Chat,
}

type CliWorkflow = QueryWorkflow<OpenAiEmbedder, DiskVectorStore, OpenAiGenerator>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
        anyhow::anyhow!(
            "OPENAI_API_KEY is not set; export your OpenAI API key before running pdf-qa"
        )
    })?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    match &cli.command {
        Command::Build { folder } => build_index(&cli, &api_key, folder).await?,
        Command::Ask { question } => {
            let workflow = open_workflow(&cli, &api_key).await?;
            match workflow.process_question(question).await {
                Ok(result) => display_result(&result),
                Err(error) => anyhow::bail!("{error}"),
            }
        }
        Command::Chat => {
            let workflow = open_workflow(&cli, &api_key).await?;
            interactive_loop(&workflow).await?;
        }
    }

    Ok(())
}

async fn build_index(cli: &Cli, api_key: &str, folder: &str) -> anyhow::Result<()> {
    let report = load_documents(Path::new(folder), &LopdfExtractor).map_err(|error| {
        match remediation(&error) {
            Some(hint) => anyhow::anyhow!("{error} ({hint})"),
            None => anyhow::anyhow!(error),
        }
    })?;

    if !report.skipped_files.is_empty() {
        warn!(
            "skipped_files={} for folder={}",
            report.skipped_files.len(),
            folder
        );
        for skipped in &report.skipped_files {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
        }
    }

    info!(
        folder = %folder,
        document_count = report.documents.len(),
        "extracted documents"
    );

    let embedder =
        OpenAiEmbedder::new(api_key, &cli.api_base)?.with_model(&cli.embedding_model);
    let index = DiskVectorStore::create(Path::new(&cli.index_dir))?;

    let summary = index_documents(
        &report.documents,
        &IngestionOptions::default(),
        &embedder,
        &index,
    )
    .await
    .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    println!(
        "{} chunks from {} documents indexed at {}",
        summary.chunks,
        summary.documents,
        summary.built_at.to_rfc3339()
    );

    Ok(())
}

fn remediation(error: &IngestError) -> Option<&'static str> {
    match error {
        IngestError::NoInputFolder(_) => Some("create the folder and copy your pdf files into it"),
        IngestError::NoDocumentsFound(_) => Some("add at least one .pdf file to the folder"),
        IngestError::EmptyCorpus => {
            Some("none of the pdfs contained extractable text; try different files")
        }
        _ => None,
    }
}

async fn open_workflow(cli: &Cli, api_key: &str) -> anyhow::Result<CliWorkflow> {
    let index = DiskVectorStore::open(Path::new(&cli.index_dir))
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "system not initialized: no index found under '{}'; run `pdf-qa build --folder <documents>` first",
                cli.index_dir
            )
        })?;

    let embedder =
        OpenAiEmbedder::new(api_key, &cli.api_base)?.with_model(&cli.embedding_model);
    let generator = OpenAiGenerator::new(api_key, &cli.api_base)?.with_model(&cli.chat_model);
    let retriever = Retriever::new(embedder, index).with_top_k(cli.top_k);

    Ok(QueryWorkflow::new(retriever, generator))
}

enum ReplInput {
    Quit,
    Empty,
    Question(String),
}

fn classify_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }
    if ["quit", "exit", "q"]
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return ReplInput::Quit;
    }
    ReplInput::Question(trimmed.to_string())
}

/// Question loop: quit tokens or end of input end the session; a failed
/// question is reported and the loop keeps accepting further questions.
async fn interactive_loop(workflow: &CliWorkflow) -> anyhow::Result<()> {
    let stdin = io::stdin();

    loop {
        print!("\nYour question: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        match classify_input(&line) {
            ReplInput::Quit => break,
            ReplInput::Empty => println!("Please enter a question."),
            ReplInput::Question(question) => match workflow.process_question(&question).await {
                Ok(result) => display_result(&result),
                Err(error) => println!("Error: {error}"),
            },
        }
    }

    Ok(())
}

fn display_result(result: &QueryResult) {
    let rule = "-".repeat(60);
    println!("\n{rule}");
    println!("ANSWER:");
    println!("{rule}");
    println!("{}", result.answer);
    println!("\nConfidence: {}", result.confidence);
    println!("Sources Used: {} document chunks", result.num_sources);
    println!("Files Referenced: {}", result.source_files.join(", "));
    println!("{rule}");
}
