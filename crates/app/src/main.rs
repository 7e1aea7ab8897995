mod server;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use notes_rag_core::client::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVICE_URL};
use notes_rag_core::config::{DEFAULT_INDEX_DIR, DEFAULT_NOTES_DIR, DEFAULT_TOP_K};
use notes_rag_core::llm::{DEFAULT_APP_TITLE, DEFAULT_APP_URL, DEFAULT_OPENROUTER_BASE_URL};
use notes_rag_core::{
    answer_or_unavailable, ChunkingConfig, LlmSettings, RagApiClient, RagService, Settings,
    DEFAULT_EMBEDDING_MODEL, UNAVAILABLE_MESSAGE,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "notes-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the /reindex and /chat HTTP API.
    Serve(ServeArgs),
    /// Ask a running service to rebuild its index.
    Reindex(RemoteArgs),
    /// Ask a running service a question.
    Ask {
        #[command(flatten)]
        remote: RemoteArgs,
        /// Question to answer from the notes.
        question: String,
        /// Number of chunks to retrieve (1-20).
        #[arg(long)]
        top_k: Option<i64>,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Interface to bind.
    #[arg(long, env = "RAG_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, env = "RAG_PORT", default_value_t = 8000)]
    port: u16,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Args)]
struct SettingsArgs {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true)]
    openrouter_api_key: String,

    /// OpenRouter base URL
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_OPENROUTER_BASE_URL)]
    openrouter_base_url: String,

    /// Chat model name
    #[arg(long, env = "OPENROUTER_MODEL", default_value = "")]
    openrouter_model: String,

    /// Referer sent to OpenRouter
    #[arg(long, env = "OPENROUTER_APP_URL", default_value = DEFAULT_APP_URL)]
    openrouter_app_url: String,

    /// App title sent to OpenRouter
    #[arg(long, env = "OPENROUTER_APP_TITLE", default_value = DEFAULT_APP_TITLE)]
    openrouter_app_title: String,

    /// Folder with .md and .txt notes
    #[arg(long, env = "NOTES_DIR", default_value = DEFAULT_NOTES_DIR)]
    notes_dir: PathBuf,

    /// Folder where the vector index is persisted
    #[arg(long, env = "INDEX_DIR", default_value = DEFAULT_INDEX_DIR)]
    index_dir: PathBuf,

    /// Embedding model identifier
    #[arg(long, env = "EMBEDDINGS_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embeddings_model: String,

    /// Default number of chunks per question
    #[arg(long, env = "TOP_K_DEFAULT", default_value_t = DEFAULT_TOP_K)]
    top_k_default: i64,

    /// Chunk size in characters
    #[arg(long, env = "CHUNK_SIZE", default_value_t = 1_000)]
    chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, env = "CHUNK_OVERLAP", default_value_t = 200)]
    chunk_overlap: usize,

    /// Timeout for generation requests, e.g. "60s"
    #[arg(long, env = "LLM_TIMEOUT", default_value = DEFAULT_REQUEST_TIMEOUT)]
    llm_timeout: String,
}

impl SettingsArgs {
    fn into_settings(self) -> anyhow::Result<Settings> {
        let chunking = ChunkingConfig::new(self.chunk_size, self.chunk_overlap)?;
        let timeout = notes_rag_core::parse_timeout(&self.llm_timeout)?;
        let base = std::env::current_dir().context("reading current directory")?;

        Ok(Settings {
            llm: LlmSettings {
                api_key: self.openrouter_api_key,
                base_url: self.openrouter_base_url,
                model: self.openrouter_model,
                app_url: self.openrouter_app_url,
                app_title: self.openrouter_app_title,
                timeout,
            },
            notes_dir: self.notes_dir,
            index_dir: self.index_dir,
            embeddings_model: self.embeddings_model,
            top_k_default: self.top_k_default,
            chunking,
        }
        .with_base_dir(&base))
    }
}

#[derive(Args)]
struct RemoteArgs {
    /// Base URL of the notes service
    #[arg(long, env = "RAG_BASE_URL", default_value = DEFAULT_SERVICE_URL)]
    base_url: String,

    /// Request timeout, e.g. "60s"
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = DEFAULT_REQUEST_TIMEOUT)]
    timeout: String,
}

impl RemoteArgs {
    fn client(&self) -> anyhow::Result<RagApiClient> {
        Ok(RagApiClient::from_timeout_str(&self.base_url, &self.timeout)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let bind_addr = format!("{}:{}", args.host, args.port);
            let settings = args.settings.into_settings()?;
            info!(
                version = app_version,
                started_at = %Utc::now().to_rfc3339(),
                notes_dir = %settings.notes_dir.display(),
                index_dir = %settings.index_dir.display(),
                embeddings_model = %settings.embeddings_model,
                "notes-rag boot"
            );

            let service = RagService::from_settings(settings)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            server::run_server(Arc::new(service), &bind_addr).await?;
        }
        Command::Reindex(remote) => {
            let client = remote.client()?;
            match client.reindex().await {
                Ok(report) => println!(
                    "Notes indexed.\nFiles: {}\nChunks: {}",
                    report.indexed_files, report.indexed_chunks
                ),
                Err(error) => {
                    error!(%error, base_url = client.base_url(), "reindex failed");
                    println!("{UNAVAILABLE_MESSAGE}");
                }
            }
        }
        Command::Ask {
            remote,
            question,
            top_k,
        } => {
            let client = remote.client()?;
            println!("{}", answer_or_unavailable(client.chat(&question, top_k).await));
        }
    }

    Ok(())
}
