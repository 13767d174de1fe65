//! # librorec
//!
//! Interactive REPL for the book recommendation agent: type messages, get
//! recommendations, quit with "salir" or "exit". Conversation state is kept
//! in memory for the lifetime of the process.

use anyhow::Context;
use clap::Parser;
use dialogue_checkpoint::InMemoryCheckpointSaver;
use llm::{OpenAiClient, RemoteLlmConfig};
use recomendador::{catalog_tools, MemoryCatalog, Recommender};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "librorec")]
#[command(about = "Conversational book recommendation agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Model name sent to the chat endpoint
    #[arg(short, long, default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// API key (falls back to the OPENAI_API_KEY environment variable)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Conversation thread id (defaults to a fresh one per run)
    #[arg(short, long)]
    thread: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let config = RemoteLlmConfig::new(cli.api_key, cli.base_url, cli.model);
    let client = Arc::new(OpenAiClient::new(config).context("failed to build model client")?);

    let catalog = Arc::new(MemoryCatalog::with_sample_books());
    let tools = catalog_tools(catalog);
    let saver = Arc::new(InMemoryCheckpointSaver::new());

    let agent =
        Recommender::new(client, tools, saver).context("failed to build the agent graph")?;

    let thread_id = cli.thread.unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(thread_id, "conversation started");

    println!("Agente de recomendación de libros. Escribe \"salir\" para terminar.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("tú> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("salir") || text.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = agent
            .respond(&thread_id, text)
            .await
            .context("turn failed")?;
        println!("\nagente> {reply}\n");
    }

    println!("¡Hasta pronto!");
    Ok(())
}
