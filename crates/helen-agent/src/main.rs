use std::io::{BufRead, Write as _};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use helen_agent::config::AgentConfig;
use helen_agent::generation::OpenAiGenerator;
use helen_agent::orchestrator::{Orchestrator, TurnInput};
use helen_engine::{EngineConfig, Message};

/// Interactive Helen session against an OpenAI-compatible endpoint.
#[derive(Parser, Debug)]
#[command(name = "helen-agent", about = "ADHD crisis-support conversation loop")]
struct Args {
    /// Chat-completions base URL (overrides HELEN_LLM_URL).
    #[arg(long)]
    url: Option<String>,

    /// Model name (overrides HELEN_LLM_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Seed for validation-phrase selection.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Session identifier used in logs.
    #[arg(long, default_value = "local")]
    session: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = AgentConfig::default();
    if let Some(url) = args.url {
        config.url = url;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    info!(url = %config.url, model = %config.model, "helen-agent starting");

    let generator = OpenAiGenerator::new(config)?;
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), args.seed);

    let mut messages: Vec<Message> = Vec::new();
    let mut deescalation = None;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        messages.push(Message::user(line, Utc::now()));
        let outcome = orchestrator
            .process_turn(TurnInput {
                session_id: args.session.clone(),
                messages: messages.clone(),
                previous_activity: None,
                deescalation: deescalation.take(),
                now: Utc::now(),
            })
            .await;

        println!("{}", serde_json::to_string_pretty(&outcome.response)?);
        messages.push(Message::agent(
            outcome.response.response_text.clone(),
            Utc::now(),
        ));
        deescalation = outcome.deescalation;
    }

    Ok(())
}
