use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use marketai_core::{load_config, AssistantConfig, AssistantError, MarketAssistant};
use marketai_schema::{ChatTurn, Tool};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod render;

#[derive(Parser)]
#[command(name = "marketai", version, about = "MarketAI marketing assistant")]
struct Cli {
    #[arg(long, global = true, help = "YAML config file (defaults apply when omitted)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Also write daily-rotated logs to this directory")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate a marketing campaign")]
    Campaign {
        #[arg(long)]
        product: String,
        #[arg(long)]
        audience: String,
        #[arg(long)]
        platform: String,
        #[arg(long, help = "Print the raw JSON result")]
        json: bool,
    },
    #[command(about = "Create a sales pitch")]
    Pitch {
        #[arg(long)]
        product: String,
        #[arg(long)]
        persona: String,
        #[arg(long)]
        industry: String,
        #[arg(long, help = "Print the raw JSON result")]
        json: bool,
    },
    #[command(about = "Score a sales lead")]
    Lead {
        #[arg(long)]
        name: String,
        #[arg(long)]
        budget: String,
        #[arg(long)]
        need: String,
        #[arg(long, default_value = "")]
        urgency: String,
        #[arg(long, help = "Print the raw JSON result")]
        json: bool,
    },
    #[command(about = "Ask the knowledge assistant (interactive without a query)")]
    Chat {
        query: Option<String>,
        #[arg(long, help = "Print replies as JSON chat turns")]
        json: bool,
    },
    #[command(about = "Validate the config file")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref())?;

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = AssistantConfig::from_env();
            config.validate()?;
            config
        }
    };

    let assistant = MarketAssistant::from_config(&config);

    if let Commands::Validate = cli.command {
        println!(
            "Config valid. model={}, max_attempts={}, knowledge_snippets={}, api_key={}",
            assistant.model(),
            config.retry.max_attempts,
            assistant.knowledge().len(),
            if config.api_key().is_some() {
                "set"
            } else {
                "missing (demo mode)"
            }
        );
        return Ok(());
    }

    match cli.command {
        Commands::Campaign {
            product,
            audience,
            platform,
            json,
        } => {
            require(&[
                ("product", product.as_str()),
                ("audience", audience.as_str()),
                ("platform", platform.as_str()),
            ])?;
            let result = assistant
                .generate_campaign(&product, &audience, &platform)
                .await;
            emit(Tool::Campaign, result, json, render::campaign)?;
        }
        Commands::Pitch {
            product,
            persona,
            industry,
            json,
        } => {
            require(&[
                ("product", product.as_str()),
                ("persona", persona.as_str()),
                ("industry", industry.as_str()),
            ])?;
            let result = assistant.generate_pitch(&product, &persona, &industry).await;
            emit(Tool::Pitch, result, json, render::pitch)?;
        }
        Commands::Lead {
            name,
            budget,
            need,
            urgency,
            json,
        } => {
            require(&[
                ("name", name.as_str()),
                ("budget", budget.as_str()),
                ("need", need.as_str()),
            ])?;
            let result = assistant.score_lead(&name, &budget, &need, &urgency).await;
            emit(Tool::Lead, result, json, render::lead)?;
        }
        Commands::Chat { query, json } => match query {
            Some(query) => {
                require(&[("query", query.as_str())])?;
                let reply = chat_reply(&assistant, &query, &[]).await;
                print_turn(&ChatTurn::assistant(reply), json)?;
            }
            None => run_chat_loop(&assistant, json).await?,
        },
        Commands::Validate => {}
    }

    Ok(())
}

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, "marketai.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn require(fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            bail!("--{name} must not be empty");
        }
    }
    Ok(())
}

fn emit<T: Serialize>(
    tool: Tool,
    result: Result<T, AssistantError>,
    json: bool,
    human: fn(&T) -> String,
) -> Result<()> {
    match result {
        Ok(value) if json => println!("{}", serde_json::to_string_pretty(&value)?),
        Ok(value) => print!("{}", human(&value)),
        Err(err) => {
            tracing::error!(
                tool = %tool,
                status = ?err.inference_error().and_then(|e| e.status_code),
                error = %err,
                "tool call failed"
            );
            bail!(render::failure_message(tool, &err));
        }
    }
    Ok(())
}

/// Chat failures become the assistant's reply instead of ending the session.
async fn chat_reply(assistant: &MarketAssistant, query: &str, history: &[ChatTurn]) -> String {
    match assistant.ask_chatbot(query, history).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::error!(
                tool = %Tool::Chat,
                status = ?err.inference_error().and_then(|e| e.status_code),
                error = %err,
                "chat call failed"
            );
            render::failure_message(Tool::Chat, &err)
        }
    }
}

fn print_turn(turn: &ChatTurn, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(turn)?);
    } else {
        println!("{}", turn.text);
    }
    Ok(())
}

async fn run_chat_loop(assistant: &MarketAssistant, json: bool) -> Result<()> {
    let mut history = vec![ChatTurn::assistant(render::CHAT_GREETING)];
    print_turn(&history[0], json)?;
    if !json {
        println!("Type 'quit' to exit.");
        println!("---");
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input == "quit" || input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let reply = chat_reply(assistant, input, &history).await;
        history.push(ChatTurn::user(input));
        let turn = ChatTurn::assistant(reply);
        print_turn(&turn, json)?;
        history.push(turn);
    }

    Ok(())
}
