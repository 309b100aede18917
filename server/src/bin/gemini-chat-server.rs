use anyhow::Context;
use clap::Parser;
use gemini_chat_core::{ChatConfig, ExchangeReducer, GeminiClient};
use gemini_chat_server::config::{AppConfig, DEFAULT_HTTP_ADDR};
use gemini_chat_server::http_server;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gemini-chat-server", about = "HTTP chat front end for the Gemini API")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini API key
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Gemini model to use
    #[arg(short = 'o', long)]
    model: Option<String>,

    /// Base URL of the Gemini API
    #[arg(long)]
    base_url: Option<String>,

    /// System prompt sent with every request
    #[arg(short, long)]
    system_prompt: Option<String>,

    /// HTTP server address
    #[arg(long, default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line args
    let args = Args::parse();

    let overrides = ChatConfig {
        api_key: args.api_key,
        model_name: args.model,
        base_url: args.base_url,
        system_prompt: args.system_prompt,
        ..ChatConfig::empty()
    };
    let chat_config = ChatConfig::load(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(chat_config.log_level())),
        )
        .init();

    info!("Starting gemini-chat-server");

    let config = AppConfig::new(args.http_addr, chat_config);

    // Initialize Gemini client
    let client = match GeminiClient::new(config.chat.clone()) {
        Ok(client) => {
            info!(model = config.chat.model_name(), "Initialized Gemini client");
            client
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Gemini client");
            return Err(anyhow::anyhow!("Failed to initialize Gemini client: {}", e));
        }
    };

    http_server::run_server(config, ExchangeReducer::new(client)).await?;

    info!("gemini-chat-server shutting down");
    Ok(())
}
