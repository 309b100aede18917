use anyhow::Context;
use clap::Parser;
use colored::*;
use gemini_chat_core::{ChatConfig, ExchangeReducer, GeminiClient};
use tracing::{error, info};

mod app;
mod cli;
mod logging;
mod output;

use crate::cli::Args;
use crate::logging::init_logging;
use crate::output::{print_banner, print_usage_instructions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Defaults, then config file, then environment (.env included), then flags
    let config = ChatConfig::load(args.config.as_deref(), &args.config_overrides())
        .context("Failed to load configuration")?;

    init_logging(config.log_level(), args.verbose);

    if args.prompt.is_none() && !args.interactive {
        print_usage_instructions();
        return Ok(());
    }

    if config.api_key.is_none() {
        error!("No API key configured");
        eprintln!(
            "{}",
            "No API key configured. Set GEMINI_API_KEY, pass --api-key, or add api_key to the config file."
                .red()
        );
    }
    let client = GeminiClient::new(config).context("Failed to initialize Gemini client")?;
    info!(model = client.config().model_name(), "Gemini client ready");

    let reducer = ExchangeReducer::new(client);

    print_banner();
    if args.interactive {
        crate::app::run_interactive_chat(&reducer).await?;
    } else if let Some(prompt) = args.prompt {
        crate::app::run_single_query(prompt, &reducer).await?;
    }

    Ok(())
}
