use anyhow::{Context, Result};
use colored::*;
use gemini_chat_core::{ExchangeOutcome, ExchangeReducer, Turn, TurnStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::output::{print_history, print_notice, print_turn};

/// A line read at the interactive prompt
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    History,
    Message(&'a str),
}

pub fn parse_command(input: &str) -> Command<'_> {
    let input = input.trim();
    if input.is_empty() {
        Command::Empty
    } else if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        Command::Exit
    } else if input == "/history" {
        Command::History
    } else {
        Command::Message(input)
    }
}

fn start_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Waiting for Gemini...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

/// Runs one exchange behind a spinner, then shows the banner (if any) and the reply.
async fn exchange(
    reducer: &ExchangeReducer,
    store: &mut TurnStore,
    utterance: &str,
) -> Result<ExchangeOutcome> {
    let spinner = start_spinner()?;
    let outcome = reducer.handle_user_turn(store, utterance).await;
    spinner.finish_and_clear();

    debug!(state = %outcome.state, turns = store.len(), "Exchange finished");
    if let Some(notice) = &outcome.notice {
        print_notice(notice);
    }
    print_turn(&outcome.reply);
    Ok(outcome)
}

/// Runs a single query against a fresh session and displays the response
pub async fn run_single_query(prompt: String, reducer: &ExchangeReducer) -> Result<()> {
    info!("Running single query");

    let mut store = TurnStore::new();
    print_turn(&Turn::user(prompt.as_str()));
    exchange(reducer, &mut store, &prompt).await?;
    Ok(())
}

/// Runs an interactive chat session; the turn store lives until the loop ends
pub async fn run_interactive_chat(reducer: &ExchangeReducer) -> Result<()> {
    println!("Type 'exit' or 'quit' to end the session, '/history' to show the conversation.");
    println!();

    let mut store = TurnStore::new();

    loop {
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            // EOF
            println!();
            break;
        }

        match parse_command(&input) {
            Command::Empty => continue,
            Command::Exit => {
                println!("Exiting chat session.");
                break;
            }
            Command::History => print_history(&store),
            Command::Message(utterance) => {
                exchange(reducer, &mut store, utterance).await?;
            }
        }

        println!(); // Add spacing between interactions
    }

    info!(turns = store.len(), "Chat session ended");
    Ok(())
}
