use clap::Parser;
use gemini_chat_core::ChatConfig;
use std::path::PathBuf;

/// Terminal chat client for the Gemini API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The prompt to send
    #[arg(index = 1)] // Positional argument
    pub prompt: Option<String>,

    /// Enter interactive chat mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Path to the config file (defaults to ~/.config/gemini-chat/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gemini API key; an empty value is passed through for host-injected auth
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Gemini model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the Gemini API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// System prompt sent with every request
    #[arg(short, long)]
    pub system_prompt: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Flags as the top config layer.
    pub fn config_overrides(&self) -> ChatConfig {
        ChatConfig {
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
            ..ChatConfig::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_flag_is_kept() {
        let args = Args::parse_from(["gemini-chat", "--api-key", "", "hello"]);
        assert_eq!(args.prompt.as_deref(), Some("hello"));
        assert_eq!(args.config_overrides().api_key.as_deref(), Some(""));
    }

    #[test]
    fn unset_flags_do_not_override() {
        let args = Args::parse_from(["gemini-chat", "-i"]);
        assert!(args.interactive);
        assert_eq!(args.config_overrides(), ChatConfig::empty());
    }
}
