//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod model_list;
pub mod say;
pub mod session;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::auth::AuthManager;
use crate::cli::model_list::list_models;
use crate::cli::say::run_say;
use crate::cli::session::{prepare_session, report_configuration_error, SessionOptions};
use crate::core::config::{Config, ConfigKey};
use crate::ui::chat_loop::{run_chat, use_color, ChatLoop};

#[derive(Parser)]
#[command(name = "codeaide")]
#[command(about = "A terminal coding assistant backed by Groq-hosted models")]
#[command(
    long_about = "Codeaide is a line-oriented terminal chat that only answers coding questions. \
It can look up the current date and time on the model's request, and every reply is graded \
by a second model call.\n\n\
Authentication:\n\
  Use 'codeaide auth' to store a Groq API key in your system keyring.\n\n\
Environment Variables:\n\
  GROQ_API_KEY      Your Groq API key (takes precedence over the keyring)\n\
  GROQ_BASE_URL     Custom API base URL (optional, defaults to https://api.groq.com/openai/v1)\n\
  RUST_LOG          Diagnostic log filter\n\n\
Commands:\n\
  /help             Show available commands\n\
  /clear            Clear the conversation history\n\
  /model [id]       Show or switch the chat model\n\
  /models           List selectable models\n\
  /history          Show the conversation so far\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat, or list available models if no model specified
    #[arg(short = 'm', long, global = true, value_name = "MODEL", num_args = 0..=1, default_missing_value = "")]
    pub model: Option<String>,

    /// Write diagnostic logs to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Only read the API key from GROQ_API_KEY, never from the keyring
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single prompt and print the reply with its evaluation
    Say {
        /// Prompt text; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Store a Groq API key in the system keyring
    Auth,
    /// Remove the stored Groq API key
    Deauth,
    /// List selectable models
    Models,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    crate::logging::init(args.log.as_deref())?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            let auth_manager = AuthManager::new();
            if let Err(e) = auth_manager.interactive_deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Models => {
            list_models(&Config::load()?);
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let (Some(key), Some(value)) = (key, value) else {
                config.print_all();
                println!();
                println!("Keys: {}", key_names());
                return Ok(());
            };
            if let Err(e) = config.set_value(&key, &value) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {}", value.trim());
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset_value(&key) {
                eprintln!("❌ {e}");
                eprintln!("Keys: {}", key_names());
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Say { prompt } => run_say(prompt, args.model, args.env_only).await,
        Commands::Chat => match args.model.as_deref() {
            Some("") => {
                list_models(&Config::load()?);
                Ok(())
            }
            _ => start_chat(args.model, args.env_only).await,
        },
    }
}

async fn start_chat(model: Option<String>, env_only: bool) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let options = SessionOptions {
        model,
        env_only,
        interactive: true,
    };
    match prepare_session(&config, &options) {
        Ok((runner, session)) => run_chat(ChatLoop::new(runner, session, use_color())).await,
        Err(err) => {
            report_configuration_error(&err);
            std::process::exit(1);
        }
    }
}

fn key_names() -> String {
    ConfigKey::ALL
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
