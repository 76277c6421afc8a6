//! Codeaide is a terminal coding assistant that talks to Groq's
//! OpenAI-compatible chat completions API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation session, message serialization, the
//!   completion driver, the tool registry, reply evaluation, and the per-turn
//!   state machine in [`core::turn`].
//! - [`ui`] renders transcripts and runs the line-oriented chat loop.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`auth`] resolves the API key from the environment, the system keyring,
//!   or an interactive prompt.
//! - [`api`] defines the chat completion payloads sent over the wire.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
