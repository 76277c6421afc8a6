//! Terminal presentation: transcript rendering and the chat REPL.
//!
//! [`render`] turns transcript messages into tone-tagged lines; [`chat_loop`]
//! reads user input, dispatches slash commands through [`crate::commands`],
//! and runs turns through [`crate::core::turn::TurnRunner`].

pub mod chat_loop;
pub mod render;
