//! Bible Expert is a full-screen terminal assistant for studying the Bible
//! with Google's Gemini models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: chat sessions, the study collection, daily
//!   devotionals, persistence and the action/command loop that applies user
//!   input and background results.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`commands`] implements slash-command parsing and dispatch.
//! - [`api`] defines the Gemini request/response payloads and HTTP client.
//! - [`auth`] resolves the API key from the environment or system keyring.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which
//! resolves configuration and dispatches into [`ui::chat_loop`] or one of
//! the non-interactive subcommands.

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
