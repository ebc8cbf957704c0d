//! Terminal UI.
//!
//! [`chat_loop`] runs the interactive session: it feeds key presses and
//! stream fragments into [`crate::core::app`] as actions and redraws with
//! [`renderer`]. [`views`] builds the transcript, study and devotional
//! content from [`markdown`] and [`wrap`]; [`theme`] holds the two palettes.

pub mod chat_loop;
pub mod config_error;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod views;
pub mod wrap;
