//! # Interface Layer
//!
//! Entry points for users: the command line and the interactive terminal UI.

pub mod commands;
pub mod tui;
