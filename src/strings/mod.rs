//! # Strings Module
//!
//! Centralizes user-facing strings, prompts, and log text.

pub mod logs;
pub mod messages;
pub mod prompts;
