//! # Infrastructure Layer
//!
//! Handles interactions with the filesystem and external services.
//! Implements the traits defined in the Domain layer (e.g., LlmProvider).

pub mod applier;
pub mod llm;
pub mod sandbox;
pub mod tui;
