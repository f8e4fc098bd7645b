//! # Plan Studio
//!
//! Turns a natural-language instruction into a structured change plan (create, update or
//! delete files), lets the caller review it, then applies it inside a sandboxed project
//! directory.
//!
//! - Domain: plan model, errors, configuration and trait seams
//! - Infrastructure: path sandbox, plan applier, LLM providers, TUI log capture
//! - Application: generators, fetch worker, session, rendering
//! - Interface: CLI and terminal UI

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
