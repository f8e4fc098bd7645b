//! # Domain Layer
//!
//! Core definitions, types, and traits that define the change-plan engine.
//! Independent of specific frameworks, serving as the contract for other layers.

pub mod config;
pub mod error;
pub mod plan;
pub mod traits;
