//! # Application Layer
//!
//! Orchestration of the change-plan flow: the generators that produce plan text, the
//! background fetch worker, the interactive session and the text renderers.

pub mod fetch;
pub mod generator;
pub mod render;
pub mod session;
