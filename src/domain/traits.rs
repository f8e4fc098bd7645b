//! # Domain Traits
//!
//! Abstract interfaces for the pluggable parts of the engine.
//! Implementations live in the Application and Infrastructure layers.

use async_trait::async_trait;

use crate::domain::error::CoreResult;

/// Produces raw plan JSON from a natural-language instruction.
///
/// The returned text is decoded by the caller with [`crate::domain::plan::Plan::decode`];
/// generators never interpret it.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, instruction: &str) -> CoreResult<String>;

    /// Short label for logs and the status line.
    fn name(&self) -> &str;
}

/// Abstract interface for a chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion with a system directive and a user message.
    ///
    /// Missing credentials are `ServiceUnavailable`; transport and service failures are
    /// `RemoteError` carrying the provider's detail.
    async fn completion(&self, system: &str, user: &str) -> CoreResult<String>;
}
