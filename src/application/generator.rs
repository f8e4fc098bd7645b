//! # Plan Generators
//!
//! The two interchangeable ways of turning an instruction into plan JSON:
//! - [`OfflineStub`]: deterministic, no I/O, always a single README create.
//! - [`RemoteGenerator`]: one chat completion with the fixed plan directive. The reply
//!   is passed through untouched; decoding is the caller's job.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::config::GeneratorConfig;
use crate::domain::error::CoreResult;
use crate::domain::plan::{Operation, Plan};
use crate::domain::traits::{LlmProvider, PlanGenerator};
use crate::infrastructure::llm::Client as LlmClient;
use crate::strings::prompts;

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineStub;

impl OfflineStub {
    /// The stub plan for `instruction`: one create whose content embeds it verbatim.
    pub fn plan(instruction: &str) -> Plan {
        Plan::new(
            vec![Operation::create(
                prompts::OFFLINE_TARGET,
                prompts::offline_readme(instruction),
            )],
            prompts::OFFLINE_NOTES,
        )
    }
}

#[async_trait]
impl PlanGenerator for OfflineStub {
    async fn generate(&self, instruction: &str) -> CoreResult<String> {
        Ok(Self::plan(instruction).encode())
    }

    fn name(&self) -> &str {
        "offline"
    }
}

pub struct RemoteGenerator {
    llm: Arc<dyn LlmProvider>,
    label: String,
}

impl RemoteGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, label: impl Into<String>) -> Self {
        Self {
            llm,
            label: label.into(),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let label = format!("{}:{}", config.provider, config.model);
        Self::new(Arc::new(LlmClient::new(config.clone())), label)
    }
}

#[async_trait]
impl PlanGenerator for RemoteGenerator {
    async fn generate(&self, instruction: &str) -> CoreResult<String> {
        self.llm.completion(prompts::PLAN_DIRECTIVE, instruction).await
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Pick the generator for the current mode.
pub fn generator_for(config: &GeneratorConfig, offline: bool) -> Arc<dyn PlanGenerator> {
    if offline {
        Arc::new(OfflineStub)
    } else {
        Arc::new(RemoteGenerator::from_config(config))
    }
}
