//! Recharging plan generation.
//!
//! Plans come from a chat model behind an OpenAI-compatible API. The
//! planning loop only sees the [`PlanGenerator`] trait: it hands over the
//! conversation so far and gets back the raw answer text, which it parses
//! and verifies itself.

mod client;
mod error;
mod prompt;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::GeneratedPlan;

pub use client::{ChatClient, ChatConfig};
pub use error::GeneratorError;
pub use prompt::{PlanPrompt, SYSTEM_PROMPT, initial_conversation, response_format, retry_feedback};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a generation conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Source of candidate plans.
pub trait PlanGenerator: Send + Sync {
    /// Answer the conversation with a JSON plan, as text.
    fn generate(
        &self,
        conversation: &[ChatMessage],
    ) -> impl Future<Output = Result<String, GeneratorError>> + Send;
}

/// Parse a generator answer into a plan.
///
/// Models without structured-output support tend to wrap the JSON in a
/// Markdown code fence; the fence is stripped before parsing.
pub fn parse_plan(answer: &str) -> Result<GeneratedPlan, serde_json::Error> {
    serde_json::from_str(strip_code_fence(answer))
}

fn strip_code_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string ("json") on the opening fence line.
    match body.split_once('\n') {
        Some((info, content)) if !info.trim_start().starts_with('{') => content.trim(),
        _ => body.trim(),
    }
}
