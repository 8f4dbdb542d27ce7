//! The Atomia request pipeline.
//!
//! One chat exchange runs as:
//!
//! 1. **Resolve** the session id (fresh UUID when absent)
//! 2. **Record** the user turn, trimming history to capacity
//! 3. **Assemble** the prompt: preamble, subject, recent turns, question
//! 4. **Generate** through the [`GenerationClient`](atomia_providers::GenerationClient)
//! 5. **Record** the assistant turn and return the updated context
//!
//! Exchanges for the same session run one at a time, in arrival order.

pub mod chat;
pub mod prompt;

pub use chat::{CONFIDENCE, ChatOutcome, ChatRequest, ChatService};
pub use prompt::{DEFAULT_PREAMBLE, PromptAssembler};
