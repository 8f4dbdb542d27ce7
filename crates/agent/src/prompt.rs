//! Prompt assembly.
//!
//! Deterministic: identical inputs always produce identical prompts. No I/O,
//! no clock, no session state.

use atomia_config::PromptConfig;
use atomia_core::message::{Subject, Turn};

/// The built-in Atomia persona.
pub const DEFAULT_PREAMBLE: &str = "\
You are Atomia — an AI-powered academic mentor designed for IISER aspirants.
Your primary goal is to help students understand and master concepts in
Physics, Chemistry, Mathematics, and Biology (PCMB) for the IISER Aptitude Test (IAT).

💡 Approach Guidelines:
1. Give *step-by-step explanations* with clear reasoning and correct use of formulas.
2. Use *scientific accuracy* and proper terminology at an IISER-level difficulty.
3. Encourage learning through *concept clarity*, not just final answers.
4. Maintain a *calm, friendly, and motivating tone*.
5. If a question is ambiguous, politely ask for clarification.
6. Do NOT generate irrelevant or emotional content — stay academic and helpful.
7. Conclude each response with a short motivation like: “Keep learning — every step counts!”

🎯 Your objective:
To serve as a 24×7 AI mentor for IISER aspirants — making every concept understandable and inspiring.";

const CLOSING_INSTRUCTION: &str =
    "🧠 Provide a clear academic explanation following the Atomia approach.";

/// Builds the text sent to the provider for one exchange.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    preamble: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PREAMBLE)
    }
}

impl PromptAssembler {
    /// Leading and trailing blank lines of `preamble` are dropped.
    pub fn new(preamble: impl AsRef<str>) -> Self {
        Self {
            preamble: preamble.as_ref().trim_matches(['\n', '\r']).to_string(),
        }
    }

    /// Use the configured override, or the built-in persona.
    pub fn from_config(config: &PromptConfig) -> Self {
        match config.system_preamble_override.as_deref() {
            Some(text) if !text.trim().is_empty() => Self::new(text),
            _ => Self::default(),
        }
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Assemble the prompt.
    ///
    /// `history` is rendered one `ROLE: text` line per turn. The caller passes
    /// history that already ends with the current question, so the question
    /// shows up twice: once in the conversation, once under `USER QUESTION`.
    pub fn assemble(&self, subject: Option<Subject>, history: &[Turn], message: &str) -> String {
        let conversation = history
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = String::with_capacity(
            self.preamble.len() + conversation.len() + message.len() + 160,
        );
        prompt.push_str(&self.preamble);
        prompt.push_str("\n\n");

        if let Some(subject) = subject {
            prompt.push_str(&format!("Subject: {subject}\n\n"));
        }

        prompt.push_str("Recent Conversation:\n");
        prompt.push_str(&conversation);
        prompt.push_str("\n\nUSER QUESTION:\n");
        prompt.push_str(message);
        prompt.push_str("\n\n");
        prompt.push_str(CLOSING_INSTRUCTION);
        prompt.push('\n');
        prompt
    }
}
