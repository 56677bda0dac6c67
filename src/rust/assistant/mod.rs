//! Health chat assistant backed by a hosted text-generation model.
//!
//! Every call is stateless: the assistant sees one utterance wrapped in a fixed
//! instruction, never the conversation so far. Failures never escape a
//! [`ChatSession`]; they become an inline assistant message instead.

mod gemini;
mod session;
mod transcript;

pub use gemini::{GeminiAssistant, API_KEY_ENV, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, MAX_ERROR_BODY_CHARS};
pub use session::{ChatSession, ERROR_PREFIX};
pub use transcript::{Message, Transcript};

/// Instruction that scopes every request to health topics.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful health assistant.\nOnly provide information related to diseases, symptoms, and health.";

/// Failures of a single assistant call.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant is not configured")]
    NotConfigured,
    #[error("cannot reach the assistant service at {0}")]
    Connection(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("assistant service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    ResponseParsing(String),
    #[error("request was blocked: {0}")]
    Blocked(String),
    #[error("assistant returned no text")]
    EmptyResponse,
}

/// A text-generation backend.
#[allow(async_fn_in_trait)]
pub trait Assistant {
    /// Generates a reply to a complete prompt.
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Wraps a user utterance in the health-only instruction.
pub fn build_prompt(user_input: &str) -> String {
    format!("{}\n\nUser question: {}\n", SYSTEM_INSTRUCTION, user_input)
}
