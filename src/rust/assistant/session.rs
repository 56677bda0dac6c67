use log::{info, warn};

use super::transcript::{Message, Transcript};
use super::{build_prompt, Assistant, AssistantError};

/// Prefix of assistant messages that report a failed call.
pub const ERROR_PREFIX: &str = "Error: ";

/// The chat feature of a session.
///
/// Holds the assistant when one is configured. Calls never fail from the
/// caller's point of view: errors are turned into assistant messages.
#[derive(Debug)]
pub struct ChatSession<A> {
    assistant: Option<A>,
}

impl<A: Assistant> ChatSession<A> {
    pub fn new(assistant: Option<A>) -> Self {
        Self { assistant }
    }

    pub fn is_configured(&self) -> bool {
        self.assistant.is_some()
    }

    /// Asks the assistant once and returns its reply or an inline error message.
    pub async fn reply(&self, utterance: &str) -> Message {
        let result = match &self.assistant {
            Some(assistant) => assistant.generate(&build_prompt(utterance)).await,
            None => Err(AssistantError::NotConfigured),
        };
        match result {
            Ok(text) => {
                info!("Assistant replied with {} characters", text.len());
                Message::assistant(text)
            }
            Err(e) => {
                warn!("Assistant call failed: {}", e);
                Message::assistant(format!("{}{}", ERROR_PREFIX, e))
            }
        }
    }

    /// Appends the utterance and the assistant's answer to `transcript`.
    ///
    /// Blank input leaves the transcript untouched.
    pub async fn submit(&self, transcript: Transcript, utterance: &str) -> Transcript {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return transcript;
        }
        let reply = self.reply(utterance).await;
        transcript.with_message(Message::user(utterance)).with_message(reply)
    }
}
