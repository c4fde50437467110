use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a line of the conversation.
#[derive(Deserialize, Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Renders `(text, sender)` pairs in the order they are produced.
///
/// Nothing is stored between questions; a sink only displays.
pub trait ConversationSink: Send + Sync {
    fn display(&self, text: &str, sender: Sender);
}
