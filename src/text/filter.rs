//! Noise filter for clustered chat lines.

use serde::Serialize;

/// Lines containing any of these (case-insensitive) are game notices, not
/// player chat.
pub const STOPLIST: [&str; 2] = ["(broadcast)", "(system)"];

/// Shortest trimmed line, in characters, that is worth translating.
pub const MIN_MESSAGE_CHARS: usize = 2;

/// A line that survived filtering, labelled with its 1-based position in the
/// clustered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedMessage {
    pub index: usize,
    pub text: String,
}

/// `true` when `message` should be dropped.
pub fn is_noise(message: &str) -> bool {
    let trimmed = message.trim();
    if trimmed.chars().count() < MIN_MESSAGE_CHARS {
        return true;
    }
    let lower = trimmed.to_lowercase();
    STOPLIST.iter().any(|term| lower.contains(term))
}

/// Drop noise lines, keeping order and original numbering.
pub fn filter_messages<S: AsRef<str>>(messages: &[S]) -> Vec<NumberedMessage> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| !is_noise(m.as_ref()))
        .map(|(i, m)| NumberedMessage {
            index: i + 1,
            text: m.as_ref().to_string(),
        })
        .collect()
}
