//! Pure text stages of the pipeline: line clustering and noise filtering.
//!
//! ```text
//! Vec<TextFragment> ──LineClusterer──▶ Vec<String> ──filter_messages──▶ Vec<NumberedMessage>
//!   (OCR order)                         (top→bottom)                      (1-based labels)
//! ```
//!
//! Neither stage can fail: malformed fragments are dropped and logged.

pub mod cluster;
pub mod filter;

pub use cluster::{
    anchor, Anchor, LineClusterer, LineGroup, MalformedFragment, DEFAULT_LINE_THRESHOLD,
};
pub use filter::{filter_messages, is_noise, NumberedMessage, MIN_MESSAGE_CHARS, STOPLIST};
