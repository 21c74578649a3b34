//! Screen-region chat translator.
//!
//! Captures a fixed chat area, runs OCR on it, rebuilds chat lines from the
//! scattered text fragments, drops noise and translates each remaining line.

pub mod capture;
pub mod config;
pub mod hotkey;
pub mod ocr;
pub mod pipeline;
pub mod text;
pub mod translate;
