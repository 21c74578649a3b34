//! Configuration module for the chat translator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform config directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CaptureConfig, ClusterConfig, HotkeyConfig, OcrConfig, OutputConfig, OutputFormat,
    TranslatorConfig, TranslatorProvider,
};
