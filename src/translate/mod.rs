//! Translation module: one call per surviving chat line.
//!
//! This module provides:
//! * [`Translator`]: async trait implemented by all backends.
//! * [`GoogleTranslator`]: keyless Google `gtx` endpoint (default).
//! * [`ApiTranslator`]: any OpenAI-compatible chat-completions endpoint.
//! * [`TranslationError`]: per-message, always recoverable.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use chat_translator::config::AppConfig;
//! use chat_translator::translate::build_translator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let translator = build_translator(&config.translator);
//!     let english = translator.translate("привет", "en").await.unwrap();
//!     println!("{english}");
//! }
//! ```

pub mod api;
pub mod google;
pub mod translator;

use std::sync::Arc;
use std::time::Duration;

pub use api::ApiTranslator;
pub use google::GoogleTranslator;
pub use translator::{TranslationError, Translator};

use crate::config::{TranslatorConfig, TranslatorProvider};

/// Construct the backend selected in `config`.
pub fn build_translator(config: &TranslatorConfig) -> Arc<dyn Translator> {
    match config.provider {
        TranslatorProvider::GoogleGtx => Arc::new(GoogleTranslator::from_config(config)),
        TranslatorProvider::OpenAiCompatible => Arc::new(ApiTranslator::from_config(config)),
    }
}

/// HTTP client shared by the backends.  No timeout unless one is configured.
fn http_client(timeout_secs: Option<u64>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_else(|e| {
        log::warn!("translate: falling back to default HTTP client ({e})");
        reqwest::Client::new()
    })
}
