//! Google `gtx` translator.
//!
//! Uses the keyless endpoint browsers use:
//! `GET {base_url}/translate_a/single?client=gtx&sl=auto&tl=en&dt=t&q=…`.
//! The answer is a nested JSON array whose first element lists translated
//! sentence segments; those are concatenated in order.

use async_trait::async_trait;
use serde_json::Value;

use super::translator::{TranslationError, Translator};
use crate::config::TranslatorConfig;

/// [`Translator`] backed by Google's public `gtx` endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
    source_language: String,
}

impl GoogleTranslator {
    /// Build from application config.  Only `base_url`, `source_language`
    /// and `timeout_secs` are used.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self {
            client: super::http_client(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            source_language: config.source_language.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate_a/single", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        parse_gtx_response(&json)
    }
}

/// Concatenate the translated segments of a `gtx` response.
fn parse_gtx_response(json: &Value) -> Result<String, TranslationError> {
    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Parse("missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    let translated = translated.trim();
    if translated.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }
    Ok(translated.to_string())
}
