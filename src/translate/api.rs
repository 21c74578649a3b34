//! OpenAI-compatible chat-completions translator.
//!
//! `ApiTranslator` calls any `/v1/chat/completions` endpoint: Ollama
//! (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.  All connection details
//! come from [`TranslatorConfig`]; nothing is hardcoded.

use async_trait::async_trait;

use super::translator::{TranslationError, Translator};
use crate::config::TranslatorConfig;

/// Build the `(system, user)` message pair for one chat line.
fn build_chat(text: &str, target_language: &str) -> (String, String) {
    let system = format!(
        "You translate short in-game chat messages into the language with \
         ISO-639-1 code \"{target_language}\". Keep player names, slang and \
         emoticons as they are. Reply with the translation only, no quotes \
         and no commentary."
    );
    (system, text.to_string())
}

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl ApiTranslator {
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self {
            client: super::http_client(config.timeout_secs),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let (system_msg, user_msg) = build_chat(text, target_language);

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  256
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        let translated = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(TranslationError::EmptyResponse)?
            .trim()
            .to_string();

        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorProvider;

    fn make_config(api_key: Option<&str>) -> TranslatorConfig {
        TranslatorConfig {
            provider: TranslatorProvider::OpenAiCompatible,
            base_url: "http://localhost:11434".into(),
            api_key: api_key.map(|s| s.to_string()),
            ..TranslatorConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _translator = ApiTranslator::from_config(&make_config(None));
        let _translator = ApiTranslator::from_config(&make_config(Some("")));
    }

    #[test]
    fn prompt_names_target_language_and_passes_text_through() {
        let (system, user) = build_chat("gg wp", "de");
        assert!(system.contains("\"de\""));
        assert_eq!(user, "gg wp");
    }

    /// Nothing listens on port 1, so the request fails fast with a
    /// transport error instead of hanging.
    #[tokio::test]
    async fn unreachable_endpoint_is_a_recoverable_error() {
        let config = TranslatorConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_secs: Some(2),
            ..make_config(None)
        };
        let translator = ApiTranslator::from_config(&config);
        let result = translator.translate("hola", "en").await;
        assert!(matches!(
            result,
            Err(TranslationError::Request(_)) | Err(TranslationError::Timeout)
        ));
    }
}
