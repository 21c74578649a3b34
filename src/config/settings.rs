//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::capture::CaptureRegion;
use crate::hotkey::parse_key;
use crate::text::DEFAULT_LINE_THRESHOLD;

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Where to capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// User-selected region.  `None` means the default chat area of the
    /// primary monitor is computed at start-up.
    pub region: Option<CaptureRegion>,
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Capture hotkey and its polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key name (e.g. `"F9"`).
    pub capture_key: String,
    /// How often the key state is sampled, in milliseconds.
    pub poll_interval_ms: u64,
    /// Pause after a release before the key can fire again, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            capture_key: "F9".into(),
            poll_interval_ms: 50,
            cooldown_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// ClusterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Vertical distance (pixels) under which fragments share a line.
    pub line_threshold: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            line_threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl ClusterConfig {
    /// Replace a non-finite or non-positive threshold with the default.
    fn sanitize(&mut self) {
        if !(self.line_threshold.is_finite() && self.line_threshold > 0.0) {
            log::warn!(
                "config: invalid line_threshold {}; using {DEFAULT_LINE_THRESHOLD}",
                self.line_threshold
            );
            self.line_threshold = DEFAULT_LINE_THRESHOLD;
        }
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Settings for the recognition engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language codes, combined with `+`.
    pub languages: Vec<String>,
    /// Try the accelerated mode first; fall back to CPU once on failure.
    pub prefer_acceleration: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: vec!["eng".into(), "rus".into()],
            prefer_acceleration: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslatorProvider / TranslatorConfig
// ---------------------------------------------------------------------------

/// Selects which translation backend handles each message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TranslatorProvider {
    /// Google's public `translate_a/single?client=gtx` endpoint.
    GoogleGtx,
    /// Any OpenAI-compatible REST API (OpenAI, Groq, Ollama, LM Studio …).
    OpenAiCompatible,
}

impl Default for TranslatorProvider {
    fn default() -> Self {
        Self::GoogleGtx
    }
}

/// Settings for the translation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub provider: TranslatorProvider,
    /// Language every message is translated into (ISO-639-1).
    pub target_language: String,
    /// Source language hint; `"auto"` lets the backend detect it.
    pub source_language: String,
    /// Base URL of the API endpoint.
    ///
    /// - GoogleGtx default: `https://translate.googleapis.com`
    /// - Ollama (OpenAI mode): `http://localhost:11434`
    pub base_url: String,
    /// API key, `None` for endpoints without authentication.
    pub api_key: Option<String>,
    /// Model identifier for OpenAI-compatible backends.
    pub model: String,
    /// Sampling temperature for OpenAI-compatible backends.
    pub temperature: f32,
    /// Per-request timeout in seconds.  `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: TranslatorProvider::default(),
            target_language: "en".into(),
            source_language: "auto".into(),
            base_url: "https://translate.googleapis.com".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.2,
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// How result batches are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable lines through the `log` facade.
    Log,
    /// One JSON object per record on stdout.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Log
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// Sections missing from the file fall back to their defaults.
///
/// ```rust,no_run
/// use chat_translator::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert_eq!(config.hotkey.poll_interval_ms, 50);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub hotkey: HotkeyConfig,
    pub clustering: ClusterConfig,
    pub ocr: OcrConfig,
    pub translator: TranslatorConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.clustering.sanitize();
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record a user-selected region (validated) or clear it with `None`.
    ///
    /// Only touches this struct; call [`save`](Self::save) to persist.
    pub fn set_capture_region(&mut self, region: Option<CaptureRegion>) -> Result<()> {
        if let Some(r) = &region {
            r.validate()?;
        }
        self.capture.region = region;
        Ok(())
    }

    /// Switch the capture hotkey to `name` after checking that it is a known
    /// key.  Returns the parsed key; call [`save`](Self::save) to persist.
    pub fn set_capture_key(&mut self, name: &str) -> Result<rdev::Key> {
        let Some(key) = parse_key(name) else {
            bail!("unknown key name {name:?}");
        };
        self.hotkey.capture_key = name.trim().to_string();
        Ok(key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.capture.region, loaded.capture.region);
        assert_eq!(original.hotkey.capture_key, loaded.hotkey.capture_key);
        assert_eq!(original.hotkey.poll_interval_ms, loaded.hotkey.poll_interval_ms);
        assert_eq!(original.hotkey.cooldown_ms, loaded.hotkey.cooldown_ms);
        assert_eq!(
            original.clustering.line_threshold,
            loaded.clustering.line_threshold
        );
        assert_eq!(original.ocr.languages, loaded.ocr.languages);
        assert_eq!(original.translator.provider, loaded.translator.provider);
        assert_eq!(original.translator.timeout_secs, loaded.translator.timeout_secs);
        assert_eq!(original.output.format, loaded.output.format);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert!(config.capture.region.is_none());
        assert_eq!(config.hotkey.capture_key, "F9");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.hotkey.capture_key, "F9");
        assert_eq!(cfg.hotkey.poll_interval_ms, 50);
        assert_eq!(cfg.hotkey.cooldown_ms, 200);
        assert_eq!(cfg.clustering.line_threshold, 15.0);
        assert_eq!(cfg.ocr.languages, vec!["eng", "rus"]);
        assert!(cfg.ocr.prefer_acceleration);
        assert_eq!(cfg.translator.provider, TranslatorProvider::GoogleGtx);
        assert_eq!(cfg.translator.target_language, "en");
        assert!(cfg.translator.timeout_secs.is_none());
        assert_eq!(cfg.output.format, OutputFormat::Log);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[hotkey]\ncapture_key = \"F10\"\npoll_interval_ms = 20\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.hotkey.capture_key, "F10");
        assert_eq!(cfg.hotkey.poll_interval_ms, 20);
        assert_eq!(cfg.hotkey.cooldown_ms, 200);
        assert_eq!(cfg.translator.target_language, "en");
        assert!(cfg.capture.region.is_none());
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.set_capture_region(Some(CaptureRegion::new(10, 700, 400, 200).unwrap()))
            .unwrap();
        cfg.translator.provider = TranslatorProvider::OpenAiCompatible;
        cfg.translator.base_url = "http://localhost:11434".into();
        cfg.translator.api_key = Some("sk-test".into());
        cfg.translator.timeout_secs = Some(30);
        cfg.clustering.line_threshold = 12.5;
        cfg.output.format = OutputFormat::Json;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(
            loaded.capture.region,
            Some(CaptureRegion {
                left: 10,
                top: 700,
                width: 400,
                height: 200
            })
        );
        assert_eq!(loaded.translator.provider, TranslatorProvider::OpenAiCompatible);
        assert_eq!(loaded.translator.api_key, Some("sk-test".into()));
        assert_eq!(loaded.translator.timeout_secs, Some(30));
        assert_eq!(loaded.clustering.line_threshold, 12.5);
        assert_eq!(loaded.output.format, OutputFormat::Json);
    }

    #[test]
    fn set_capture_region_rejects_small_selection() {
        let mut cfg = AppConfig::default();
        let tiny = CaptureRegion {
            left: 0,
            top: 0,
            width: 20,
            height: 300,
        };
        assert!(cfg.set_capture_region(Some(tiny)).is_err());
        assert!(cfg.capture.region.is_none());

        cfg.set_capture_region(Some(CaptureRegion::new(0, 0, 60, 60).unwrap()))
            .unwrap();
        cfg.set_capture_region(None).unwrap();
        assert!(cfg.capture.region.is_none());
    }

    #[test]
    fn set_capture_key_accepts_known_names_only() {
        let mut cfg = AppConfig::default();
        assert!(cfg.set_capture_key("Ctrl+Q").is_err());
        assert!(cfg.set_capture_key("").is_err());
        assert_eq!(cfg.hotkey.capture_key, "F9");

        assert_eq!(cfg.set_capture_key(" f10 ").unwrap(), rdev::Key::F10);
        assert_eq!(cfg.hotkey.capture_key, "f10");
    }

    #[test]
    fn invalid_line_threshold_falls_back_to_default() {
        let dir = tempdir().expect("temp dir");
        for value in ["nan", "-5.0", "0.0", "inf"] {
            let path = dir.path().join("threshold.toml");
            let body = format!("[clustering]\nline_threshold = {value}\n");
            std::fs::write(&path, body).unwrap();
            let cfg = AppConfig::load_from(&path).expect("load");
            assert_eq!(cfg.clustering.line_threshold, DEFAULT_LINE_THRESHOLD, "{value}");
        }
    }

    #[test]
    fn loaded_nan_threshold_still_merges_nearby_fragments() {
        use crate::ocr::TextFragment;
        use crate::text::LineClusterer;

        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nan.toml");
        std::fs::write(&path, "[clustering]\nline_threshold = nan\n").unwrap();
        let cfg = AppConfig::load_from(&path).expect("load");

        let fragments: Vec<TextFragment> = [
            (0.0, 100.0, "a"),
            (30.0, 102.0, "b"),
            (60.0, 108.0, "c"),
            (0.0, 140.0, "d"),
        ]
        .into_iter()
        .map(|(x, y, text)| TextFragment::from_box(x, y - 5.0, 20.0, 10.0, text, 0.9))
        .collect();
        let lines = LineClusterer::new(cfg.clustering.line_threshold).cluster(&fragments);
        assert_eq!(lines, vec!["a b c", "d"]);
    }

    #[test]
    fn valid_line_threshold_is_kept() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("threshold.toml");
        std::fs::write(&path, "[clustering]\nline_threshold = 8.5\n").unwrap();
        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.clustering.line_threshold, 8.5);
    }
}
