//! Tesseract backend via `rusty-tesseract`.
//!
//! Word-level boxes from `image_to_data` become axis-aligned quads.  The
//! tesseract CLI must be installed and on `PATH`; start-up fails otherwise.

use image::{DynamicImage, RgbaImage};
use rusty_tesseract::{Args, Image};

use super::engine::{OcrError, RecognitionEngine, TextFragment};

/// Tesseract's page-segmentation level for single words.
const WORD_LEVEL: i32 = 5;

/// [`RecognitionEngine`] that shells out to the tesseract CLI.
pub struct TesseractEngine {
    args: Args,
    version: String,
}

impl std::fmt::Debug for TesseractEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TesseractEngine")
            .field("lang", &self.args.lang)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl TesseractEngine {
    /// Start the engine for `languages` (tesseract codes, e.g. `eng`, `rus`).
    ///
    /// Tesseract has no accelerated backend, so `accelerated == true` always
    /// fails with [`OcrError::AccelerationUnavailable`]; pair this with
    /// [`initialize_with_fallback`](super::initialize_with_fallback).
    pub fn initialize(languages: &[String], accelerated: bool) -> Result<Self, OcrError> {
        if accelerated {
            return Err(OcrError::AccelerationUnavailable(
                "tesseract runs on the CPU only".into(),
            ));
        }
        if languages.is_empty() {
            return Err(OcrError::Initialization("no OCR languages configured".into()));
        }

        let version = rusty_tesseract::get_tesseract_version()
            .map_err(|e| OcrError::Initialization(e.to_string()))?;

        let args = Args {
            lang: languages.join("+"),
            ..Args::default()
        };

        log::info!("ocr: tesseract {} with languages {}", version.trim(), args.lang);
        Ok(Self { args, version })
    }
}

impl RecognitionEngine for TesseractEngine {
    fn recognize(&self, frame: &RgbaImage) -> Result<Vec<TextFragment>, OcrError> {
        // Alpha only confuses binarisation.
        let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb))
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let output = rusty_tesseract::image_to_data(&image, &self.args)
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        Ok(output
            .data
            .iter()
            .filter_map(|row| {
                word_fragment(
                    row.level,
                    row.left,
                    row.top,
                    row.width,
                    row.height,
                    row.conf,
                    &row.text,
                )
            })
            .collect())
    }
}

/// Convert one `image_to_data` row into a fragment.
///
/// Non-word rows, blank words and rows tesseract marks with a negative
/// confidence are skipped.  Confidence is rescaled from 0–100 to 0–1.
fn word_fragment(
    level: i32,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    conf: f32,
    text: &str,
) -> Option<TextFragment> {
    if level != WORD_LEVEL || conf < 0.0 || text.trim().is_empty() {
        return None;
    }
    Some(TextFragment::from_box(
        left as f32,
        top as f32,
        width as f32,
        height as f32,
        text,
        (conf / 100.0).clamp(0.0, 1.0),
    ))
}
