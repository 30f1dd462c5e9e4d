use std::path::PathBuf;

use super::types::{OcrEngine, OcrPageResult};
#[cfg(feature = "ocr")]
use super::guard_parser;
use super::ExtractionError;

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct BundledTesseract {
    tessdata_dir: PathBuf,
    lang: String,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    /// Initialize with a tessdata directory. English only by default.
    pub fn new(tessdata_dir: &std::path::Path) -> Result<Self, ExtractionError> {
        if !tessdata_dir.join("eng.traineddata").exists() {
            return Err(ExtractionError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }

        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            lang: "eng".to_string(),
        })
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        let tessdata_str = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?;

        guard_parser(ExtractionError::OcrProcessing, || {
            let tess = tesseract::Tesseract::new(Some(tessdata_str), Some(&self.lang))
                .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

            let mut tess = tess
                .set_image_from_mem(image_bytes)
                .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

            let text = tess
                .get_text()
                .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

            let confidence = tess.mean_text_conf().max(0) as f32 / 100.0;

            Ok(OcrPageResult { text, confidence })
        })
    }
}

/// Stand-in when Tesseract is not compiled in or has no language data.
/// Every image reads as blank, which the pipeline treats as an empty query.
pub struct UnavailableOcrEngine;

impl OcrEngine for UnavailableOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        tracing::warn!("OCR requested but no engine is available");
        Ok(OcrPageResult {
            text: String::new(),
            confidence: 0.0,
        })
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
    pub confidence: f32,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError> {
        Ok(OcrPageResult {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }
}

/// Build the OCR engine, respecting feature flags.
pub fn build_ocr_engine() -> Box<dyn OcrEngine + Send + Sync> {
    #[cfg(feature = "ocr")]
    {
        match find_tessdata_dir() {
            Some(tessdata) => match BundledTesseract::new(&tessdata) {
                Ok(engine) => {
                    tracing::info!(tessdata = %tessdata.display(), "Tesseract OCR initialized");
                    return Box::new(engine);
                }
                Err(e) => tracing::warn!(error = %e, "Tesseract OCR unavailable"),
            },
            None => tracing::warn!(
                "Tesseract data not found. Set TESSDATA_PREFIX or install tesseract-ocr-eng"
            ),
        }
    }

    tracing::info!("Image OCR unavailable; uploaded images will yield no text");
    Box::new(UnavailableOcrEngine)
}

/// Locate tessdata directory from environment or system paths.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    let from_env = std::env::var("TESSDATA_PREFIX").ok().map(PathBuf::from);

    let candidates = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ];

    from_env
        .into_iter()
        .chain(candidates.iter().map(PathBuf::from))
        .find(|p| p.join("eng.traineddata").exists())
}
