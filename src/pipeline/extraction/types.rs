use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::pipeline::import::ArtifactKind;

/// Result of text extraction from a single upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub kind: ArtifactKind,
    pub method: Option<ExtractionMethod>,
    pub text: String,
    pub page_count: usize,
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// How text was extracted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    TesseractOcr,
    PdfDirect,
    DocxParagraphs,
}

/// Per-page extraction result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageExtraction {
    pub page_number: usize,
    pub text: String,
}

/// Quality notes. None of these stop the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ExtractionWarning {
    NoTextDetected,
    LowConfidence { confidence: f32 },
    ExtractorFailed { reason: String },
}

/// Raw OCR result from the engine
#[derive(Debug)]
pub struct OcrPageResult {
    pub text: String,
    pub confidence: f32,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError>;
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}

/// Word document paragraph extraction abstraction
pub trait DocxExtractor {
    fn paragraphs(&self, docx_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Turns a supported upload into text.
///
/// Never fails: parse errors and unreadable content degrade to empty text
/// with a warning attached.
pub trait TextExtractor {
    fn extract(&self, kind: &ArtifactKind, bytes: &[u8]) -> ExtractionResult;
}
