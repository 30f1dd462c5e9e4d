pub mod types;
pub mod preprocess;
pub mod pdf;
pub mod docx;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use pdf::*;
pub use docx::*;
pub use ocr::*;
pub use orchestrator::*;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Tesseract OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Word document parsing failed: {0}")]
    DocxParsing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Tessdata not found at: {0}")]
    TessdataNotFound(PathBuf),

    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),
}

/// Run a third-party parser, turning a panic inside it into `on_panic(msg)`.
///
/// Uploads are untrusted and some parsers panic on malformed input
/// instead of returning an error.
pub(crate) fn guard_parser<T>(
    on_panic: fn(String) -> ExtractionError,
    parse: impl FnOnce() -> Result<T, ExtractionError>,
) -> Result<T, ExtractionError> {
    match catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(error = %msg, "Parser panicked");
            Err(on_panic(format!("parser panicked: {msg}")))
        }
    }
}
