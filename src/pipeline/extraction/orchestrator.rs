use super::docx::join_paragraphs;
use super::pdf::concatenate_pages;
use super::preprocess::preprocess_image;
use super::types::{
    DocxExtractor, ExtractionMethod, ExtractionResult, ExtractionWarning, OcrEngine,
    PdfExtractor, TextExtractor,
};
use super::ExtractionError;
use crate::pipeline::import::ArtifactKind;

/// OCR confidence below which a warning is attached.
const LOW_OCR_CONFIDENCE: f32 = 0.5;

/// Concrete implementation of the text extractor.
/// Uses trait objects for OCR, PDF and DOCX extraction, enabling dependency injection.
pub struct DocumentExtractor {
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    docx_extractor: Box<dyn DocxExtractor + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        docx_extractor: Box<dyn DocxExtractor + Send + Sync>,
    ) -> Self {
        Self {
            ocr_engine,
            pdf_extractor,
            docx_extractor,
        }
    }

    /// Production extractors: Tesseract (if available), pdf-extract, docx-rs.
    pub fn with_defaults() -> Self {
        Self::new(
            super::ocr::build_ocr_engine(),
            Box::new(super::pdf::PdfTextExtractor),
            Box::new(super::docx::DocxTextExtractor),
        )
    }

    fn try_extract(
        &self,
        kind: &ArtifactKind,
        bytes: &[u8],
    ) -> Result<(ExtractionMethod, String, usize, Vec<ExtractionWarning>), ExtractionError> {
        match kind {
            ArtifactKind::Png | ArtifactKind::Jpeg => {
                // Tesseract reads the original bytes if normalisation fails
                let processed = match preprocess_image(bytes) {
                    Ok(png) => png,
                    Err(e) => {
                        tracing::warn!(error = %e, "Image preprocessing failed, using original bytes");
                        bytes.to_vec()
                    }
                };
                let ocr = self.ocr_engine.ocr_image(&processed)?;
                let mut warnings = Vec::new();
                if !ocr.text.trim().is_empty() && ocr.confidence < LOW_OCR_CONFIDENCE {
                    warnings.push(ExtractionWarning::LowConfidence {
                        confidence: ocr.confidence,
                    });
                }
                Ok((ExtractionMethod::TesseractOcr, ocr.text, 1, warnings))
            }
            ArtifactKind::Pdf => {
                let pages = self.pdf_extractor.extract_text(bytes)?;
                let page_count = pages.len();
                Ok((ExtractionMethod::PdfDirect, concatenate_pages(&pages), page_count, vec![]))
            }
            ArtifactKind::Docx => {
                let paragraphs = self.docx_extractor.paragraphs(bytes)?;
                Ok((ExtractionMethod::DocxParagraphs, join_paragraphs(&paragraphs), 1, vec![]))
            }
            ArtifactKind::Unsupported(tag) => Err(ExtractionError::UnsupportedFormat(tag.clone())),
        }
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, kind: &ArtifactKind, bytes: &[u8]) -> ExtractionResult {
        tracing::info!(kind = kind.as_str(), size = bytes.len(), "Starting text extraction");

        let method = match kind {
            ArtifactKind::Png | ArtifactKind::Jpeg => Some(ExtractionMethod::TesseractOcr),
            ArtifactKind::Pdf => Some(ExtractionMethod::PdfDirect),
            ArtifactKind::Docx => Some(ExtractionMethod::DocxParagraphs),
            ArtifactKind::Unsupported(_) => None,
        };

        let mut result = match self.try_extract(kind, bytes) {
            Ok((method, text, page_count, warnings)) => ExtractionResult {
                kind: kind.clone(),
                method: Some(method),
                text,
                page_count,
                warnings,
            },
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), error = %e, "Extraction failed, continuing with empty text");
                ExtractionResult {
                    kind: kind.clone(),
                    method,
                    text: String::new(),
                    page_count: 0,
                    warnings: vec![ExtractionWarning::ExtractorFailed {
                        reason: e.to_string(),
                    }],
                }
            }
        };

        if result.is_empty() && result.warnings.is_empty() {
            result.warnings.push(ExtractionWarning::NoTextDetected);
        }

        tracing::info!(
            kind = kind.as_str(),
            method = ?result.method,
            pages = result.page_count,
            text_length = result.text.len(),
            warnings = result.warnings.len(),
            "Text extraction complete"
        );

        result
    }
}
