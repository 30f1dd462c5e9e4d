use super::types::{PageExtraction, PdfExtractor};
use super::{guard_parser, ExtractionError};

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
        let page_texts = guard_parser(ExtractionError::PdfParsing, || {
            pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
                .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
        })?;

        let pages = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageExtraction {
                page_number: i + 1,
                text,
            })
            .collect();

        Ok(pages)
    }
}

/// Join page texts in page order, with nothing inserted between pages.
pub fn concatenate_pages(pages: &[PageExtraction]) -> String {
    let mut ordered: Vec<&PageExtraction> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_number);
    ordered.iter().map(|p| p.text.as_str()).collect()
}
