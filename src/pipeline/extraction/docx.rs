use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::types::DocxExtractor;
use super::{guard_parser, ExtractionError};

/// Word (.docx) extractor using the docx-rs crate.
///
/// Only top-level body paragraphs are read. Table cells, headers and
/// footers are skipped. Empty paragraphs are kept so the joined text
/// preserves blank lines.
pub struct DocxTextExtractor;

impl DocxExtractor for DocxTextExtractor {
    fn paragraphs(&self, docx_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        guard_parser(ExtractionError::DocxParsing, || {
            let docx = docx_rs::read_docx(docx_bytes)
                .map_err(|e| ExtractionError::DocxParsing(format!("{e:?}")))?;

            Ok(docx
                .document
                .children
                .iter()
                .filter_map(|child| match child {
                    DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                    _ => None,
                })
                .collect())
        })
    }
}

/// Paragraph texts joined by a single newline, in document order.
pub fn join_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join("\n")
}

/// Plain text of one paragraph. Runs are concatenated with no separator
/// because they are parts of the same sentence.
fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    collect_children(&para.children, &mut out);
    out
}

fn collect_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_children(&link.children, out),
            _ => {}
        }
    }
}
