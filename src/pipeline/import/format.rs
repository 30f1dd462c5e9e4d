use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::ImportError;

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024; // 20MB

/// Upload kinds the pipeline knows how to read.
///
/// Chosen from the declared media-type tag only. Extensions and magic bytes
/// are never consulted, so a mislabelled file goes to the wrong extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ArtifactKind {
    Png,
    Jpeg,
    Pdf,
    Docx,
    Unsupported(String),
}

impl ArtifactKind {
    /// Map a declared media type (`image/png; charset=...` etc.) to a kind.
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            MIME_PNG => Self::Png,
            // image/jpg is not registered but browsers still send it
            MIME_JPEG | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            MIME_PDF => Self::Pdf,
            MIME_DOCX => Self::Docx,
            _ => Self::Unsupported(essence),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Unsupported(_) => "unsupported",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// An uploaded file together with its declared media type.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: sanitize_filename(file_name),
            kind: ArtifactKind::from_media_type(media_type),
            bytes,
        }
    }

    /// Build an artifact from a base64 payload (raw or `data:` URL).
    ///
    /// Size is checked on the decoded bytes.
    pub fn from_base64(
        file_name: &str,
        media_type: &str,
        data: &str,
    ) -> Result<Self, ImportError> {
        let bytes = decode_data_url(data)?;
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        let size = bytes.len() as u64;
        if size > MAX_FILE_SIZE {
            return Err(ImportError::FileTooLarge {
                size_mb: size as f64 / (1024.0 * 1024.0),
                max_mb: MAX_FILE_SIZE / (1024 * 1024),
            });
        }
        Ok(Self::new(file_name, media_type, bytes))
    }
}

/// Decode a base64 data URL to raw bytes.
///
/// Handles both `data:image/jpeg;base64,...` and raw base64 strings.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, ImportError> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(base64_data.trim())
        .map_err(|e| ImportError::InvalidPayload(format!("Base64 decode failed: {e}")))
}

/// Strip path components and control characters, and cap the length of an
/// uploaded file name. The result is safe to put in a log line.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_media_types_map_to_kinds() {
        assert_eq!(ArtifactKind::from_media_type("image/png"), ArtifactKind::Png);
        assert_eq!(ArtifactKind::from_media_type("image/jpeg"), ArtifactKind::Jpeg);
        assert_eq!(ArtifactKind::from_media_type("application/pdf"), ArtifactKind::Pdf);
        assert_eq!(ArtifactKind::from_media_type(MIME_DOCX), ArtifactKind::Docx);
    }

    #[test]
    fn media_type_parameters_and_case_ignored() {
        assert_eq!(
            ArtifactKind::from_media_type("Image/PNG; name=scan.png"),
            ArtifactKind::Png
        );
        assert_eq!(ArtifactKind::from_media_type("image/jpg"), ArtifactKind::Jpeg);
    }

    #[test]
    fn zip_is_unsupported() {
        let kind = ArtifactKind::from_media_type("application/zip");
        assert_eq!(kind, ArtifactKind::Unsupported("application/zip".into()));
        assert!(!kind.is_supported());
    }

    #[test]
    fn legacy_word_and_gif_unsupported() {
        assert!(!ArtifactKind::from_media_type("application/msword").is_supported());
        assert!(!ArtifactKind::from_media_type("image/gif").is_supported());
        assert!(!ArtifactKind::from_media_type("").is_supported());
    }

    #[test]
    fn kind_follows_tag_not_extension() {
        let artifact = Artifact::new("notes.pdf", "image/png", vec![1, 2, 3]);
        assert_eq!(artifact.kind, ArtifactKind::Png);
        assert!(artifact.kind.is_image());
    }

    #[test]
    fn decode_data_url_png() {
        let data = "data:image/png;base64,iVBORw0KGgo=";
        let bytes = decode_data_url(data).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn decode_data_url_raw_base64() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let bytes = decode_data_url(&raw).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_data_url_invalid_base64() {
        let result = decode_data_url("not-valid-base64!!!");
        assert!(matches!(result, Err(ImportError::InvalidPayload(_))));
    }

    #[test]
    fn empty_payload_rejected() {
        let result = Artifact::from_base64("a.png", "image/png", "");
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn from_base64_keeps_declared_kind() {
        let data = base64::engine::general_purpose::STANDARD.encode(b"PK\x03\x04");
        let artifact = Artifact::from_base64("archive.zip", "application/zip", &data).unwrap();
        assert_eq!(artifact.file_name, "archive.zip");
        assert!(!artifact.kind.is_supported());
    }

    #[test]
    fn sanitize_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("normal_file.pdf"), "normal_file.pdf");
        assert_eq!(sanitize_filename(""), "document");
        assert_eq!(sanitize_filename("file\0name.pdf"), "filename.pdf");
    }

    #[test]
    fn sanitize_strips_line_breaks() {
        assert_eq!(
            sanitize_filename("notes\nINFO forged line.pdf"),
            "notesINFO forged line.pdf"
        );
        let artifact = Artifact::new("scan\r\n.png", "image/png", vec![1]);
        assert_eq!(artifact.file_name, "scan.png");
    }
}
