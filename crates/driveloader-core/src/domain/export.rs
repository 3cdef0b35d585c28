//! Export formats for store-native documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const GOOGLE_SHEET: &str = "application/vnd.google-apps.spreadsheet";
const GOOGLE_SLIDES: &str = "application/vnd.google-apps.presentation";

/// Office format a document is converted to when raw download is refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Word document.
    #[default]
    Docx,
    /// Excel workbook.
    Xlsx,
    /// `PowerPoint` deck.
    Pptx,
    /// `OpenDocument` text.
    Odt,
    /// Portable document.
    Pdf,
}

impl ExportFormat {
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Odt => "application/vnd.oasis.opendocument.text",
            Self::Pdf => "application/pdf",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Pptx => "pptx",
            Self::Odt => "odt",
            Self::Pdf => "pdf",
        }
    }

    /// Pick the export format for a document of `mime_type`.
    ///
    /// Spreadsheets and presentations cannot be exported as text documents,
    /// so they get their office equivalent; everything else uses `default`.
    pub fn for_document(mime_type: Option<&str>, default: Self) -> Self {
        match mime_type {
            Some(GOOGLE_SHEET) => Self::Xlsx,
            Some(GOOGLE_SLIDES) => Self::Pptx,
            _ => default,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            "pptx" => Ok(Self::Pptx),
            "odt" => Ok(Self::Odt),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_document() {
        assert_eq!(
            ExportFormat::for_document(Some("application/vnd.google-apps.document"), ExportFormat::Docx),
            ExportFormat::Docx
        );
        assert_eq!(
            ExportFormat::for_document(Some(GOOGLE_SHEET), ExportFormat::Docx),
            ExportFormat::Xlsx
        );
        assert_eq!(
            ExportFormat::for_document(Some(GOOGLE_SLIDES), ExportFormat::Pdf),
            ExportFormat::Pptx
        );
        assert_eq!(ExportFormat::for_document(None, ExportFormat::Pdf), ExportFormat::Pdf);
    }

    #[test]
    fn test_parse() {
        assert_eq!(".DOCX".parse::<ExportFormat>(), Ok(ExportFormat::Docx));
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert!("rtf".parse::<ExportFormat>().is_err());
    }
}
