use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const JPEG_MIME: &str = "image/jpeg";
pub const PNG_MIME: &str = "image/png";

/// One of the four declared media types an upload may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Pdf,
    Docx,
    Jpeg,
    Png,
}

impl MediaType {
    pub const ALL: [Self; 4] = [Self::Pdf, Self::Docx, Self::Jpeg, Self::Png];

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim() {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            JPEG_MIME => Some(Self::Jpeg),
            PNG_MIME => Some(Self::Png),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::Jpeg => JPEG_MIME,
            Self::Png => PNG_MIME,
        }
    }

    /// Folder under the upload root where files of this type are stored.
    #[must_use]
    pub const fn storage_folder(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docs",
            Self::Jpeg | Self::Png => "images",
        }
    }

    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_mime())
    }
}

impl std::str::FromStr for MediaType {
    type Err = crate::upload::UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s).ok_or_else(|| crate::upload::UploadError::UnsupportedType(s.to_string()))
    }
}
