//! # External Services
//!
//! Document analysis and logo generation live behind traits so sessions can
//! be driven by a real backend or by an in-process fake. Uploaded files are
//! classified before anything is sent anywhere.

use crate::errors::ServiceError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lettercraft_model::AnalysisRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::debug;

/// A user-supplied file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Pdf,
}

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

impl Upload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Classify by MIME type, falling back to the file extension
    pub fn kind(&self) -> Result<UploadKind, ServiceError> {
        let mime = self.mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            return Ok(UploadKind::Image);
        }
        if mime == "application/pdf" {
            return Ok(UploadKind::Pdf);
        }

        let extension = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(UploadKind::Pdf),
            ext if IMAGE_EXTENSIONS.contains(&ext) => Ok(UploadKind::Image),
            _ => Err(self.unsupported("expected an image or a PDF")),
        }
    }

    pub fn require_image(&self) -> Result<(), ServiceError> {
        match self.kind() {
            Ok(UploadKind::Image) => Ok(()),
            _ => Err(self.unsupported("expected an image")),
        }
    }

    pub fn data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }

    fn unsupported(&self, expected: &'static str) -> ServiceError {
        ServiceError::UnsupportedInput {
            name: self.name.clone(),
            mime: self.mime.clone(),
            expected,
        }
    }
}

/// `data:` URI with base64 payload
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Aspect ratios supported by logo generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }

    /// Parse a ratio string; anything unsupported becomes square
    pub fn coerce(value: &str) -> Self {
        let value = value.trim();
        match Self::ALL.into_iter().find(|r| r.as_str() == value) {
            Some(ratio) => ratio,
            None => {
                debug!(ratio = value, "unsupported aspect ratio, using 1:1");
                AspectRatio::Square
            }
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    pub fn data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }
}

/// Reads an uploaded letter and reports its structure
pub trait AnalysisService {
    fn analyze(
        &self,
        upload: &Upload,
    ) -> impl Future<Output = Result<AnalysisRecord, ServiceError>> + Send;
}

/// Generates a logo image from a text prompt
pub trait LogoService {
    fn generate(
        &self,
        prompt: &str,
        ratio: AspectRatio,
    ) -> impl Future<Output = Result<GeneratedImage, ServiceError>> + Send;
}
