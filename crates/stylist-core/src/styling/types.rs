//! Styling types
//!
//! Source images, style requests, and styled results.

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::{Error, Result};

use super::encoder;

/// Image MIME types accepted as input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    WebP,
}

impl MimeType {
    /// Get the MIME string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Subtype used as download extension (`png`, `jpeg`, `webp`)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::WebP => "webp",
        }
    }

    /// Parse a MIME string such as `image/jpeg`
    pub fn parse(s: &str) -> Option<Self> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detect from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detect from magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
            Some(Self::WebP)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-selected photo, held in memory for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime_type: MimeType,
    name: Option<String>,
}

impl SourceImage {
    /// Wrap bytes with the default upload limit
    pub fn from_bytes(bytes: Vec<u8>, mime_type: MimeType) -> Result<Self> {
        Self::from_bytes_with_limit(bytes, mime_type, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn from_bytes_with_limit(bytes: Vec<u8>, mime_type: MimeType, max_bytes: u64) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EncodingError("image is empty".to_string()));
        }
        let size = bytes.len() as u64;
        if size >= max_bytes {
            return Err(Error::ImageTooLarge {
                size,
                limit: max_bytes,
            });
        }
        Ok(Self {
            bytes,
            mime_type,
            name: None,
        })
    }

    /// Read an image file
    ///
    /// The type comes from the extension, falling back to the file's magic bytes.
    pub async fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::EncodingError(format!("{}: {}", path.display(), e)))?;
        if metadata.len() >= max_bytes {
            return Err(Error::ImageTooLarge {
                size: metadata.len(),
                limit: max_bytes,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::EncodingError(format!("{}: {}", path.display(), e)))?;

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(MimeType::from_extension)
            .or_else(|| MimeType::sniff(&bytes))
            .ok_or_else(|| {
                let shown = path
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Error::UnsupportedImageType(shown)
            })?;

        let image = Self::from_bytes_with_limit(bytes, mime_type, max_bytes)?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(image.with_name(name))
    }

    fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Pixel dimensions, if the bytes decode as an image
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

/// Outfit framing wrapped around the user's prompt
pub fn outfit_instruction(prompt: &str) -> String {
    format!(
        "Given the person in this image, redraw them wearing the following outfit: {}. Do not change the person's pose or the background.",
        prompt
    )
}

/// One generation attempt's input, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRequest {
    encoded_image: String,
    mime_type: MimeType,
    prompt: String,
}

impl StyleRequest {
    /// Encode the image and capture the prompt
    pub fn new(image: &SourceImage, prompt: impl Into<String>) -> Result<Self> {
        Ok(Self {
            encoded_image: encoder::encode(image.bytes())?,
            mime_type: image.mime_type(),
            prompt: prompt.into(),
        })
    }

    pub fn encoded_image(&self) -> &str {
        &self.encoded_image
    }

    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Full instruction text sent alongside the image
    pub fn instruction(&self) -> String {
        outfit_instruction(&self.prompt)
    }
}

/// A generated image, still base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledImage {
    /// Base64 payload as returned by the service
    pub data: String,
    pub mime_type: MimeType,
}

impl StyledImage {
    pub fn new(data: impl Into<String>, mime_type: MimeType) -> Self {
        Self {
            data: data.into(),
            mime_type,
        }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decoded image bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        encoder::decode(&self.data)
    }

    /// Default download name, e.g. `ai-styled-image.png`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.mime_type.extension())
    }
}
