//! High-level styling operations
//!
//! One call to [`StyleClient::generate_styled_image`] is one attempt: a single
//! request, no retry, no fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::client::{GeminiClient, GenerationBackend};
use super::encoder;
use super::types::{MimeType, SourceImage, StyleRequest, StyledImage};
use super::wire::{GenerateContentRequest, GenerateContentResponse};

/// Restyles photos through a generation backend
pub struct StyleClient<B = GeminiClient> {
    backend: Arc<B>,
}

impl<B> Clone for StyleClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl StyleClient<GeminiClient> {
    /// Build a client for the configured Gemini endpoint
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(GeminiClient::from_config(config)?))
    }
}

impl<B: GenerationBackend> StyleClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Redraw the person in `image` wearing the outfit described by `prompt`
    ///
    /// The prompt is forwarded as given; callers decide whether blank prompts
    /// are acceptable.
    pub async fn generate_styled_image(
        &self,
        image: &SourceImage,
        prompt: &str,
    ) -> Result<StyledImage> {
        let request = StyleRequest::new(image, prompt)?;

        info!(
            mime_type = %request.mime_type(),
            size_bytes = image.size_bytes(),
            prompt_chars = prompt.chars().count(),
            "Generating styled image"
        );

        let body = GenerateContentRequest::for_style(&request);
        let response = match self.backend.generate_content(&body).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Styled image request failed");
                return Err(Error::RequestFailed {
                    cause: e.to_string(),
                });
            }
        };

        let styled = extract_styled_image(&response, request.mime_type())?;

        info!(
            mime_type = %styled.mime_type,
            payload_chars = styled.data.len(),
            "Styled image generated"
        );

        Ok(styled)
    }
}

/// Pull the first inline image out of a response
///
/// The response's own MIME type wins when it is one we can display; otherwise
/// the source image's type is assumed.
fn extract_styled_image(
    response: &GenerateContentResponse,
    source_mime: MimeType,
) -> Result<StyledImage> {
    let Some(inline) = response.first_inline_image() else {
        warn!(
            block_reason = response.block_reason().unwrap_or("none"),
            finish_reason = response.finish_reason().unwrap_or("none"),
            text = response.text().as_deref().unwrap_or(""),
            "Response contained no image"
        );
        return Err(Error::NoImageReturned);
    };

    if let Err(e) = encoder::decode(&inline.data) {
        error!(error = %e, "Returned image payload is not valid base64");
        return Err(Error::RequestFailed {
            cause: e.to_string(),
        });
    }

    let mime_type = MimeType::parse(&inline.mime_type).unwrap_or_else(|| {
        debug!(returned = %inline.mime_type, fallback = %source_mime, "Using source MIME type");
        source_mime
    });

    Ok(StyledImage::new(inline.data.trim(), mime_type))
}

/// Write a styled image into `dir` as `<stem>.<ext>`
///
/// An existing file is never overwritten; a timestamped name is chosen instead.
pub fn save_styled_image(styled: &StyledImage, dir: &Path, stem: &str) -> Result<PathBuf> {
    let bytes = styled
        .decode()
        .map_err(|e| Error::ImageSaveError(e.to_string()))?;

    std::fs::create_dir_all(dir)
        .map_err(|e| Error::ImageSaveError(format!("Failed to create directory: {}", e)))?;

    let path = unique_output_path(dir, stem, styled.mime_type);
    std::fs::write(&path, &bytes)
        .map_err(|e| Error::ImageSaveError(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), size_bytes = bytes.len(), "Styled image saved");
    Ok(path)
}

fn unique_output_path(dir: &Path, stem: &str, mime_type: MimeType) -> PathBuf {
    let ext = mime_type.extension();
    let plain = dir.join(format!("{}.{}", stem, ext));
    if !plain.exists() {
        return plain;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stamped = dir.join(format!("{}_{}.{}", stem, timestamp, ext));
    if !stamped.exists() {
        return stamped;
    }

    (2u32..)
        .map(|n| dir.join(format!("{}_{}_{}.{}", stem, timestamp, n, ext)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(stamped)
}
