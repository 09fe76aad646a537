//! Outfit restyling through Gemini image generation
//!
//! Features:
//! - Base64 encoding of source photos
//! - The `generateContent` request/response wire format
//! - A single-attempt style client with a swappable transport
//! - Saving generated images without overwriting earlier downloads

mod client;
pub mod encoder;
pub mod operations;
mod types;
pub mod wire;

pub use client::{BackendError, GeminiClient, GeminiClientBuilder, GenerationBackend};
pub use operations::{StyleClient, save_styled_image};
pub use types::{MimeType, SourceImage, StyleRequest, StyledImage, outfit_instruction};
