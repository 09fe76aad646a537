//! Error types for Stylist

use thiserror::Error;

/// Result type alias using Stylist's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown for every failed exchange with the generation service
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to generate image. The model may have refused the request due to safety policies or an invalid prompt. Please try again.";

/// Message shown when the service answered without an image
pub const NO_IMAGE_MESSAGE: &str =
    "The API did not return an image. Please try a different prompt.";

/// Message shown when generation is attempted without an image or prompt
pub const MISSING_INPUT_MESSAGE: &str = "Please upload an image and enter a style prompt.";

/// Stylist error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Generation errors (E100-E199)
    /// The cause is kept for diagnostics and never rendered.
    #[error("{}", REQUEST_FAILED_MESSAGE)]
    RequestFailed { cause: String },

    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImageReturned,

    #[error("A styled image is already being generated. Wait for it to finish.")]
    GenerationInProgress,

    // Output errors (E400-E499)
    #[error("Failed to save image: {0}")]
    ImageSaveError(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API key not configured. Set the STYLIST_API_KEY or GEMINI_API_KEY environment variable.")]
    MissingCredential,

    // Input errors (E800-E899)
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported image type '{0}'. Use a PNG, JPEG or WEBP image.")]
    UnsupportedImageType(String),

    #[error("Image is too large ({size} bytes). It must be smaller than {limit} bytes.")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("Could not read the source image: {0}")]
    EncodingError(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestFailed { .. } => "E100",
            Self::NoImageReturned => "E101",
            Self::GenerationInProgress => "E102",
            Self::ImageSaveError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::MissingCredential => "E601",
            Self::InvalidInput(_) => "E800",
            Self::UnsupportedImageType(_) => "E801",
            Self::ImageTooLarge { .. } => "E802",
            Self::EncodingError(_) => "E803",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NoImageReturned => Some("Rephrase the outfit description".to_string()),
            Self::MissingCredential => Some("export STYLIST_API_KEY=<your key>".to_string()),
            Self::ConfigError(_) => Some("stylist config list".to_string()),
            Self::ImageTooLarge { limit, .. } => {
                Some(format!("stylist config set upload.max_bytes {}", limit * 2))
            }
            _ => None,
        }
    }

    /// Whether this error came out of a generation attempt
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::RequestFailed { .. } | Self::NoImageReturned)
    }
}
