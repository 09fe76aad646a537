//! Per-session styling state
//!
//! Holds the selected photo, the prompt, and the outcome of the latest
//! attempt. Every attempt carries an [`AttemptToken`]; only the completion
//! for the current token is applied, so a reset silently discards whatever a
//! still-running request later returns.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, MISSING_INPUT_MESSAGE, Result};
use crate::styling::{SourceImage, StyledImage};

use super::prompts::EXAMPLE_PROMPTS;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Ready,
    Generating,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Generating => "generating",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptToken(Uuid);

impl AttemptToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AttemptToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a worker needs to run an attempt off the UI loop
#[derive(Debug, Clone)]
pub struct PendingAttempt {
    pub token: AttemptToken,
    pub image: SourceImage,
    pub prompt: String,
}

/// Outcome of reporting an attempt back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// State of one styling session
#[derive(Debug, Clone)]
pub struct Session {
    image: Option<SourceImage>,
    prompt: String,
    result: Option<StyledImage>,
    error: Option<String>,
    phase: Phase,
    pending: Option<AttemptToken>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            image: None,
            prompt: String::new(),
            result: None,
            error: None,
            phase: Phase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn result(&self) -> Option<&StyledImage> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    /// A result exists and nothing is running
    pub fn can_download(&self) -> bool {
        self.result.is_some() && !self.is_generating()
    }

    /// Whether the generate action should be offered at all
    pub fn can_generate(&self) -> bool {
        self.image.is_some() && !self.prompt.trim().is_empty() && !self.is_generating()
    }

    /// Replace the photo, clearing the last result and error
    ///
    /// Refused while an attempt is running; only a reset abandons one.
    pub fn select_image(&mut self, image: SourceImage) -> Result<()> {
        if self.is_generating() {
            return Err(Error::GenerationInProgress);
        }
        info!(
            mime_type = %image.mime_type(),
            size_bytes = image.size_bytes(),
            "Image selected"
        );
        self.image = Some(image);
        self.result = None;
        self.error = None;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Replace the prompt text
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<()> {
        if self.is_generating() {
            return Err(Error::GenerationInProgress);
        }
        self.prompt = prompt.into();
        Ok(())
    }

    /// Use one of the example prompts
    pub fn choose_example(&mut self, index: usize) -> Result<&'static str> {
        let example = EXAMPLE_PROMPTS
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvalidInput(format!("No example prompt #{}", index + 1)))?;
        self.set_prompt(example)?;
        Ok(example)
    }

    /// Record a message for the user without changing phase
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Start an attempt, clearing the previous result and error
    pub fn begin_generation(&mut self) -> Result<PendingAttempt> {
        if self.is_generating() {
            return Err(Error::GenerationInProgress);
        }

        let image = match &self.image {
            Some(image) if !self.prompt.trim().is_empty() => image.clone(),
            _ => {
                self.error = Some(MISSING_INPUT_MESSAGE.to_string());
                return Err(Error::InvalidInput(MISSING_INPUT_MESSAGE.to_string()));
            }
        };

        let token = AttemptToken::new();
        self.pending = Some(token);
        self.result = None;
        self.error = None;
        self.phase = Phase::Generating;

        debug!(token = %token, "Generation started");

        Ok(PendingAttempt {
            token,
            image,
            prompt: self.prompt.clone(),
        })
    }

    /// Apply the outcome of an attempt if it is still the current one
    pub fn complete(&mut self, token: AttemptToken, outcome: Result<StyledImage>) -> Completion {
        if self.pending != Some(token) {
            debug!(token = %token, "Discarding stale generation result");
            return Completion::Stale;
        }

        self.pending = None;
        match outcome {
            Ok(styled) => {
                self.result = Some(styled);
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.to_string());
                self.phase = Phase::Failed;
            }
        }
        Completion::Applied
    }

    /// Back to a blank session; a running attempt becomes stale
    pub fn reset(&mut self) {
        *self = Self::new();
        info!("Session reset");
    }
}
