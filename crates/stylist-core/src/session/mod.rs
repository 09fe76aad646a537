//! Session state for interactive styling
//!
//! One session per user: the selected photo, the prompt, the latest result,
//! and the token that tells a current completion from a stale one.

mod carousel;
mod prompts;
mod state;

pub use carousel::LoadingCarousel;
pub use prompts::{EXAMPLE_PROMPTS, LOADING_MESSAGES};
pub use state::{AttemptToken, Completion, PendingAttempt, Phase, Session};
