//! Stylist Core Library
//!
//! This crate provides the core functionality for Stylist, including:
//! - Source image loading and base64 encoding
//! - The Gemini `generateContent` style client
//! - Session state with stale-result protection
//! - Configuration (TOML file + environment credentials)

pub mod config;
pub mod error;
pub mod session;
pub mod styling;

pub use error::{Error, Result};
