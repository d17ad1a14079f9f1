//! Generative client for character details, portraits, scenes and scene art.
//!
//! [`Oracle`] wraps a [`GenerativeBackend`] and applies the failure policy:
//! text capabilities make one attempt and fall back to fixed content, image
//! capabilities retry with a softened prompt and fall back to placeholders.

mod backend;
mod client;
mod config;
pub mod prompts;
mod resilient;

pub use backend::{GeminiBackend, GenerativeBackend, OracleError};
pub use client::{CharacterDetails, Oracle, Scene};
pub use config::OracleConfig;
pub use resilient::{resilient, retrying, RetryPolicy};
