//! Evaluation request and result types.
//!
//! An [`EvaluationRequest`] is the validated form of an inbound score
//! request: a single target character and a decoded-and-checked image.

pub mod image;

pub use image::{ImageError, ImagePayload};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest score a result can carry.
pub const MIN_SCORE: u8 = 0;
/// Highest score a result can carry.
pub const MAX_SCORE: u8 = 100;

/// Reasons an inbound request cannot be turned into an [`EvaluationRequest`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field 'target' must be exactly one character, got {0}")]
    InvalidTarget(usize),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A validated evaluation request.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    target: String,
    image: ImagePayload,
}

impl EvaluationRequest {
    pub fn new(target: &str, image: ImagePayload) -> Result<Self, RequestError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(RequestError::MissingField("target"));
        }
        let chars = target.chars().count();
        if chars != 1 {
            return Err(RequestError::InvalidTarget(chars));
        }

        Ok(Self {
            target: target.to_string(),
            image,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn image(&self) -> &ImagePayload {
        &self.image
    }
}

/// Normalized model verdict: a score in `[0, 100]` and non-empty feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: u8,
    pub feedback: String,
}
