// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ImageId;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Intake errors --
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image has degenerate dimensions {width}x{height}")]
    DegenerateImage { width: u32, height: u32 },

    // -- Configuration --
    #[error("invalid conversion settings: {0}")]
    InvalidConfig(String),

    // -- Assembly errors --
    #[error("document sink failed: {0}")]
    Sink(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;

/// A single input image that was dropped from a conversion.
///
/// Produced by intake (or by descriptor validation) and reported next to the
/// finished document. Never aborts processing of the other images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: ImageId,
    /// Display name of the input (usually the file name).
    pub name: String,
    /// Position of the item in the caller-supplied sequence.
    pub source_order: usize,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(
        id: ImageId,
        name: impl Into<String>,
        source_order: usize,
        err: &BildwerkError,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            source_order,
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}: {}", self.source_order + 1, self.name, self.reason)
    }
}
