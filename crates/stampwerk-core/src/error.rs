// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stampwerk.

use thiserror::Error;

use crate::types::StampId;

/// Top-level error type for all Stampwerk operations.
#[derive(Debug, Error)]
pub enum StampwerkError {
    // -- Upload / rasterization --
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("rasterization failed{}: {reason}", page_suffix(.page))]
    RasterizationFailure { page: Option<usize>, reason: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF pages cannot be rendered: {0}")]
    RendererUnavailable(String),

    // -- Interaction --
    #[error("pointer position could not be resolved to a page")]
    PointerResolutionFailure,

    #[error("no stamp with id {0}")]
    UnknownStampReference(StampId),

    #[error("a stamp with id {0} is already registered")]
    DuplicateStamp(StampId),

    #[error("a placement is already waiting for authorization")]
    PlacementPending,

    #[error("stamp placement was denied")]
    AuthorizationDenied,

    #[error("stamp placement was cancelled")]
    AuthorizationCancelled,

    // -- Compositing --
    #[error("compositing failed{}: {reason}", page_suffix(.page))]
    CompositingFailure { page: Option<usize>, reason: String },

    #[error("font error: {0}")]
    Font(String),

    #[error("invalid color {0:?} (expected #RRGGBB)")]
    InvalidColor(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StampwerkError {
    /// Whether the error is an in-session soft failure that leaves the open
    /// document fully usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PointerResolutionFailure
                | Self::UnknownStampReference(_)
                | Self::DuplicateStamp(_)
                | Self::PlacementPending
                | Self::AuthorizationDenied
                | Self::AuthorizationCancelled
        )
    }
}

fn page_suffix(page: &Option<usize>) -> String {
    match page {
        Some(index) => format!(" on page {}", index + 1),
        None => String::new(),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StampwerkError>;
