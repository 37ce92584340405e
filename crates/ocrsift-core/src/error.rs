// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ocrsift.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all ocrsift operations.
#[derive(Debug, Error)]
pub enum SiftError {
    // -- Rasterization errors --
    /// The rendered page exceeds the pixel budget at this resolution.
    /// Recoverable by retrying at a lower DPI.
    #[error("rendered page too large at {dpi} DPI: {detail}")]
    RasterTooLarge { dpi: u32, detail: String },

    #[error("rasterization failed at every DPI level {tried:?}; page images stay too large")]
    DpiLadderExhausted { tried: Vec<u32> },

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    // -- Recognition errors --
    #[error("OCR failed: {0}")]
    Ocr(String),

    // -- Configuration errors --
    #[error("filter '{name}' does not exist; available filters: {available:?}")]
    UnknownFilter { name: String, available: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Output --
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Rasterize,
    Recognize,
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Rasterize => "rasterize",
            Stage::Recognize => "recognize",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

impl SiftError {
    /// The stage a fatal error belongs to, for driver-side reporting.
    pub fn stage(&self) -> Stage {
        match self {
            SiftError::RasterTooLarge { .. }
            | SiftError::DpiLadderExhausted { .. }
            | SiftError::Rasterize(_)
            | SiftError::Pdf(_)
            | SiftError::Image(_)
            | SiftError::UnsupportedDocument(_) => Stage::Rasterize,
            SiftError::Ocr(_) => Stage::Recognize,
            SiftError::UnknownFilter { .. } | SiftError::Config(_) => Stage::Config,
            SiftError::Write { .. } | SiftError::Io(_) => Stage::Write,
        }
    }

    /// Whether this error belongs to the "too large / decompression bomb" class
    /// that the DPI ladder recovers from.
    pub fn is_too_large(&self) -> bool {
        matches!(self, SiftError::RasterTooLarge { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiftError>;
