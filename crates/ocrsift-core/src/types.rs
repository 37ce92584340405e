// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ocrsift pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

/// Recognized text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number.
    pub page_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Raw text of a whole document: page texts interleaved with page markers.
///
/// This is what the content filters consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentText(String);

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        non_whitespace_count(&self.0)
    }
}

impl std::fmt::Display for DocumentText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page-boundary marker line for page `n`.
pub fn page_marker(page_number: u32) -> String {
    format!("--- 第 {page_number} 页 ---")
}

/// Whether a (trimmed or untrimmed) line is a page-boundary marker.
pub fn is_page_marker(line: &str) -> bool {
    let Some(inner) = line
        .trim()
        .strip_prefix("---")
        .and_then(|rest| rest.strip_suffix("---"))
    else {
        return false;
    };
    let Some(number) = inner
        .trim()
        .strip_prefix('第')
        .and_then(|rest| rest.strip_suffix('页'))
    else {
        return false;
    };
    let number = number.trim();
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
}

/// Count characters that are not whitespace. Used as the OCR yield measure
/// and by the capacity guard.
pub fn non_whitespace_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Supported input document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Multi-page PDF, rasterized before recognition.
    Pdf,
    /// Single raster image treated as one page.
    Image,
}

impl InputKind {
    /// Detect the input kind from the file extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let suffix = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match suffix.as_str() {
            "pdf" => Ok(InputKind::Pdf),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" => Ok(InputKind::Image),
            other => Err(SiftError::UnsupportedDocument(if other.is_empty() {
                format!("{} has no file extension", path.display())
            } else {
                format!(".{other} ({})", path.display())
            })),
        }
    }
}
