// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR adapter seam.

use image::DynamicImage;
use ocrsift_core::config::OcrParams;
use ocrsift_core::error::Result;

/// Recognizes the text in a single prepared image.
///
/// Implementations must be usable from several rayon workers at once.
pub trait TextRecognizer: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, image: &DynamicImage, params: &OcrParams) -> Result<String>;
}
