// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition side of the pipeline — page preparation and OCR adapters.

pub mod prepare;
pub mod recognizer;
pub mod tesseract;

#[cfg(feature = "ocrs")]
pub mod ocr;

pub use prepare::{PagePreparer, Variant};
pub use recognizer::TextRecognizer;
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "ocrs")]
pub use ocr::{OcrsModelConfig, OcrsRecognizer};
