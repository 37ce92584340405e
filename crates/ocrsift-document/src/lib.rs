// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrsift-document — Document side of ocrsift.
//
// Rasterizes PDFs (with DPI fallback), prepares page images, recognizes them
// through a pluggable OCR adapter, assembles page texts under page markers,
// and runs the result through a content filter before writing it out.

pub mod assemble;
pub mod convert;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod scan;

// Re-export the primary types so callers can use `ocrsift_document::DocumentConverter` etc.
pub use assemble::assemble;
pub use convert::{DocumentConverter, default_output_path, output_file_name};
pub use image::processor::ImageProcessor;
pub use pdf::raster::{DpiLadder, PdftoppmRasterizer, Rasterizer, rasterize_with_fallback};
pub use pdf::reader::PdfReader;
pub use pipeline::{ChunkSpan, PagePipeline, plan_chunks};
pub use scan::prepare::{PagePreparer, Variant};
pub use scan::recognizer::TextRecognizer;
pub use scan::tesseract::TesseractRecognizer;

#[cfg(feature = "ocrs")]
pub use scan::ocr::{OcrsModelConfig, OcrsRecognizer};
