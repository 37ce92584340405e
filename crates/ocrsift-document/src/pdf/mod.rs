// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — inspection and rasterization of input PDFs.

pub mod raster;
pub mod reader;

pub use raster::{DpiLadder, PdftoppmRasterizer, Rasterizer, RenderedDocument, rasterize_with_fallback};
pub use reader::{PageSize, PdfReader};
