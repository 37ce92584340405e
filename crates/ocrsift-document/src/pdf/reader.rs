// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — opens existing PDF documents with the `lopdf` crate and reports
// page count and page geometry without rendering anything.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use ocrsift_core::error::SiftError;
use tracing::{debug, info, instrument, warn};

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Parent chain depth limit when resolving inherited page attributes.
const MAX_INHERIT_DEPTH: usize = 32;

/// Size of a page's media box in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// Pixel dimensions when rendered at `dpi`, rounded up.
    pub fn pixels_at(&self, dpi: u32) -> (u64, u64) {
        let dpi = dpi as f32;
        (
            (self.width_pt * dpi / POINTS_PER_INCH).ceil().max(0.0) as u64,
            (self.height_pt * dpi / POINTS_PER_INCH).ceil().max(0.0) as u64,
        )
    }

    /// Pixel count when rendered at `dpi`.
    pub fn pixel_count_at(&self, dpi: u32) -> u64 {
        let (w, h) = self.pixels_at(dpi);
        w * h
    }
}

/// Read-only view of an existing PDF file.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SiftError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            SiftError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// PDF version string from the file header, e.g. `1.5`.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// Media box size of every page, in page order. Pages whose media box
    /// cannot be resolved are reported as `None`.
    pub fn page_sizes(&self) -> Vec<Option<PageSize>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                let size = self.media_box(id);
                if size.is_none() {
                    warn!(page = number, "Page has no usable MediaBox");
                }
                size
            })
            .collect()
    }

    /// Largest pixel count of any page when rendered at `dpi`.
    pub fn max_pixels_at(&self, dpi: u32) -> Option<u64> {
        self.page_sizes()
            .into_iter()
            .flatten()
            .map(|size| size.pixel_count_at(dpi))
            .max()
    }

    /// Resolve `/MediaBox`, following `/Parent` for inherited values.
    fn media_box(&self, page_id: ObjectId) -> Option<PageSize> {
        let mut dict = self.document.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_INHERIT_DEPTH {
            if let Ok(Object::Array(values)) = dict.get(b"MediaBox") {
                return page_size_from_box(values);
            }
            dict = parent_of(&self.document, dict)?;
        }
        None
    }
}

fn parent_of<'a>(document: &'a Document, dict: &Dictionary) -> Option<&'a Dictionary> {
    match dict.get(b"Parent").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn page_size_from_box(values: &[Object]) -> Option<PageSize> {
    let coords: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
    let [x0, y0, x1, y1] = coords.as_slice() else {
        return None;
    };
    Some(PageSize {
        width_pt: (x1 - x0).abs(),
        height_pt: (y1 - y0).abs(),
    })
}
