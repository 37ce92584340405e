// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterization — turns a PDF into page images at a chosen resolution, with
// a DPI ladder that retries lower resolutions when pages come out too large.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageError, ImageReader};
use ocrsift_core::config::RasterConfig;
use ocrsift_core::error::{Result, SiftError};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;

/// Renders every page of a PDF at `dpi`, in page order.
///
/// Implementations report oversized output as [`SiftError::RasterTooLarge`] so
/// the caller can retry at a lower resolution.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

// ---------------------------------------------------------------------------
// DPI ladder
// ---------------------------------------------------------------------------

/// Resolutions to try, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpiLadder {
    levels: Vec<u32>,
}

impl DpiLadder {
    /// `requested` followed by the fallbacks strictly below it.
    pub fn new(requested: u32, fallbacks: &[u32]) -> Self {
        let mut levels = vec![requested];
        levels.extend(fallbacks.iter().copied().filter(|dpi| *dpi < requested));
        Self { levels }
    }

    pub fn from_config(config: &RasterConfig) -> Self {
        Self::new(config.dpi, &config.fallback_dpis)
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }
}

/// Pages rendered at the resolution that succeeded.
#[derive(Debug)]
pub struct RenderedDocument {
    pub dpi: u32,
    pub pages: Vec<DynamicImage>,
}

/// Walk `ladder` until a level renders. Only "too large" failures move to the
/// next level; any other error is returned as-is.
#[instrument(skip(rasterizer, ladder), fields(path = %path.display(), ladder = ?ladder.levels()))]
pub fn rasterize_with_fallback(
    rasterizer: &dyn Rasterizer,
    path: &Path,
    ladder: &DpiLadder,
) -> Result<RenderedDocument> {
    let mut tried = Vec::with_capacity(ladder.levels().len());

    for &dpi in ladder.levels() {
        tried.push(dpi);
        match rasterizer.rasterize(path, dpi) {
            Ok(pages) => {
                info!(dpi, pages = pages.len(), "Rasterized document");
                return Ok(RenderedDocument { dpi, pages });
            }
            Err(err) if err.is_too_large() => {
                warn!(dpi, error = %err, "Pages too large at this resolution; trying a lower one");
            }
            Err(err) => return Err(err),
        }
    }

    Err(SiftError::DpiLadderExhausted { tried })
}

// ---------------------------------------------------------------------------
// pdftoppm
// ---------------------------------------------------------------------------

/// Renders pages with poppler's `pdftoppm` into a scratch directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    max_image_pixels: u64,
}

impl PdftoppmRasterizer {
    pub fn new(max_image_pixels: u64) -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            max_image_pixels,
        }
    }

    pub fn from_config(config: &RasterConfig) -> Self {
        Self::new(config.max_image_pixels)
    }

    /// Use a specific pdftoppm executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Reject the level from the media boxes alone, before rendering. Files
    /// lopdf cannot parse skip the check and are left to pdftoppm.
    fn precheck(&self, path: &Path, dpi: u32) -> Result<()> {
        let reader = match PdfReader::open(path) {
            Ok(reader) => reader,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read page geometry; skipping size precheck");
                return Ok(());
            }
        };
        if reader.page_count() == 0 {
            return Err(SiftError::Pdf(format!("{} has no pages", path.display())));
        }
        if let Some(pixels) = reader.max_pixels_at(dpi)
            && pixels > self.max_image_pixels
        {
            return Err(SiftError::RasterTooLarge {
                dpi,
                detail: format!(
                    "largest page would be {} pixels, limit is {}",
                    pixels, self.max_image_pixels
                ),
            });
        }
        Ok(())
    }

    fn render(&self, path: &Path, dpi: u32, out_dir: &Path) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(path)
            .arg(out_dir.join("page"))
            .output()
            .map_err(|err| {
                SiftError::Rasterize(format!("cannot run {}: {}", self.binary.display(), err))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SiftError::Rasterize(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn decode_page(&self, path: &Path, dpi: u32) -> Result<DynamicImage> {
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|err| image_error(err, dpi))?;

        let pixels = width as u64 * height as u64;
        if pixels > self.max_image_pixels {
            return Err(SiftError::RasterTooLarge {
                dpi,
                detail: format!(
                    "{}x{} = {} pixels exceeds limit {}",
                    width, height, pixels, self.max_image_pixels
                ),
            });
        }

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|err| image_error(err, dpi))?;
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
    }
}

impl Rasterizer for PdftoppmRasterizer {
    #[instrument(skip(self), fields(path = %path.display(), dpi))]
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        self.precheck(path, dpi)?;

        let scratch = tempfile::tempdir()?;
        self.render(path, dpi, scratch.path())?;

        let files = rendered_pages(scratch.path())?;
        if files.is_empty() {
            return Err(SiftError::Rasterize(format!(
                "pdftoppm produced no pages for {}",
                path.display()
            )));
        }
        debug!(pages = files.len(), "Decoding rendered pages");

        files
            .iter()
            .map(|file| self.decode_page(file, dpi))
            .collect()
    }
}

/// `ImageError::Limits` is the decoder's decompression-bomb guard.
fn image_error(err: ImageError, dpi: u32) -> SiftError {
    match err {
        ImageError::Limits(limit) => SiftError::RasterTooLarge {
            dpi,
            detail: limit.to_string(),
        },
        other => SiftError::Rasterize(other.to_string()),
    }
}

/// PNG files written by pdftoppm, ordered by page number. pdftoppm zero-pads
/// the page number to the width of the page count, so names alone do not sort.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| page_number_of(&path).map(|n| (n, path)))
        .collect();
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number_of(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}

// ---------------------------------------------------------------------------
// Single images
// ---------------------------------------------------------------------------

/// Open a standalone image as a one-page document, converted to RGB.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn open_image_page(path: &Path) -> Result<DynamicImage> {
    let image = ImageProcessor::open(path)?.into_dynamic();
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fails with "too large" above `max_ok_dpi` and records every attempt.
    struct LadderStub {
        max_ok_dpi: u32,
        attempts: Mutex<Vec<u32>>,
    }

    impl LadderStub {
        fn new(max_ok_dpi: u32) -> Self {
            Self {
                max_ok_dpi,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<u32> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl Rasterizer for LadderStub {
        fn rasterize(&self, _path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
            self.attempts.lock().unwrap().push(dpi);
            if dpi > self.max_ok_dpi {
                return Err(SiftError::RasterTooLarge {
                    dpi,
                    detail: "exceeds limit".into(),
                });
            }
            Ok(vec![DynamicImage::new_rgb8(2, 2)])
        }
    }

    struct Broken;

    impl Rasterizer for Broken {
        fn rasterize(&self, _path: &Path, _dpi: u32) -> Result<Vec<DynamicImage>> {
            Err(SiftError::Pdf("corrupt xref".into()))
        }
    }

    #[test]
    fn ladder_keeps_only_lower_fallbacks() {
        assert_eq!(DpiLadder::new(400, &[250, 200, 150]).levels(), [400, 250, 200, 150]);
        assert_eq!(DpiLadder::new(200, &[250, 200, 150]).levels(), [200, 150]);
        assert_eq!(DpiLadder::new(100, &[250, 200, 150]).levels(), [100]);
        assert_eq!(
            DpiLadder::from_config(&RasterConfig::default()).levels(),
            [300, 250, 200, 150]
        );
    }

    #[test]
    fn falls_back_until_a_level_renders() {
        let stub = LadderStub::new(150);
        let ladder = DpiLadder::new(400, &[250, 200, 150]);
        let rendered = rasterize_with_fallback(&stub, Path::new("doc.pdf"), &ladder).unwrap();
        assert_eq!(rendered.dpi, 150);
        assert_eq!(rendered.pages.len(), 1);
        assert_eq!(stub.attempts(), [400, 250, 200, 150]);
    }

    #[test]
    fn stops_at_first_success() {
        let stub = LadderStub::new(300);
        let ladder = DpiLadder::new(300, &[250, 200, 150]);
        let rendered = rasterize_with_fallback(&stub, Path::new("doc.pdf"), &ladder).unwrap();
        assert_eq!(rendered.dpi, 300);
        assert_eq!(stub.attempts(), [300]);
    }

    #[test]
    fn exhausted_ladder_reports_every_level() {
        let stub = LadderStub::new(100);
        let ladder = DpiLadder::new(300, &[250, 200, 150]);
        let err = rasterize_with_fallback(&stub, Path::new("doc.pdf"), &ladder).unwrap_err();
        match err {
            SiftError::DpiLadderExhausted { tried } => assert_eq!(tried, [300, 250, 200, 150]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_errors_propagate_without_retry() {
        let ladder = DpiLadder::new(300, &[250, 200, 150]);
        let err = rasterize_with_fallback(&Broken, Path::new("doc.pdf"), &ladder).unwrap_err();
        assert!(matches!(err, SiftError::Pdf(_)));
    }

    #[test]
    fn limit_errors_map_to_too_large() {
        use image::error::{LimitError, LimitErrorKind};
        let err = image_error(
            ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)),
            300,
        );
        assert!(err.is_too_large());
    }

    #[test]
    fn rendered_pages_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = rendered_pages(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn oversized_pages_fail_precheck() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("tall.pdf");
        std::fs::write(&pdf, crate::pdf::reader::tests::pdf_with_pages(&[(72, 7200)])).unwrap();

        // 300 x 30000 pixels at 300 dpi, 150 x 15000 at 150 dpi
        let rasterizer = PdftoppmRasterizer::new(5_000_000);
        assert!(rasterizer.precheck(&pdf, 300).unwrap_err().is_too_large());
        assert!(rasterizer.precheck(&pdf, 150).is_ok());
    }

    #[test]
    fn unreadable_geometry_leaves_rendering_to_pdftoppm() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("odd.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 not parseable by lopdf").unwrap();

        let rasterizer = PdftoppmRasterizer::new(1).with_binary("/nonexistent/pdftoppm");
        assert!(rasterizer.precheck(&pdf, 300).is_ok());
        // the render step is still attempted
        assert!(matches!(
            rasterizer.rasterize(&pdf, 300),
            Err(SiftError::Rasterize(_))
        ));
    }

    #[test]
    fn decode_rejects_pages_over_pixel_limit() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("page-1.png");
        DynamicImage::new_rgb8(40, 30).save(&png).unwrap();

        let small = PdftoppmRasterizer::new(1000);
        assert!(small.decode_page(&png, 300).unwrap_err().is_too_large());

        let roomy = PdftoppmRasterizer::new(10_000);
        let page = roomy.decode_page(&png, 300).unwrap();
        assert_eq!((page.width(), page.height()), (40, 30));
    }

    #[test]
    fn missing_binary_is_a_rasterize_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, crate::pdf::reader::tests::pdf_with_pages(&[(612, 792)])).unwrap();
        let rasterizer = PdftoppmRasterizer::new(u64::MAX).with_binary("/nonexistent/pdftoppm");
        assert!(matches!(
            rasterizer.rasterize(&pdf, 72),
            Err(SiftError::Rasterize(_))
        ));
    }

    #[test]
    fn image_pages_are_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        DynamicImage::new_luma8(5, 6).save(&path).unwrap();
        let page = open_image_page(&path).unwrap();
        assert!(matches!(page, DynamicImage::ImageRgb8(_)));
        assert!(matches!(
            open_image_page(&dir.path().join("missing.png")),
            Err(SiftError::Image(_))
        ));
    }
}
