// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document conversion — input file in, filtered UTF-8 text file out.
//
// Flow: resolve filter → load pages (rasterize with DPI fallback, or open the
// image) → recognize each page → assemble → filter with guard → write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use ocrsift_core::error::{Result, SiftError};
use ocrsift_core::{ConvertConfig, DocumentText, InputKind, PageText};
use ocrsift_filter::{FilteredText, FilterRegistry, filter_with_guard};
use tracing::{info, instrument, warn};

use crate::assemble::assemble;
use crate::pdf::raster::{DpiLadder, PdftoppmRasterizer, Rasterizer, open_image_page, rasterize_with_fallback};
use crate::pipeline::PagePipeline;
use crate::scan::recognizer::TextRecognizer;

/// Suffix appended to the input's stem to name its text output.
pub const OUTPUT_SUFFIX: &str = "_converted.txt";

/// File name of the text output for `input`: `<stem>_converted.txt`.
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}{OUTPUT_SUFFIX}")
}

/// Default output path: next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(output_file_name(input))
}

/// Converts documents to text with a fixed configuration, rasterizer,
/// recognizer and filter registry.
pub struct DocumentConverter {
    config: ConvertConfig,
    rasterizer: Arc<dyn Rasterizer>,
    pipeline: PagePipeline,
    filters: FilterRegistry,
}

impl DocumentConverter {
    /// Converter rendering with `pdftoppm` and filtering with the built-in
    /// strategies.
    pub fn new(config: ConvertConfig, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let rasterizer = Arc::new(PdftoppmRasterizer::from_config(&config.raster));
        let pipeline = PagePipeline::new(recognizer, &config);
        Self {
            config,
            rasterizer,
            pipeline,
            filters: FilterRegistry::with_builtin(),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Convert `input` and write the result to `output`.
    ///
    /// `filter_name` overrides the configured filter. An unknown name falls
    /// back to the default strategy; the lookup happens before any page is
    /// loaded so configuration errors surface first.
    #[instrument(skip(self), fields(input = %input.display(), output = %output.display()))]
    pub fn convert(&self, input: &Path, output: &Path, filter_name: Option<&str>) -> Result<PathBuf> {
        let name = filter_name.unwrap_or(&self.config.filter.name);
        let filter = self.filters.get(name)?;

        let raw = self.extract(input)?;
        let FilteredText { text, outcome } =
            filter_with_guard(filter.as_ref(), &raw, self.config.filter.min_retained_chars);
        info!(
            filter = %filter.describe().name,
            ?outcome,
            raw_chars = raw.char_count(),
            "Content filtered"
        );

        write_text(output, &text)?;
        info!(chars = text.chars().count(), "Conversion complete");
        Ok(output.to_path_buf())
    }

    /// Recognize every page of `input` and assemble the raw document text,
    /// without filtering.
    pub fn extract(&self, input: &Path) -> Result<DocumentText> {
        let images = self.load_pages(input)?;
        info!(pages = images.len(), "Recognizing pages");

        let pages: Vec<PageText> = images
            .iter()
            .enumerate()
            .map(|(i, image)| self.pipeline.render_page(image, i as u32 + 1))
            .collect();

        let empty = pages.iter().filter(|p| p.is_empty()).count();
        if empty > 0 {
            warn!(empty, total = pages.len(), "Some pages produced no text");
        }
        Ok(assemble(pages))
    }

    fn load_pages(&self, input: &Path) -> Result<Vec<DynamicImage>> {
        match InputKind::detect(input)? {
            InputKind::Pdf => {
                let ladder = DpiLadder::from_config(&self.config.raster);
                let rendered = rasterize_with_fallback(self.rasterizer.as_ref(), input, &ladder)?;
                Ok(rendered.pages)
            }
            InputKind::Image => Ok(vec![open_image_page(input)?]),
        }
    }
}

/// Write UTF-8 text (no BOM), creating parent directories as needed.
fn write_text(path: &Path, text: &str) -> Result<()> {
    let write_err = |source| SiftError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, text).map_err(write_err)
}
