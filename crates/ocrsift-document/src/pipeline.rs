// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive page pipeline — one page image in, one page of text out.
//
// Oversized pages are split into overlapping horizontal strips and recognized
// strip by strip. Normal pages are recognized in several preprocessing variants
// and the variant that yields the most text wins.

use std::sync::Arc;

use image::DynamicImage;
use ocrsift_core::config::{ChunkConfig, ConvertConfig, OcrParams};
use ocrsift_core::{PageText, non_whitespace_count};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::scan::prepare::{PagePreparer, Variant};
use crate::scan::recognizer::TextRecognizer;

/// Vertical slice `[top, bottom)` of an oversized page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub index: usize,
    pub top: u32,
    pub bottom: u32,
}

impl ChunkSpan {
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Whether a page of `height` pixels must be split.
pub fn is_oversized(height: u32, config: &ChunkConfig) -> bool {
    height as f64 > config.max_chunk_height as f64 * config.oversize_factor as f64
}

/// Split `height` into at most `max_chunks` strips of `height / n` pixels,
/// each extended by the overlap. Pages that are not oversized yield a single
/// span covering the whole page. The last span always ends at `height`. A zero
/// chunk height is treated as 1 px, so unvalidated configs cannot divide by zero.
pub fn plan_chunks(height: u32, config: &ChunkConfig) -> Vec<ChunkSpan> {
    if !is_oversized(height, config) {
        return vec![ChunkSpan {
            index: 0,
            top: 0,
            bottom: height,
        }];
    }

    let count = height
        .div_ceil(config.max_chunk_height.max(1))
        .min(config.max_chunks)
        .max(1);
    let chunk_height = height / count;

    (0..count)
        .map(|i| {
            let top = i * chunk_height;
            let bottom = if i + 1 == count {
                height
            } else {
                ((i + 1) * chunk_height)
                    .saturating_add(config.chunk_overlap)
                    .min(height)
            };
            ChunkSpan {
                index: i as usize,
                top,
                bottom,
            }
        })
        .collect()
}

/// Pick the candidate with the most non-whitespace characters. The earliest
/// candidate wins a tie.
pub fn select_best<K: Copy>(candidates: Vec<(K, String)>) -> Option<(K, String)> {
    let mut best: Option<(K, String, usize)> = None;
    for (key, text) in candidates {
        let count = non_whitespace_count(&text);
        if best.as_ref().is_none_or(|(_, _, top)| count > *top) {
            best = Some((key, text, count));
        }
    }
    best.map(|(key, text, _)| (key, text))
}

/// Turns page images into page text with a shared recognizer.
pub struct PagePipeline {
    recognizer: Arc<dyn TextRecognizer>,
    preparer: PagePreparer,
    chunking: ChunkConfig,
    params: OcrParams,
    parallel: bool,
}

impl PagePipeline {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, config: &ConvertConfig) -> Self {
        Self {
            recognizer,
            preparer: PagePreparer::new(config.prepare.clone()),
            chunking: config.chunking.clone(),
            params: config.ocr.clone(),
            parallel: config.parallel_recognition,
        }
    }

    /// Recognize one page. Never fails: recognition errors are logged and the
    /// page may come back empty.
    #[instrument(skip(self, image), fields(page = page_number, width = image.width(), height = image.height()))]
    pub fn render_page(&self, image: &DynamicImage, page_number: u32) -> PageText {
        let text = if is_oversized(image.height(), &self.chunking) {
            self.recognize_chunks(image, page_number)
        } else {
            self.recognize_variants(image, page_number)
        };

        if text.is_empty() {
            warn!(page = page_number, "No text recognized on page");
        } else {
            info!(page = page_number, chars = text.chars().count(), "Page recognized");
        }
        PageText::new(page_number, text)
    }

    fn recognize_chunks(&self, image: &DynamicImage, page_number: u32) -> String {
        let spans = plan_chunks(image.height(), &self.chunking);
        info!(page = page_number, chunks = spans.len(), "Splitting oversized page");

        let source = ImageProcessor::from_dynamic(image.clone());
        let texts = self.map_ordered(&spans, |span| {
            let strip = source
                .crop(0, span.top, source.width(), span.height())
                .into_dynamic();
            let prepared = self.preparer.prepare(strip);
            let text = self.recognize_or_empty(&prepared, page_number, "chunk", span.index);
            debug!(page = page_number, chunk = span.index, chars = text.chars().count(), "Chunk recognized");
            text
        });

        texts
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn recognize_variants(&self, image: &DynamicImage, page_number: u32) -> String {
        let texts = self.map_ordered(&Variant::ALL, |variant| {
            let prepared = self.preparer.variant(image, *variant);
            self.recognize_or_empty(&prepared, page_number, variant.name(), 0)
        });

        let candidates: Vec<(Variant, String)> = Variant::ALL.into_iter().zip(texts).collect();
        match select_best(candidates) {
            Some((variant, text)) => {
                debug!(page = page_number, %variant, chars = non_whitespace_count(&text), "Variant selected");
                text
            }
            None => String::new(),
        }
    }

    /// Run `f` over `items`, on the rayon pool when enabled. Results keep the
    /// order of `items` either way.
    fn map_ordered<T, F>(&self, items: &[T], f: F) -> Vec<String>
    where
        T: Sync,
        F: Fn(&T) -> String + Sync + Send,
    {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    fn recognize_or_empty(
        &self,
        image: &DynamicImage,
        page_number: u32,
        attempt: &str,
        index: usize,
    ) -> String {
        match self.recognizer.recognize(image, &self.params) {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(
                    page = page_number,
                    attempt,
                    index,
                    engine = self.recognizer.name(),
                    error = %err,
                    "Recognition failed; treating as empty"
                );
                String::new()
            }
        }
    }
}
