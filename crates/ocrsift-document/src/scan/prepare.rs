// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page preparation — the image transforms applied before every recognition
// call, plus presets for poor-quality scans.

use image::DynamicImage;
use ocrsift_core::config::PrepareConfig;
use tracing::instrument;

use crate::image::processor::ImageProcessor;

/// Preprocessing variant recognized for normal-size pages.
///
/// Declaration order is the tie-break order during variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Unmodified page.
    Raw,
    /// Contrast-boosted page.
    Contrast,
    /// Sharpness-boosted page.
    Sharpness,
}

impl Variant {
    /// All variants, in tie-break order.
    pub const ALL: [Variant; 3] = [Variant::Raw, Variant::Contrast, Variant::Sharpness];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Raw => "raw",
            Variant::Contrast => "contrast",
            Variant::Sharpness => "sharpness",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pure image transforms used by the page pipeline.
#[derive(Debug, Clone)]
pub struct PagePreparer {
    config: PrepareConfig,
}

impl PagePreparer {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Standard preparation: the optional upscale, enhance and denoise steps
    /// enabled in the config, then cap the width and boost contrast.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn prepare(&self, image: DynamicImage) -> DynamicImage {
        let mut image = image;
        if self.config.min_height > 0 {
            image = self.upscale_for_ocr(image, self.config.min_height);
        }
        if self.config.enhance_low_quality {
            image = self.enhance_low_quality(image);
        }
        if self.config.denoise {
            image = self.denoise(image);
        }
        ImageProcessor::from_dynamic(image)
            .fit_width(self.config.max_width)
            .adjust_contrast(self.config.base_contrast)
            .into_dynamic()
    }

    /// Build `variant` from `image`, followed by the standard preparation.
    pub fn variant(&self, image: &DynamicImage, variant: Variant) -> DynamicImage {
        let processor = ImageProcessor::from_dynamic(image.clone());
        let adjusted = match variant {
            Variant::Raw => processor,
            Variant::Contrast => processor.adjust_contrast(self.config.contrast_variant),
            Variant::Sharpness => processor.adjust_sharpness(self.config.sharpness_variant),
        };
        self.prepare(adjusted.into_dynamic())
    }

    /// Preset for faded or blurry scans.
    pub fn enhance_low_quality(&self, image: DynamicImage) -> DynamicImage {
        ImageProcessor::from_dynamic(image)
            .adjust_contrast(1.3)
            .adjust_sharpness(1.6)
            .scale_brightness(1.1)
            .into_dynamic()
    }

    /// Grayscale plus a light Gaussian blur.
    pub fn denoise(&self, image: DynamicImage) -> DynamicImage {
        ImageProcessor::from_dynamic(image).denoise(0.5).into_dynamic()
    }

    /// Upscale pages shorter than `target_height`.
    pub fn upscale_for_ocr(&self, image: DynamicImage, target_height: u32) -> DynamicImage {
        ImageProcessor::from_dynamic(image)
            .fit_min_height(target_height)
            .into_dynamic()
    }
}

impl Default for PagePreparer {
    fn default() -> Self {
        Self::new(PrepareConfig::default())
    }
}
