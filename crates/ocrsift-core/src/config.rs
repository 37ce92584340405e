// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion configuration. Every section has defaults so a TOML file only needs
// to name the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

/// Settings for a single document conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub raster: RasterConfig,
    pub chunking: ChunkConfig,
    pub prepare: PrepareConfig,
    pub ocr: OcrParams,
    pub filter: FilterConfig,
    /// Recognize chunks and variants of one page on the rayon pool.
    pub parallel_recognition: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            raster: RasterConfig::default(),
            chunking: ChunkConfig::default(),
            prepare: PrepareConfig::default(),
            ocr: OcrParams::default(),
            filter: FilterConfig::default(),
            parallel_recognition: true,
        }
    }
}

/// Rasterization resolution and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Requested rendering resolution.
    pub dpi: u32,
    /// Fixed fallback resolutions, tried in order when a page is too large.
    /// Levels at or above `dpi` are skipped.
    pub fallback_dpis: Vec<u32>,
    /// Pages with more pixels than this are rejected as too large.
    pub max_image_pixels: u64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            fallback_dpis: vec![250, 200, 150],
            max_image_pixels: 178_956_970,
        }
    }
}

/// Oversized page splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Nominal chunk height in pixels.
    pub max_chunk_height: u32,
    /// Pixels shared between adjacent chunks.
    pub chunk_overlap: u32,
    /// Upper bound on the number of chunks per page.
    pub max_chunks: u32,
    /// A page is split only when taller than `max_chunk_height * oversize_factor`.
    pub oversize_factor: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_height: 10_000,
            chunk_overlap: 50,
            max_chunks: 6,
            oversize_factor: 1.2,
        }
    }
}

/// Image preparation applied before every recognition call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Wider images are downscaled to this width.
    pub max_width: u32,
    /// Contrast factor applied to every prepared image.
    pub base_contrast: f32,
    /// Contrast factor of the contrast-boosted variant.
    pub contrast_variant: f32,
    /// Sharpness factor of the sharpness-boosted variant.
    pub sharpness_variant: f32,
    /// Run the faded-scan preset (contrast, sharpness, brightness) first.
    pub enhance_low_quality: bool,
    /// Convert to grayscale with a light blur.
    pub denoise: bool,
    /// Upscale images shorter than this many pixels (2000 suits small
    /// scans). 0 disables upscaling.
    pub min_height: u32,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            max_width: 2500,
            base_contrast: 1.2,
            contrast_variant: 1.3,
            sharpness_variant: 1.4,
            enhance_low_quality: false,
            denoise: false,
            min_height: 0,
        }
    }
}

/// Language set and engine options handed to the OCR adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrParams {
    /// Engine language set, e.g. `chi_sim+eng`.
    pub languages: String,
    /// Extra engine arguments, passed through verbatim.
    pub engine_args: Vec<String>,
}

impl Default for OcrParams {
    fn default() -> Self {
        let args = [
            "--oem",
            "3",
            "--psm",
            "6",
            "-c",
            "tessedit_char_blacklist=|",
            "-c",
            "preserve_interword_spaces=1",
            "-c",
            "textord_really_old_xheight=1",
            "-c",
            "textord_min_linesize=2.5",
        ];
        Self {
            languages: "chi_sim+eng".to_string(),
            engine_args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Content filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Registry name of the strategy to use.
    pub name: String,
    /// Filtered output with fewer non-whitespace chars is replaced by the raw text.
    pub min_retained_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            min_retained_chars: 4096,
        }
    }
}

impl ConvertConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| SiftError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            SiftError::Config(format!("failed to read {}: {}", path.display(), err))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.raster.dpi == 0 {
            return Err(SiftError::Config("raster.dpi must be positive".into()));
        }
        if self.chunking.max_chunk_height == 0 {
            return Err(SiftError::Config(
                "chunking.max_chunk_height must be positive".into(),
            ));
        }
        if self.chunking.max_chunks == 0 {
            return Err(SiftError::Config("chunking.max_chunks must be positive".into()));
        }
        if self.prepare.max_width == 0 {
            return Err(SiftError::Config("prepare.max_width must be positive".into()));
        }
        Ok(())
    }
}
