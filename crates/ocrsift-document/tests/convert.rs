// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end conversion with stub rasterizer and recognizer.

use std::path::Path;
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use ocrsift_core::config::OcrParams;
use ocrsift_core::{ConvertConfig, Result, SiftError, Stage, is_page_marker};
use ocrsift_document::{DocumentConverter, Rasterizer, TextRecognizer};
use ocrsift_filter::{ArticleFilter, FilterRegistry};

/// Renders three pages of heights 10, 20 and 30, failing as "too large"
/// above `max_ok_dpi`.
struct StubRasterizer {
    max_ok_dpi: u32,
    attempts: Mutex<Vec<u32>>,
}

impl StubRasterizer {
    fn new(max_ok_dpi: u32) -> Arc<Self> {
        Arc::new(Self {
            max_ok_dpi,
            attempts: Mutex::new(Vec::new()),
        })
    }

    fn attempts(&self) -> Vec<u32> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, _path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        self.attempts.lock().unwrap().push(dpi);
        if dpi > self.max_ok_dpi {
            return Err(SiftError::RasterTooLarge {
                dpi,
                detail: "exceeds limit of 178956970 pixels".into(),
            });
        }
        Ok([10, 20, 30]
            .into_iter()
            .map(|h| DynamicImage::new_rgb8(8, h))
            .collect())
    }
}

/// Text keyed on the page height; the 20 px page is blank.
struct PageByHeight;

impl TextRecognizer for PageByHeight {
    fn name(&self) -> &str {
        "page-by-height"
    }

    fn recognize(&self, image: &DynamicImage, _params: &OcrParams) -> Result<String> {
        Ok(match image.height() {
            10 => "第一页的正文内容\n".to_string(),
            30 => "第三页的正文内容\n用户留言\n写得真好\n".to_string(),
            _ => String::new(),
        })
    }
}

fn converter(config: ConvertConfig, rasterizer: Arc<StubRasterizer>) -> DocumentConverter {
    DocumentConverter::new(config, Arc::new(PageByHeight)).with_rasterizer(rasterizer)
}

#[test]
fn short_output_falls_back_to_raw_text_with_every_page_marker() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out/doc_converted.txt");
    let rasterizer = StubRasterizer::new(300);

    let written = converter(ConvertConfig::default(), rasterizer.clone())
        .convert(Path::new("doc.pdf"), &output, None)
        .unwrap();

    assert_eq!(written, output);
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "--- 第 1 页 ---\n第一页的正文内容\n\n\
         --- 第 2 页 ---\n\n\n\
         --- 第 3 页 ---\n第三页的正文内容\n用户留言\n写得真好\n\n"
    );
    let markers: Vec<&str> = text.lines().filter(|l| is_page_marker(l)).collect();
    assert_eq!(markers.len(), 3);
    assert_eq!(rasterizer.attempts(), [300]);
}

#[test]
fn article_filter_output_is_kept_above_the_floor() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("doc.txt");
    let mut config = ConvertConfig::default();
    config.filter.min_retained_chars = 0;

    converter(config, StubRasterizer::new(300))
        .convert(Path::new("doc.pdf"), &output, Some("article"))
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, "第一页的正文内容\n第三页的正文内容");
}

#[test]
fn oversized_renders_walk_the_dpi_ladder() {
    let dir = tempfile::tempdir().unwrap();
    let rasterizer = StubRasterizer::new(200);

    converter(ConvertConfig::default(), rasterizer.clone())
        .convert(Path::new("doc.pdf"), &dir.path().join("doc.txt"), None)
        .unwrap();

    assert_eq!(rasterizer.attempts(), [300, 250, 200]);
}

#[test]
fn exhausted_ladder_is_a_rasterize_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("doc.txt");
    let err = converter(ConvertConfig::default(), StubRasterizer::new(100))
        .convert(Path::new("doc.pdf"), &output, None)
        .unwrap_err();

    assert!(matches!(err, SiftError::DpiLadderExhausted { .. }));
    assert_eq!(err.stage(), Stage::Rasterize);
    assert!(!output.exists());
}

#[test]
fn unknown_filter_without_default_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let rasterizer = StubRasterizer::new(300);
    let registry = FilterRegistry::builder().register(ArticleFilter::new()).build();

    let err = converter(ConvertConfig::default(), rasterizer.clone())
        .with_filters(registry)
        .convert(Path::new("doc.pdf"), &dir.path().join("doc.txt"), Some("nope"))
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Config);
    match err {
        SiftError::UnknownFilter { name, available } => {
            assert_eq!(name, "nope");
            assert_eq!(available, ["article"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(rasterizer.attempts().is_empty());
}

#[test]
fn unknown_filter_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("doc.txt");
    converter(ConvertConfig::default(), StubRasterizer::new(300))
        .convert(Path::new("doc.pdf"), &output, Some("no-such-filter"))
        .unwrap();
    assert!(output.exists());
}

#[test]
fn unsupported_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let rasterizer = StubRasterizer::new(300);
    let err = converter(ConvertConfig::default(), rasterizer.clone())
        .convert(Path::new("notes.docx"), &dir.path().join("notes.txt"), None)
        .unwrap_err();
    assert!(matches!(err, SiftError::UnsupportedDocument(_)));
    assert!(rasterizer.attempts().is_empty());
}

#[test]
fn image_input_is_a_single_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    DynamicImage::new_luma8(8, 10).save(&input).unwrap();
    let output = dir.path().join("scan_converted.txt");

    converter(ConvertConfig::default(), StubRasterizer::new(300))
        .convert(&input, &output, None)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, "--- 第 1 页 ---\n第一页的正文内容\n\n");
}
