// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract adapter — runs the `tesseract` CLI on a temporary PNG and reads the
// recognized text from stdout.

use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use ocrsift_core::config::OcrParams;
use ocrsift_core::error::{Result, SiftError};
use tracing::{debug, instrument};

use crate::scan::recognizer::TextRecognizer;

/// Invokes an external `tesseract` binary once per image.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
}

impl TesseractRecognizer {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
        }
    }

    /// Use a specific tesseract executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check that the binary runs at all.
    pub fn probe(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|err| {
                SiftError::Ocr(format!(
                    "cannot run {}: {}",
                    self.binary.display(),
                    err
                ))
            })?;
        if !output.status.success() {
            return Err(SiftError::Ocr(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        Ok(())
    }

    fn command(&self, image_path: &std::path::Path, params: &OcrParams) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path).arg("stdout");
        if !params.languages.is_empty() {
            cmd.arg("-l").arg(&params.languages);
        }
        cmd.args(&params.engine_args);
        cmd
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage, params: &OcrParams) -> Result<String> {
        let scratch = tempfile::Builder::new()
            .prefix("ocrsift-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(scratch.path(), image::ImageFormat::Png)
            .map_err(|err| SiftError::Ocr(format!("failed to write OCR input: {}", err)))?;

        let output = self
            .command(scratch.path(), params)
            .output()
            .map_err(|err| {
                SiftError::Ocr(format!(
                    "cannot run {}: {}",
                    self.binary.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SiftError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.chars().count(), "Tesseract recognition complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_carries_languages_and_engine_args() {
        let recognizer = TesseractRecognizer::new();
        let cmd = recognizer.command(std::path::Path::new("/tmp/page.png"), &OcrParams::default());
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(&args[..4], ["/tmp/page.png", "stdout", "-l", "chi_sim+eng"]);
        assert!(args.contains(&"tessedit_char_blacklist=|".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "-c").count(), 4);
    }

    #[test]
    fn empty_language_set_omits_flag() {
        let params = OcrParams {
            languages: String::new(),
            engine_args: vec![],
        };
        let cmd = TesseractRecognizer::new().command(std::path::Path::new("p.png"), &params);
        assert_eq!(cmd.get_args().count(), 2);
    }

    #[test]
    fn missing_binary_is_an_ocr_error() {
        let recognizer = TesseractRecognizer::with_binary("/nonexistent/ocrsift-tesseract");
        let img = DynamicImage::new_luma8(4, 4);
        let err = recognizer
            .recognize(&img, &OcrParams::default())
            .unwrap_err();
        assert!(matches!(err, SiftError::Ocr(_)));
        assert!(recognizer.probe().is_err());
    }
}
