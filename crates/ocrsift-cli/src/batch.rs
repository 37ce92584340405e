// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver — converts a directory of documents on a fixed-size thread
// pool. Inputs whose output already exists are skipped unless forced, so an
// interrupted run can simply be restarted.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use ocrsift_core::InputKind;
use ocrsift_document::{DocumentConverter, output_file_name};
use rayon::prelude::*;
use tracing::{error, info};

/// Outcome tally of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounters {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} converted, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        )
    }
}

/// Supported documents directly inside `dir`, sorted by file name.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && InputKind::detect(path).is_ok())
        .collect();
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

/// How a batch run treats its inputs.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions<'a> {
    pub filter: Option<&'a str>,
    pub workers: usize,
    /// Overwrite outputs that already exist.
    pub force: bool,
}

/// Convert `inputs` into `output_dir`.
pub fn run_batch(
    converter: &DocumentConverter,
    inputs: &[PathBuf],
    output_dir: &Path,
    options: BatchOptions<'_>,
) -> Result<BatchCounters> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .context("cannot start worker pool")?;

    let counters = Mutex::new(BatchCounters::default());
    let total = inputs.len();

    pool.install(|| {
        inputs.par_iter().for_each(|input| {
            let output = output_dir.join(output_file_name(input));
            if !options.force && output.exists() {
                info!(input = %input.display(), "Output exists; skipping");
                bump(&counters, |c| c.skipped += 1);
                return;
            }

            match converter.convert(input, &output, options.filter) {
                Ok(path) => {
                    info!(input = %input.display(), output = %path.display(), "Converted");
                    bump(&counters, |c| c.processed += 1);
                }
                Err(err) => {
                    error!(
                        input = %input.display(),
                        stage = %err.stage(),
                        error = %err,
                        "Conversion failed"
                    );
                    bump(&counters, |c| c.failed += 1);
                }
            }
        });
    });

    let counters = counters
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    info!(total, %counters, "Batch finished");
    Ok(counters)
}

fn bump(counters: &Mutex<BatchCounters>, update: impl FnOnce(&mut BatchCounters)) {
    let mut guard = counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    update(&mut guard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::DynamicImage;
    use ocrsift_core::config::OcrParams;
    use ocrsift_core::{ConvertConfig, SiftError};
    use ocrsift_document::{Rasterizer, TextRecognizer};

    struct OnePage;

    impl Rasterizer for OnePage {
        fn rasterize(&self, path: &Path, _dpi: u32) -> ocrsift_core::Result<Vec<DynamicImage>> {
            if path.file_stem().is_some_and(|s| s == "broken") {
                return Err(SiftError::Pdf("corrupt xref".into()));
            }
            Ok(vec![DynamicImage::new_rgb8(4, 4)])
        }
    }

    struct Fixed;

    impl TextRecognizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: &DynamicImage, _params: &OcrParams) -> ocrsift_core::Result<String> {
            Ok("页面正文".to_string())
        }
    }

    fn options(workers: usize, force: bool) -> BatchOptions<'static> {
        BatchOptions {
            filter: None,
            workers,
            force,
        }
    }

    fn converter() -> DocumentConverter {
        DocumentConverter::new(ConvertConfig::default(), Arc::new(Fixed))
            .with_rasterizer(Arc::new(OnePage))
    }

    #[test]
    fn inputs_are_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PNG", "notes.txt", "c.tif"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = collect_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.PNG", "b.pdf", "c.tif"]);
    }

    #[test]
    fn existing_outputs_are_skipped_and_failures_counted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("done_converted.txt"), "old").unwrap();

        let inputs: Vec<PathBuf> = ["broken.pdf", "done.pdf", "fresh.pdf"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();

        let counters = run_batch(&converter(), &inputs, &out, options(2, false)).unwrap();
        assert_eq!(
            counters,
            BatchCounters {
                processed: 1,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(std::fs::read_to_string(out.join("done_converted.txt")).unwrap(), "old");
        let fresh = std::fs::read_to_string(out.join("fresh_converted.txt")).unwrap();
        assert!(fresh.starts_with("--- 第 1 页 ---\n页面正文"));
        assert!(!out.join("broken_converted.txt").exists());
    }

    #[test]
    fn rerun_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let inputs = vec![dir.path().join("one.pdf"), dir.path().join("two.pdf")];

        let first = run_batch(&converter(), &inputs, &out, options(1, false)).unwrap();
        assert_eq!(first.processed, 2);
        let second = run_batch(&converter(), &inputs, &out, options(1, false)).unwrap();
        assert_eq!(second.skipped, 2);
        assert_eq!(second.processed, 0);
    }

    #[test]
    fn forced_rerun_overwrites_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("one_converted.txt"), "stale").unwrap();
        let inputs = vec![dir.path().join("one.pdf"), dir.path().join("two.pdf")];

        let forced = run_batch(&converter(), &inputs, &out, options(1, true)).unwrap();
        assert_eq!(
            forced,
            BatchCounters {
                processed: 2,
                skipped: 0,
                failed: 0
            }
        );
        let one = std::fs::read_to_string(out.join("one_converted.txt")).unwrap();
        assert!(one.starts_with("--- 第 1 页 ---\n页面正文"));
    }
}
