// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrsift — OCR scanned documents and keep only the main content.
//
// Entry point. Initialises logging, builds the configuration and OCR engine,
// and dispatches the subcommand.

mod batch;
mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ocrsift_core::ConvertConfig;
use ocrsift_document::{DocumentConverter, PdfReader, TesseractRecognizer, TextRecognizer, default_output_path};
use ocrsift_filter::FilterRegistry;

use cli::{Cli, Command, ConvertOptions, Engine};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            options,
        } => {
            let converter = build_converter(&options)?;
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let written = converter
                .convert(&input, &output, options.filter.as_deref())
                .with_context(|| format!("failed to convert {}", input.display()))?;
            println!("{}", written.display());
        }

        Command::Batch {
            input_dir,
            output,
            workers,
            force,
            options,
        } => {
            let inputs = batch::collect_inputs(&input_dir)?;
            if inputs.is_empty() {
                println!("No supported documents in {}", input_dir.display());
                return Ok(());
            }
            println!("Found {} documents", inputs.len());

            let converter = build_converter(&options)?;
            let batch_options = batch::BatchOptions {
                filter: options.filter.as_deref(),
                workers,
                force,
            };
            let counters = batch::run_batch(&converter, &inputs, &output, batch_options)?;
            println!("{counters}");
            if counters.failed > 0 {
                bail!("{} of {} documents failed", counters.failed, inputs.len());
            }
        }

        Command::Filters { json } => {
            let infos = FilterRegistry::with_builtin().describe_all();
            if json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                for info in infos {
                    println!("{info}");
                }
            }
        }

        Command::Info { pdf, dpi } => print_info(&pdf, dpi)?,
    }

    Ok(())
}

/// Configuration file (if any) with command-line overrides applied.
fn load_config(options: &ConvertOptions) -> Result<ConvertConfig> {
    let mut config = match &options.config {
        Some(path) => ConvertConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConvertConfig::default(),
    };
    if let Some(dpi) = options.dpi {
        config.raster.dpi = dpi;
    }
    if let Some(lang) = &options.lang {
        config.ocr.languages = lang.clone();
    }
    if let Some(filter) = &options.filter {
        config.filter.name = filter.clone();
    }
    if options.sequential {
        config.parallel_recognition = false;
    }
    config.validate()?;
    Ok(config)
}

fn build_converter(options: &ConvertOptions) -> Result<DocumentConverter> {
    let config = load_config(options)?;
    let recognizer = build_recognizer(options)?;
    let converter = DocumentConverter::new(config, recognizer);
    // Resolve once so a bad filter name is reported before any document work.
    converter.filters().get(&converter.config().filter.name)?;
    Ok(converter)
}

fn build_recognizer(options: &ConvertOptions) -> Result<Arc<dyn TextRecognizer>> {
    match options.engine {
        Engine::Tesseract => {
            let tesseract = TesseractRecognizer::with_binary(&options.tesseract_bin);
            tesseract
                .probe()
                .context("tesseract is not available; install it or pass --tesseract-bin")?;
            Ok(Arc::new(tesseract))
        }
        Engine::Ocrs => ocrs_recognizer(options),
    }
}

#[cfg(feature = "ocrs")]
fn ocrs_recognizer(options: &ConvertOptions) -> Result<Arc<dyn TextRecognizer>> {
    use ocrsift_document::{OcrsModelConfig, OcrsRecognizer};

    let models = match &options.model_dir {
        Some(dir) => OcrsModelConfig::from_dir(dir),
        None => OcrsModelConfig::default(),
    };
    Ok(Arc::new(OcrsRecognizer::new(models)?))
}

#[cfg(not(feature = "ocrs"))]
fn ocrs_recognizer(_options: &ConvertOptions) -> Result<Arc<dyn TextRecognizer>> {
    bail!("this build of ocrsift does not include the ocrs engine; rebuild with `--features ocrs`")
}

fn print_info(pdf: &Path, dpi: u32) -> Result<()> {
    let reader = PdfReader::open(pdf)?;
    println!("File:    {}", pdf.display());
    println!("Version: {}", reader.version());
    println!("Pages:   {}", reader.page_count());

    for (index, size) in reader.page_sizes().into_iter().enumerate() {
        match size {
            Some(size) => {
                let (w, h) = size.pixels_at(dpi);
                println!(
                    "  page {:>4}: {:.0} x {:.0} pt, {} x {} px at {} dpi",
                    index + 1,
                    size.width_pt,
                    size.height_pt,
                    w,
                    h,
                    dpi
                );
            }
            None => println!("  page {:>4}: no MediaBox", index + 1),
        }
    }
    Ok(())
}
