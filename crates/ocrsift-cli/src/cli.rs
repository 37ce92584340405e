// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Convert scanned PDFs and images to text, keeping only the main content.
#[derive(Debug, Parser)]
#[command(name = "ocrsift", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert one PDF or image to text.
    Convert {
        /// Input PDF or image (.jpg .jpeg .png .bmp .tiff .tif).
        input: PathBuf,

        /// Output text file. Defaults to `<stem>_converted.txt` next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// Convert every supported file in a directory, skipping finished ones.
    Batch {
        /// Directory holding the inputs.
        input_dir: PathBuf,

        /// Directory for the text outputs.
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Documents converted at the same time.
        #[arg(short, long, default_value_t = default_workers())]
        workers: usize,

        /// Convert again even when the output already exists.
        #[arg(short = 'F', long)]
        force: bool,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// List the available content filters.
    Filters {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show page count and page geometry of a PDF.
    Info {
        pdf: PathBuf,

        /// Resolution used for the pixel estimates.
        #[arg(long, default_value_t = 300)]
        dpi: u32,
    },
}

/// Options shared by `convert` and `batch`. Flags override the config file.
#[derive(Debug, Clone, Args)]
pub struct ConvertOptions {
    /// Content filter name (see `ocrsift filters`).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Rendering resolution for PDFs.
    #[arg(long)]
    pub dpi: Option<u32>,

    /// OCR language set, e.g. `chi_sim+eng`.
    #[arg(short, long)]
    pub lang: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OCR engine.
    #[arg(long, value_enum, default_value_t = Engine::Tesseract)]
    pub engine: Engine,

    /// Tesseract executable.
    #[arg(long, default_value = "tesseract")]
    pub tesseract_bin: PathBuf,

    /// Directory holding the ocrs detection and recognition models.
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Recognize variants and chunks one at a time.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// External `tesseract` binary.
    Tesseract,
    /// Built-in `ocrs` engine (requires the `ocrs` feature).
    Ocrs,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(4))
        .unwrap_or(1)
}
