// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrsift-filter — Separates substantive content from boilerplate in OCR output.
//
// Provides the line-classification engine (`HybridFilter`), document-family
// strategies (`DjgFilter`, `ArticleFilter`), the name-keyed `FilterRegistry`,
// and the capacity guard that rejects over-aggressive filtering.

pub mod article;
pub mod djg;
pub mod guard;
pub mod hybrid;
pub mod registry;
pub mod signals;

pub use article::ArticleFilter;
pub use djg::DjgFilter;
pub use guard::{FilterOutcome, FilteredText, filter_with_guard};
pub use hybrid::{HybridFilter, Mode, Verdict};
pub use registry::{ContentFilter, FilterInfo, FilterRegistry, FilterRegistryBuilder};
