// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capacity guard — falls back to the unfiltered document when a filter keeps
// too little of it, or when the filter itself fails.

use std::panic::{self, AssertUnwindSafe};

use ocrsift_core::{DocumentText, non_whitespace_count};
use tracing::{debug, instrument, warn};

use crate::registry::ContentFilter;

/// How the final text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filtered text was kept.
    Filtered,
    /// The filtered text was below the floor; the raw text was used.
    BelowFloor { retained: usize, floor: usize },
    /// The filter panicked; the raw text was used.
    FilterFailed,
}

/// Final text of a document after filtering and guarding.
#[derive(Debug, Clone)]
pub struct FilteredText {
    pub text: String,
    pub outcome: FilterOutcome,
}

impl FilteredText {
    /// Whether the raw text was substituted for the filter output.
    pub fn used_raw(&self) -> bool {
        self.outcome != FilterOutcome::Filtered
    }
}

/// Run `filter` over `raw` and keep its output only if it retains at least
/// `floor` non-whitespace characters.
#[instrument(skip_all, fields(filter = %filter.describe().name, floor = floor))]
pub fn filter_with_guard(
    filter: &dyn ContentFilter,
    raw: &DocumentText,
    floor: usize,
) -> FilteredText {
    let filtered = match panic::catch_unwind(AssertUnwindSafe(|| {
        filter.extract_main_content(raw.as_str())
    })) {
        Ok(text) => text,
        Err(_) => {
            warn!("Content filter panicked; keeping the unfiltered text");
            return FilteredText {
                text: raw.as_str().to_string(),
                outcome: FilterOutcome::FilterFailed,
            };
        }
    };

    apply_floor(raw, filtered, floor)
}

/// Substitute the raw text when `filtered` is below the retention floor.
pub fn apply_floor(raw: &DocumentText, filtered: String, floor: usize) -> FilteredText {
    let retained = non_whitespace_count(&filtered);
    if retained < floor {
        warn!(
            retained,
            floor,
            raw_chars = raw.char_count(),
            "Filtered content below floor; using the unfiltered text"
        );
        return FilteredText {
            text: raw.as_str().to_string(),
            outcome: FilterOutcome::BelowFloor { retained, floor },
        };
    }

    debug!(retained, raw_chars = raw.char_count(), "Filtered content kept");
    FilteredText {
        text: filtered,
        outcome: FilterOutcome::Filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FilterInfo;

    struct Fixed(&'static str);

    impl ContentFilter for Fixed {
        fn extract_main_content(&self, _text: &str) -> String {
            self.0.to_string()
        }

        fn describe(&self) -> FilterInfo {
            FilterInfo::new("fixed", "returns a fixed string")
        }
    }

    struct Exploding;

    impl ContentFilter for Exploding {
        fn extract_main_content(&self, _text: &str) -> String {
            panic!("classifier bug")
        }

        fn describe(&self) -> FilterInfo {
            FilterInfo::new("exploding", "always panics")
        }
    }

    #[test]
    fn below_floor_returns_raw_text() {
        let raw = DocumentText::new("raw text with page markers");
        let result = filter_with_guard(&Fixed("tiny"), &raw, 4096);
        assert_eq!(result.text, raw.as_str());
        assert_eq!(
            result.outcome,
            FilterOutcome::BelowFloor {
                retained: 4,
                floor: 4096
            }
        );
        assert!(result.used_raw());
    }

    #[test]
    fn floor_counts_only_non_whitespace() {
        let raw = DocumentText::new("raw");
        // 4095 visible chars padded with whitespace is still below 4096
        let filtered = "字 \n".repeat(4095);
        let result = apply_floor(&raw, filtered, 4096);
        assert!(result.used_raw());

        let enough = "字\n".repeat(4096);
        let result = apply_floor(&raw, enough.clone(), 4096);
        assert_eq!(result.outcome, FilterOutcome::Filtered);
        assert_eq!(result.text, enough);
    }

    #[test]
    fn panicking_filter_falls_back_to_raw() {
        let raw = DocumentText::new("raw document");
        let result = filter_with_guard(&Exploding, &raw, 0);
        assert_eq!(result.text, "raw document");
        assert_eq!(result.outcome, FilterOutcome::FilterFailed);
    }

    #[test]
    fn zero_floor_always_keeps_filtered() {
        let raw = DocumentText::new("raw");
        let result = filter_with_guard(&Fixed(""), &raw, 0);
        assert_eq!(result.outcome, FilterOutcome::Filtered);
        assert_eq!(result.text, "");
    }
}
