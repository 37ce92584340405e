// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hybrid content filter — the default line classifier.
//
// Documents containing the key-points marker are filtered with a
// boundary-aware scan anchored on that section; all other documents get a
// conservative scan that only drops definite noise and comment sections, and
// recovers when strong evidence of body text reappears.
//
// Both scans are folds of a pure `step(mode, line) -> (mode, verdict)`
// function over the trimmed lines, so each rule can be tested line by line.

use ocrsift_core::is_page_marker;

use crate::registry::{ContentFilter, FilterInfo};
use crate::signals::{
    char_len, cjk_ratio, contains_key_points_marker, is_comment_start,
    is_definite_comment_start, is_definite_noise, is_noise, is_numbered_item,
    KEY_POINTS_MARKER,
};

/// Per-document classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ordinary body text; no key-points section seen yet.
    Scanning,
    /// Inside the key-points section.
    InKeySection,
    /// The key-points section has closed; back to body text.
    KeySectionEnded,
    /// Inside a comment section; lines are dropped.
    Skipping,
}

/// Decision for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop,
}

/// The default strategy, registered as `default`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridFilter;

impl HybridFilter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentFilter for HybridFilter {
    fn extract_main_content(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let kept = if contains_key_points_marker(text) {
            scan(text, step_boundary_aware)
        } else {
            scan(text, |mode, line, _| step_conservative(mode, line))
        };
        kept.join("\n")
    }

    fn describe(&self) -> FilterInfo {
        FilterInfo::new(
            "default",
            "Hybrid filter: key-points boundary scan when the marker is present, conservative filtering otherwise",
        )
    }
}

/// Fold a step function over the trimmed lines of `text`.
///
/// Blank lines and page markers never reach the step function.
fn scan<'a, F>(text: &'a str, step: F) -> Vec<&'a str>
where
    F: Fn(Mode, &str, Option<&str>) -> (Mode, Verdict),
{
    let (_, kept) = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_page_marker(line))
        .fold((Mode::Scanning, Vec::new()), |(mode, mut kept), line| {
            let (next, verdict) = step(mode, line, kept.last().copied());
            if verdict == Verdict::Keep {
                kept.push(line);
            }
            (next, kept)
        });
    kept
}

/// One step of the boundary-aware scan. `last_emitted` is the most recent
/// kept line, which may lie several input lines back.
pub fn step_boundary_aware(mode: Mode, line: &str, last_emitted: Option<&str>) -> (Mode, Verdict) {
    match mode {
        Mode::Skipping => (Mode::Skipping, Verdict::Drop),
        _ if line.contains(KEY_POINTS_MARKER) => (Mode::InKeySection, Verdict::Keep),
        Mode::InKeySection => step_key_section(line, last_emitted),
        Mode::Scanning | Mode::KeySectionEnded => step_body(mode, line),
    }
}

fn step_key_section(line: &str, last_emitted: Option<&str>) -> (Mode, Verdict) {
    if is_comment_start(line) {
        return (Mode::Skipping, Verdict::Drop);
    }
    // anything that looks like a key point already passes as a continuation
    if is_numbered_item(line) || is_continuation(line, last_emitted) {
        (Mode::InKeySection, Verdict::Keep)
    } else {
        (Mode::KeySectionEnded, Verdict::Drop)
    }
}

fn step_body(mode: Mode, line: &str) -> (Mode, Verdict) {
    if is_comment_start(line) {
        (Mode::Skipping, Verdict::Drop)
    } else if is_noise(line) {
        (mode, Verdict::Drop)
    } else {
        (mode, Verdict::Keep)
    }
}

/// One step of the conservative scan.
pub fn step_conservative(mode: Mode, line: &str) -> (Mode, Verdict) {
    if is_definite_noise(line) {
        return (mode, Verdict::Drop);
    }
    if is_definite_comment_start(line) {
        return (Mode::Skipping, Verdict::Drop);
    }
    match mode {
        Mode::Skipping if is_strong_body_text(line) => (Mode::Scanning, Verdict::Keep),
        Mode::Skipping => (Mode::Skipping, Verdict::Drop),
        _ => (mode, Verdict::Keep),
    }
}

fn is_continuation(line: &str, last_emitted: Option<&str>) -> bool {
    last_emitted.is_some_and(is_numbered_item) || (cjk_ratio(line) > 0.3 && char_len(line) > 5)
}

/// Evidence strong enough to leave a comment section that was entered by mistake.
fn is_strong_body_text(line: &str) -> bool {
    char_len(line) > 20 && cjk_ratio(line) > 0.6
}
