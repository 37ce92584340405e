// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-level text signals shared by the content filters: CJK ratio, noise
// signatures, comment-section markers and numbered key-point items.

use std::sync::LazyLock;

use ocrsift_core::is_page_marker;
use regex::Regex;

/// Phrase that opens an editorially curated key-points section.
pub const KEY_POINTS_MARKER: &str = "划重点";

/// Markers that open a comment section (boundary-aware strategy).
pub const COMMENT_START_MARKERS: &[&str] = &[
    "我的留言",
    "用户留言",
    "最新留言",
    "最热留言",
    "只看作者",
    "好的人",
    "这是前提",
    "首次发布:",
    "发布时间:",
    "写留言",
];

/// Higher-precision comment markers (conservative strategy).
pub const DEFINITE_COMMENT_START_MARKERS: &[&str] = &[
    "我的留言",
    "用户留言",
    "最新留言",
    "最热留言",
    "只看作者",
    "评论区",
    "留言区",
];

/// ASCII punctuation counted together with uppercase letters by the
/// shouting/garble check.
const SHOUTING_SYMBOLS: &str = ".,;:!@#$%^&*()_+=-[]{}|\\`~";

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[、．.]").expect("valid numbered-item regex"));

static DATE_STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}年\d{1,2}月\d{1,2}日").expect("valid date regex"));

static UI_SIGNATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // two uppercase runs on one line
        r"[A-Z]{3,}.*[A-Z]{3,}",
        // all-caps line
        r"^\s*[A-Z\s]{10,}$",
        // recurring OCR garble
        r"Qtr|DATA|ABIES|AIEEE",
        r"E\s*制$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid UI signature regex"))
    .collect()
});

/// CJK Unified Ideographs block.
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Length in code points.
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Fraction of code points that are CJK ideographs; 0 for an empty line.
pub fn cjk_ratio(line: &str) -> f64 {
    let total = char_len(line);
    if total == 0 {
        return 0.0;
    }
    let cjk = line.chars().filter(|c| is_cjk(*c)).count();
    cjk as f64 / total as f64
}

/// `1、` / `2.` / `3．` style list item.
pub fn is_numbered_item(line: &str) -> bool {
    NUMBERED_ITEM.is_match(line)
}

pub fn contains_key_points_marker(text: &str) -> bool {
    text.contains(KEY_POINTS_MARKER)
}

pub fn is_comment_start(line: &str) -> bool {
    COMMENT_START_MARKERS.iter().any(|marker| line.contains(marker))
}

pub fn is_definite_comment_start(line: &str) -> bool {
    DEFINITE_COMMENT_START_MARKERS
        .iter()
        .any(|marker| line.contains(marker))
}

/// OCR garbage, UI chrome, metadata stamps and page markers.
pub fn is_noise(line: &str) -> bool {
    let len = char_len(line);

    let shouting = line
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_whitespace() || SHOUTING_SYMBOLS.contains(*c))
        .count();
    if len > 10 && shouting as f64 > len as f64 * 0.7 {
        return true;
    }

    if DATE_STAMP.is_match(line) {
        return true;
    }

    if UI_SIGNATURES.iter().any(|re| re.is_match(line)) {
        return true;
    }

    if len < 5
        && line
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || is_cjk(c)))
    {
        return true;
    }

    is_page_marker(line)
}

/// Noise predicate of the conservative strategy. Currently the same
/// signatures as [`is_noise`].
pub fn is_definite_noise(line: &str) -> bool {
    is_noise(line)
}
