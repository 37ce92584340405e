// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DJG filter — strategy for book-like documents with page furniture.
//
// Strips headers/footers, UI chrome and metadata lines, keeps chapter titles,
// and re-flows the remaining body lines into paragraphs.

use std::sync::LazyLock;

use ocrsift_core::is_page_marker;
use regex::{Regex, RegexSet};

use crate::registry::{ContentFilter, FilterInfo};
use crate::signals::{char_len, cjk_ratio, is_cjk};

static HEADER_FOOTER: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^\s*\d+\s*$",
        r"页码",
        r"第.*页",
        r"共.*页",
        r"版权所有",
        r"Copyright",
        r"© 20\d{2}",
        r"\d{4}年\d{1,2}月",
        r"保留所有权利",
    ])
    .expect("valid header/footer patterns")
});

static CHAPTER_TITLE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^第[一二三四五六七八九十\d]+章",
        r"^\d+\.\d+",
        r"^[一二三四五六七八九十]+、",
        r"^\d+[、．]",
    ])
    .expect("valid chapter patterns")
});

static METADATA: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\d{4}-\d{2}-\d{2}",
        r"\d{2}:\d{2}:\d{2}",
        r"作者[:：]",
        r"发布时间[:：]",
        r"来源[:：]",
        r"字数[:：]\d+",
    ])
    .expect("valid metadata patterns")
});

static MERGE_LEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z，。；：]").expect("valid merge lead regex"));

const UI_KEYWORDS: &[&str] = &[
    "点击", "按钮", "菜单", "链接", "返回", "下一页", "上一页", "确定", "取消", "提交", "重置",
    "登录", "注册", "Click", "Button", "Menu", "Link",
];

/// Book-style strategy, registered as `djg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DjgFilter;

impl DjgFilter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentFilter for DjgFilter {
    fn extract_main_content(&self, text: &str) -> String {
        let kept: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !is_page_marker(line))
            .filter(|line| {
                if is_header_footer(line) {
                    return false;
                }
                if is_chapter_title(line) {
                    return true;
                }
                !is_ui_element(line) && !is_metadata(line) && is_main_content(line)
            })
            .collect();
        merge_paragraphs(&kept)
    }

    fn describe(&self) -> FilterInfo {
        FilterInfo::new(
            "djg",
            "Book-style filter: drops headers, footers, UI text and metadata, keeps chapter titles, re-flows paragraphs",
        )
    }
}

fn is_header_footer(line: &str) -> bool {
    HEADER_FOOTER.is_match(line)
}

fn is_chapter_title(line: &str) -> bool {
    CHAPTER_TITLE.is_match(line)
}

fn is_metadata(line: &str) -> bool {
    METADATA.is_match(line)
}

/// Neither CJK, word character nor whitespace.
fn is_symbol(c: char) -> bool {
    !(is_cjk(c) || c.is_alphanumeric() || c == '_' || c.is_whitespace())
}

fn symbol_ratio(line: &str) -> f64 {
    let len = char_len(line);
    if len == 0 {
        return 0.0;
    }
    line.chars().filter(|c| is_symbol(*c)).count() as f64 / len as f64
}

fn is_ui_element(line: &str) -> bool {
    if char_len(line) < 15 && UI_KEYWORDS.iter().any(|k| line.contains(k)) {
        return true;
    }
    symbol_ratio(line) > 0.5
}

fn is_main_content(line: &str) -> bool {
    let len = char_len(line);
    if len < 5 {
        return false;
    }
    let ratio = cjk_ratio(line);
    if ratio > 0.3 && len > 8 {
        return true;
    }
    ratio < 0.1 && len > 10 && !is_gibberish(line)
}

fn is_gibberish(line: &str) -> bool {
    has_repeated_run(line, 5) || symbol_ratio(line) > 0.6
}

/// Whether some character repeats at least `run` times in a row.
fn has_repeated_run(line: &str, run: usize) -> bool {
    let mut previous = None;
    let mut count = 0;
    for c in line.chars() {
        if Some(c) == previous {
            count += 1;
        } else {
            previous = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

/// Join body lines into paragraphs. Chapter titles always stand alone;
/// paragraphs are separated by a blank line.
fn merge_paragraphs(lines: &[&str]) -> String {
    let mut merged: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for &line in lines {
        if is_chapter_title(line) {
            if !current.is_empty() {
                merged.push(current.join(" "));
                current.clear();
            }
            merged.push(line.to_string());
        } else if should_merge(line, &current) {
            current.push(line);
        } else {
            if !current.is_empty() {
                merged.push(current.join(" "));
            }
            current = vec![line];
        }
    }
    if !current.is_empty() {
        merged.push(current.join(" "));
    }

    merged.join("\n\n")
}

fn should_merge(line: &str, current: &[&str]) -> bool {
    current.is_empty() || char_len(line) < 30 || MERGE_LEAD.is_match(line)
}
