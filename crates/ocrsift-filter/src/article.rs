// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Article filter — cuts the document at the first end-of-article marker.

use ocrsift_core::is_page_marker;

use crate::registry::{ContentFilter, FilterInfo};

/// Lines containing any of these end the article body.
pub const END_OF_ARTICLE_MARKERS: &[&str] = &["用户留言", "上一篇", "下一篇"];

/// Keeps every non-blank line before the first end-of-article marker, verbatim.
///
/// Suited to web articles captured as images, where comments and
/// previous/next navigation always follow the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleFilter;

impl ArticleFilter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentFilter for ArticleFilter {
    fn extract_main_content(&self, text: &str) -> String {
        text.lines()
            .take_while(|line| !END_OF_ARTICLE_MARKERS.iter().any(|m| line.contains(m)))
            .filter(|line| !line.trim().is_empty() && !is_page_marker(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn describe(&self) -> FilterInfo {
        FilterInfo::new(
            "article",
            "Truncates at the first comment or previous/next-article marker and keeps everything before it",
        )
    }
}
