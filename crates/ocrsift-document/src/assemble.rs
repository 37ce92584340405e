// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembly — page texts joined under page markers.

use ocrsift_core::{DocumentText, PageText, page_marker};

/// Join pages in page-number order. Every page gets its marker line, even when
/// its text is empty, followed by the text and a blank line.
pub fn assemble(mut pages: Vec<PageText>) -> DocumentText {
    pages.sort_by_key(|page| page.page_number);

    let mut out = String::new();
    for page in &pages {
        out.push_str(&page_marker(page.page_number));
        out.push('\n');
        out.push_str(page.text.trim_end());
        out.push_str("\n\n");
    }
    DocumentText::new(out)
}
