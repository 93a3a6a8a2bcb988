// src/selector/mod.rs
//
// Bookmark-driven section selector. Given a filing's outline (a flat,
// level-tagged list of bookmarks in document order) and a set of target
// section keywords, computes the ordered list of 0-based inclusive page
// ranges that make up the sections worth keeping. The hierarchy is never
// materialized as a tree: a candidate's range ends at the first following
// entry at the same or shallower nesting level.

// --- Imports ---
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// --- Constants ---
// Roman-numeral section markers stripped during title normalization.
// DART filings prefix the sections we care about with "II." and "IV.";
// this is a deliberate, narrow literal list, not a Roman-numeral parser.
const SECTION_MARKERS: [&str; 2] = ["II.", "IV."];

// --- Default keyword configuration (Lazy Static) ---
// The six DART section labels targeted for analysis, plus the footnote
// marker ("주석") that disqualifies otherwise-matching entries.
pub static DEFAULT_KEYWORDS: Lazy<SectionKeywords> = Lazy::new(|| SectionKeywords {
    targets: [
        "사업의내용",
        "요약재무정보",
        "연결재무제표",
        "재무제표",
        "배당에관한사항",
        "이사의경영진단",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect(),
    exclusion: "주석".to_string(),
});

// --- Data Structures ---

/// One bookmark node, in document (pre-order traversal) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Nesting depth, 1 = top-level.
    pub level: u32,
    /// Bookmark label, arbitrary Unicode.
    pub title: String,
    /// 1-based page number where the bookmark target begins.
    pub page: u32,
}

impl OutlineEntry {
    pub fn new(level: u32, title: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// An inclusive pair of 0-based page indices marking a contiguous block
/// of pages to retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Number of pages covered by this range (always >= 1).
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Target section labels plus the exclusion marker applied after matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionKeywords {
    pub targets: Vec<String>,
    pub exclusion: String,
}

impl Default for SectionKeywords {
    fn default() -> Self {
        DEFAULT_KEYWORDS.clone()
    }
}

// --- Main Selector ---

pub struct SectionSelector {
    keywords: SectionKeywords,
}

impl SectionSelector {
    pub fn new(keywords: SectionKeywords) -> Self {
        Self { keywords }
    }

    /// Normalizes a bookmark title for matching: strips all whitespace,
    /// then removes the literal "II." / "IV." section markers.
    /// Deterministic and idempotent; the result is never persisted.
    pub fn normalize_title(title: &str) -> String {
        let mut clean: String = title.chars().filter(|c| !c.is_whitespace()).collect();
        for marker in SECTION_MARKERS {
            clean = clean.replace(marker, "");
        }
        clean
    }

    /// Selects the page ranges to keep from a filing's outline.
    ///
    /// An entry is a candidate when its normalized title contains any
    /// target keyword as a substring (case-sensitive); containment of the
    /// exclusion marker always disqualifies it. Each surviving candidate's
    /// range starts at its own page and ends just before the next entry at
    /// the same or shallower level, or at the document end. Ranges that
    /// fail `0 <= start <= end` are dropped (adjacent bookmarks on the
    /// same page produce an inverted range).
    ///
    /// Returns the accepted ranges sorted by start (stable). Overlapping
    /// ranges are NOT coalesced; downstream page-copy processes them in
    /// order and may duplicate pages. An empty result means no section
    /// matched and the caller should fall back to the whole document.
    pub fn select(&self, outline: &[OutlineEntry], total_pages: u32) -> Vec<PageRange> {
        let mut ranges: Vec<PageRange> = Vec::new();

        for (i, entry) in outline.iter().enumerate() {
            let clean_title = Self::normalize_title(&entry.title);

            if !self
                .keywords
                .targets
                .iter()
                .any(|target| clean_title.contains(target.as_str()))
            {
                continue;
            }

            // Exclusion always wins, regardless of which target matched.
            if clean_title.contains(self.keywords.exclusion.as_str()) {
                tracing::debug!(title = %entry.title, "section excluded by footnote marker");
                continue;
            }

            let start_p = entry.page as i64 - 1; // convert to 0-based

            // The range runs until the next bookmark at the same or a
            // shallower level; without one it runs to the document end.
            let mut end_p = total_pages as i64 - 1;
            for next in &outline[i + 1..] {
                if next.level <= entry.level {
                    end_p = next.page as i64 - 2; // page immediately before the boundary
                    break;
                }
            }

            if 0 <= start_p && start_p <= end_p {
                tracing::info!(
                    title = %entry.title,
                    start = start_p + 1,
                    end = end_p + 1,
                    "section selected"
                );
                ranges.push(PageRange {
                    start: start_p as u32,
                    end: end_p as u32,
                });
            } else {
                tracing::debug!(
                    title = %entry.title,
                    start = start_p,
                    end = end_p,
                    "dropping invalid page range"
                );
            }
        }

        // Sort by start only; overlapping ranges are kept as-is.
        ranges.sort_by_key(|r| r.start);
        ranges
    }
}

impl Default for SectionSelector {
    fn default() -> Self {
        Self::new(SectionKeywords::default())
    }
}
