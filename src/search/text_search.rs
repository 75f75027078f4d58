//! Text search implementation with regex support.
//!
//! Matches are found per line in the concatenated run text and mapped back
//! to page space by interpolating inside each contributing run.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::layout::{PageLayout, TextLine};
use regex::Regex;

/// A search result with position information.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Page number (0-indexed) where the match was found
    pub page: usize,
    /// The matched text
    pub text: String,
    /// Bounding box of the match on the page
    pub bbox: Rect,
    /// Index of the line (in reading order) holding the match
    pub line_index: usize,
    /// Start character offset in the line text
    pub start_index: usize,
    /// End character offset in the line text (exclusive)
    pub end_index: usize,
    /// One box per run that makes up the match
    pub span_boxes: Vec<Rect>,
}

/// Options for text search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Treat pattern as literal text (not regex)
    pub literal: bool,
}

impl SearchOptions {
    /// Regex search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive literal search.
    pub fn literal() -> Self {
        Self { literal: true }
    }
}

/// Text searcher over page layouts.
pub struct TextSearcher;

impl TextSearcher {
    /// Search one page layout.
    ///
    /// Matches never cross line boundaries.
    pub fn search(layout: &PageLayout, pattern: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let regex = Self::build_regex(pattern, options)?;
        let mut results = Vec::new();

        for (line_index, line) in layout.lines().enumerate() {
            let text = line.text();
            let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
            let to_char = |byte: usize| char_starts.partition_point(|&b| b < byte);

            for mat in regex.find_iter(&text) {
                if mat.as_str().is_empty() {
                    continue;
                }
                let start = to_char(mat.start());
                let end = to_char(mat.end());
                let span_boxes = Self::span_boxes(line, start, end);
                let Some(bbox) = span_boxes.iter().copied().reduce(|a, b| a.union(&b)) else {
                    continue;
                };
                results.push(SearchResult {
                    page: layout.page,
                    text: mat.as_str().to_string(),
                    bbox,
                    line_index,
                    start_index: start,
                    end_index: end,
                    span_boxes,
                });
            }
        }

        Ok(results)
    }

    /// Build regex from pattern and options.
    fn build_regex(pattern: &str, options: &SearchOptions) -> Result<Regex> {
        let pattern = if options.literal {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };
        Regex::new(&pattern).map_err(|e| Error::InvalidConfig(format!("Invalid search pattern: {}", e)))
    }

    /// Interpolated boxes of characters `start..end` of a line, one per run.
    fn span_boxes(line: &TextLine, start: usize, end: usize) -> Vec<Rect> {
        let mut boxes = Vec::new();
        let mut pos = 0;
        for run in &line.runs {
            let n = run.char_count();
            let ov0 = start.max(pos);
            let ov1 = end.min(pos + n);
            if ov0 < ov1 {
                boxes.push(run.span_rect(ov0 - pos, ov1 - pos));
            }
            pos += n;
        }
        boxes
    }
}

/// Rectangles of every exact occurrence of `needle` on a page.
pub fn find_literal(layout: &PageLayout, needle: &str) -> Vec<Rect> {
    if needle.is_empty() {
        return Vec::new();
    }
    TextSearcher::search(layout, needle, &SearchOptions::literal())
        .map(|results| results.into_iter().map(|r| r.bbox).collect())
        .unwrap_or_default()
}
