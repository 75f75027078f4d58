//! Text search over page layouts.
//!
//! Regex or literal search with position tracking, returning one bounding
//! box per match. This is the literal-search primitive engines expose and
//! the fallback geometry source of detection.
//!
//! ## Example
//!
//! ```
//! use placeholder_oxide::engine::{DocumentEngine, MemoryDocument};
//! use placeholder_oxide::search::{SearchOptions, TextSearcher};
//!
//! let mut doc = MemoryDocument::new();
//! let page = doc.add_page(595.0, 842.0);
//! doc.add_text(page, 72.0, 100.0, "Invoice {{number}}", "Helvetica", 12.0).unwrap();
//!
//! let layout = doc.page_layout(page).unwrap();
//! let results = TextSearcher::search(&layout, "{{number}}", &SearchOptions::literal()).unwrap();
//! assert_eq!(results.len(), 1);
//! ```

mod text_search;

pub use text_search::{find_literal, SearchOptions, SearchResult, TextSearcher};
