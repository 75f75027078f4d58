//! Page text layout model: blocks, lines, runs and colors.

mod text_run;

pub use text_run::{Color, PageLayout, TextBlock, TextLine, TextRun};
