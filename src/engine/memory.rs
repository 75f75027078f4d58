//! In-memory document engine.
//!
//! Pages hold a block/line/run text layout, painted rectangles and a font
//! table. Redaction removes the characters whose interpolated centre lies
//! inside a redaction rectangle and keeps paint. Rasterization samples the
//! painted rectangles over the page background (glyphs are not rendered).
//! Text drawn by the pipeline re-enters the text layer, so literal search
//! finds replacement values the same way it finds original text.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{
    DocumentEngine, DocumentId, DrawOutcome, DrawSpec, FontExtension, FontHandle, FontId, FontMetrics,
    FontPayload, FontRecord, FontSource, FormField, LaidOutLine, PixelSamples, TextAlign, TextAnnotation,
    TextBoxLayout,
};
use crate::error::{Error, Result};
use crate::fonts::{builtin_family_for, builtin_variant_name, strip_subset_prefix, BuiltinFont, FontProgram, FontStyle};
use crate::geometry::{Point, Rect};
use crate::layout::{Color, PageLayout, TextBlock, TextLine, TextRun};
use crate::search::find_literal;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Largest rasterization grid along either axis.
const MAX_SAMPLES_PER_AXIS: usize = 64;

/// Line advance as a multiple of the font's ascender-to-descender extent.
const LINE_SPACING: f32 = 1.2;

/// Engine operations that can be made to fail for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fault {
    /// `rasterize` fails
    Rasterize,
    /// `queue_redaction` and `apply_redactions` fail
    Redact,
    /// `paint_rect` fails for rectangles starting at or right of `min_x`
    Paint {
        /// Left edge threshold in points
        min_x: u32,
    },
}

/// An opaque painted rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintedRect {
    /// Area
    pub rect: Rect,
    /// Fill colour
    pub color: Color,
}

#[derive(Debug, Clone)]
pub(crate) struct MemoryPage {
    pub(crate) bounds: Rect,
    pub(crate) background: Color,
    pub(crate) blocks: Vec<TextBlock>,
    pub(crate) fills: Vec<PaintedRect>,
    pub(crate) pending: Vec<Rect>,
    pub(crate) annotations: Vec<TextAnnotation>,
    pub(crate) form_fields: Vec<FormField>,
    pub(crate) fonts: Vec<FontId>,
    pub(crate) faults: HashSet<Fault>,
}

impl MemoryPage {
    fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            background: Color::white(),
            blocks: Vec::new(),
            fills: Vec::new(),
            pending: Vec::new(),
            annotations: Vec::new(),
            form_fields: Vec::new(),
            fonts: Vec::new(),
            faults: HashSet::new(),
        }
    }
}

/// A font table entry.
#[derive(Debug, Clone)]
pub(crate) struct TableFont {
    pub(crate) record: FontRecord,
    pub(crate) payload: FontPayload,
    pub(crate) file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum LoadedFont {
    Builtin(BuiltinFont),
    Program(FontProgram),
}

impl LoadedFont {
    fn label(&self) -> String {
        match self {
            LoadedFont::Builtin(font) => font.name().to_string(),
            LoadedFont::Program(program) => program
                .postscript_name()
                .unwrap_or_else(|| program.name())
                .to_string(),
        }
    }

    fn covers(&self, text: &str) -> bool {
        match self {
            LoadedFont::Builtin(font) => font.covers(text),
            LoadedFont::Program(program) => program.covers(text),
        }
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            LoadedFont::Builtin(font) => font.text_width(text, size),
            LoadedFont::Program(program) => program.text_width(text, size),
        }
    }

    fn metrics(&self) -> FontMetrics {
        match self {
            LoadedFont::Builtin(font) => font.metrics(),
            LoadedFont::Program(program) => program.metrics(),
        }
    }
}

/// A complete document held in memory.
#[derive(Debug)]
pub struct MemoryDocument {
    id: DocumentId,
    pub(crate) pages: Vec<MemoryPage>,
    pub(crate) font_table: Vec<TableFont>,
    loaded: Vec<LoadedFont>,
    builtin_handles: HashMap<&'static str, FontHandle>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create an empty document with a fresh id.
    pub fn new() -> Self {
        Self {
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            pages: Vec::new(),
            font_table: Vec::new(),
            loaded: Vec::new(),
            builtin_handles: HashMap::new(),
        }
    }

    /// Append a page and return its index.
    pub fn add_page(&mut self, width: f32, height: f32) -> usize {
        self.pages.push(MemoryPage::new(Rect::new(0.0, 0.0, width, height)));
        self.pages.len() - 1
    }

    fn page(&self, page: usize) -> Result<&MemoryPage> {
        let count = self.pages.len();
        self.pages.get(page).ok_or(Error::PageOutOfRange { page, count })
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut MemoryPage> {
        let count = self.pages.len();
        self.pages.get_mut(page).ok_or(Error::PageOutOfRange { page, count })
    }

    /// Set the page background colour.
    pub fn set_background(&mut self, page: usize, color: Color) -> Result<()> {
        self.page_mut(page)?.background = color;
        Ok(())
    }

    /// Make an engine operation fail on a page.
    pub fn set_fault(&mut self, page: usize, fault: Fault) -> Result<()> {
        self.page_mut(page)?.faults.insert(fault);
        Ok(())
    }

    /// Append a line of runs as its own block.
    ///
    /// Fonts named by the runs and missing from the page's font table are
    /// registered as non-embedded.
    pub fn add_line(&mut self, page: usize, runs: Vec<TextRun>) -> Result<()> {
        self.page(page)?;
        for run in &runs {
            self.register_font_name(page, &run.font_name)?;
        }
        self.page_mut(page)?.blocks.push(TextBlock::new(vec![TextLine::new(runs)]));
        Ok(())
    }

    /// Lay out `text` as a single run measured with built-in metrics and
    /// return its rectangle. `top` is the top edge of the run.
    pub fn add_text(&mut self, page: usize, x: f32, top: f32, text: &str, font_name: &str, size: f32) -> Result<Rect> {
        self.add_text_runs(page, x, top, &[text], font_name, size, Color::black())
    }

    /// Lay out consecutive runs on one line, as an engine would report text
    /// whose drawing was split into several show operations.
    #[allow(clippy::too_many_arguments)]
    pub fn add_text_runs(
        &mut self,
        page: usize,
        x: f32,
        top: f32,
        pieces: &[&str],
        font_name: &str,
        size: f32,
        color: Color,
    ) -> Result<Rect> {
        let font = self.measuring_font(font_name);
        let metrics = font.metrics();
        let height = metrics.extent() * size;
        let mut cursor = x;
        let mut runs = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let width = font.text_width(piece, size);
            runs.push(TextRun::new(
                *piece,
                Rect::new(cursor, top, cursor + width, top + height),
                font_name,
                size,
                color,
            ));
            cursor += width;
        }
        let rect = Rect::new(x, top, cursor, top + height);
        self.add_line(page, runs)?;
        Ok(rect)
    }

    /// Metrics used to lay out text in `font_name`: an embedded program of
    /// that name if the document has one, else the closest built-in font.
    fn measuring_font(&self, font_name: &str) -> LoadedFont {
        let embedded = self
            .font_table
            .iter()
            .filter(|f| f.record.name == font_name || f.record.base_name == strip_subset_prefix(font_name))
            .find_map(|f| FontProgram::parse(f.record.name.clone(), f.payload.bytes.clone()).ok());
        if let Some(program) = embedded {
            return LoadedFont::Program(program);
        }
        let builtin = BuiltinFont::by_name(font_name)
            .or_else(|| BuiltinFont::by_name(builtin_variant_name(builtin_family_for(font_name), FontStyle::Normal)));
        match builtin {
            Some(font) => LoadedFont::Builtin(font),
            None => LoadedFont::Builtin(BuiltinFont::helvetica()),
        }
    }

    pub(crate) fn register_font_name(&mut self, page: usize, name: &str) -> Result<()> {
        let existing = self.font_table.iter().find(|f| f.record.name == name).map(|f| f.record.id);
        let id = match existing {
            Some(id) => id,
            None => self.push_table_font(name, FontExtension::Unknown, Vec::new(), None),
        };
        let fonts = &mut self.page_mut(page)?.fonts;
        if !fonts.contains(&id) {
            fonts.push(id);
        }
        Ok(())
    }

    pub(crate) fn push_table_font(&mut self, name: &str, extension: FontExtension, bytes: Vec<u8>, file: Option<PathBuf>) -> FontId {
        let id = FontId(self.font_table.len() as u32 + 1);
        self.font_table.push(TableFont {
            record: FontRecord {
                id,
                name: name.to_string(),
                base_name: strip_subset_prefix(name).to_string(),
            },
            payload: FontPayload { extension, bytes },
            file,
        });
        id
    }

    /// Add an embedded font program to the page's font table.
    pub fn add_embedded_font(&mut self, page: usize, name: &str, extension: FontExtension, bytes: Vec<u8>) -> Result<FontId> {
        self.page(page)?;
        let id = self.push_table_font(name, extension, bytes, None);
        self.page_mut(page)?.fonts.push(id);
        Ok(id)
    }

    /// Add an embedded font read from a file to the page's font table.
    pub fn add_embedded_font_file(&mut self, page: usize, name: &str, path: impl Into<PathBuf>) -> Result<FontId> {
        self.page(page)?;
        let path = path.into();
        let bytes = std::fs::read(&path)?;
        let id = self.push_table_font(name, FontExtension::from_path(&path), bytes, Some(path));
        self.page_mut(page)?.fonts.push(id);
        Ok(id)
    }

    /// Add a FreeText annotation.
    pub fn add_annotation(&mut self, page: usize, annotation: TextAnnotation) -> Result<()> {
        self.page_mut(page)?.annotations.push(annotation);
        Ok(())
    }

    /// Add a text form field.
    pub fn add_form_field(&mut self, page: usize, field: FormField) -> Result<()> {
        self.page_mut(page)?.form_fields.push(field);
        Ok(())
    }

    /// Text of a page, one line per text line.
    pub fn page_text(&self, page: usize) -> Result<String> {
        let page = self.page(page)?;
        let lines: Vec<String> = page.blocks.iter().flat_map(|b| b.lines.iter()).map(TextLine::text).collect();
        Ok(lines.join("\n"))
    }

    /// Painted rectangles of a page, oldest first.
    pub fn fills(&self, page: usize) -> Result<&[PaintedRect]> {
        Ok(&self.page(page)?.fills)
    }

    /// Redactions queued on a page and not yet applied.
    pub fn pending_redactions(&self, page: usize) -> Result<&[Rect]> {
        Ok(&self.page(page)?.pending)
    }

    fn check_fault(&self, page: usize, fault: Fault) -> Result<()> {
        if self.page(page)?.faults.contains(&fault) {
            return Err(Error::Engine(format!("{:?} fault injected on page {}", fault, page)));
        }
        Ok(())
    }

    fn loaded(&self, font: FontHandle) -> Result<&LoadedFont> {
        self.loaded
            .get(font.0 as usize)
            .ok_or_else(|| Error::Engine(format!("unknown font handle {}", font.0)))
    }

    fn push_loaded(&mut self, font: LoadedFont) -> FontHandle {
        self.loaded.push(font);
        FontHandle(self.loaded.len() as u32 - 1)
    }

    fn push_drawn_line(&mut self, page: usize, runs: Vec<TextRun>) -> Result<()> {
        let page = self.page_mut(page)?;
        page.blocks.push(TextBlock::new(vec![TextLine::new(runs)]));
        Ok(())
    }
}

/// Remove every character whose interpolated centre lies in one of `areas`.
fn redact_line(line: &TextLine, areas: &[Rect]) -> TextLine {
    let mut runs = Vec::new();
    for run in &line.runs {
        let chars: Vec<char> = run.text.chars().collect();
        let n = chars.len();
        let mut kept_from: Option<usize> = None;
        let flush = |from: usize, to: usize, runs: &mut Vec<TextRun>| {
            let mut piece = run.clone();
            piece.text = chars[from..to].iter().collect();
            piece.rect = run.span_rect(from, to);
            runs.push(piece);
        };
        for i in 0..n {
            let center = run.span_rect(i, i + 1).center();
            let removed = areas.iter().any(|a| a.contains_point(&center));
            match (removed, kept_from) {
                (false, None) => kept_from = Some(i),
                (true, Some(from)) => {
                    flush(from, i, &mut runs);
                    kept_from = None;
                },
                _ => {},
            }
        }
        if let Some(from) = kept_from {
            flush(from, n, &mut runs);
        }
    }
    TextLine::new(runs)
}

impl DocumentEngine for MemoryDocument {
    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_bounds(&self, page: usize) -> Result<Rect> {
        Ok(self.page(page)?.bounds)
    }

    fn page_layout(&self, page: usize) -> Result<PageLayout> {
        let p = self.page(page)?;
        Ok(PageLayout {
            page,
            bounds: p.bounds,
            blocks: p.blocks.clone(),
        })
    }

    fn search_literal(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        Ok(find_literal(&self.page_layout(page)?, needle))
    }

    fn paint_rect(&mut self, page: usize, rect: Rect, color: Color) -> Result<()> {
        let blocked = self.page(page)?.faults.iter().any(|f| match f {
            Fault::Paint { min_x } => rect.x0 >= *min_x as f32,
            _ => false,
        });
        if blocked {
            return Err(Error::Engine(format!("paint fault injected on page {}", page)));
        }
        self.page_mut(page)?.fills.push(PaintedRect { rect, color });
        Ok(())
    }

    fn queue_redaction(&mut self, page: usize, rect: Rect) -> Result<()> {
        self.check_fault(page, Fault::Redact)?;
        self.page_mut(page)?.pending.push(rect);
        Ok(())
    }

    fn apply_redactions(&mut self, page: usize) -> Result<usize> {
        self.check_fault(page, Fault::Redact)?;
        let p = self.page_mut(page)?;
        let areas = std::mem::take(&mut p.pending);
        if areas.is_empty() {
            return Ok(0);
        }
        for block in &mut p.blocks {
            for line in &mut block.lines {
                *line = redact_line(line, &areas);
            }
            block.lines.retain(|l| !l.runs.is_empty());
        }
        p.blocks.retain(|b| !b.lines.is_empty());
        log::debug!("applied {} redactions on page {}", areas.len(), page);
        Ok(areas.len())
    }

    fn rasterize(&self, page: usize, rect: Rect) -> Result<PixelSamples> {
        self.check_fault(page, Fault::Rasterize)?;
        let p = self.page(page)?;
        let Some(area) = rect.intersection(&p.bounds) else {
            return Ok(PixelSamples::default());
        };
        let width = (area.width().ceil() as usize).clamp(1, MAX_SAMPLES_PER_AXIS);
        let height = (area.height().ceil() as usize).clamp(1, MAX_SAMPLES_PER_AXIS);
        let mut rgb = Vec::with_capacity(width * height * 3);
        for row in 0..height {
            let y = area.y0 + (row as f32 + 0.5) * area.height() / height as f32;
            for col in 0..width {
                let x = area.x0 + (col as f32 + 0.5) * area.width() / width as f32;
                let point = Point::new(x, y);
                let color = p
                    .fills
                    .iter()
                    .rev()
                    .find(|f| f.rect.contains_point(&point))
                    .map(|f| f.color)
                    .unwrap_or(p.background);
                rgb.extend_from_slice(&color.to_rgb8());
            }
        }
        Ok(PixelSamples { width, height, rgb })
    }

    fn list_fonts(&self, page: usize) -> Result<Vec<FontRecord>> {
        let p = self.page(page)?;
        Ok(p
            .fonts
            .iter()
            .filter_map(|id| self.font_table.iter().find(|f| f.record.id == *id))
            .map(|f| f.record.clone())
            .collect())
    }

    fn extract_font(&self, id: FontId) -> Result<FontPayload> {
        self.font_table
            .iter()
            .find(|f| f.record.id == id)
            .map(|f| f.payload.clone())
            .ok_or_else(|| Error::Engine(format!("unknown font id {}", id.0)))
    }

    fn embed_font(&mut self, source: FontSource<'_>) -> Result<FontHandle> {
        let program = match source {
            FontSource::Bytes { name, data } => FontProgram::parse(name, data.to_vec())?,
            FontSource::Path(path) => FontProgram::from_file(path)?,
        };
        log::debug!("embedded font {} ({} bytes)", program.name(), program.byte_len());
        Ok(self.push_loaded(LoadedFont::Program(program)))
    }

    fn builtin_font(&mut self, name: &str) -> Result<FontHandle> {
        let font = BuiltinFont::by_name(name).ok_or_else(|| Error::Font(format!("no built-in font named {}", name)))?;
        if let Some(handle) = self.builtin_handles.get(font.name()) {
            return Ok(*handle);
        }
        let key = font.name();
        let handle = self.push_loaded(LoadedFont::Builtin(font));
        self.builtin_handles.insert(key, handle);
        Ok(handle)
    }

    fn font_metrics(&self, font: FontHandle) -> Result<FontMetrics> {
        Ok(self.loaded(font)?.metrics())
    }

    fn covers_text(&self, font: FontHandle, text: &str) -> Result<bool> {
        Ok(self.loaded(font)?.covers(text))
    }

    fn measure_width(&self, text: &str, font: FontHandle, size: f32) -> Result<f32> {
        Ok(self.loaded(font)?.text_width(text, size))
    }

    fn layout_text_box(&self, rect: Rect, spec: &DrawSpec<'_>) -> Result<TextBoxLayout> {
        let font = self.loaded(spec.font)?;
        let size = spec.size;
        let line_height = font.metrics().extent() * size * LINE_SPACING;
        let max_width = rect.width();
        let space_width = font.text_width(" ", size);

        let mut wrapped: Vec<(String, f32)> = Vec::new();
        for paragraph in spec.text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0;
            for word in paragraph.split_whitespace() {
                let word_width = font.text_width(word, size);
                if current.is_empty() {
                    current = word.to_string();
                    current_width = word_width;
                } else if current_width + space_width + word_width <= max_width {
                    current.push(' ');
                    current.push_str(word);
                    current_width += space_width + word_width;
                } else {
                    wrapped.push((std::mem::take(&mut current), current_width));
                    current = word.to_string();
                    current_width = word_width;
                }
            }
            if !current.is_empty() {
                wrapped.push((current, current_width));
            }
        }

        let max_lines = if line_height > 0.0 {
            ((rect.height() + 0.01) / line_height).floor() as usize
        } else {
            0
        };
        let too_wide = wrapped.iter().any(|(_, w)| *w > max_width + 0.01);
        let overflow = too_wide || wrapped.len() > max_lines;
        wrapped.truncate(max_lines);

        Ok(TextBoxLayout {
            lines: wrapped
                .into_iter()
                .map(|(text, width)| LaidOutLine { text, width })
                .collect(),
            line_height,
            overflow,
        })
    }

    fn draw_text_in_rect(&mut self, page: usize, rect: Rect, spec: &DrawSpec<'_>) -> Result<DrawOutcome> {
        self.page(page)?;
        let layout = self.layout_text_box(rect, spec)?;
        let font = self.loaded(spec.font)?;
        let label = font.label();
        let ascender = font.metrics().ascender;
        for (i, line) in layout.lines.iter().enumerate() {
            let x = match spec.align {
                TextAlign::Left => rect.x0,
                TextAlign::Center => rect.x0 + (rect.width() - line.width) / 2.0,
                TextAlign::Right => rect.x1 - line.width,
            };
            let baseline = rect.y0 + i as f32 * layout.line_height + ascender * spec.size;
            let run = self.drawn_run(spec, &label, line.text.clone(), Point::new(x, baseline))?;
            self.push_drawn_line(page, vec![run])?;
        }
        Ok(DrawOutcome {
            overflow: layout.overflow,
        })
    }

    fn draw_text_at(&mut self, page: usize, origin: Point, spec: &DrawSpec<'_>) -> Result<()> {
        self.page(page)?;
        let label = self.loaded(spec.font)?.label();
        let run = self.drawn_run(spec, &label, spec.text.to_string(), origin)?;
        self.push_drawn_line(page, vec![run])
    }

    fn text_annotations(&self, page: usize) -> Result<Vec<TextAnnotation>> {
        Ok(self.page(page)?.annotations.clone())
    }

    fn form_fields(&self, page: usize) -> Result<Vec<FormField>> {
        Ok(self.page(page)?.form_fields.clone())
    }
}

impl MemoryDocument {
    /// Run for text drawn with its baseline at `origin`.
    fn drawn_run(&self, spec: &DrawSpec<'_>, label: &str, text: String, origin: Point) -> Result<TextRun> {
        let font = self.loaded(spec.font)?;
        let metrics = font.metrics();
        let width = font.text_width(&text, spec.size);
        let font_name = match spec.synthetic {
            FontStyle::Normal => label.to_string(),
            style => format!("{}+{:?}", label, style),
        };
        Ok(TextRun::new(
            text,
            Rect::new(
                origin.x,
                origin.y - metrics.ascender * spec.size,
                origin.x + width,
                origin.y - metrics.descender * spec.size,
            ),
            font_name,
            spec.size,
            spec.color,
        ))
    }
}
