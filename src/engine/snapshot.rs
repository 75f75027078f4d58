//! JSON snapshots of in-memory documents.
//!
//! A snapshot stores page geometry, the text layout, painted rectangles,
//! annotations, form fields and the font table. Embedded font programs are
//! referenced by file path rather than inlined.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::memory::{MemoryDocument, PaintedRect};
use super::{DocumentEngine, FontExtension, FormField, TextAnnotation};
use crate::error::Result;
use crate::layout::{Color, TextBlock};

/// One page of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Background colour
    #[serde(default = "Color::white")]
    pub background: Color,
    /// Text layout
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
    /// Painted rectangles, oldest first
    #[serde(default)]
    pub fills: Vec<PaintedRect>,
    /// FreeText annotations
    #[serde(default)]
    pub annotations: Vec<TextAnnotation>,
    /// Text form fields
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

/// One font table entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSnapshot {
    /// Name as recorded in the document
    pub name: String,
    /// Program format
    #[serde(default = "unknown_extension")]
    pub extension: FontExtension,
    /// Program file, absent for non-embedded fonts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Pages whose font table lists the font
    #[serde(default)]
    pub pages: Vec<usize>,
}

fn unknown_extension() -> FontExtension {
    FontExtension::Unknown
}

/// Serializable form of a [`MemoryDocument`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Pages in order
    pub pages: Vec<PageSnapshot>,
    /// Font table
    #[serde(default)]
    pub fonts: Vec<FontSnapshot>,
}

impl LayoutSnapshot {
    /// Capture a document.
    pub fn from_document(doc: &MemoryDocument) -> Self {
        let pages = doc
            .pages
            .iter()
            .map(|p| PageSnapshot {
                width: p.bounds.width(),
                height: p.bounds.height(),
                background: p.background,
                blocks: p.blocks.clone(),
                fills: p.fills.clone(),
                annotations: p.annotations.clone(),
                form_fields: p.form_fields.clone(),
            })
            .collect();
        let fonts = doc
            .font_table
            .iter()
            .map(|f| FontSnapshot {
                name: f.record.name.clone(),
                extension: f.payload.extension,
                file: f.file.clone(),
                pages: doc
                    .pages
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.fonts.contains(&f.record.id))
                    .map(|(i, _)| i)
                    .collect(),
            })
            .collect();
        Self { pages, fonts }
    }

    /// Rebuild a document. Font files are read from disk.
    pub fn to_document(&self) -> Result<MemoryDocument> {
        let mut doc = MemoryDocument::new();
        for page in &self.pages {
            let index = doc.add_page(page.width, page.height);
            doc.set_background(index, page.background)?;
            for annotation in &page.annotations {
                doc.add_annotation(index, annotation.clone())?;
            }
            for field in &page.form_fields {
                doc.add_form_field(index, field.clone())?;
            }
        }

        for font in &self.fonts {
            let bytes = match &font.file {
                Some(path) => std::fs::read(path)?,
                None => Vec::new(),
            };
            let id = doc.push_table_font(&font.name, font.extension, bytes, font.file.clone());
            for &page in &font.pages {
                if let Some(p) = doc.pages.get_mut(page) {
                    p.fonts.push(id);
                }
            }
        }

        for (index, page) in self.pages.iter().enumerate() {
            for block in &page.blocks {
                for run in block.lines.iter().flat_map(|l| l.runs.iter()) {
                    doc.register_font_name(index, &run.font_name)?;
                }
            }
            for fill in &page.fills {
                doc.paint_rect(index, fill.rect, fill.color)?;
            }
            if let Some(p) = doc.pages.get_mut(index) {
                p.blocks = page.blocks.clone();
            }
        }
        Ok(doc)
    }

    /// Parse a snapshot from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Write the snapshot to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
