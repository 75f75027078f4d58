//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use placeholder_oxide::engine::MemoryDocument;
use placeholder_oxide::geometry::Rect;

/// Printable ASCII plus the Turkish letters.
pub fn latin_turkish_charset() -> Vec<char> {
    let mut chars: Vec<char> = (0x20u8..0x7f).map(char::from).collect();
    chars.extend("çğıöşüÇĞİÖŞÜ".chars());
    chars
}

/// Printable ASCII only.
pub fn ascii_charset() -> Vec<char> {
    (0x20u8..0x7f).map(char::from).collect()
}

/// Build a minimal TrueType program mapping every char of `chars` to its
/// own glyph, each `advance` units wide (1000 units per em), padded with
/// trailing zeros to at least `min_len` bytes.
pub fn build_ttf(chars: &[char], advance: u16, min_len: usize) -> Vec<u8> {
    let mut chars: Vec<char> = chars.to_vec();
    chars.sort_unstable();
    chars.dedup();
    let num_glyphs = chars.len() as u16 + 1;

    let cmap = {
        let mut t = Vec::new();
        push_u16(&mut t, 0); // version
        push_u16(&mut t, 1); // one encoding record
        push_u16(&mut t, 3); // Windows
        push_u16(&mut t, 10); // UCS-4
        push_u32(&mut t, 12);
        let groups = chars.len() as u32;
        push_u16(&mut t, 12); // format 12
        push_u16(&mut t, 0);
        push_u32(&mut t, 16 + groups * 12);
        push_u32(&mut t, 0); // language
        push_u32(&mut t, groups);
        for (i, c) in chars.iter().enumerate() {
            push_u32(&mut t, *c as u32);
            push_u32(&mut t, *c as u32);
            push_u32(&mut t, i as u32 + 1);
        }
        t
    };

    let head = {
        let mut t = Vec::new();
        push_u32(&mut t, 0x0001_0000); // version
        push_u32(&mut t, 0x0001_0000); // revision
        push_u32(&mut t, 0); // checksum adjustment
        push_u32(&mut t, 0x5F0F_3CF5); // magic
        push_u16(&mut t, 0); // flags
        push_u16(&mut t, 1000); // units per em
        t.extend_from_slice(&[0; 16]); // created, modified
        for v in [0i16, -200, 1000, 800] {
            push_u16(&mut t, v as u16);
        }
        push_u16(&mut t, 0); // mac style
        push_u16(&mut t, 8); // lowest rec ppem
        push_u16(&mut t, 2); // direction hint
        push_u16(&mut t, 0); // index to loc format
        push_u16(&mut t, 0); // glyph data format
        t
    };

    let hhea = {
        let mut t = Vec::new();
        push_u32(&mut t, 0x0001_0000);
        push_u16(&mut t, 800); // ascender
        push_u16(&mut t, (-200i16) as u16); // descender
        push_u16(&mut t, 0); // line gap
        push_u16(&mut t, advance); // advance width max
        for _ in 0..3 {
            push_u16(&mut t, 0); // min lsb, min rsb, x max extent
        }
        push_u16(&mut t, 1); // caret slope rise
        push_u16(&mut t, 0); // caret slope run
        push_u16(&mut t, 0); // caret offset
        for _ in 0..4 {
            push_u16(&mut t, 0); // reserved
        }
        push_u16(&mut t, 0); // metric data format
        push_u16(&mut t, num_glyphs);
        t
    };

    let hmtx = {
        let mut t = Vec::new();
        for _ in 0..num_glyphs {
            push_u16(&mut t, advance);
            push_u16(&mut t, 0);
        }
        t
    };

    let maxp = {
        let mut t = Vec::new();
        push_u32(&mut t, 0x0000_5000);
        push_u16(&mut t, num_glyphs);
        t
    };

    // table records must be sorted by tag
    let tables: [(&[u8; 4], Vec<u8>); 5] = [(b"cmap", cmap), (b"head", head), (b"hhea", hhea), (b"hmtx", hmtx), (b"maxp", maxp)];

    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_u16(&mut out, tables.len() as u16);
    push_u16(&mut out, 64); // search range
    push_u16(&mut out, 2); // entry selector
    push_u16(&mut out, 16); // range shift

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(*tag);
        push_u32(&mut out, 0); // checksum
        push_u32(&mut out, offset as u32);
        push_u32(&mut out, data.len() as u32);
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend_from_slice(&body);
    if out.len() < min_len {
        out.resize(min_len, 0);
    }
    out
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// A full-size Unicode-capable font (passes the subset cutoff).
pub fn unicode_font() -> Vec<u8> {
    build_ttf(&latin_turkish_charset(), 550, 24_000)
}

/// Write `data` to `dir/name` and return the path.
pub fn write_font(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write font fixture");
    path
}

/// One page with a single line of Helvetica text at (72, 100).
pub fn one_line_document(text: &str, size: f32) -> (MemoryDocument, Rect) {
    let mut doc = MemoryDocument::new();
    let page = doc.add_page(595.0, 842.0);
    let rect = doc.add_text(page, 72.0, 100.0, text, "Helvetica", size).expect("add text");
    (doc, rect)
}

/// Absolute tolerance comparison.
pub fn approx(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}
