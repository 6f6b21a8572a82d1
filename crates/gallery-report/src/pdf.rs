//! Minimal PDF 1.4 writer.
//!
//! Only what the report needs: the two standard Helvetica faces with
//! WinAnsi encoding, JPEG image XObjects, and one content stream per page.
//! Callers work in top-left-origin points; [`ContentBuilder`] flips the y
//! axis into PDF user space.

use std::fmt::Write as _;

use crate::error::{ReportError, Result};
use crate::layout::Rect;

/// Indirect object number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    /// `N 0 R` reference syntax.
    pub fn reference(&self) -> String {
        format!("{} 0 R", self.0)
    }
}

/// Collects indirect objects and serializes them with a cross-reference table.
#[derive(Debug, Default)]
pub struct PdfWriter {
    objects: Vec<Option<Vec<u8>>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an object number to be filled in later with [`set`](Self::set).
    pub fn reserve(&mut self) -> ObjectId {
        self.objects.push(None);
        ObjectId(self.objects.len() as u32)
    }

    /// Fill a reserved object.
    pub fn set(&mut self, id: ObjectId, body: impl Into<Vec<u8>>) {
        if let Some(slot) = self.objects.get_mut(id.0 as usize - 1) {
            *slot = Some(body.into());
        }
    }

    /// Add a finished object.
    pub fn add(&mut self, body: impl Into<Vec<u8>>) -> ObjectId {
        self.objects.push(Some(body.into()));
        ObjectId(self.objects.len() as u32)
    }

    /// Add a stream object. `dict` holds the entries besides `/Length`.
    pub fn add_stream(&mut self, dict: &str, data: &[u8]) -> ObjectId {
        let mut body = format!("<< {} /Length {} >>\nstream\n", dict, data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Serialize the document with `root` as the catalog.
    pub fn finish(self, root: ObjectId) -> Result<Vec<u8>> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, object) in self.objects.into_iter().enumerate() {
            let number = index + 1;
            let body = object.ok_or_else(|| {
                ReportError::JobFailure(format!("PDF object {} was reserved but never written", number))
            })?;
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", number).as_bytes());
            out.extend_from_slice(&body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {} >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            root.reference(),
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        Ok(out)
    }
}

/// The two faces used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Font dictionary for this face.
    pub fn dictionary(&self) -> String {
        format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            self.base_font()
        )
    }

    /// Advance width of `c` in thousandths of the font size.
    fn glyph_width(&self, c: char) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ if c.is_uppercase() => 722,
            _ => match self {
                Font::Regular => 556,
                Font::Bold => 611,
            },
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        f64::from(units) * size / 1000.0
    }
}

/// Shorten `text` with a trailing ellipsis so it fits in `max_width` points.
pub fn truncate_to_width(text: &str, font: Font, size: f64, max_width: f64) -> String {
    if font.text_width(text, size) <= max_width {
        return text.to_string();
    }
    const ELLIPSIS: &str = "...";
    let mut kept = String::new();
    for c in text.chars() {
        kept.push(c);
        if font.text_width(&format!("{}{}", kept, ELLIPSIS), size) > max_width {
            kept.pop();
            break;
        }
    }
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Map a character to its WinAnsi code. Unmappable characters become `?`.
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' | '\n' | '\r' => b' ',
        _ => b'?',
    }
}

/// Encode `text` as a PDF literal string, including the parentheses.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match win_ansi(c) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            byte @ 0x20..=0x7E => out.push(byte as char),
            byte => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push(')');
    out
}

/// Format a coordinate without trailing zeros.
fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Builds one page's content stream.
#[derive(Debug)]
pub struct ContentBuilder {
    page_height: f64,
    ops: String,
}

impl ContentBuilder {
    pub fn new(page_height: f64) -> Self {
        Self {
            page_height,
            ops: String::new(),
        }
    }

    /// Draw `text` with its baseline at `baseline` (top-left coordinates).
    pub fn text(&mut self, font: Font, size: f64, x: f64, baseline: f64, text: &str) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "BT /{} {} Tf {} {} Td {} Tj ET",
            font.resource_name(),
            num(size),
            num(x),
            num(self.page_height - baseline),
            encode_text(text)
        );
        self
    }

    /// Draw `text` centered on `center_x`.
    pub fn centered_text(
        &mut self,
        font: Font,
        size: f64,
        center_x: f64,
        baseline: f64,
        text: &str,
    ) -> &mut Self {
        let x = center_x - font.text_width(text, size) / 2.0;
        self.text(font, size, x, baseline, text)
    }

    /// Paint image XObject `name` into `rect`.
    pub fn image(&mut self, name: &str, rect: &Rect) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "q {} 0 0 {} {} {} cm /{} Do Q",
            num(rect.width),
            num(rect.height),
            num(rect.x),
            num(self.page_height - rect.bottom()),
            name
        );
        self
    }

    /// Stroke the outline of `rect` in light gray.
    pub fn frame(&mut self, rect: &Rect) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "q 0.75 G 0.5 w {} {} {} {} re S Q",
            num(rect.x),
            num(self.page_height - rect.bottom()),
            num(rect.width),
            num(rect.height)
        );
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

/// Dictionary entries for a baseline JPEG image XObject.
pub fn jpeg_image_dict(width: u32, height: u32) -> String {
    format!(
        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
        width, height
    )
}

// Advance widths for characters 32..=126 from the standard Adobe AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];
