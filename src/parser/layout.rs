//! Layout analysis for PDF pages.
//!
//! Interprets the text operators of a page's content stream into positioned
//! spans, then groups spans into lines and lines into blocks. Coordinates
//! here are page space (origin bottom-left, after the CTM); conversion to
//! the top-left model coordinates happens when blocks are built.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::{BBox, Line, Span, TextBlock};

use super::graphics::{
    lookup_xobject, page_resources, resource_fonts, GraphicsState, Matrix, XObject, MAX_FORM_DEPTH,
};

/// Average glyph width as a fraction of the font size, used when the font's
/// real metrics are not consulted.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// A text span with position and style information, in PDF coordinates.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    /// Create a new text span, estimating its width from the font size.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Convert to a model span on a page of the given height.
    pub fn to_span(&self, page_height: f32) -> Span {
        Span::new(
            self.text.clone(),
            self.font_size,
            self.font_name.clone(),
            BBox::new(
                self.x,
                page_height - self.top(),
                self.x + self.width,
                page_height - self.bottom(),
            ),
        )
    }
}

/// A text line composed of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Convert to a model line on a page of the given height.
    ///
    /// A separating space is added to a span when the horizontal gap to its
    /// predecessor suggests a word break that the text itself lacks.
    pub fn to_line(&self, page_height: f32) -> Line {
        let mut spans: Vec<Span> = Vec::with_capacity(self.spans.len());
        for (i, span) in self.spans.iter().enumerate() {
            let mut model = span.to_span(page_height);
            if i > 0 && needs_space(&self.spans[i - 1], span) {
                model.text.insert(0, ' ');
            }
            spans.push(model);
        }
        Line::new(spans)
    }
}

/// Whether a space belongs between two adjacent spans of one line.
fn needs_space(prev: &TextSpan, curr: &TextSpan) -> bool {
    let gap = curr.x - (prev.x + prev.width);
    let threshold = curr.font_size * AVG_CHAR_WIDTH * 0.2;
    if gap <= threshold {
        return false;
    }
    if prev.text.ends_with(char::is_whitespace) || curr.text.starts_with(char::is_whitespace) {
        return false;
    }
    let prev_cjk = prev.text.chars().last().is_some_and(is_spaceless_script_char);
    let curr_cjk = curr.text.chars().next().is_some_and(is_spaceless_script_char);
    !(prev_cjk && curr_cjk)
}

/// Layout analyzer for extracting positioned text from PDF pages.
///
/// Span positions are in page space: the text matrix is mapped through the
/// current transformation matrix, and text drawn inside Form XObjects is
/// included.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let resources = page_resources(self.doc, page_dict);
        let content = page_content(self.doc, page_id).map_err(|e| Error::TextExtract(e.to_string()))?;

        let mut spans = Vec::new();
        self.parse_content_stream(&content, resources, Matrix::IDENTITY, 0, &mut spans)?;
        Ok(spans)
    }

    /// Interpret the text operators of a content stream.
    fn parse_content_stream(
        &self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        base: Matrix,
        depth: usize,
        spans: &mut Vec<TextSpan>,
    ) -> Result<()> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::TextExtract(e.to_string()))?;

        let lopdf_fonts = resource_fonts(self.doc, resources);
        let fonts: HashMap<&[u8], String> = lopdf_fonts
            .iter()
            .map(|(name, font)| {
                let base_font = font
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                (name.as_slice(), base_font)
            })
            .collect();

        let mut gs = GraphicsState::new(base);
        let mut current_font = String::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            if gs.apply(&op.operator, &op.operands) {
                continue;
            }
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix.begin();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Do" => {
                    let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                        continue;
                    };
                    if let Some(XObject::Form {
                        content,
                        matrix,
                        resources,
                    }) = lookup_xobject(self.doc, resources, name)
                    {
                        if depth < MAX_FORM_DEPTH {
                            let base = matrix.then(&gs.ctm());
                            self.parse_content_stream(&content, resources, base, depth + 1, spans)?;
                        }
                    }
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                            current_font = fonts.get(font_name.as_slice()).cloned().unwrap_or_else(
                                || String::from_utf8_lossy(font_name.as_slice()).to_string(),
                            );
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        text_matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text_matrix.leading = -ty;
                        }
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(&op.operands) {
                        text_matrix.set(m);
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text_matrix.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }

                    let encoding = lopdf_fonts
                        .get(&current_font_name)
                        .and_then(|f| f.get_font_encoding(self.doc).ok());
                    let decode = |bytes: &[u8]| match encoding {
                        Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                            .unwrap_or_else(|_| decode_text_simple(bytes)),
                        None => decode_text_simple(bytes),
                    };

                    let text = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(arr)) => decode_tj_array(arr, &decode),
                            _ => String::new(),
                        },
                        "\"" => match op.operands.get(2) {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                        _ => match op.operands.first() {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                    };

                    if !text.trim().is_empty() {
                        let text: String = text.nfc().collect();
                        let advance = text.chars().count() as f32 * current_font_size * AVG_CHAR_WIDTH;
                        let placement = text_matrix.matrix().then(&gs.ctm());
                        let (x, y) = placement.origin();
                        let effective_size = current_font_size * placement.scale();
                        spans.push(TextSpan::new(text, x, y, effective_size, current_font.clone()));
                        text_matrix.advance(advance);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Decode a `TJ` array, turning large negative adjustments into spaces.
fn decode_tj_array(arr: &[Object], decode: &dyn Fn(&[u8]) -> String) -> String {
    // Adjustments are in 1/1000 text space units; beyond this they are
    // treated as word gaps.
    const SPACE_THRESHOLD: f32 = 200.0;

    let mut combined = String::new();
    for item in arr {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(bytes)),
            other => {
                let Some(n) = get_number(other) else {
                    continue;
                };
                if -n > SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(char::is_whitespace)
                    && !combined.chars().last().is_some_and(is_spaceless_script_char)
                {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

/// Group spans into text blocks in top-to-bottom order.
pub fn blocks_from_spans(spans: Vec<TextSpan>, page_height: f32) -> Vec<TextBlock> {
    let lines = group_spans_into_lines(spans);
    group_lines_into_blocks(lines)
        .into_iter()
        .map(|lines| {
            TextBlock::from_lines(lines.iter().map(|l| l.to_line(page_height)).collect())
        })
        .collect()
}

/// Y-based line grouping.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Y descending (PDF Y is bottom-up), then X
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => {
                current_line_spans.push(span);
            }
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current_line_spans)));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Group consecutive lines into blocks based on spacing, size and indent.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = calculate_avg_line_spacing(&lines);
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Calculate average line spacing.
fn calculate_avg_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// Determine if a new block should start.
fn should_break_block(prev_line: &TextLine, curr_line: &TextLine, avg_spacing: f32) -> bool {
    // Large spacing indicates new paragraph
    let spacing = (prev_line.y - curr_line.y).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    // Significant font size change
    if (prev_line.font_size - curr_line.font_size).abs() > 1.0 {
        return true;
    }

    // Significant left margin change (indentation)
    if (prev_line.x - curr_line.x).abs() > 20.0 {
        return true;
    }

    // Weight change at line start (bold heading over regular body)
    let prev_bold = prev_line.spans.first().is_some_and(|s| is_bold_font(&s.font_name));
    let curr_bold = curr_line.spans.first().is_some_and(|s| is_bold_font(&s.font_name));
    prev_bold != curr_bold
}

fn is_bold_font(font_name: &str) -> bool {
    font_name.to_lowercase().contains("bold")
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    // Line start, for Td/T* which are relative to it
    line_e: f32,
    line_f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    /// Reset position at `BT`; leading persists across text objects.
    fn begin(&mut self) {
        *self = Self {
            leading: self.leading,
            ..Self::default()
        };
    }

    fn set(&mut self, m: Matrix) {
        let [a, b, c, d, e, f] = m.0;
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_e = e;
        self.line_f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    /// Move past shown text of the given width in text space.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn matrix(&self) -> Matrix {
        Matrix([self.a, self.b, self.c, self.d, self.e, self.f])
    }
}

/// Decoded content of a page, with multiple content streams concatenated.
pub(crate) fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        // A page without content is blank, not broken
        Err(_) => return Ok(Vec::new()),
    };

    let stream_data = |obj: &Object| -> Result<Vec<u8>> {
        match doc.dereference(obj)?.1 {
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse("content is not a stream".to_string())),
        }
    };

    match doc.dereference(contents)?.1 {
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                content.extend_from_slice(&stream_data(obj)?);
                content.push(b' ');
            }
            Ok(content)
        }
        other => stream_data(other),
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character is from a script that does not separate words
/// with spaces (Chinese, Japanese). Korean uses spaces and is excluded.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
