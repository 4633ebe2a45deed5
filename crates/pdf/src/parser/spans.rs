//! Content-stream interpretation: turn a page's text operators into
//! [`TextSpan`]s in top-down page coordinates.
//!
//! PDF user space puts the origin at the bottom-left with `y` growing upward.
//! Every span leaving this module has been flipped against the top edge of the
//! MediaBox so that `bbox.y1` is the baseline measured from the top of the
//! page and
//! `bbox.y0 = y1 - font_size`.
//!
//! Glyph widths are not read from the font program. Each character is
//! approximated as half the font size wide, which is enough for line grouping
//! and word-gap detection.

use outline_core::{BBox, TextSpan};

use super::backend::{
    decode_text_simple, get_number_from_value, FontResource, PageId, PdfBackend, PdfValue,
};
use crate::PdfError;

/// Approximate glyph advance as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// A `TJ` kerning displacement wider than this fraction of an average glyph
/// is read as a word break.
const KERNING_SPACE_FRACTION: f32 = 0.3;

/// [a, b, c, d, tx, ty]
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text state carried between operators of one content stream.
#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    /// Tz, as a fraction (100% = 1.0).
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
    is_bold: bool,
    is_italic: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
            is_bold: false,
            is_italic: false,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    /// Baseline in PDF user space, including text rise.
    fn baseline(&self) -> f32 {
        self.text_matrix[5] + self.text_rise
    }

    /// Rendered size: `font_size * sqrt(b^2 + d^2)`.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn glyph_advance(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Td: translate the line matrix and reset the text matrix to it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn set_font(&mut self, key: Vec<u8>, font: Option<&FontResource>, size: f32) {
        self.font_size = size;
        match font {
            Some(font) => {
                self.font_name = font.display_name();
                self.is_bold = font.is_bold();
                self.is_italic = font.is_italic();
            }
            None => {
                let fallback = FontResource {
                    key: key.clone(),
                    ..FontResource::default()
                };
                self.font_name = fallback.display_name();
                self.is_bold = fallback.is_bold();
                self.is_italic = fallback.is_italic();
            }
        }
        self.font_key = key;
    }

    /// Move past `text` and return the horizontal displacement applied.
    fn advance_after_show(&mut self, text: &str) -> f32 {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let extra = if ch == ' ' { self.word_spacing } else { 0.0 };
                self.glyph_advance() + self.char_spacing + extra
            })
            .sum();
        self.advance_x(dx);
        dx
    }
}

/// Collects spans for one page and performs the coordinate flip.
struct SpanSink<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
    /// Upper MediaBox edge in user space.
    page_top: f32,
    spans: Vec<TextSpan>,
}

impl SpanSink<'_> {
    fn decode(&self, operand: &PdfValue, font_key: &[u8]) -> String {
        match operand {
            PdfValue::Str(bytes) => {
                let decoded = self.backend.decode_text(self.page_id, font_key, bytes);
                if decoded.is_empty() {
                    decode_text_simple(bytes)
                } else {
                    decoded
                }
            }
            _ => String::new(),
        }
    }

    fn push(&mut self, text: &str, x0: f32, x1: f32, pdf_baseline: f32, state: &TextState) {
        let text = text.trim_end();
        if text.trim().is_empty() {
            return;
        }
        let size = state.effective_font_size();
        let baseline = self.page_top - pdf_baseline;
        self.spans.push(TextSpan {
            text: text.to_string(),
            font_name: state.font_name.clone(),
            font_size: size,
            bold: state.is_bold,
            italic: state.is_italic,
            underline: false,
            bbox: BBox::new(x0, baseline - size, x1.max(x0), baseline),
            page_index: self.page_index,
        });
    }

    /// Tj, ' and ".
    fn show_string(&mut self, operand: &PdfValue, state: &mut TextState) {
        let text = self.decode(operand, &state.font_key);
        if text.is_empty() {
            return;
        }
        let x0 = state.x();
        let baseline = state.baseline();
        let dx = state.advance_after_show(&text);
        self.push(&text, x0, x0 + dx, baseline, state);
    }

    /// TJ: strings interleaved with kerning adjustments in thousandths of a
    /// text-space unit. Large negative adjustments become spaces.
    fn show_array(&mut self, elements: &[PdfValue], state: &mut TextState) {
        let mut buf = String::new();
        let mut x0 = state.x();
        let baseline = state.baseline();

        for elem in elements {
            match elem {
                PdfValue::Str(_) => {
                    let fragment = self.decode(elem, &state.font_key);
                    if buf.is_empty() {
                        x0 = state.x();
                    }
                    buf.push_str(&fragment);
                    state.advance_after_show(&fragment);
                }
                other => {
                    if let Some(adj) = get_number_from_value(other) {
                        let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                        if dx > state.glyph_advance() * KERNING_SPACE_FRACTION
                            && !buf.is_empty()
                            && !buf.ends_with(' ')
                        {
                            buf.push(' ');
                        }
                        state.advance_x(dx);
                    }
                }
            }
        }

        let x1 = state.x();
        self.push(&buf, x0, x1, baseline, state);
    }
}

fn number_at(operands: &[PdfValue], idx: usize) -> Option<f32> {
    operands.get(idx).and_then(get_number_from_value)
}

/// Walk a page's content stream and return its text spans in stream order.
///
/// Handles the text-object operators `BT ET Tf Tm Td TD T* TL Tc Tw Tz Ts Tj TJ ' "`;
/// everything else is ignored. A page whose MediaBox cannot be read is
/// measured against a US Letter box.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_default();
    let page_top = backend.media_box(page_id).unwrap_or_default().top();

    let mut state = TextState::default();
    let mut sink = SpanSink {
        backend,
        page_id,
        page_index,
        page_top,
        spans: Vec::new(),
    };

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            // Font state deliberately survives ET; producers rely on it.
            "ET" => {}
            "Tf" => {
                let key = match operands.first() {
                    Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
                    _ => continue,
                };
                let size = number_at(operands, 1).unwrap_or(0.0);
                let font = fonts.iter().find(|f| f.key == key);
                state.set_font(key, font, size);
            }
            "Tm" => {
                let vals: Vec<f32> = operands
                    .iter()
                    .take(6)
                    .filter_map(get_number_from_value)
                    .collect();
                if let [a, b, c, d, e, f] = vals[..] {
                    state.text_matrix = [a, b, c, d, e, f];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number_at(operands, 0), number_at(operands, 1)) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number_at(operands, 0), number_at(operands, 1)) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some(v) = number_at(operands, 0) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = number_at(operands, 0) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number_at(operands, 0) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number_at(operands, 0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number_at(operands, 0) {
                    state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(first) = operands.first() {
                    sink.show_string(first, &mut state);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    sink.show_array(arr, &mut state);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    sink.show_string(first, &mut state);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    if let Some(aw) = number_at(operands, 0) {
                        state.word_spacing = aw;
                    }
                    if let Some(ac) = number_at(operands, 1) {
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    sink.show_string(&operands[2], &mut state);
                }
            }
            _ => {}
        }
    }

    Ok(sink.spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::backend::{ContentOp, MediaBox};
    use crate::parser::mock::*;

    fn page(ops: Vec<ContentOp>) -> MockBackend {
        MockBackend::single_page(helvetica_fonts(), ops)
    }

    #[test]
    fn test_extract_simple_tj() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            tm(1.0, 0.0, 0.0, 1.0, 72.0, 700.0),
            tj(b"Hello World"),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.text, "Hello World");
        assert_eq!(span.page_index, 0);
        assert!((span.font_size - 12.0).abs() < 0.01);
        // 792 - 700 = 92 from the top.
        assert!((span.bbox.y1 - 92.0).abs() < 0.01);
        assert!((span.bbox.y0 - 80.0).abs() < 0.01);
        assert!((span.bbox.x0 - 72.0).abs() < 0.01);
        // 11 glyphs at 6pt each.
        assert!((span.bbox.width() - 66.0).abs() < 0.01);
        assert!(!span.bold);
    }

    #[test]
    fn test_higher_on_page_has_smaller_y() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            tm(1.0, 0.0, 0.0, 1.0, 72.0, 700.0),
            tj(b"Top"),
            tm(1.0, 0.0, 0.0, 1.0, 72.0, 100.0),
            tj(b"Bottom"),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans[0].bbox.y1 < spans[1].bbox.y1);
    }

    #[test]
    fn test_page_height_from_media_box() {
        let mut backend = page(vec![
            bt(),
            tf(b"F1", 10.0),
            tm(1.0, 0.0, 0.0, 1.0, 50.0, 800.0),
            tj(b"A4 line"),
            et(),
        ]);
        backend.media_box = Some(MediaBox::from_corners(0.0, 0.0, 595.0, 842.0));

        let spans = extract_page_spans(&backend, (1, 0), 3).unwrap();
        assert!((spans[0].bbox.y1 - 42.0).abs() < 0.01);
        assert_eq!(spans[0].page_index, 3);
    }

    #[test]
    fn test_offset_media_box_flips_against_top_edge() {
        let mut backend = page(vec![
            bt(),
            tf(b"F1", 10.0),
            tm(1.0, 0.0, 0.0, 1.0, 50.0, 850.0),
            tj(b"shifted origin"),
            et(),
        ]);
        backend.media_box = Some(MediaBox::from_corners(0.0, 100.0, 612.0, 892.0));

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert!((spans[0].bbox.y1 - 42.0).abs() < 0.01);
        assert!((spans[0].bbox.y0 - 32.0).abs() < 0.01);
    }

    #[test]
    fn test_bold_from_font_name() {
        let backend = MockBackend::single_page(
            vec![font(b"F2", "Helvetica-Bold", None)],
            vec![
                bt(),
                tf(b"F2", 14.0),
                tm(1.0, 0.0, 0.0, 1.0, 72.0, 750.0),
                tj(b"Bold Title"),
                et(),
            ],
        );

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert!(spans[0].bold);
        assert_eq!(spans[0].font_name, "Helvetica-Bold");
    }

    #[test]
    fn test_bold_from_descriptor_flags() {
        let backend = MockBackend::single_page(
            vec![font(b"F4", "Minion", Some(1 << 18))],
            vec![
                bt(),
                tf(b"F4", 16.0),
                tm(1.0, 0.0, 0.0, 1.0, 72.0, 750.0),
                tj(b"Heavy"),
                et(),
            ],
        );

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert!(spans[0].bold);
        assert!(!spans[0].italic);
    }

    #[test]
    fn test_unknown_font_key_used_as_name() {
        let backend = MockBackend::single_page(
            Vec::new(),
            vec![bt(), tf(b"F7", 9.0), td(10.0, 10.0), tj(b"orphan"), et()],
        );

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans[0].font_name, "F7");
    }

    #[test]
    fn test_text_matrix_scales_size() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 1.0),
            tm(24.0, 0.0, 0.0, 24.0, 72.0, 600.0),
            tj(b"Scaled"),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert!((spans[0].font_size - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_td_and_tstar_move_down() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            td(72.0, 700.0),
            tj(b"First"),
            tl(14.0),
            tstar(),
            tj(b"Second"),
            td_upper(0.0, -20.0),
            tj(b"Third"),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        let tops: Vec<f32> = spans.iter().map(|s| s.bbox.y1).collect();
        assert!((tops[0] - 92.0).abs() < 0.01);
        assert!((tops[1] - 106.0).abs() < 0.01);
        assert!((tops[2] - 126.0).abs() < 0.01);
        assert!(spans.iter().all(|s| (s.bbox.x0 - 72.0).abs() < 0.01));
    }

    #[test]
    fn test_quote_operators_advance_line() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            tl(15.0),
            td(72.0, 700.0),
            op("'", vec![PdfValue::Str(b"Quoted".to_vec())]),
            op(
                "\"",
                vec![
                    PdfValue::Real(1.0),
                    PdfValue::Real(0.5),
                    PdfValue::Str(b"Double".to_vec()),
                ],
            ),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans[0].text, "Quoted");
        assert!((spans[0].bbox.y1 - 107.0).abs() < 0.01);
        assert_eq!(spans[1].text, "Double");
        assert!((spans[1].bbox.y1 - 122.0).abs() < 0.01);
    }

    #[test]
    fn test_tj_array_kerning_inserts_space() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 10.0),
            td(72.0, 700.0),
            tj_array(vec![
                PdfValue::Str(b"Annual".to_vec()),
                PdfValue::Integer(-250),
                PdfValue::Str(b"Rep".to_vec()),
                PdfValue::Integer(-20),
                PdfValue::Str(b"ort".to_vec()),
            ]),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Annual Report");
    }

    #[test]
    fn test_text_rise_lifts_span() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            td(72.0, 700.0),
            ts(5.0),
            tj(b"raised"),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert!((spans[0].bbox.y1 - 87.0).abs() < 0.01);
    }

    #[test]
    fn test_whitespace_only_strings_dropped() {
        let backend = page(vec![
            bt(),
            tf(b"F1", 12.0),
            td(72.0, 700.0),
            tj(b"   "),
            tj(b"kept  "),
            et(),
        ]);

        let spans = extract_page_spans(&backend, (1, 0), 0).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "kept");
    }

    #[test]
    fn test_non_text_operators_ignored() {
        let backend = page(vec![
            op("q", vec![]),
            op("re", vec![PdfValue::Integer(0); 4]),
            op("f", vec![]),
            op("Q", vec![]),
        ]);
        assert!(extract_page_spans(&backend, (1, 0), 0).unwrap().is_empty());
    }

    #[test]
    fn test_state_effective_size_and_translate() {
        let mut state = TextState {
            font_size: 10.0,
            ..TextState::default()
        };
        state.text_matrix = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        assert!((state.effective_font_size() - 20.0).abs() < 0.01);

        let mut state = TextState::default();
        state.translate_line(10.0, 20.0);
        state.translate_line(5.0, -3.0);
        assert!((state.x() - 15.0).abs() < 0.01);
        assert!((state.baseline() - 17.0).abs() < 0.01);
    }
}
