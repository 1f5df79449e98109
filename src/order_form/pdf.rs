//! Single-page PDF writer
//!
//! Supports exactly what the order form draws: Helvetica text, straight
//! lines and JPEG images on one A4 page.

use super::logo::LogoImage;
use super::surface::DrawingSurface;
use crate::error::ProcurementResult;
use std::fmt::Write as _;

const MM_TO_PT: f32 = 72.0 / 25.4;
const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const DEFAULT_FONT_SIZE: f32 = 16.0;
/// 0.2 mm in points
const LINE_WIDTH_PT: f32 = 0.567;

/// In-memory PDF document
#[derive(Debug, Clone)]
pub struct PdfDocument {
    title: String,
    width_mm: f32,
    height_mm: f32,
    font_size: f32,
    content: String,
    images: Vec<LogoImage>,
}

impl PdfDocument {
    /// Blank A4 portrait page
    pub fn a4(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            font_size: DEFAULT_FONT_SIZE,
            content: format!("{} w\n", LINE_WIDTH_PT),
            images: Vec::new(),
        }
    }

    fn x(&self, mm: f32) -> f32 {
        mm * MM_TO_PT
    }

    /// Flip from top-left millimetres to bottom-left points
    fn y(&self, mm: f32) -> f32 {
        (self.height_mm - mm) * MM_TO_PT
    }

    fn image_name(index: usize) -> String {
        format!("Im{}", index + 1)
    }
}

impl DrawingSurface for PdfDocument {
    fn page_width(&self) -> f32 {
        self.width_mm
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        let _ = writeln!(
            self.content,
            "BT /F1 {:.2} Tf {:.2} {:.2} Td ({}) Tj ET",
            self.font_size,
            x,
            y,
            escape_text(text)
        );
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (x1, y1, x2, y2) = (self.x(x1), self.y(y1), self.x(x2), self.y(y2));
        let _ = writeln!(self.content, "{:.2} {:.2} m {:.2} {:.2} l S", x1, y1, x2, y2);
    }

    fn image(&mut self, image: &LogoImage, x: f32, y: f32, width: f32, height: f32) {
        let name = Self::image_name(self.images.len());
        let left = self.x(x);
        let bottom = self.y(y + height);
        let _ = writeln!(
            self.content,
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /{} Do Q",
            width * MM_TO_PT,
            height * MM_TO_PT,
            left,
            bottom,
            name
        );
        self.images.push(image.clone());
    }

    fn render(&self) -> ProcurementResult<Vec<u8>> {
        let mut writer = ObjectWriter::new();

        // Object numbers: 1 catalog, 2 pages, 3 page, 4 font, 5 contents,
        // 6 info, 7.. images
        let image_refs: String = (0..self.images.len())
            .map(|i| format!("/{} {} 0 R ", Self::image_name(i), 7 + i))
            .collect();

        writer.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");
        writer.object(2, b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
        writer.object(
            3,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 4 0 R >> /XObject << {}>> >> /Contents 5 0 R >>",
                self.width_mm * MM_TO_PT,
                self.height_mm * MM_TO_PT,
                image_refs
            )
            .as_bytes(),
        );
        writer.object(
            4,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        writer.stream(5, "", &encode_win_ansi(&self.content));
        writer.object(
            6,
            &encode_win_ansi(&format!(
                "<< /Title ({}) /Producer (mh-procurement) >>",
                escape_text(&self.title)
            )),
        );

        for (i, image) in self.images.iter().enumerate() {
            let dict = format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                image.width, image.height
            );
            writer.stream(7 + i, &dict, &image.jpeg);
        }

        Ok(writer.finish(1, 6))
    }
}

/// Appends numbered objects and tracks their byte offsets for the xref table
struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, number: usize, body: &[u8]) {
        self.offsets.push((number, self.buf.len()));
        self.buf.extend_from_slice(format!("{} 0 obj\n", number).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, number: usize, dict: &str, data: &[u8]) {
        let dict = if dict.is_empty() {
            format!("<< /Length {} >>", data.len())
        } else {
            format!("<< {} /Length {} >>", dict, data.len())
        };
        let mut body = format!("{}\nstream\n", dict).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object(number, &body);
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|(number, _)| *number);
        let size = self.offsets.len() + 1;
        let xref_offset = self.buf.len();

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for (_, offset) in &self.offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, root, info, xref_offset
        );

        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Escape a string literal for a content stream
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0x0A | 0xA0..=0xFF) => code as u8,
            0x20AC => 0x80,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn renders_valid_skeleton() {
        let mut doc = PdfDocument::a4("Order Form");
        doc.set_font_size(20.0);
        doc.text("Hello (world)", 20.0, 30.0);
        doc.line(20.0, 100.0, 190.0, 100.0);

        let bytes = doc.render().unwrap();
        let text = as_text(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("(Hello \\(world\\)) Tj"));
        assert!(text.contains("/F1 20.00 Tf"));
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(text.contains(" l S"));
    }

    fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).rposition(|window| window == needle)
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = PdfDocument::a4("t").render().unwrap();

        let start = rfind(&bytes, b"startxref\n").unwrap() + b"startxref\n".len();
        let tail = as_text(&bytes[start..]);
        let xref_offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[xref_offset..].starts_with(b"xref"));

        let xref = as_text(&bytes[xref_offset..]);
        let first_entry = xref.lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(bytes[offset..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn top_left_coordinates_are_flipped() {
        let mut doc = PdfDocument::a4("t");
        doc.text("x", 0.0, 0.0);
        let text = as_text(&doc.render().unwrap());
        assert!(text.contains("0.00 841.89 Td"));
    }

    #[test]
    fn images_become_xobjects() {
        let logo = LogoImage {
            width: 2,
            height: 3,
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
        };
        let mut doc = PdfDocument::a4("t");
        doc.image(&logo, 170.0, 100.0, 20.0, 20.0);

        let text = as_text(&doc.render().unwrap());
        assert!(text.contains("/XObject << /Im1 7 0 R >>"));
        assert!(text.contains("/Width 2 /Height 3"));
        assert!(text.contains("/Filter /DCTDecode /Length 4"));
        assert!(text.contains("/Im1 Do Q"));
    }

    #[test]
    fn title_uses_the_text_encoding() {
        let bytes = PdfDocument::a4("Caf\u{e9} (Orders)").render().unwrap();
        assert!(rfind(&bytes, b"/Title (Caf\xE9 \\(Orders\\))").is_some());
        assert!(rfind(&bytes, "Caf\u{e9}".as_bytes()).is_none());
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(encode_win_ansi("Caf\u{e9} \u{2603}"), b"Caf\xE9 ?".to_vec());
    }
}
