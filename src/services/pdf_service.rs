use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

pub type Rgb = (f32, f32, f32);

pub const BRAND: Rgb = (0.0, 0.231, 0.169);
pub const TEXT: Rgb = (0.2, 0.2, 0.2);
pub const MUTED: Rgb = (0.4, 0.4, 0.4);
pub const POSITIVE: Rgb = (0.0, 0.478, 0.2);
const BOX_FILL: Rgb = (0.976, 0.976, 0.976);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

impl FontStyle {
    fn resource(self) -> Name<'static> {
        match self {
            FontStyle::Regular => Name(b"F1"),
            FontStyle::Bold => Name(b"F2"),
            FontStyle::Oblique => Name(b"F3"),
        }
    }
}

/// Flowing A4 document. `y` grows downwards from the top edge of the page,
/// the way report layouts are measured; it is flipped when drawing.
pub struct PdfDocument {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    fonts: [Ref; 3],
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,
    content: Content,
    next_id: i32,

    page_w: f32,
    page_h: f32,
    margin: f32,
    y: f32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let fonts = [Ref::new(3), Ref::new(4), Ref::new(5)];

        for (id, base) in fonts.iter().zip([
            &b"Helvetica"[..],
            &b"Helvetica-Bold"[..],
            &b"Helvetica-Oblique"[..],
        ]) {
            pdf.type1_font(*id)
                .base_font(Name(base))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        let mut doc = Self {
            pdf,
            catalog_id,
            pages_id,
            fonts,
            page_refs: Vec::new(),
            current_content_id: None,
            content: Content::new(),
            next_id: 6,
            page_w: 595.0,
            page_h: 842.0,
            margin: 50.0,
            y: 50.0,
        };
        doc.add_page();
        doc
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn flush_page(&mut self) {
        if let Some(id) = self.current_content_id.take() {
            let content = std::mem::replace(&mut self.content, Content::new());
            self.pdf.stream(id, &content.finish());
        }
    }

    pub fn add_page(&mut self) {
        self.flush_page();

        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);
        page.resources()
            .fonts()
            .pair(FontStyle::Regular.resource(), self.fonts[0])
            .pair(FontStyle::Bold.resource(), self.fonts[1])
            .pair(FontStyle::Oblique.resource(), self.fonts[2]);
        drop(page);

        self.current_content_id = Some(content_id);
        self.y = self.margin;
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    pub fn content_width(&self) -> f32 {
        self.page_w - 2.0 * self.margin
    }

    /// Starts a new page once the cursor has passed `limit`.
    pub fn break_after(&mut self, limit: f32) {
        if self.y > limit {
            self.add_page();
        }
    }

    pub fn move_down(&mut self, lines: f32) {
        self.y += lines * 12.0;
    }

    /// Single line at an absolute position; `y` is the top of the line.
    pub fn text_at(&mut self, x: f32, y: f32, size: f32, style: FontStyle, color: Rgb, text: &str) {
        let baseline = self.page_h - y - size;
        self.content.save_state();
        self.content.set_fill_rgb(color.0, color.1, color.2);
        self.content.begin_text();
        self.content.set_font(style.resource(), size);
        self.content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, baseline]);
        self.content.show(Str(&win_ansi(text)));
        self.content.end_text();
        self.content.restore_state();
    }

    /// Flowing paragraph at the cursor, wrapped to the content width.
    pub fn text(&mut self, size: f32, style: FontStyle, color: Rgb, text: &str) {
        self.text_indented(0.0, size, style, color, text);
    }

    pub fn text_indented(&mut self, indent: f32, size: f32, style: FontStyle, color: Rgb, text: &str) {
        let width = self.content_width() - indent;
        let max_chars = ((width / (size * 0.5)).floor() as usize).max(10);
        let line_h = size * 1.25;
        let x = self.margin + indent;
        for line in textwrap::wrap(text, max_chars) {
            if self.y + line_h > self.page_h - self.margin {
                self.add_page();
            }
            let y = self.y;
            self.text_at(x, y, size, style, color, &line);
            self.y += line_h;
        }
    }

    /// Rounded-look summary box spanning the content width; returns its top.
    pub fn summary_box(&mut self, height: f32) -> f32 {
        let top = self.y;
        let bottom = self.page_h - top - height;
        self.content.save_state();
        self.content.set_line_width(1.0);
        self.content.set_fill_rgb(BOX_FILL.0, BOX_FILL.1, BOX_FILL.2);
        self.content.set_stroke_rgb(BRAND.0, BRAND.1, BRAND.2);
        self.content.rect(self.margin, bottom, self.content_width(), height);
        self.content.fill_nonzero_and_stroke();
        self.content.restore_state();
        top
    }

    /// Report title block with the generation date on the right.
    pub fn header(&mut self, title: &str, subtitle: Option<&str>, generated_on: &str) {
        self.text_at(self.margin, 50.0, 20.0, FontStyle::Bold, BRAND, title);
        if let Some(subtitle) = subtitle {
            self.text_at(self.margin, 75.0, 12.0, FontStyle::Regular, TEXT, subtitle);
        }
        let stamp = format!("Gerado em: {}", generated_on);
        let stamp_w = stamp.chars().count() as f32 * 10.0 * 0.5;
        let x = self.page_w - self.margin - stamp_w;
        self.text_at(x, 100.0, 10.0, FontStyle::Regular, MUTED, &stamp);
        self.y = 135.0;
    }

    pub fn section_title(&mut self, title: &str) {
        self.text(14.0, FontStyle::Bold, BRAND, title);
        self.move_down(0.5);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.flush_page();
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());
        self.pdf.finish()
    }
}

/// Encodes text for the standard 14 fonts. Latin-1 maps directly; a few common
/// typographic marks use their WinAnsi slots; anything else becomes `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_text_keeps_accents() {
        assert_eq!(win_ansi("Ação"), vec![b'A', 0xE7, 0xE3, b'o']);
        assert_eq!(win_ansi("R$ 10,00"), b"R$ 10,00".to_vec());
        assert_eq!(win_ansi("✓"), vec![b'?']);
        assert_eq!(win_ansi("•"), vec![0x95]);
    }

    #[test]
    fn finished_document_is_a_pdf() {
        let mut doc = PdfDocument::new();
        doc.header("Relatório", Some("Sub"), "01/02/2024");
        doc.text(10.0, FontStyle::Regular, TEXT, "Olá");
        let bytes = doc.finish();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(15).any(|w| w == b"WinAnsiEncoding"));
    }

    #[test]
    fn break_after_starts_new_page_past_limit() {
        let mut doc = PdfDocument::new();
        doc.break_after(700.0);
        assert_eq!(doc.page_count(), 1);

        doc.set_y(701.0);
        doc.break_after(700.0);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.y(), 50.0);
    }

    #[test]
    fn long_text_wraps_and_flows_to_next_page() {
        let mut doc = PdfDocument::new();
        let long = "palavra ".repeat(2000);
        doc.text(10.0, FontStyle::Regular, TEXT, &long);
        assert!(doc.page_count() > 1);
    }
}
