//! Page layout: turns the block stream into positioned text, lines and filled rectangles.
//!
//! The engine owns a cursor in top-left page coordinates (points, y growing downwards) and the
//! current pen (font slot, size, color). Every text line is checked against the bottom margin
//! before it is placed; when it does not fit a new page is started and the cursor returns to the
//! top margin, so multi-line blocks continue across pages without clipping.
//!
//! Direction is resolved per line. Lines containing right-to-left script are wrapped in logical
//! order, each wrapped line is reordered to visual order and placed right-aligned as one block.
//! Other lines are tokenized into styled runs and flowed left to right, switching faces per run.

use log::debug;

use crate::bidi::Reorderer;
use crate::fonts::{FontBook, FontSlot};
use crate::markdown::{strip_markup, tokenize, Block, RunStyle, StyledRun};
use crate::script::is_rtl;
use crate::styling::{BasicTextStyle, RenderStyle, Rgb, MM};

/// Horizontal padding inside filled and aligned cells.
const CELL_PADDING: f32 = 1.0 * MM;
/// Stroke width of horizontal rules.
const RULE_WIDTH: f32 = 0.5;
const TAB_WIDTH: usize = 4;

/// One drawing primitive, in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// `baseline` is measured from the top edge of the page.
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: FontSlot,
        size: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Rgb,
        width: f32,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
}

/// Items placed on one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<DrawItem>,
}

impl Page {
    /// Text of all text items on the page, one item per line.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The laid-out document. Only the PDF writer interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &DrawItem> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Current drawing position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    x: f32,
    y: f32,
}

/// Current font and color.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pen {
    slot: FontSlot,
    size: f32,
    color: Rgb,
}

/// Text collected for the current line that shares one face.
struct PendingText {
    x: f32,
    text: String,
    slot: FontSlot,
}

/// Lays out blocks onto pages. One engine renders one document.
pub struct LayoutEngine<'a> {
    fonts: &'a FontBook,
    style: &'a RenderStyle,
    reorderer: Reorderer,
    width: f32,
    height: f32,
    pages: Vec<Page>,
    cursor: Cursor,
    pen: Pen,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontBook, style: &'a RenderStyle, reorderer: Reorderer) -> Self {
        let (width, height) = style.page_dimensions();
        let mut engine = Self {
            fonts,
            style,
            reorderer,
            width,
            height,
            pages: vec![Page::default()],
            cursor: Cursor {
                x: style.margins.left,
                y: style.margins.top,
            },
            pen: Pen {
                slot: FontSlot::Regular,
                size: style.text.size,
                color: style.text.text_color,
            },
        };
        engine.set_body();
        engine
    }

    /// Renders every block in order and returns the finished pages.
    pub fn render<'b, I>(mut self, blocks: I) -> RenderedDocument
    where
        I: IntoIterator<Item = Block<'b>>,
    {
        for block in blocks {
            self.render_block(block);
        }
        debug!("Layout finished with {} page(s)", self.pages.len());
        RenderedDocument {
            width: self.width,
            height: self.height,
            pages: self.pages,
        }
    }

    fn render_block(&mut self, block: Block<'_>) {
        match block {
            Block::Heading { level, text } => self.render_heading(level, text),
            Block::UnorderedListItem { indent, text } => self.render_unordered_item(indent, text),
            Block::OrderedListItem { indent, text } => self.render_ordered_item(indent, text),
            Block::Blockquote { text } => self.render_blockquote(text),
            Block::HorizontalRule => self.render_horizontal_rule(),
            Block::FencedCode { lines } => self.render_code_block(&lines),
            Block::BlankLine => self.advance(self.style.blank_line_spacing),
            Block::Paragraph { text } => self.render_paragraph(text),
        }
    }

    // -- Blocks ---------------------------------------------------------------

    fn render_heading(&mut self, level: u8, text: &str) {
        let heading = self.style.heading;
        self.advance(heading.before_spacing);
        self.pen = Pen {
            slot: FontSlot::Bold,
            size: self.style.heading_size(level),
            color: heading.text_color,
        };
        if is_rtl(text) {
            self.rtl_block(text, heading.line_height, None);
        } else {
            let left = self.style.margins.left;
            self.flow_runs(tokenize(text), left, heading.line_height);
        }
        self.advance(heading.after_spacing);
        self.set_body();
    }

    fn render_unordered_item(&mut self, indent: usize, text: &str) {
        self.set_body();
        let line_height = self.style.text.line_height;
        let bullet = self.bullet();
        if is_rtl(text) {
            self.rtl_block(text, line_height, Some(bullet));
            return;
        }
        let left = self.list_left(indent);
        let marker = format!("{} ", bullet);
        let runs = std::iter::once(StyledRun::new(&marker, RunStyle::Plain)).chain(tokenize(text));
        self.flow_runs(runs, left, line_height);
    }

    fn render_ordered_item(&mut self, indent: usize, text: &str) {
        self.set_body();
        let line_height = self.style.text.line_height;
        if is_rtl(text) {
            self.rtl_block(text, line_height, None);
            return;
        }
        let left = self.list_left(indent);
        self.flow_runs(tokenize(text), left, line_height);
    }

    fn render_blockquote(&mut self, text: &str) {
        let quote = self.style.block_quote;
        self.pen = Pen {
            slot: FontSlot::Italic,
            size: quote.size,
            color: quote.text_color,
        };
        if is_rtl(text) {
            self.rtl_block(text, quote.line_height, None);
        } else {
            let left = self.style.margins.left + self.style.block_quote_indent;
            let width = self.right_edge() - left;
            let lines = self.wrap(text, width - 2.0 * CELL_PADDING);
            self.place_lines(&lines, left, width, quote.line_height, Align::Left, None);
        }
        self.set_body();
    }

    fn render_horizontal_rule(&mut self) {
        let spacing = self.style.horizontal_rule_spacing;
        self.advance(spacing);
        self.ensure_space(RULE_WIDTH);
        let y = self.cursor.y;
        let color = self.style.horizontal_rule_color;
        let from = (self.style.margins.left, y);
        let to = (self.right_edge(), y);
        self.push(DrawItem::Line {
            from,
            to,
            color,
            width: RULE_WIDTH,
        });
        self.advance(spacing);
        self.set_body();
    }

    fn render_code_block(&mut self, lines: &[&str]) {
        let code: BasicTextStyle = self.style.code;
        self.advance(code.before_spacing);
        self.pen = Pen {
            slot: FontSlot::Mono,
            size: code.size,
            color: code.text_color,
        };

        let left = self.style.margins.left;
        let width = self.style.content_width();
        let mut wrapped = Vec::with_capacity(lines.len().max(1));
        for line in lines {
            let expanded = line.replace('\t', &" ".repeat(TAB_WIDTH));
            wrapped.extend(self.wrap(&expanded, width - 2.0 * CELL_PADDING));
        }
        if wrapped.is_empty() {
            wrapped.push(String::new());
        }
        self.place_lines(
            &wrapped,
            left,
            width,
            code.line_height,
            Align::Left,
            code.background_color,
        );

        self.advance(code.after_spacing);
        self.set_body();
    }

    fn render_paragraph(&mut self, text: &str) {
        self.set_body();
        let line_height = self.style.text.line_height;
        if is_rtl(text) {
            self.rtl_block(text, line_height, None);
            return;
        }
        let left = self.style.margins.left;
        self.flow_runs(tokenize(text), left, line_height);
    }

    // -- Pen and cursor -------------------------------------------------------

    fn set_body(&mut self) {
        self.pen = Pen {
            slot: FontSlot::Regular,
            size: self.style.text.size,
            color: self.style.text.text_color,
        };
    }

    fn right_edge(&self) -> f32 {
        self.width - self.style.margins.right
    }

    fn bottom_edge(&self) -> f32 {
        self.height - self.style.margins.bottom
    }

    fn list_left(&self, indent: usize) -> f32 {
        let left = self.style.margins.left + indent as f32 * self.style.list_indent_step;
        // Deeply indented items still get a usable line.
        left.min(self.right_edge() - self.style.content_width() / 4.0)
    }

    fn bullet(&self) -> char {
        let bullet = self.style.bullet;
        if self.fonts.face(FontSlot::Regular).covers(bullet) {
            bullet
        } else {
            '-'
        }
    }

    /// Moves down by `dy` and back to the left margin.
    fn advance(&mut self, dy: f32) {
        self.cursor.x = self.style.margins.left;
        self.cursor.y += dy;
    }

    /// Starts a new page when a line of `height` would cross the bottom margin.
    fn ensure_space(&mut self, height: f32) {
        let at_top = self.cursor.y <= self.style.margins.top;
        if self.cursor.y + height > self.bottom_edge() && !at_top {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor.y = self.style.margins.top;
        debug!("Starting page {}", self.pages.len());
    }

    fn push(&mut self, item: DrawItem) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn baseline(&self, line_top: f32, line_height: f32) -> f32 {
        line_top + 0.5 * line_height + 0.3 * self.pen.size
    }

    fn text_width(&self, slot: FontSlot, text: &str) -> f32 {
        self.fonts.text_width(slot, self.pen.size, text)
    }

    fn push_text(&mut self, x: f32, line_height: f32, text: String, slot: FontSlot) {
        if text.is_empty() {
            return;
        }
        let baseline = self.baseline(self.cursor.y, line_height);
        let Pen { size, color, .. } = self.pen;
        self.push(DrawItem::Text {
            x,
            baseline,
            text,
            font: slot,
            size,
            color,
        });
    }

    // -- Inline flow ----------------------------------------------------------

    /// Places styled runs left to right from `left`, wrapping at the right margin, and ends the
    /// line afterwards.
    fn flow_runs<'r, I>(&mut self, runs: I, left: f32, line_height: f32)
    where
        I: IntoIterator<Item = StyledRun<'r>>,
    {
        let right = self.right_edge();
        let base = self.pen.slot;
        let mut pending: Option<PendingText> = None;
        let mut line_started = false;
        self.cursor.x = left;

        for run in runs {
            let slot = match run.style {
                RunStyle::Plain => base,
                RunStyle::Bold => FontSlot::Bold,
                RunStyle::Italic => FontSlot::Italic,
                RunStyle::Code => FontSlot::Mono,
            };

            for piece in split_words(run.text) {
                let is_space = piece.chars().all(char::is_whitespace);
                let width = self.text_width(slot, piece);

                if self.cursor.x + width > right && line_started {
                    self.flush_pending(&mut pending, line_height);
                    self.cursor.y += line_height;
                    self.cursor.x = left;
                    line_started = false;
                    if is_space {
                        continue;
                    }
                }

                if !line_started {
                    self.ensure_space(line_height);
                    line_started = true;
                }

                if self.cursor.x + width > right && !is_space {
                    // A word wider than the whole line is split by characters.
                    for c in piece.chars() {
                        let mut buf = [0u8; 4];
                        let ch: &str = c.encode_utf8(&mut buf);
                        let cw = self.text_width(slot, ch);
                        if self.cursor.x + cw > right && self.cursor.x > left {
                            self.flush_pending(&mut pending, line_height);
                            self.cursor.y += line_height;
                            self.cursor.x = left;
                            self.ensure_space(line_height);
                        }
                        self.append_pending(&mut pending, ch, slot, cw, line_height);
                    }
                    continue;
                }

                self.append_pending(&mut pending, piece, slot, width, line_height);
            }
        }

        self.flush_pending(&mut pending, line_height);
        self.cursor.y += line_height;
        self.cursor.x = self.style.margins.left;
    }

    fn append_pending(
        &mut self,
        pending: &mut Option<PendingText>,
        piece: &str,
        slot: FontSlot,
        width: f32,
        line_height: f32,
    ) {
        match pending {
            Some(p) if p.slot == slot => p.text.push_str(piece),
            _ => {
                self.flush_pending(pending, line_height);
                *pending = Some(PendingText {
                    x: self.cursor.x,
                    text: piece.to_string(),
                    slot,
                });
            }
        }
        self.cursor.x += width;
    }

    fn flush_pending(&mut self, pending: &mut Option<PendingText>, line_height: f32) {
        if let Some(p) = pending.take() {
            self.push_text(p.x, line_height, p.text, p.slot);
        }
    }

    // -- Cells ----------------------------------------------------------------

    /// Right-aligned block for a right-to-left line. Inline markers are dropped, the text is
    /// wrapped in logical order and each line is reordered on its own. `marker` goes to the
    /// right end of the first line.
    fn rtl_block(&mut self, text: &str, line_height: f32, marker: Option<char>) {
        let left = self.style.margins.left;
        let width = self.style.content_width();
        let logical = strip_markup(text);
        let suffix = marker.map(|m| format!(" {}", m)).unwrap_or_default();
        let available = width - 2.0 * CELL_PADDING - self.text_width(self.pen.slot, &suffix);

        let visual: Vec<String> = self
            .wrap(&logical, available)
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let mut v = self.reorderer.reorder(line);
                if i == 0 {
                    v.push_str(&suffix);
                }
                v
            })
            .collect();
        self.place_lines(&visual, left, width, line_height, Align::Right, None);
    }

    /// Places already wrapped lines inside a cell column, breaking pages between lines.
    fn place_lines(
        &mut self,
        lines: &[String],
        left: f32,
        width: f32,
        line_height: f32,
        align: Align,
        fill: Option<Rgb>,
    ) {
        let slot = self.pen.slot;
        for line in lines {
            self.ensure_space(line_height);
            if let Some(color) = fill {
                self.push(DrawItem::FillRect {
                    x: left,
                    y: self.cursor.y,
                    width,
                    height: line_height,
                    color,
                });
            }
            let x = match align {
                Align::Left => left + CELL_PADDING,
                Align::Right => left + width - CELL_PADDING - self.text_width(slot, line),
            };
            self.push_text(x, line_height, line.clone(), slot);
            self.cursor.y += line_height;
        }
        self.cursor.x = self.style.margins.left;
    }

    /// Greedy word wrap with the current pen. Whitespace inside a line is kept; whitespace at a
    /// wrap point is dropped. Always returns at least one line.
    fn wrap(&self, text: &str, width: f32) -> Vec<String> {
        let slot = self.pen.slot;
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;

        for piece in split_words(text) {
            let is_space = piece.chars().all(char::is_whitespace);
            let piece_width = self.text_width(slot, piece);

            if current_width + piece_width <= width || current.is_empty() && is_space {
                current.push_str(piece);
                current_width += piece_width;
                continue;
            }
            if is_space {
                lines.push(std::mem::take(&mut current).trim_end().to_string());
                current_width = 0.0;
                continue;
            }
            if current.trim().is_empty() {
                current.clear();
            } else {
                lines.push(std::mem::take(&mut current).trim_end().to_string());
            }
            current_width = 0.0;
            if piece_width <= width {
                current.push_str(piece);
                current_width = piece_width;
                continue;
            }
            for c in piece.chars() {
                let mut buf = [0u8; 4];
                let ch: &str = c.encode_utf8(&mut buf);
                let cw = self.text_width(slot, ch);
                if current_width + cw > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += cw;
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Splits text into alternating runs of whitespace and non-whitespace, covering all input.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != space)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (piece, tail) = rest.split_at(end);
        rest = tail;
        Some(piece)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;

    fn layout_with(markdown: &str, reorderer: Reorderer) -> RenderedDocument {
        let fonts = FontBook::builtin();
        let style = RenderStyle::default();
        LayoutEngine::new(&fonts, &style, reorderer).render(parse(markdown))
    }

    fn layout(markdown: &str) -> RenderedDocument {
        layout_with(markdown, Reorderer::default())
    }

    fn texts(doc: &RenderedDocument) -> Vec<(String, FontSlot)> {
        doc.items()
            .filter_map(|item| match item {
                DrawItem::Text { text, font, .. } => Some((text.clone(), *font)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_split_words_covers_input() {
        let pieces: Vec<_> = split_words("  a bb\tccc ").collect();
        assert_eq!(pieces, vec!["  ", "a", " ", "bb", "\t", "ccc", " "]);
        assert_eq!(split_words("").count(), 0);
    }

    #[test]
    fn test_empty_document_has_one_blank_page() {
        let doc = layout("");
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].items.is_empty());
    }

    #[test]
    fn test_paragraph_runs_switch_faces() {
        let doc = layout("plain **bold** *it* `code`");
        assert_eq!(
            texts(&doc),
            vec![
                ("plain ".to_string(), FontSlot::Regular),
                ("bold".to_string(), FontSlot::Bold),
                (" ".to_string(), FontSlot::Regular),
                ("it".to_string(), FontSlot::Italic),
                (" ".to_string(), FontSlot::Regular),
                ("code".to_string(), FontSlot::Mono),
            ]
        );
    }

    #[test]
    fn test_heading_is_bold_at_level_size() {
        let doc = layout("## Section");
        let first = doc.items().next();
        match first {
            Some(DrawItem::Text {
                text, font, size, ..
            }) => {
                assert_eq!(text, "Section");
                assert_eq!(*font, FontSlot::Bold);
                assert_eq!(*size, 16.0);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_body_font_restored_after_heading() {
        let doc = layout("# Big\nsmall");
        let sizes: Vec<f32> = doc
            .items()
            .filter_map(|i| match i {
                DrawItem::Text { size, .. } => Some(*size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![20.0, 10.0]);
    }

    #[test]
    fn test_unordered_item_indent_and_bullet() {
        let style = RenderStyle::default();
        let doc = layout("- top\n    - nested");
        let xs: Vec<(f32, String)> = doc
            .items()
            .filter_map(|i| match i {
                DrawItem::Text { x, text, .. } => Some((*x, text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 2);
        assert!(xs[0].1.ends_with("top"));
        assert!((xs[0].0 - style.margins.left).abs() < 1e-3);
        assert!((xs[1].0 - (style.margins.left + 4.0 * style.list_indent_step)).abs() < 1e-3);
    }

    #[test]
    fn test_ordered_item_keeps_number() {
        let doc = layout("3. third");
        assert_eq!(texts(&doc), vec![("3. third".to_string(), FontSlot::Regular)]);
    }

    #[test]
    fn test_blockquote_is_italic_and_indented() {
        let style = RenderStyle::default();
        let doc = layout("> quoted");
        let first = doc.items().next();
        match first {
            Some(DrawItem::Text { x, font, color, .. }) => {
                assert_eq!(*font, FontSlot::Italic);
                assert_eq!(*color, style.block_quote.text_color);
                assert!(*x > style.margins.left + style.block_quote_indent - 1e-3);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_horizontal_rule_spans_content_width() {
        let style = RenderStyle::default();
        let doc = layout("---");
        let first = doc.items().next();
        match first {
            Some(DrawItem::Line { from, to, color, .. }) => {
                assert_eq!(from.0, style.margins.left);
                assert!((to.0 - from.0 - style.content_width()).abs() < 1e-3);
                assert_eq!(*color, (180, 180, 180));
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_code_block_is_shaded_and_verbatim() {
        let doc = layout("```\n  **x**\n\ty\n```");
        let fills = doc
            .items()
            .filter(|i| matches!(i, DrawItem::FillRect { .. }))
            .count();
        assert_eq!(fills, 2);
        assert_eq!(
            texts(&doc),
            vec![
                ("  **x**".to_string(), FontSlot::Mono),
                ("    y".to_string(), FontSlot::Mono),
            ]
        );
    }

    #[test]
    fn test_blank_line_only_advances() {
        let with_blank = layout("a\n\nb");
        let without = layout("a\nb");
        let last_baseline = |doc: &RenderedDocument| match doc.items().last() {
            Some(DrawItem::Text { baseline, .. }) => *baseline,
            _ => panic!("no text"),
        };
        assert_eq!(with_blank.items().count(), without.items().count());
        let gap = last_baseline(&with_blank) - last_baseline(&without);
        assert!((gap - RenderStyle::default().blank_line_spacing).abs() < 1e-3);
    }

    #[test]
    fn test_long_paragraph_wraps_within_margins() {
        let style = RenderStyle::default();
        let text = "word ".repeat(200);
        let doc = layout(&text);
        let lines = texts(&doc).len();
        assert!(lines > 1);
        let fonts = FontBook::builtin();
        for item in doc.items() {
            if let DrawItem::Text { x, text, size, font, .. } = item {
                let w = fonts.text_width(*font, *size, text);
                assert!(x + w <= doc.width - style.margins.right + 1e-3);
            }
        }
    }

    #[test]
    fn test_overlong_word_is_split() {
        let doc = layout(&"x".repeat(600));
        let joined: String = texts(&doc).into_iter().map(|(t, _)| t).collect();
        assert_eq!(joined, "x".repeat(600));
        assert!(texts(&doc).len() > 1);
    }

    #[test]
    fn test_page_break_keeps_content_inside_margins() {
        let style = RenderStyle::default();
        let markdown = (0..200)
            .map(|i| format!("Line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let doc = layout(&markdown);
        assert!(doc.page_count() > 1);
        for item in doc.items() {
            if let DrawItem::Text { baseline, .. } = item {
                assert!(*baseline >= style.margins.top);
                assert!(*baseline <= doc.height - style.margins.bottom);
            }
        }
        let all: Vec<String> = texts(&doc).into_iter().map(|(t, _)| t).collect();
        assert_eq!(all.len(), 200);
        assert_eq!(all[199], "Line number 199");
    }

    #[test]
    fn test_code_block_continues_across_pages() {
        let code: Vec<String> = (0..120).map(|i| format!("let x{} = {};", i, i)).collect();
        let markdown = format!("```\n{}\n```", code.join("\n"));
        let doc = layout(&markdown);
        assert!(doc.page_count() >= 2);
        for page in &doc.pages {
            let fills = page
                .items
                .iter()
                .filter(|i| matches!(i, DrawItem::FillRect { .. }))
                .count();
            let lines = page
                .items
                .iter()
                .filter(|i| matches!(i, DrawItem::Text { .. }))
                .count();
            assert_eq!(fills, lines);
        }
    }

    #[test]
    fn test_rtl_paragraph_is_right_aligned_and_reordered() {
        let style = RenderStyle::default();
        let fonts = FontBook::builtin();
        let doc = layout("שלום עולם");
        let items: Vec<_> = doc.items().collect();
        assert_eq!(items.len(), 1);
        match items[0] {
            DrawItem::Text { x, text, size, font, .. } => {
                #[cfg(feature = "bidi")]
                assert_eq!(text, "םלוע םולש");
                let right = x + fonts.text_width(*font, *size, text);
                assert!((right - (doc.width - style.margins.right - CELL_PADDING)).abs() < 1e-3);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_rtl_identity_keeps_logical_order() {
        let doc = layout_with("שלום", Reorderer::Identity);
        assert_eq!(doc.pages[0].text(), "שלום");
    }

    #[test]
    fn test_rtl_markup_is_stripped() {
        let doc = layout_with("**שלום** עולם", Reorderer::Identity);
        assert_eq!(doc.pages[0].text(), "שלום עולם");
    }

    #[test]
    fn test_rtl_list_item_gets_trailing_marker() {
        let doc = layout_with("- שלום", Reorderer::Identity);
        assert_eq!(doc.pages[0].text(), "שלום -");
    }
}
