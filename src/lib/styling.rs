//! Visual style values used by the layout engine.
//!
//! All lengths are PDF points. The defaults reproduce the look of the original converter: 10pt
//! body text, bold headings at 20/16/13/11pt, 9pt monospace code on a light gray background and
//! muted italic quotes.

/// RGB color with 8-bit channels.
pub type Rgb = (u8, u8, u8);

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Width and height in points, portrait.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0 * MM, 297.0 * MM),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
        }
    }
}

/// Font size, color and vertical spacing of one kind of element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicTextStyle {
    pub size: f32,
    pub text_color: Rgb,
    pub background_color: Option<Rgb>,
    pub line_height: f32,
    pub before_spacing: f32,
    pub after_spacing: f32,
}

impl BasicTextStyle {
    pub fn new(size: f32, text_color: Rgb, line_height: f32) -> Self {
        Self {
            size,
            text_color,
            background_color: None,
            line_height,
            before_spacing: 0.0,
            after_spacing: 0.0,
        }
    }

    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.before_spacing = before;
        self.after_spacing = after;
        self
    }

    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background_color = Some(color);
        self
    }
}

/// Complete set of style values for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub page_size: PageSize,
    pub margins: Margins,
    pub text: BasicTextStyle,
    /// Heading template; `size` applies to levels without an entry in `heading_sizes`.
    pub heading: BasicTextStyle,
    /// Sizes for heading levels 1 to 4.
    pub heading_sizes: [f32; 4],
    pub code: BasicTextStyle,
    pub block_quote: BasicTextStyle,
    /// Extra left indent of LTR blockquotes.
    pub block_quote_indent: f32,
    /// Horizontal offset added per leading whitespace character of a list item.
    pub list_indent_step: f32,
    pub horizontal_rule_color: Rgb,
    pub horizontal_rule_spacing: f32,
    /// Vertical advance of a blank line.
    pub blank_line_spacing: f32,
    pub bullet: char,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::default(),
            text: BasicTextStyle::new(10.0, (30, 30, 30), 5.0 * MM),
            heading: BasicTextStyle::new(10.0, (0, 0, 0), 8.0 * MM).with_spacing(4.0 * MM, 1.0 * MM),
            heading_sizes: [20.0, 16.0, 13.0, 11.0],
            code: BasicTextStyle::new(9.0, (50, 50, 50), 5.0 * MM)
                .with_spacing(2.0 * MM, 2.0 * MM)
                .with_background((240, 240, 240)),
            block_quote: BasicTextStyle::new(9.0, (100, 100, 100), 5.0 * MM),
            block_quote_indent: 5.0 * MM,
            list_indent_step: 3.0 * MM,
            horizontal_rule_color: (180, 180, 180),
            horizontal_rule_spacing: 3.0 * MM,
            blank_line_spacing: 4.0 * MM,
            bullet: '\u{2022}',
        }
    }
}

impl RenderStyle {
    /// Font size for a heading level; levels outside 1..=4 use the heading template size.
    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1..=4 => self.heading_sizes[usize::from(level) - 1],
            _ => self.heading.size,
        }
    }

    /// Page width and height in points.
    pub fn page_dimensions(&self) -> (f32, f32) {
        self.page_size.dimensions_pt()
    }

    /// Horizontal space between the left and right margins.
    pub fn content_width(&self) -> f32 {
        let (width, _) = self.page_dimensions();
        width - self.margins.left - self.margins.right
    }
}
