//! Configuration loading for page geometry, element styles and font options.
//!
//! The configuration is a TOML document parsed into a `toml::Value` tree and read field by field;
//! anything missing keeps its default, so an empty file is a valid configuration.
//!
//! ```toml
//! [page]
//! size = "a4"            # a4, letter or legal
//!
//! [margin]               # points
//! top = 20.0
//! right = 20.0
//! bottom = 20.0
//! left = 20.0
//!
//! [text]
//! size = 10
//! textcolor = { r = 30, g = 30, b = 30 }
//!
//! [heading]
//! sizes = [20, 16, 13, 11]
//! textcolor = { r = 0, g = 0, b = 0 }
//!
//! [code]
//! size = 9
//! backgroundcolor = { r = 240, g = 240, b = 240 }
//!
//! [fonts]
//! search_paths = ["/opt/fonts"]
//! bidi = true
//!
//! [extract]
//! program = "markitdown"
//! ```
//!
//! Each element section (`text`, `heading`, `code`, `block_quote`) accepts `size`, `textcolor`,
//! `backgroundcolor`, `lineheight`, `beforespacing` and `afterspacing`. Lengths are points.
//!
//! A syntactically invalid document is logged and replaced by the defaults. Only a configuration
//! file that cannot be read at all is an error.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use toml::Value;

use crate::styling::{BasicTextStyle, Margins, PageSize, RenderStyle, Rgb};
use crate::DocmarkError;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = "docmark.toml";
/// Default external document converter.
pub const DEFAULT_EXTRACTOR_PROGRAM: &str = "markitdown";

/// Where the TOML configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Built-in defaults
    Default,
    /// A file on disk
    File(&'a str),
    /// A TOML string held in memory
    Embedded(&'a str),
}

/// Font discovery and shaping options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontOptions {
    /// Directories probed before the system font locations.
    pub search_paths: Vec<PathBuf>,
    /// When false, RTL text is placed in logical order.
    pub bidi: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            bidi: true,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DocmarkConfig {
    pub style: RenderStyle,
    pub fonts: FontOptions,
    /// Executable used to turn non-Markdown inputs into Markdown.
    pub extractor_program: String,
}

impl Default for DocmarkConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::default(),
            fonts: FontOptions::default(),
            extractor_program: DEFAULT_EXTRACTOR_PROGRAM.to_string(),
        }
    }
}

/// Integer or float as f32.
fn as_number(value: &Value) -> Option<f32> {
    match value {
        Value::Integer(i) => Some(*i as f32),
        Value::Float(f) => Some(*f as f32),
        _ => None,
    }
}

fn parse_number(value: Option<&Value>, field: &str) -> Option<f32> {
    value.and_then(|v| v.get(field)).and_then(as_number)
}

/// Reads `{ r, g, b }` from `field`. Components outside 0..=255 make the color invalid.
fn parse_color(value: Option<&Value>, field: &str) -> Option<Rgb> {
    value.and_then(|c| {
        let color = c.get(field)?;
        let channel = |name: &str| -> Option<u8> {
            let v = color.get(name)?.as_integer()?;
            u8::try_from(v).ok()
        };
        Some((channel("r")?, channel("g")?, channel("b")?))
    })
}

/// Applies the fields present in `value` on top of `default`.
fn parse_style(value: Option<&Value>, default: BasicTextStyle) -> BasicTextStyle {
    let mut style = default;
    if value.is_none() {
        return style;
    }
    if let Some(size) = parse_number(value, "size").filter(|s| *s > 0.0) {
        style.size = size;
    }
    if let Some(color) = parse_color(value, "textcolor") {
        style.text_color = color;
    }
    if let Some(color) = parse_color(value, "backgroundcolor") {
        style.background_color = Some(color);
    }
    if let Some(height) = parse_number(value, "lineheight").filter(|h| *h > 0.0) {
        style.line_height = height;
    }
    if let Some(spacing) = non_negative(value, "beforespacing") {
        style.before_spacing = spacing;
    }
    if let Some(spacing) = non_negative(value, "afterspacing") {
        style.after_spacing = spacing;
    }
    style
}

/// Lengths and spacings; negative values are ignored.
fn non_negative(value: Option<&Value>, field: &str) -> Option<f32> {
    parse_number(value, field).filter(|v| *v >= 0.0)
}

fn parse_margins(value: Option<&Value>, default: Margins) -> Margins {
    Margins {
        top: non_negative(value, "top").unwrap_or(default.top),
        right: non_negative(value, "right").unwrap_or(default.right),
        bottom: non_negative(value, "bottom").unwrap_or(default.bottom),
        left: non_negative(value, "left").unwrap_or(default.left),
    }
}

fn parse_heading_sizes(value: Option<&Value>, default: [f32; 4]) -> [f32; 4] {
    let mut sizes = default;
    if let Some(list) = value.and_then(|h| h.get("sizes")).and_then(Value::as_array) {
        for (slot, v) in sizes.iter_mut().zip(list) {
            if let Some(size) = as_number(v).filter(|s| *s > 0.0) {
                *slot = size;
            }
        }
    }
    sizes
}

fn parse_fonts(value: Option<&Value>) -> FontOptions {
    let mut options = FontOptions::default();
    let Some(fonts) = value else {
        return options;
    };
    if let Some(paths) = fonts.get("search_paths").and_then(Value::as_array) {
        options.search_paths = paths
            .iter()
            .filter_map(Value::as_str)
            .map(PathBuf::from)
            .collect();
    }
    if let Some(bidi) = fonts.get("bidi").and_then(Value::as_bool) {
        options.bidi = bidi;
    }
    options
}

/// Parses a TOML configuration. Invalid TOML yields the defaults.
///
/// ```rust
/// use docmark::config::parse_config_string;
///
/// let config = parse_config_string("[text]\nsize = 12\n[fonts]\nbidi = false\n");
/// assert_eq!(config.style.text.size, 12.0);
/// assert!(!config.fonts.bidi);
/// assert_eq!(config.style.heading_sizes, [20.0, 16.0, 13.0, 11.0]);
/// ```
pub fn parse_config_string(config_str: &str) -> DocmarkConfig {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid configuration, using defaults: {}", e);
            return DocmarkConfig::default();
        }
    };

    let defaults = RenderStyle::default();
    let page = config.get("page");
    let page_size = match page.and_then(|p| p.get("size")).and_then(Value::as_str) {
        Some(name) => PageSize::from_name(name).unwrap_or_else(|| {
            warn!("Unknown page size '{}', using {}", name, defaults.page_size.name());
            defaults.page_size
        }),
        None => defaults.page_size,
    };

    let heading = config.get("heading");
    let rule = config.get("horizontal_rule");
    let style = RenderStyle {
        page_size,
        margins: parse_margins(config.get("margin"), defaults.margins),
        text: parse_style(config.get("text"), defaults.text),
        heading: parse_style(heading, defaults.heading),
        heading_sizes: parse_heading_sizes(heading, defaults.heading_sizes),
        code: parse_style(config.get("code"), defaults.code),
        block_quote: parse_style(config.get("block_quote"), defaults.block_quote),
        block_quote_indent: non_negative(config.get("block_quote"), "indent")
            .unwrap_or(defaults.block_quote_indent),
        list_indent_step: non_negative(config.get("list_item"), "indentstep")
            .unwrap_or(defaults.list_indent_step),
        horizontal_rule_color: parse_color(rule, "color").unwrap_or(defaults.horizontal_rule_color),
        horizontal_rule_spacing: non_negative(rule, "spacing")
            .unwrap_or(defaults.horizontal_rule_spacing),
        blank_line_spacing: non_negative(config.get("text"), "blanklinespacing")
            .unwrap_or(defaults.blank_line_spacing),
        bullet: defaults.bullet,
    };

    let extractor_program = config
        .get("extract")
        .and_then(|e| e.get("program"))
        .and_then(Value::as_str)
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_EXTRACTOR_PROGRAM)
        .to_string();

    DocmarkConfig {
        style,
        fonts: parse_fonts(config.get("fonts")),
        extractor_program,
    }
}

/// Loads the configuration from `source`.
///
/// A file that cannot be read is a [`DocmarkError::ConfigError`]; its content is parsed with
/// [`parse_config_string`] otherwise.
pub fn load_config_from_source(source: ConfigSource) -> Result<DocmarkConfig, DocmarkError> {
    match source {
        ConfigSource::Default => Ok(DocmarkConfig::default()),
        ConfigSource::File(path) => {
            let content = fs::read_to_string(path).map_err(|e| DocmarkError::ConfigError {
                message: format!("Cannot read configuration file '{}': {}", path, e),
                suggestion: "Check the path passed with --config, or run with \
                             --get-default-configuration to create one"
                    .to_string(),
            })?;
            debug!("Loaded configuration from {}", path);
            Ok(parse_config_string(&content))
        }
        ConfigSource::Embedded(content) => Ok(parse_config_string(content)),
    }
}

/// Finds an implicit configuration file: `docmark.toml` in the working directory, then
/// `docmark/config.toml` in the user configuration directory.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("docmark").join("config.toml");
    user.is_file().then_some(user)
}

fn color_toml(rgb: Rgb) -> String {
    format!("{{ r = {}, g = {}, b = {} }}", rgb.0, rgb.1, rgb.2)
}

fn style_toml(name: &str, style: &BasicTextStyle) -> String {
    let mut out = format!(
        "[{}]\nsize = {:?}\ntextcolor = {}\n",
        name,
        style.size,
        color_toml(style.text_color)
    );
    if let Some(bg) = style.background_color {
        out.push_str(&format!("backgroundcolor = {}\n", color_toml(bg)));
    }
    out
}

/// A complete configuration file holding the default values.
pub fn default_config_toml() -> String {
    let config = DocmarkConfig::default();
    let style = &config.style;
    let m = &style.margins;
    let sizes = style
        .heading_sizes
        .iter()
        .map(|s| format!("{:?}", s))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::from("# docmark configuration. All lengths are points.\n\n");
    out.push_str(&format!("[page]\nsize = \"{}\"\n\n", style.page_size.name()));
    out.push_str(&format!(
        "[margin]\ntop = {:?}\nright = {:?}\nbottom = {:?}\nleft = {:?}\n\n",
        m.top, m.right, m.bottom, m.left
    ));
    out.push_str(&style_toml("text", &style.text));
    out.push('\n');
    out.push_str(&style_toml("heading", &style.heading));
    out.push_str(&format!("sizes = [{}]\n\n", sizes));
    out.push_str(&style_toml("code", &style.code));
    out.push('\n');
    out.push_str(&style_toml("block_quote", &style.block_quote));
    out.push('\n');
    out.push_str(&format!(
        "[horizontal_rule]\ncolor = {}\n\n",
        color_toml(style.horizontal_rule_color)
    ));
    out.push_str(&format!(
        "[fonts]\nsearch_paths = []\nbidi = {}\n\n",
        config.fonts.bidi
    ));
    out.push_str(&format!(
        "[extract]\nprogram = \"{}\"\n",
        config.extractor_program
    ));
    out
}
