//! docmark renders the Markdown produced by document extraction tools into PDF, with first-class
//! support for right-to-left scripts.
//!
//! The pipeline is a chain of small components:
//! [`markdown::parse`] splits the document into blocks, [`markdown::tokenize`] splits a line into
//! styled runs, [`layout::LayoutEngine`] places everything on pages (reordering Hebrew and Arabic
//! lines with [`bidi::Reorderer`]) and [`pdf::PdfWriter`] serializes the pages. An [`Engine`]
//! holds the fonts, style and reorder strategy shared by all of them.
//!
//! ```rust
//! use docmark::config::ConfigSource;
//!
//! fn example() -> Result<(), docmark::DocmarkError> {
//!     let markdown = "# Hello World\nThis is a **test**.";
//!     let bytes = docmark::parse_into_bytes(markdown, ConfigSource::Default)?;
//!     assert!(bytes.starts_with(b"%PDF"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Rendering several documents with the same setup should reuse one engine, so fonts are
//! resolved and loaded only once:
//!
//! ```rust
//! use docmark::bidi::Reorderer;
//! use docmark::fonts::FontBook;
//! use docmark::styling::RenderStyle;
//! use docmark::Engine;
//!
//! let engine = Engine::new(FontBook::builtin(), RenderStyle::default(), Reorderer::default());
//! let first = engine.layout("# One");
//! let second = engine.layout("# Two\n\nBody");
//! assert_eq!(first.page_count(), 1);
//! assert_eq!(second.page_count(), 1);
//! ```
//!
//! Styling is configured with TOML, see [`config`].

pub mod bidi;
pub mod config;
pub mod convert;
mod debug;
pub mod extract;
pub mod fonts;
pub mod layout;
pub mod markdown;
pub mod pdf;
pub mod script;
pub mod styling;
pub mod validation;

use std::error::Error;
use std::fmt;
use std::path::Path;

use log::debug;

use bidi::Reorderer;
use config::{load_config_from_source, ConfigSource, DocmarkConfig};
use fonts::{resolve_fonts, FontBook, FontResolver};
use layout::{LayoutEngine, RenderedDocument};
use pdf::PdfWriter;
use styling::RenderStyle;

/// Errors surfaced by conversion. Font and bidi degradations are logged, not returned.
#[derive(Debug)]
pub enum DocmarkError {
    /// The input document could not be turned into Markdown
    ExtractionFailed { path: String, message: String },
    /// The PDF could not be produced or written
    SerializationFailed {
        path: Option<String>,
        message: String,
        suggestion: Option<String>,
    },
    /// An explicitly requested configuration could not be read
    ConfigError { message: String, suggestion: String },
    /// A file system problem outside PDF serialization
    IoError {
        message: String,
        path: String,
        suggestion: String,
    },
}

impl Error for DocmarkError {}
impl fmt::Display for DocmarkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocmarkError::ExtractionFailed { path, message } => {
                write!(f, "❌ Extraction Error: {}", message)?;
                write!(f, "\n📁 Path: {}", path)?;
                Ok(())
            }
            DocmarkError::SerializationFailed {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ PDF Generation Error: {}", message)?;
                if let Some(p) = path {
                    write!(f, "\n📁 Path: {}", p)?;
                }
                if let Some(hint) = suggestion {
                    write!(f, "\n💡 Suggestion: {}", hint)?;
                }
                Ok(())
            }
            DocmarkError::ConfigError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Configuration Error: {}", message)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
            DocmarkError::IoError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ File Error: {}", message)?;
                write!(f, "\n📁 Path: {}", path)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
        }
    }
}

impl DocmarkError {
    pub fn extraction(path: &Path, message: impl Into<String>) -> Self {
        DocmarkError::ExtractionFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Serialization error for `path` with a suggestion derived from the message.
    pub fn serialization(path: &Path, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let suggestion = if lower.contains("permission") || lower.contains("denied") {
            "Check that you have write permissions for the output location"
        } else {
            "Check that the output directory exists and there is enough disk space"
        };
        DocmarkError::SerializationFailed {
            path: Some(path.display().to_string()),
            message,
            suggestion: Some(suggestion.to_string()),
        }
    }
}

/// Fonts, style and reorder strategy for a series of renders.
///
/// An engine is immutable; each render owns its own page state, so one engine can serve any
/// number of documents.
#[derive(Debug, Clone)]
pub struct Engine {
    fonts: FontBook,
    style: RenderStyle,
    reorderer: Reorderer,
}

impl Engine {
    pub fn new(fonts: FontBook, style: RenderStyle, reorderer: Reorderer) -> Self {
        Self {
            fonts,
            style,
            reorderer,
        }
    }

    /// Resolves and loads fonts (configured directories first, then the system locations) and
    /// selects the reorder strategy.
    pub fn from_config(config: &DocmarkConfig) -> Self {
        let set = if config.fonts.search_paths.is_empty() {
            resolve_fonts()
        } else {
            FontResolver::system()
                .with_search_paths(&config.fonts.search_paths)
                .resolve()
        };
        debug!("Resolved font set: {:?}", set);
        Self::new(
            FontBook::load(&set),
            config.style.clone(),
            Reorderer::from_config(config.fonts.bidi),
        )
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn reorderer(&self) -> Reorderer {
        self.reorderer
    }

    /// Parses and lays out `markdown`.
    pub fn layout(&self, markdown: &str) -> RenderedDocument {
        LayoutEngine::new(&self.fonts, &self.style, self.reorderer).render(markdown::parse(markdown))
    }

    /// Warnings about input that will not render as expected.
    pub fn validate(&self, markdown: &str) -> Vec<String> {
        validation::validate_conversion(markdown, &self.fonts, self.reorderer)
    }

    pub fn render_to_bytes(&self, markdown: &str) -> Result<Vec<u8>, DocmarkError> {
        let rendered = self.layout(markdown);
        PdfWriter::new(&self.fonts)
            .to_bytes(&rendered)
            .map_err(|message| DocmarkError::SerializationFailed {
                message,
                path: None,
                suggestion: Some(
                    "Check available memory and try with a smaller document".to_string(),
                ),
            })
    }

    /// Renders `markdown` into the PDF file at `path`.
    pub fn render_to_file(&self, markdown: &str, path: &Path) -> Result<(), DocmarkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(DocmarkError::IoError {
                    message: "Output directory does not exist".to_string(),
                    path: parent.display().to_string(),
                    suggestion: format!(
                        "Create the directory first: mkdir -p {}",
                        parent.display()
                    ),
                });
            }
        }
        let rendered = self.layout(markdown);
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("docmark");
        PdfWriter::new(&self.fonts)
            .with_title(title)
            .write(&rendered, path)
    }
}

/// Converts `markdown` to a PDF file at `path`, configured from `config`.
///
/// # Example
/// ```rust
/// use docmark::config::ConfigSource;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("hello.pdf");
/// docmark::parse_into_file("# Hello\nשלום עולם", path.to_str().unwrap(), ConfigSource::Default)
///     .unwrap();
/// assert!(path.exists());
/// ```
pub fn parse_into_file(
    markdown: &str,
    path: &str,
    config: ConfigSource,
) -> Result<(), DocmarkError> {
    let config = load_config_from_source(config)?;
    Engine::from_config(&config).render_to_file(markdown, Path::new(path))
}

/// Converts `markdown` to PDF bytes, configured from `config`.
pub fn parse_into_bytes(markdown: &str, config: ConfigSource) -> Result<Vec<u8>, DocmarkError> {
    let config = load_config_from_source(config)?;
    Engine::from_config(&config).render_to_bytes(markdown)
}
