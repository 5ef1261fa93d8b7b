//! File and directory conversion: extract Markdown, save it, then render it to PDF.
//!
//! For an input `report.docx` and output directory `out`, a conversion writes `out/report.md` and,
//! when requested, `out/report.pdf`. The Markdown is the primary result: a PDF failure is
//! recorded as a warning and the Markdown file is kept.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::extract::Extractor;
use crate::{DocmarkError, Engine};

/// Outcome of converting one input file.
#[derive(Debug)]
pub struct ConversionReport {
    pub source: PathBuf,
    /// The written Markdown file, `None` when extraction failed.
    pub md_path: Option<PathBuf>,
    /// The written PDF, `None` when not requested or when rendering failed.
    pub pdf_path: Option<PathBuf>,
    /// Extraction or Markdown write failure.
    pub error: Option<DocmarkError>,
    /// Non-fatal problems, including a failed PDF render.
    pub warnings: Vec<String>,
}

impl ConversionReport {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            md_path: None,
            pdf_path: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    fn failed(mut self, error: DocmarkError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs conversions with one extractor and one engine.
pub struct Converter<'a, E: Extractor> {
    engine: &'a Engine,
    extractor: E,
}

impl<'a, E: Extractor> Converter<'a, E> {
    pub fn new(engine: &'a Engine, extractor: E) -> Self {
        Self { engine, extractor }
    }

    /// Converts `src` into `<stem>.md` (and `<stem>.pdf` if `generate_pdf`) inside `out_dir`.
    pub fn convert_file(&self, src: &Path, out_dir: &Path, generate_pdf: bool) -> ConversionReport {
        let report = ConversionReport::new(src);

        if let Err(e) = fs::create_dir_all(out_dir) {
            return report.failed(DocmarkError::IoError {
                message: format!("Cannot create output directory: {}", e),
                path: out_dir.display().to_string(),
                suggestion: "Choose another directory with --output".to_string(),
            });
        }

        let markdown = match self.extractor.extract(src) {
            Ok(text) => text,
            Err(e) => return report.failed(e),
        };

        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let md_path = out_dir.join(format!("{}.md", stem));
        if let Err(e) = fs::write(&md_path, &markdown) {
            return report.failed(DocmarkError::IoError {
                message: format!("Cannot write Markdown: {}", e),
                path: md_path.display().to_string(),
                suggestion: "Check that the output directory is writable".to_string(),
            });
        }
        info!("Markdown written to {}", md_path.display());

        let mut report = report;
        report.md_path = Some(md_path);
        report.warnings = self.engine.validate(&markdown);

        if generate_pdf {
            let pdf_path = out_dir.join(format!("{}.pdf", stem));
            match self.engine.render_to_file(&markdown, &pdf_path) {
                Ok(()) => report.pdf_path = Some(pdf_path),
                Err(e) => {
                    warn!("PDF generation failed for {}: {}", src.display(), e);
                    report
                        .warnings
                        .push(format!("PDF generation failed: {}", e));
                }
            }
        }
        report
    }

    /// Converts every regular file directly inside `input_dir`, in file name order.
    pub fn convert_directory(
        &self,
        input_dir: &Path,
        out_dir: &Path,
        generate_pdf: bool,
    ) -> Result<Vec<ConversionReport>, DocmarkError> {
        let files = list_files(input_dir)?;
        if files.is_empty() {
            info!("No files found in {}", input_dir.display());
        }
        Ok(files
            .iter()
            .map(|src| self.convert_file(src, out_dir, generate_pdf))
            .collect())
    }
}

/// Regular files directly inside `dir`, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DocmarkError> {
    let io_error = |e: std::io::Error| DocmarkError::IoError {
        message: format!("Cannot read input directory: {}", e),
        path: dir.display().to_string(),
        suggestion: "Check that the directory exists and is readable".to_string(),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
