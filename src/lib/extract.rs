//! Turning input documents into Markdown text.
//!
//! Markdown and plain text files are read as they are. Everything else (Word, PowerPoint, Excel,
//! PDF, HTML, ...) goes through the `markitdown` command line tool, whose standard output is the
//! Markdown rendition of the file.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::config::DEFAULT_EXTRACTOR_PROGRAM;
use crate::DocmarkError;

/// File extensions read directly, compared case-insensitively.
pub const PASSTHROUGH_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Produces Markdown for one input file.
pub trait Extractor {
    fn extract(&self, path: &Path) -> Result<String, DocmarkError>;
}

/// Reads the file as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExtractor;

impl PassthroughExtractor {
    /// Whether `path` has an extension this extractor handles.
    pub fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                PASSTHROUGH_EXTENSIONS
                    .iter()
                    .any(|known| e.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }
}

impl Extractor for PassthroughExtractor {
    fn extract(&self, path: &Path) -> Result<String, DocmarkError> {
        let bytes = fs::read(path).map_err(|e| DocmarkError::extraction(path, e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);
        // A UTF-8 BOM would otherwise end up in the first block.
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
    }
}

/// Runs an external converter and captures its standard output.
#[derive(Debug, Clone)]
pub struct MarkitdownExtractor {
    program: String,
}

impl Default for MarkitdownExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTOR_PROGRAM)
    }
}

impl MarkitdownExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Extractor for MarkitdownExtractor {
    fn extract(&self, path: &Path) -> Result<String, DocmarkError> {
        debug!("Running {} on {}", self.program, path.display());
        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                DocmarkError::extraction(
                    path,
                    format!("failed to run '{}': {}", self.program, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim();
            let message = if reason.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                format!("'{}' exited with {}: {}", self.program, output.status, reason)
            };
            return Err(DocmarkError::extraction(path, message));
        }

        String::from_utf8(output.stdout).map_err(|_| {
            DocmarkError::extraction(path, format!("'{}' produced invalid UTF-8", self.program))
        })
    }
}

/// Picks the extractor for a file: passthrough for Markdown and text, the external tool otherwise.
pub struct DispatchExtractor {
    passthrough: PassthroughExtractor,
    external: MarkitdownExtractor,
}

impl DispatchExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            passthrough: PassthroughExtractor,
            external: MarkitdownExtractor::new(program),
        }
    }
}

impl Default for DispatchExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTOR_PROGRAM)
    }
}

impl Extractor for DispatchExtractor {
    fn extract(&self, path: &Path) -> Result<String, DocmarkError> {
        if PassthroughExtractor::handles(path) {
            self.passthrough.extract(path)
        } else {
            self.external.extract(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_passthrough_extensions() {
        assert!(PassthroughExtractor::handles(Path::new("a.md")));
        assert!(PassthroughExtractor::handles(Path::new("dir/B.MARKDOWN")));
        assert!(PassthroughExtractor::handles(Path::new("notes.txt")));
        assert!(!PassthroughExtractor::handles(Path::new("report.docx")));
        assert!(!PassthroughExtractor::handles(Path::new("README")));
    }

    #[test]
    fn test_passthrough_reads_and_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "\u{feff}# Title\n").unwrap();
        assert_eq!(PassthroughExtractor.extract(&path).unwrap(), "# Title\n");
    }

    #[test]
    fn test_passthrough_missing_file() {
        let err = PassthroughExtractor
            .extract(Path::new("no/such/file.md"))
            .unwrap_err();
        assert!(matches!(err, DocmarkError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_missing_program_is_extraction_error() {
        let extractor = MarkitdownExtractor::new("docmark-test-no-such-program");
        let err = extractor.extract(&PathBuf::from("file.docx")).unwrap_err();
        match err {
            DocmarkError::ExtractionFailed { message, .. } => {
                assert!(message.contains("docmark-test-no-such-program"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_uses_passthrough_for_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.markdown");
        fs::write(&path, "text").unwrap();
        let extractor = DispatchExtractor::new("docmark-test-no-such-program");
        assert_eq!(extractor.extract(&path).unwrap(), "text");
    }
}
