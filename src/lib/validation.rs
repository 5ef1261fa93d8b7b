//! Pre-flight checks run before rendering.
//!
//! None of these conditions stop a conversion. They point at input that will render differently
//! from what the author probably expects, so the CLI can print them (and `--dry-run` can stop
//! after them).

use crate::bidi::Reorderer;
use crate::fonts::FontBook;
use crate::markdown::{parse, Block};
use crate::script::is_rtl;

/// Maximum number of unsupported characters quoted in a warning.
const MAX_REPORTED_CHARS: usize = 10;

/// Returns human-readable warnings for `markdown` rendered with `fonts` and `reorderer`.
///
/// ```rust
/// use docmark::bidi::Reorderer;
/// use docmark::fonts::FontBook;
/// use docmark::validation::validate_conversion;
///
/// let warnings = validate_conversion("```\nnever closed", &FontBook::builtin(), Reorderer::Identity);
/// assert!(warnings.iter().any(|w| w.contains("code fence")));
/// ```
pub fn validate_conversion(markdown: &str, fonts: &FontBook, reorderer: Reorderer) -> Vec<String> {
    let mut warnings = Vec::new();

    let fences = markdown
        .lines()
        .filter(|line| line.starts_with("```"))
        .count();
    if fences % 2 == 1 {
        warnings.push(
            "Unterminated code fence: everything after the last ``` is rendered as code"
                .to_string(),
        );
    }

    let rtl_lines = parse(markdown)
        .filter(|block| block.text().is_some_and(is_rtl))
        .count();
    let rtl_in_code = parse(markdown).any(|block| match block {
        Block::FencedCode { lines } => lines.iter().any(|l| is_rtl(l)),
        _ => false,
    });

    if rtl_lines > 0 && reorderer.is_identity() {
        warnings.push(format!(
            "{} right-to-left line(s) found but bidi reordering is disabled; \
             they will be drawn in logical order",
            rtl_lines
        ));
    }
    if (rtl_lines > 0 || rtl_in_code) && fonts.is_builtin() {
        warnings.push(
            "Right-to-left text found but no Unicode font is available; \
             Hebrew and Arabic glyphs will be missing"
                .to_string(),
        );
    }

    let missing = fonts.missing_glyphs(markdown);
    if !missing.is_empty() {
        let sample: String = missing.iter().take(MAX_REPORTED_CHARS).collect();
        let more = if missing.len() > MAX_REPORTED_CHARS {
            format!(" and {} more", missing.len() - MAX_REPORTED_CHARS)
        } else {
            String::new()
        };
        warnings.push(format!(
            "The selected font cannot draw {} character(s): '{}'{}",
            missing.len(),
            sample,
            more
        ));
    }

    warnings
}
