//! Line-oriented block parser.
//!
//! Each line of the document is classified on its own, except while inside a fenced code block
//! where lines are collected verbatim until the closing fence. Classification order when not
//! fenced:
//!
//! 1. a line starting with three backticks opens a fence
//! 2. three or more `-`, `_` or `*` making up the whole line is a horizontal rule
//! 3. one to four `#` followed by whitespace is a heading
//! 4. optional indentation, `-`/`*`/`+` and whitespace is an unordered list item
//! 5. optional indentation, digits, `.` and whitespace is an ordered list item
//! 6. a line starting with `> ` is a blockquote
//! 7. an empty or whitespace-only line is a blank line
//! 8. anything else is paragraph text
//!
//! Nothing here fails: a fence left open at the end of the document is closed there.

use std::str::Lines;

const FENCE: &str = "```";

/// One parsed block, borrowing its text from the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Heading { level: u8, text: &'a str },
    /// `indent` counts leading whitespace characters.
    UnorderedListItem { indent: usize, text: &'a str },
    /// `text` keeps the number, e.g. `"2. Second"`.
    OrderedListItem { indent: usize, text: &'a str },
    Blockquote { text: &'a str },
    HorizontalRule,
    FencedCode { lines: Vec<&'a str> },
    BlankLine,
    Paragraph { text: &'a str },
}

impl<'a> Block<'a> {
    /// Short name of the block kind, used in logs and debug dumps.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "Heading",
            Block::UnorderedListItem { .. } => "UnorderedListItem",
            Block::OrderedListItem { .. } => "OrderedListItem",
            Block::Blockquote { .. } => "Blockquote",
            Block::HorizontalRule => "HorizontalRule",
            Block::FencedCode { .. } => "FencedCode",
            Block::BlankLine => "BlankLine",
            Block::Paragraph { .. } => "Paragraph",
        }
    }

    /// The inline text carried by the block, if it has one.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Block::Heading { text, .. }
            | Block::UnorderedListItem { text, .. }
            | Block::OrderedListItem { text, .. }
            | Block::Blockquote { text }
            | Block::Paragraph { text } => Some(text),
            Block::HorizontalRule | Block::FencedCode { .. } | Block::BlankLine => None,
        }
    }
}

/// Lazy block iterator over a Markdown document.
pub struct BlockParser<'a> {
    lines: Lines<'a>,
}

impl<'a> BlockParser<'a> {
    pub fn new(document: &'a str) -> Self {
        Self {
            lines: document.lines(),
        }
    }

    /// Collects lines until a closing fence or the end of the document.
    fn read_fenced(&mut self) -> Block<'a> {
        let mut lines = Vec::new();
        for line in self.lines.by_ref() {
            if line.starts_with(FENCE) {
                return Block::FencedCode { lines };
            }
            lines.push(line);
        }
        log::debug!("Unterminated code fence closed at end of document");
        Block::FencedCode { lines }
    }
}

impl<'a> Iterator for BlockParser<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.lines.next()?;
        if raw.starts_with(FENCE) {
            return Some(self.read_fenced());
        }
        Some(classify_line(raw))
    }
}

/// Parses `document` into its block sequence.
///
/// ```rust
/// use docmark::markdown::block::{parse, Block};
///
/// let blocks: Vec<_> = parse("# Title\n\nSome *italic* text.\n").collect();
/// assert_eq!(blocks[0], Block::Heading { level: 1, text: "Title" });
/// assert_eq!(blocks[1], Block::BlankLine);
/// assert_eq!(blocks[2], Block::Paragraph { text: "Some *italic* text." });
/// ```
pub fn parse(document: &str) -> BlockParser<'_> {
    BlockParser::new(document)
}

/// Classifies a single line outside a fence.
fn classify_line(raw: &str) -> Block<'_> {
    let line = raw.trim_end();

    if is_horizontal_rule(line) {
        return Block::HorizontalRule;
    }
    if let Some((level, text)) = heading(line) {
        return Block::Heading { level, text };
    }
    if let Some((indent, text)) = unordered_item(line) {
        return Block::UnorderedListItem { indent, text };
    }
    if let Some(indent) = ordered_item_indent(line) {
        return Block::OrderedListItem {
            indent,
            text: line.trim_start(),
        };
    }
    if let Some(text) = line.strip_prefix("> ") {
        return Block::Blockquote { text };
    }
    if line.is_empty() {
        return Block::BlankLine;
    }
    Block::Paragraph { text: line }
}

fn is_horizontal_rule(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    matches!(first, '-' | '_' | '*') && line.len() >= 3 && line.chars().all(|c| c == first)
}

/// Skips a run of whitespace and returns the rest, or `None` when there is no whitespace.
fn after_whitespace(s: &str) -> Option<&str> {
    let rest = s.trim_start();
    (rest.len() < s.len()).then_some(rest)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=4).contains(&hashes) {
        return None;
    }
    let text = after_whitespace(&line[hashes..])?;
    Some((hashes as u8, text))
}

/// Splits leading whitespace, returning its char count and the remainder.
fn split_indent(line: &str) -> (usize, &str) {
    let rest = line.trim_start();
    let indent = line[..line.len() - rest.len()].chars().count();
    (indent, rest)
}

fn unordered_item(line: &str) -> Option<(usize, &str)> {
    let (indent, rest) = split_indent(line);
    let marker = rest.chars().next()?;
    if !matches!(marker, '-' | '*' | '+') {
        return None;
    }
    let text = after_whitespace(&rest[marker.len_utf8()..])?;
    Some((indent, text))
}

fn ordered_item_indent(line: &str) -> Option<usize> {
    let (indent, rest) = split_indent(line);
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let after_dot = rest[digits..].strip_prefix('.')?;
    after_whitespace(after_dot)?;
    Some(indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(doc: &str) -> Vec<Block<'_>> {
        parse(doc).collect()
    }

    #[test]
    fn test_heading_blank_paragraph() {
        assert_eq!(
            blocks("# Title\n\nSome *italic* text.\n"),
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title"
                },
                Block::BlankLine,
                Block::Paragraph {
                    text: "Some *italic* text."
                },
            ]
        );
    }

    #[test]
    fn test_fenced_code_block() {
        assert_eq!(
            blocks("```\nline1\nline2\n```\n"),
            vec![Block::FencedCode {
                lines: vec!["line1", "line2"]
            }]
        );
    }

    #[test]
    fn test_fence_lines_are_verbatim() {
        assert_eq!(
            blocks("```rust\n# not a heading\n- not a list  \n```"),
            vec![Block::FencedCode {
                lines: vec!["# not a heading", "- not a list  "]
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_closes_at_eof() {
        assert_eq!(
            blocks("intro\n```\ncode"),
            vec![
                Block::Paragraph { text: "intro" },
                Block::FencedCode {
                    lines: vec!["code"]
                },
            ]
        );
    }

    #[test]
    fn test_empty_fence() {
        assert_eq!(
            blocks("```\n```"),
            vec![Block::FencedCode { lines: vec![] }]
        );
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(blocks("---"), vec![Block::HorizontalRule]);
        assert_eq!(blocks("___"), vec![Block::HorizontalRule]);
        assert_eq!(blocks("*****"), vec![Block::HorizontalRule]);
        assert_eq!(blocks("---   "), vec![Block::HorizontalRule]);
        assert_eq!(blocks("--"), vec![Block::Paragraph { text: "--" }]);
        assert_eq!(blocks("-*-"), vec![Block::Paragraph { text: "-*-" }]);
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            blocks("#### Four"),
            vec![Block::Heading {
                level: 4,
                text: "Four"
            }]
        );
        assert_eq!(
            blocks("##\tTabbed"),
            vec![Block::Heading {
                level: 2,
                text: "Tabbed"
            }]
        );
        assert_eq!(
            blocks("##### Five"),
            vec![Block::Paragraph { text: "##### Five" }]
        );
        assert_eq!(
            blocks("#NoSpace"),
            vec![Block::Paragraph { text: "#NoSpace" }]
        );
    }

    #[test]
    fn test_unordered_items_with_indent() {
        assert_eq!(
            blocks("- one\n  * two\n    + three"),
            vec![
                Block::UnorderedListItem {
                    indent: 0,
                    text: "one"
                },
                Block::UnorderedListItem {
                    indent: 2,
                    text: "two"
                },
                Block::UnorderedListItem {
                    indent: 4,
                    text: "three"
                },
            ]
        );
        assert_eq!(blocks("-dash"), vec![Block::Paragraph { text: "-dash" }]);
    }

    #[test]
    fn test_ordered_items_keep_number() {
        assert_eq!(
            blocks("1. First\n   12. Twelfth"),
            vec![
                Block::OrderedListItem {
                    indent: 0,
                    text: "1. First"
                },
                Block::OrderedListItem {
                    indent: 3,
                    text: "12. Twelfth"
                },
            ]
        );
        assert_eq!(blocks("3.14"), vec![Block::Paragraph { text: "3.14" }]);
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            blocks("> quoted text"),
            vec![Block::Blockquote {
                text: "quoted text"
            }]
        );
        assert_eq!(blocks(">tight"), vec![Block::Paragraph { text: ">tight" }]);
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        assert_eq!(blocks("   \t"), vec![Block::BlankLine]);
        assert_eq!(blocks("\r\n"), vec![Block::BlankLine]);
    }

    #[test]
    fn test_paragraph_trailing_whitespace_trimmed() {
        assert_eq!(
            blocks("  indented text   "),
            vec![Block::Paragraph {
                text: "  indented text"
            }]
        );
    }

    #[test]
    fn test_text_accessor() {
        assert_eq!(Block::HorizontalRule.text(), None);
        assert_eq!(
            Block::Blockquote { text: "q" }.text(),
            Some("q")
        );
        assert_eq!(Block::BlankLine.kind_name(), "BlankLine");
    }
}
