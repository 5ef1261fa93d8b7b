use crate::markdown::{tokenize, Block};

/// Escapes a string for use inside a JSON string literal.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl Block<'_> {
    /// Saves blocks to a JSON file for inspection.
    /// Text-carrying blocks list the styled runs of their line.
    ///
    /// # Arguments
    /// * `blocks` - The parsed blocks
    /// * `file_path` - Path to the output JSON file (e.g., "blocks.json")
    ///
    /// # Example
    /// ```no_run
    /// use docmark::markdown::{parse, Block};
    ///
    /// let blocks: Vec<Block> = parse("# Title").collect();
    /// Block::save_to_json_file(&blocks, "blocks.json").unwrap();
    /// ```
    pub fn save_to_json_file(blocks: &[Block], file_path: &str) -> std::io::Result<()> {
        std::fs::write(file_path, Self::blocks_to_readable_json(blocks))
    }

    /// Renders the block as an indented JSON object.
    fn to_readable_json(&self, indent_level: usize) -> String {
        let indent = "  ".repeat(indent_level);
        let inner_indent = "  ".repeat(indent_level + 1);

        let mut fields = vec![format!("\"type\": \"{}\"", self.kind_name())];
        match self {
            Block::Heading { level, .. } => fields.push(format!("\"level\": {}", level)),
            Block::UnorderedListItem { indent, .. } | Block::OrderedListItem { indent, .. } => {
                fields.push(format!("\"indent\": {}", indent))
            }
            Block::FencedCode { lines } => {
                let lines: Vec<String> = lines
                    .iter()
                    .map(|l| format!("\"{}\"", escape(l)))
                    .collect();
                fields.push(format!("\"lines\": [{}]", lines.join(", ")));
            }
            _ => {}
        }

        if let Some(text) = self.text() {
            fields.push(format!("\"text\": \"{}\"", escape(text)));
            let runs: Vec<String> = tokenize(text)
                .map(|run| {
                    format!(
                        "{}  {{ \"style\": \"{}\", \"text\": \"{}\" }}",
                        inner_indent,
                        run.style.as_str(),
                        escape(run.text)
                    )
                })
                .collect();
            if runs.is_empty() {
                fields.push("\"runs\": []".to_string());
            } else {
                fields.push(format!(
                    "\"runs\": [\n{}\n{}]",
                    runs.join(",\n"),
                    inner_indent
                ));
            }
        }

        let body: Vec<String> = fields
            .iter()
            .map(|f| format!("{}{}", inner_indent, f))
            .collect();
        format!("{}{{\n{}\n{}}}", indent, body.join(",\n"), indent)
    }

    /// Converts a block list into a readable JSON array.
    pub fn blocks_to_readable_json(blocks: &[Block]) -> String {
        let mut result = String::from("[\n");

        for (i, block) in blocks.iter().enumerate() {
            result.push_str(&block.to_readable_json(1));
            if i < blocks.len() - 1 {
                result.push(',');
            }
            result.push('\n');
        }

        result.push(']');
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;
    use std::fs;

    #[test]
    fn test_blocks_to_readable_json() {
        let blocks: Vec<Block> = parse("# Title\n- **bold** item\n```\nfn main() {}\n```").collect();
        let json = Block::blocks_to_readable_json(&blocks);
        assert!(json.contains("\"type\": \"Heading\""));
        assert!(json.contains("\"level\": 1"));
        assert!(json.contains("\"style\": \"bold\""));
        assert!(json.contains("\"lines\": [\"fn main() {}\"]"));
        assert!(json.starts_with("[\n"));
        assert!(json.ends_with(']'));
    }

    #[test]
    fn test_escape_quotes_and_control() {
        assert_eq!(escape("a\"b\\c\n"), "a\\\"b\\\\c\\n");
        assert_eq!(escape("\u{1}"), "\\u0001");
        assert_eq!(escape("שלום"), "שלום");
    }

    #[test]
    fn test_save_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        let blocks: Vec<Block> = parse("---\n\ntext").collect();
        Block::save_to_json_file(&blocks, path.to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("HorizontalRule"));
        assert!(content.contains("BlankLine"));
        assert!(content.contains("\"text\": \"text\""));
    }

    #[test]
    fn test_empty_block_list() {
        assert_eq!(Block::blocks_to_readable_json(&[]), "[\n]");
    }
}
