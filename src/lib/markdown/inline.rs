//! Inline markup tokenizer.
//!
//! Splits one logical line into styled runs using three non-nesting delimiter pairs, tried in
//! this order at every position: `**bold**`, `*italic*` and `` `code` ``. A delimiter only opens a
//! span when a closer exists later on the same line with non-empty content in between; otherwise
//! it is kept as literal text. Runs borrow from the input line.

/// Emphasis applied to a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStyle {
    Plain,
    Bold,
    Italic,
    Code,
}

impl RunStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStyle::Plain => "plain",
            RunStyle::Bold => "bold",
            RunStyle::Italic => "italic",
            RunStyle::Code => "code",
        }
    }
}

/// A contiguous span of text sharing one style, delimiters removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun<'a> {
    pub text: &'a str,
    pub style: RunStyle,
}

impl<'a> StyledRun<'a> {
    pub fn new(text: &'a str, style: RunStyle) -> Self {
        Self { text, style }
    }
}

/// Delimiter kinds, used to index the search memo.
#[derive(Clone, Copy)]
enum Delim {
    DoubleStar,
    Star,
    Backtick,
}

impl Delim {
    fn pattern(self) -> &'static str {
        match self {
            Delim::DoubleStar => "**",
            Delim::Star => "*",
            Delim::Backtick => "`",
        }
    }

    fn style(self) -> RunStyle {
        match self {
            Delim::DoubleStar => RunStyle::Bold,
            Delim::Star => RunStyle::Italic,
            Delim::Backtick => RunStyle::Code,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Lazy single-pass tokenizer over one line.
///
/// A failed closer search is remembered as the lowest byte offset from which that delimiter is
/// known to be absent, so a line full of unmatched markers is still scanned in linear time.
pub struct InlineTokenizer<'a> {
    line: &'a str,
    pos: usize,
    absent_from: [usize; 3],
}

impl<'a> InlineTokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            absent_from: [usize::MAX; 3],
        }
    }

    /// Finds `delim` at or after `from`, consulting and updating the memo.
    fn find_closer(&mut self, delim: Delim, from: usize) -> Option<usize> {
        if from >= self.absent_from[delim.index()] || from > self.line.len() {
            return None;
        }
        match self.line[from..].find(delim.pattern()) {
            Some(offset) => Some(from + offset),
            None => {
                self.absent_from[delim.index()] = from;
                None
            }
        }
    }

    /// Tries to open a span at byte offset `at`, falling back from `**` to `*` when the double
    /// marker has no closer. Returns the run and the offset after its closer.
    fn span_at(&mut self, at: usize) -> Option<(StyledRun<'a>, usize)> {
        let rest = &self.line[at..];
        if rest.starts_with("**") {
            self.span_with(Delim::DoubleStar, at)
                .or_else(|| self.span_with(Delim::Star, at))
        } else if rest.starts_with('*') {
            self.span_with(Delim::Star, at)
        } else if rest.starts_with('`') {
            self.span_with(Delim::Backtick, at)
        } else {
            None
        }
    }

    fn span_with(&mut self, delim: Delim, at: usize) -> Option<(StyledRun<'a>, usize)> {
        let open_len = delim.pattern().len();
        let content_start = at + open_len;
        // Content must be non-empty: the closer is searched one char past the opener.
        let first_len = self.line[content_start..].chars().next()?.len_utf8();
        let close = self.find_closer(delim, content_start + first_len)?;
        let text = &self.line[content_start..close];
        Some((StyledRun::new(text, delim.style()), close + open_len))
    }
}

impl<'a> Iterator for InlineTokenizer<'a> {
    type Item = StyledRun<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.line.len() {
            return None;
        }

        if let Some((run, end)) = self.span_at(self.pos) {
            self.pos = end;
            return Some(run);
        }

        // Plain text up to the next position where a span opens.
        let start = self.pos;
        let mut cursor = start;
        let line = self.line;
        for (offset, c) in line[start..].char_indices() {
            let at = start + offset;
            if at > start && matches!(c, '*' | '`') && self.span_at(at).is_some() {
                break;
            }
            cursor = at + c.len_utf8();
        }
        self.pos = cursor;
        Some(StyledRun::new(&line[start..cursor], RunStyle::Plain))
    }
}

/// Tokenizes `line` into styled runs.
///
/// ```rust
/// use docmark::markdown::inline::{tokenize, RunStyle};
///
/// let runs: Vec<_> = tokenize("Some **bold** text").collect();
/// assert_eq!(runs.len(), 3);
/// assert_eq!(runs[1].text, "bold");
/// assert_eq!(runs[1].style, RunStyle::Bold);
/// ```
pub fn tokenize(line: &str) -> InlineTokenizer<'_> {
    InlineTokenizer::new(line)
}

/// Concatenates the run texts of `line`, dropping the markup delimiters.
pub fn strip_markup(line: &str) -> String {
    tokenize(line).map(|run| run.text).collect()
}
