//! Markdown parsing: a line-oriented block parser and a per-line inline tokenizer.
//!
//! Only the subset needed for extracted documents is recognised: headings up to level four,
//! flat list items, single-line blockquotes, horizontal rules, fenced code and paragraphs, with
//! `**bold**`, `*italic*` and `` `code` `` inside a line. Everything else is rendered as literal
//! paragraph text.

pub mod block;
pub mod inline;

pub use block::{parse, Block, BlockParser};
pub use inline::{strip_markup, tokenize, InlineTokenizer, RunStyle, StyledRun};
