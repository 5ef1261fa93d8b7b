//! Logical-to-visual reordering for mixed-direction lines.
//!
//! The reordering strategy is picked once when the engine is built. With the `bidi` feature the
//! Unicode Bidirectional Algorithm from `unicode-bidi` is used; without it, or when disabled in the
//! configuration, lines pass through unchanged. The identity variant still renders RTL text, just
//! in logical order.

use log::warn;

/// How right-to-left lines are turned into visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorderer {
    /// Unicode Bidirectional Algorithm (UAX #9).
    #[cfg(feature = "bidi")]
    Unicode,
    /// Returns the input unchanged.
    Identity,
}

impl Default for Reorderer {
    fn default() -> Self {
        Self::available()
    }
}

impl Reorderer {
    /// The best strategy compiled into this build.
    pub fn available() -> Self {
        #[cfg(feature = "bidi")]
        {
            Reorderer::Unicode
        }
        #[cfg(not(feature = "bidi"))]
        {
            Reorderer::Identity
        }
    }

    /// Picks a strategy from the `fonts.bidi` configuration switch.
    pub fn from_config(enabled: bool) -> Self {
        if !enabled {
            return Reorderer::Identity;
        }
        let reorderer = Self::available();
        if reorderer == Reorderer::Identity {
            warn!("Bidi reordering requested but not compiled in; RTL lines keep logical order");
        }
        reorderer
    }

    /// Whether this strategy actually reorders.
    pub fn is_identity(&self) -> bool {
        *self == Reorderer::Identity
    }

    /// Converts one logical line into visual order.
    ///
    /// Line breaks are not expected in `text`; callers wrap first and reorder each visual line.
    pub fn reorder(&self, text: &str) -> String {
        match self {
            #[cfg(feature = "bidi")]
            Reorderer::Unicode => reorder_unicode(text),
            Reorderer::Identity => text.to_string(),
        }
    }
}

#[cfg(feature = "bidi")]
fn reorder_unicode(text: &str) -> String {
    use unicode_bidi::BidiInfo;

    let bidi_info = BidiInfo::new(text, None);
    let mut visual = String::with_capacity(text.len());
    for para in &bidi_info.paragraphs {
        let line = para.range.clone();
        visual.push_str(&bidi_info.reorder_line(para, line));
    }
    visual
}
