//! Script detection for right-to-left text.
//!
//! Direction is decided per line: a line containing any Hebrew or Arabic code point is laid out
//! as a right-aligned block and passed through the bidi reorderer before placement.

/// Inclusive code point ranges treated as right-to-left script.
const RTL_RANGES: [(u32, u32); 5] = [
    (0x0590, 0x05FF), // Hebrew
    (0x0600, 0x06FF), // Arabic
    (0x0750, 0x077F), // Arabic Supplement
    (0xFB00, 0xFDFF), // Alphabetic Presentation Forms / Arabic Presentation Forms-A
    (0xFE70, 0xFEFF), // Arabic Presentation Forms-B
];

/// Returns true if `c` falls in one of the right-to-left ranges.
pub fn is_rtl_char(c: char) -> bool {
    let cp = c as u32;
    RTL_RANGES.iter().any(|&(lo, hi)| lo <= cp && cp <= hi)
}

/// Returns true if `text` contains any right-to-left character.
///
/// ```rust
/// assert!(docmark::script::is_rtl("שלום world"));
/// assert!(!docmark::script::is_rtl("hello world"));
/// ```
pub fn is_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_range_boundary_is_rtl() {
        for &(lo, hi) in RTL_RANGES.iter() {
            for cp in [lo, hi, (lo + hi) / 2] {
                let c = char::from_u32(cp).unwrap();
                assert!(is_rtl(&c.to_string()), "U+{:04X} should be RTL", cp);
            }
        }
    }

    #[test]
    fn test_just_outside_ranges_is_ltr() {
        for cp in [0x058F, 0x0700, 0x074F, 0x0780, 0xFAFF, 0xFE00, 0xFE6F, 0xFF00] {
            let c = char::from_u32(cp).unwrap();
            assert!(!is_rtl(&c.to_string()), "U+{:04X} should not be RTL", cp);
        }
    }

    #[test]
    fn test_hebrew_and_arabic_words() {
        assert!(is_rtl("דוח מכירות"));
        assert!(is_rtl("مرحبا"));
        assert!(is_rtl("Revenue: ₪ 1,200 צפון"));
    }

    #[test]
    fn test_latin_cjk_and_empty_are_ltr() {
        assert!(!is_rtl(""));
        assert!(!is_rtl("Plain ASCII, 123 **bold**"));
        assert!(!is_rtl("Ελληνικά кириллица 中文 日本語"));
    }
}
