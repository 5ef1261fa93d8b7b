//! Font discovery and loading.
//!
//! Resolution looks for a Unicode-capable TrueType family in a fixed order of OS font locations:
//! Windows (Arial/Calibri, Consolas/Lucida Console), macOS (Arial, Helvetica, Courier New) and
//! Linux (DejaVu). The first class whose regular face exists wins; its missing bold, italic or
//! mono faces fall back to that class's regular file. When no class resolves, every slot is empty
//! and the renderer uses the PDF built-in Helvetica/Courier family, which only covers Latin text.
//!
//! Resolution only checks file existence, so it is deterministic for a given filesystem. Loading
//! reads and parses the files into a [`FontBook`] that provides glyph advance widths for layout
//! and the raw bytes for embedding.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use printpdf::BuiltinFont;
use rusttype::{Font, Scale};

/// The four faces used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSlot {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl FontSlot {
    pub const ALL: [FontSlot; 4] = [
        FontSlot::Regular,
        FontSlot::Bold,
        FontSlot::Italic,
        FontSlot::Mono,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FontSlot::Regular => "regular",
            FontSlot::Bold => "bold",
            FontSlot::Italic => "italic",
            FontSlot::Mono => "mono",
        }
    }
}

/// Font file paths for the four slots. An empty `regular` means "use the built-in family".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FontSet {
    pub regular: String,
    pub bold: String,
    pub italic: String,
    pub mono: String,
}

impl FontSet {
    /// True when no Unicode font was found and built-in fonts must be used.
    pub fn is_builtin(&self) -> bool {
        self.regular.is_empty()
    }

    pub fn path(&self, slot: FontSlot) -> &str {
        match slot {
            FontSlot::Regular => &self.regular,
            FontSlot::Bold => &self.bold,
            FontSlot::Italic => &self.italic,
            FontSlot::Mono => &self.mono,
        }
    }
}

/// Candidate files for one OS class, each slot in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontClass {
    pub name: String,
    pub regular: Vec<PathBuf>,
    pub bold: Vec<PathBuf>,
    pub italic: Vec<PathBuf>,
    pub mono: Vec<PathBuf>,
}

impl FontClass {
    fn from_strs(
        name: &str,
        regular: &[&str],
        bold: &[&str],
        italic: &[&str],
        mono: &[&str],
    ) -> Self {
        let paths = |list: &[&str]| -> Vec<PathBuf> { list.iter().map(PathBuf::from).collect() };
        Self {
            name: name.to_string(),
            regular: paths(regular),
            bold: paths(bold),
            italic: paths(italic),
            mono: paths(mono),
        }
    }

    /// A class probing `dir` with the DejaVu file names, then the Arial/Courier New ones.
    pub fn for_directory(dir: &Path) -> Self {
        let paths =
            |names: &[&str]| -> Vec<PathBuf> { names.iter().map(|n| dir.join(n)).collect() };
        Self {
            name: dir.display().to_string(),
            regular: paths(&["DejaVuSans.ttf", "Arial.ttf", "arial.ttf"]),
            bold: paths(&["DejaVuSans-Bold.ttf", "Arial Bold.ttf", "arialbd.ttf"]),
            italic: paths(&["DejaVuSans-Oblique.ttf", "Arial Italic.ttf", "ariali.ttf"]),
            mono: paths(&["DejaVuSansMono.ttf", "Courier New.ttf", "cour.ttf"]),
        }
    }

    fn first_existing(candidates: &[PathBuf]) -> Option<String> {
        candidates
            .iter()
            .find(|p| p.is_file())
            .map(|p| p.to_string_lossy().into_owned())
    }

    /// Resolves this class, or `None` when its regular face is missing.
    fn resolve(&self) -> Option<FontSet> {
        let regular = Self::first_existing(&self.regular)?;
        let or_regular =
            |list: &[PathBuf]| Self::first_existing(list).unwrap_or_else(|| regular.clone());
        Some(FontSet {
            bold: or_regular(&self.bold),
            italic: or_regular(&self.italic),
            mono: or_regular(&self.mono),
            regular,
        })
    }
}

static SYSTEM_CLASSES: Lazy<Vec<FontClass>> = Lazy::new(|| {
    vec![
        FontClass::from_strs(
            "windows",
            &[r"C:\Windows\Fonts\arial.ttf", r"C:\Windows\Fonts\calibri.ttf"],
            &[r"C:\Windows\Fonts\arialbd.ttf", r"C:\Windows\Fonts\calibrib.ttf"],
            &[r"C:\Windows\Fonts\ariali.ttf", r"C:\Windows\Fonts\calibrii.ttf"],
            &[r"C:\Windows\Fonts\consola.ttf", r"C:\Windows\Fonts\lucon.ttf"],
        ),
        FontClass::from_strs(
            "macos",
            &[
                "/Library/Fonts/Arial.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "/System/Library/Fonts/Helvetica.ttc",
            ],
            &[
                "/Library/Fonts/Arial Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            ],
            &[
                "/Library/Fonts/Arial Italic.ttf",
                "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
            ],
            &[
                "/Library/Fonts/Courier New.ttf",
                "/System/Library/Fonts/Supplemental/Courier New.ttf",
            ],
        ),
        FontClass::from_strs(
            "linux",
            &["/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"],
            &["/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"],
            &["/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf"],
            &["/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"],
        ),
    ]
});

/// Ordered list of font classes to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResolver {
    classes: Vec<FontClass>,
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::system()
    }
}

impl FontResolver {
    /// The built-in Windows, macOS, Linux order.
    pub fn system() -> Self {
        Self {
            classes: SYSTEM_CLASSES.clone(),
        }
    }

    /// Probes the given classes only, in order.
    pub fn from_classes(classes: Vec<FontClass>) -> Self {
        Self { classes }
    }

    /// Puts one class per user directory ahead of the system classes.
    pub fn with_search_paths(mut self, dirs: &[PathBuf]) -> Self {
        let mut classes: Vec<FontClass> = dirs.iter().map(|d| FontClass::for_directory(d)).collect();
        classes.append(&mut self.classes);
        self.classes = classes;
        self
    }

    pub fn classes(&self) -> &[FontClass] {
        &self.classes
    }

    /// Returns the first class that resolves, or an all-empty set.
    pub fn resolve(&self) -> FontSet {
        for class in &self.classes {
            if let Some(set) = class.resolve() {
                debug!("Font class '{}' resolved to {:?}", class.name, set);
                return set;
            }
        }
        FontSet::default()
    }
}

static SYSTEM_FONTS: Lazy<FontSet> = Lazy::new(|| FontResolver::system().resolve());

/// Resolves fonts using the system class order. The file system is scanned once per process.
pub fn resolve_fonts() -> FontSet {
    SYSTEM_FONTS.clone()
}

/// A loaded face ready for measuring and embedding.
#[derive(Clone)]
pub enum FontFace {
    /// A TrueType file. `metrics` is parsed from a copy of `bytes`.
    Embedded {
        path: PathBuf,
        bytes: Vec<u8>,
        metrics: Font<'static>,
    },
    Builtin(BuiltinFont),
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::Embedded { path, bytes, .. } => f
                .debug_struct("Embedded")
                .field("path", path)
                .field("bytes", &bytes.len())
                .finish(),
            FontFace::Builtin(font) => f.debug_tuple("Builtin").field(font).finish(),
        }
    }
}

impl FontFace {
    /// Reads and parses a TrueType/OpenType file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let bytes = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let metrics = Font::try_from_vec(bytes.clone())
            .ok_or_else(|| format!("{}: not a parseable TrueType font", path.display()))?;
        Ok(FontFace::Embedded {
            path: path.to_path_buf(),
            bytes,
            metrics,
        })
    }

    /// Advance width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            FontFace::Embedded { metrics, .. } => {
                let units_per_em = f32::from(metrics.units_per_em().max(1));
                let vm = metrics.v_metrics_unscaled();
                // rusttype scales by ascent-descent; convert so one em equals `size`.
                let height = (vm.ascent - vm.descent).max(1.0);
                let scale = Scale::uniform(size * height / units_per_em);
                metrics
                    .glyphs_for(text.chars())
                    .map(|g| g.scaled(scale).h_metrics().advance_width)
                    .sum()
            }
            FontFace::Builtin(font) => builtin_text_width(*font, text, size),
        }
    }

    /// Whether the face has a glyph for `c`.
    pub fn covers(&self, c: char) -> bool {
        match self {
            FontFace::Embedded { metrics, .. } => metrics.glyph(c).id().0 != 0,
            // Built-in fonts use WinAnsiEncoding, roughly Latin-1.
            FontFace::Builtin(_) => (c as u32) < 0x100,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin(_))
    }
}

/// Loaded faces for all four slots.
#[derive(Debug, Clone)]
pub struct FontBook {
    regular: FontFace,
    bold: FontFace,
    italic: FontFace,
    mono: FontFace,
}

impl FontBook {
    /// Helvetica, Helvetica-Bold, Helvetica-Oblique and Courier.
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::Builtin(BuiltinFont::Helvetica),
            bold: FontFace::Builtin(BuiltinFont::HelveticaBold),
            italic: FontFace::Builtin(BuiltinFont::HelveticaOblique),
            mono: FontFace::Builtin(BuiltinFont::Courier),
        }
    }

    /// Loads the files named by `set`.
    ///
    /// Never fails: an unreadable slot falls back to the regular face, and an unreadable regular
    /// face degrades the whole book to the built-in family.
    pub fn load(set: &FontSet) -> Self {
        if set.is_builtin() {
            warn!("No Unicode-capable font found; using built-in Latin-only fonts");
            return Self::builtin();
        }

        let mut cache: HashMap<&str, FontFace> = HashMap::new();
        let regular = match FontFace::load(Path::new(&set.regular)) {
            Ok(face) => face,
            Err(e) => {
                warn!("Could not load regular font ({}); using built-in fonts", e);
                return Self::builtin();
            }
        };
        cache.insert(set.regular.as_str(), regular.clone());

        let mut load_slot = |slot: FontSlot| -> FontFace {
            let path = set.path(slot);
            if let Some(face) = cache.get(path) {
                return face.clone();
            }
            match FontFace::load(Path::new(path)) {
                Ok(face) => {
                    cache.insert(path, face.clone());
                    face
                }
                Err(e) => {
                    warn!("Could not load {} font ({}); using regular face", slot.name(), e);
                    regular.clone()
                }
            }
        };

        let bold = load_slot(FontSlot::Bold);
        let italic = load_slot(FontSlot::Italic);
        let mono = load_slot(FontSlot::Mono);
        info!("Loaded fonts: regular={} mono={}", set.regular, set.mono);

        Self {
            regular,
            bold,
            italic,
            mono,
        }
    }

    pub fn face(&self, slot: FontSlot) -> &FontFace {
        match slot {
            FontSlot::Regular => &self.regular,
            FontSlot::Bold => &self.bold,
            FontSlot::Italic => &self.italic,
            FontSlot::Mono => &self.mono,
        }
    }

    /// True when the regular face is a built-in font.
    pub fn is_builtin(&self) -> bool {
        self.regular.is_builtin()
    }

    pub fn text_width(&self, slot: FontSlot, size: f32, text: &str) -> f32 {
        self.face(slot).text_width(text, size)
    }

    /// Characters of `text` the regular face cannot draw, deduplicated in order of appearance.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for c in text.chars() {
            if c.is_control() || missing.contains(&c) {
                continue;
            }
            if !self.regular.covers(c) {
                missing.push(c);
            }
        }
        missing
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::builtin()
    }
}

// Advance widths (1/1000 em) for printable ASCII, from the standard Adobe font metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

fn builtin_char_width(font: BuiltinFont, c: char) -> u16 {
    let table = match font {
        BuiltinFont::Courier
        | BuiltinFont::CourierBold
        | BuiltinFont::CourierOblique
        | BuiltinFont::CourierBoldOblique => return 600,
        BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique => &HELVETICA_BOLD_WIDTHS,
        _ => &HELVETICA_WIDTHS,
    };
    match c as u32 {
        cp @ 32..=126 => table[(cp - 32) as usize],
        _ => 556,
    }
}

fn builtin_text_width(font: BuiltinFont, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(builtin_char_width(font, c))).sum();
    units as f32 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"not really a font").unwrap();
    }

    fn class_in(dir: &Path, name: &str) -> FontClass {
        FontClass {
            name: name.to_string(),
            regular: vec![dir.join("regular.ttf")],
            bold: vec![dir.join("bold.ttf")],
            italic: vec![dir.join("italic.ttf")],
            mono: vec![dir.join("mono.ttf"), dir.join("mono2.ttf")],
        }
    }

    #[test]
    fn test_no_class_resolves_to_empty_set() {
        let dir = tempdir().unwrap();
        let resolver = FontResolver::from_classes(vec![class_in(dir.path(), "a")]);
        let set = resolver.resolve();
        assert!(set.is_builtin());
        assert_eq!(set, FontSet::default());
    }

    #[test]
    fn test_missing_siblings_fall_back_to_regular() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("regular.ttf"));
        touch(&dir.path().join("mono2.ttf"));
        let set = FontResolver::from_classes(vec![class_in(dir.path(), "a")]).resolve();

        let regular = dir.path().join("regular.ttf").to_string_lossy().into_owned();
        assert_eq!(set.regular, regular);
        assert_eq!(set.bold, regular);
        assert_eq!(set.italic, regular);
        assert!(set.mono.ends_with("mono2.ttf"));
    }

    #[test]
    fn test_first_resolving_class_wins_without_mixing() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        touch(&first.path().join("bold.ttf"));
        touch(&second.path().join("regular.ttf"));
        touch(&second.path().join("bold.ttf"));

        let set = FontResolver::from_classes(vec![
            class_in(first.path(), "first"),
            class_in(second.path(), "second"),
        ])
        .resolve();

        assert!(set.regular.starts_with(&*second.path().to_string_lossy()));
        assert!(set.bold.starts_with(&*second.path().to_string_lossy()));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        assert_eq!(resolve_fonts(), resolve_fonts());
    }

    #[test]
    fn test_memoized_resolution_matches_fresh_scan() {
        assert_eq!(resolve_fonts(), FontResolver::system().resolve());
    }

    #[test]
    fn test_search_paths_come_first() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("DejaVuSans.ttf"));
        let resolver = FontResolver::system().with_search_paths(&[dir.path().to_path_buf()]);
        assert_eq!(resolver.classes().len(), 4);
        let set = resolver.resolve();
        assert!(set.regular.ends_with("DejaVuSans.ttf"));
        assert_eq!(set.mono, set.regular);
    }

    #[test]
    fn test_unparseable_regular_degrades_to_builtin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        touch(&path);
        let p = path.to_string_lossy().into_owned();
        let book = FontBook::load(&FontSet {
            regular: p.clone(),
            bold: p.clone(),
            italic: p.clone(),
            mono: p,
        });
        assert!(book.is_builtin());
    }

    #[test]
    fn test_builtin_widths() {
        let book = FontBook::builtin();
        assert!((book.text_width(FontSlot::Mono, 10.0, "abcd") - 24.0).abs() < 1e-4);
        let regular = book.text_width(FontSlot::Regular, 10.0, "Hello");
        let bold = book.text_width(FontSlot::Bold, 10.0, "Hello");
        assert!(regular > 0.0);
        assert!(bold > regular);
        assert_eq!(book.text_width(FontSlot::Regular, 10.0, ""), 0.0);
    }

    #[test]
    fn test_builtin_missing_glyphs() {
        let book = FontBook::builtin();
        assert!(book.missing_glyphs("café").is_empty());
        assert_eq!(book.missing_glyphs("שש ab"), vec!['ש']);
    }
}
