/*
 *  text/font.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Font handles and the ordered font resolver
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use embedded_graphics::mono_font::MonoFont;
use log::{debug, info, warn};
use usvg::fontdb::{Database, FaceInfo, Stretch, Style};

use crate::constants::{BITMAP_FONT_EXT, OUTLINE_FONT_EXT};
use crate::graphics::error::FontError;
use crate::text::bitmap_font::{builtin_mono, GlyphSheet};

/// A scalable face inside a font database
#[derive(Clone)]
pub struct OutlineFace {
    pub db: Arc<Database>,
    pub family: String,
    pub weight: u16,
    pub style: Style,
    pub stretch: Stretch,
}

impl OutlineFace {
    fn from_info(db: Arc<Database>, face: &FaceInfo) -> Option<Self> {
        let family = face.families.first()?.0.clone();
        Some(Self {
            db,
            family,
            weight: face.weight.0,
            style: face.style,
            stretch: face.stretch,
        })
    }

    /// Load the first face of a font file into a private database
    pub fn from_file(path: &Path) -> Option<Self> {
        let mut db = Database::new();
        if let Err(e) = db.load_font_file(path) {
            debug!("{}: not loadable as a font ({})", path.display(), e);
            return None;
        }
        let db = Arc::new(db);
        let face = db.faces().next()?.clone();
        Self::from_info(db, &face)
    }
}

impl fmt::Debug for OutlineFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .finish()
    }
}

/// Resolved glyph source
#[derive(Clone)]
pub enum FontHandle {
    /// TrueType/OpenType, drawn at any size
    Outline(OutlineFace),
    /// Pre-rendered glyph sheet from the font directory
    Sheet(GlyphSheet),
    /// Compiled-in fixed cell font
    Mono(&'static MonoFont<'static>),
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontHandle::Outline(face) => face.fmt(f),
            FontHandle::Sheet(sheet) => sheet.fmt(f),
            FontHandle::Mono(font) => write!(
                f,
                "Mono({}x{})",
                font.character_size.width, font.character_size.height
            ),
        }
    }
}

impl FontHandle {
    /// Outline output is measured by its ink; pixel fonts keep their cells
    pub fn is_outline(&self) -> bool {
        matches!(self, FontHandle::Outline(_))
    }
}

/// One way of turning a query into a font. `None` means "not mine, ask the
/// next one".
pub trait FontStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, query: &str) -> Option<FontHandle>;
}

/// Query is a path to a font file
pub struct FilePath;

impl FontStrategy for FilePath {
    fn name(&self) -> &'static str {
        "file"
    }

    fn resolve(&self, query: &str) -> Option<FontHandle> {
        let path = Path::new(query);
        if !path.is_file() {
            return None;
        }
        OutlineFace::from_file(path).map(FontHandle::Outline)
    }
}

/// Query names a `.ttf` file in the font directory
pub struct FontDirectory {
    dir: PathBuf,
}

impl FontDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidate(&self, query: &str) -> PathBuf {
        let suffix = format!(".{OUTLINE_FONT_EXT}");
        if query.ends_with(&suffix) {
            self.dir.join(query)
        } else {
            self.dir.join(format!("{query}{suffix}"))
        }
    }
}

impl FontStrategy for FontDirectory {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn resolve(&self, query: &str) -> Option<FontHandle> {
        let path = self.candidate(query);
        if !path.is_file() {
            return None;
        }
        OutlineFace::from_file(&path).map(FontHandle::Outline)
    }
}

/// Query names a glyph sheet descriptor in the font directory, or one of
/// the compiled-in mono fonts
pub struct BitmapFont {
    dir: PathBuf,
}

impl BitmapFont {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FontStrategy for BitmapFont {
    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn resolve(&self, query: &str) -> Option<FontHandle> {
        let suffix = format!(".{BITMAP_FONT_EXT}");
        let stem = query.strip_suffix(&suffix).unwrap_or(query);
        let descriptor = self.dir.join(format!("{stem}{suffix}"));
        if descriptor.is_file() {
            match GlyphSheet::load(&descriptor) {
                Ok(sheet) => return Some(FontHandle::Sheet(sheet)),
                Err(e) => warn!("{e}"),
            }
        }
        builtin_mono(stem).map(FontHandle::Mono)
    }
}

/// Lowercase, commas to spaces, unique words, sorted, single spaced
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace(',', " ");
    let words: BTreeSet<&str> = lowered.split_whitespace().collect();
    words.into_iter().collect::<Vec<_>>().join(" ")
}

/// Human name of a face: family plus its style words, or "Regular"
pub fn face_name(family: &str, weight: u16, style: Style, stretch: Stretch) -> String {
    let mut words = Vec::new();
    if weight >= 900 {
        words.push("Black");
    } else if weight >= 700 {
        words.push("Bold");
    }
    match style {
        Style::Italic => words.push("Italic"),
        Style::Oblique => words.push("Oblique"),
        Style::Normal => {}
    }
    if stretch < Stretch::Normal {
        words.push("Condensed");
    }
    if words.is_empty() {
        words.push("Regular");
    }
    format!("{} {}", family, words.join(" "))
}

/// Normalized face name -> face, over one loaded database
pub struct FaceIndex {
    db: Arc<Database>,
    by_name: HashMap<String, FaceInfo>,
}

impl FaceIndex {
    pub fn new(db: Database) -> Self {
        let db = Arc::new(db);
        let mut by_name = HashMap::new();
        for face in db.faces() {
            for (family, _) in &face.families {
                let name = face_name(family, face.weight.0, face.style, face.stretch);
                by_name.entry(normalize_name(&name)).or_insert_with(|| face.clone());
            }
        }
        Self { db, by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All normalized names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Exact normalized lookup, then the same query with " Regular" added
    pub fn lookup(&self, query: &str) -> Option<OutlineFace> {
        let face = self
            .by_name
            .get(&normalize_name(query))
            .or_else(|| self.by_name.get(&normalize_name(&format!("{query} Regular"))))?;
        OutlineFace::from_info(Arc::clone(&self.db), face)
    }
}

/// Human query against the installed system fonts; the scan runs on first use
#[derive(Default)]
pub struct SystemQuery {
    index: OnceLock<FaceIndex>,
}

impl SystemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already loaded database instead of scanning the system
    pub fn with_database(db: Database) -> Self {
        let index = OnceLock::new();
        let _ = index.set(FaceIndex::new(db));
        Self { index }
    }

    pub fn index(&self) -> &FaceIndex {
        self.index.get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            let index = FaceIndex::new(db);
            info!("Found {} system fonts", index.len());
            index
        })
    }
}

impl FontStrategy for SystemQuery {
    fn name(&self) -> &'static str {
        "system"
    }

    fn resolve(&self, query: &str) -> Option<FontHandle> {
        self.index().lookup(query).map(FontHandle::Outline)
    }
}

/// Ordered strategies; the first to produce a font wins
pub struct FontResolver {
    strategies: Vec<Box<dyn FontStrategy>>,
}

impl FontResolver {
    /// File path, font directory, bitmap font, system query
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        let dir = font_dir.into();
        Self::with_strategies(vec![
            Box::new(FilePath),
            Box::new(FontDirectory::new(dir.clone())),
            Box::new(BitmapFont::new(dir)),
            Box::new(SystemQuery::new()),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn FontStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, query: &str) -> Result<FontHandle, FontError> {
        for strategy in &self.strategies {
            if let Some(font) = strategy.resolve(query) {
                debug!("font '{}' resolved by {} strategy", query, strategy.name());
                return Ok(font);
            }
        }
        Err(FontError::NotFound { query: query.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(&'static str, Option<&'static str>, Arc<AtomicUsize>);

    impl FontStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn resolve(&self, query: &str) -> Option<FontHandle> {
            self.2.fetch_add(1, Ordering::SeqCst);
            match self.1 {
                Some(q) if q == query => builtin_mono("6x10").map(FontHandle::Mono),
                _ => None,
            }
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("DejaVu Sans, Bold"), "bold dejavu sans");
        assert_eq!(normalize_name("  Bold bold  Sans "), "bold sans");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_face_name() {
        assert_eq!(face_name("Noto", 400, Style::Normal, Stretch::Normal), "Noto Regular");
        assert_eq!(face_name("Noto", 700, Style::Italic, Stretch::Normal), "Noto Bold Italic");
        assert_eq!(face_name("Noto", 900, Style::Normal, Stretch::Condensed), "Noto Black Condensed");
    }

    #[test]
    fn test_first_success_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = FontResolver::with_strategies(vec![
            Box::new(Fixed("a", None, calls.clone())),
            Box::new(Fixed("b", Some("x"), calls.clone())),
            Box::new(Fixed("c", Some("x"), calls.clone())),
        ]);
        assert!(matches!(resolver.resolve("x"), Ok(FontHandle::Mono(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_not_found_names_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = FontResolver::with_strategies(vec![Box::new(Fixed("a", None, calls))]);
        match resolver.resolve("Comic Sans") {
            Err(FontError::NotFound { query }) => assert_eq!(query, "Comic Sans"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_default_order() {
        let resolver = FontResolver::new("fonts");
        assert_eq!(resolver.strategy_names(), vec!["file", "directory", "bitmap", "system"]);
    }

    #[test]
    fn test_bitmap_strategy_builtin() {
        let strategy = BitmapFont::new("/nonexistent");
        assert!(matches!(strategy.resolve("5x8"), Some(FontHandle::Mono(_))));
        assert!(strategy.resolve("no-such-font").is_none());
    }

    #[test]
    fn test_directory_candidate() {
        let dir = FontDirectory::new("fonts");
        assert_eq!(dir.candidate("FIS_20"), PathBuf::from("fonts/FIS_20.ttf"));
        assert_eq!(dir.candidate("FIS_20.ttf"), PathBuf::from("fonts/FIS_20.ttf"));
    }

    #[test]
    fn test_empty_system_index() {
        let query = SystemQuery::with_database(Database::new());
        assert!(query.index().is_empty());
        assert!(query.resolve("anything").is_none());
    }
}
