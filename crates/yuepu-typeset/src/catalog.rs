//! The font catalog.
//!
//! The catalog owns every font opened during a session.
//! Fonts are looked up by name; finding the file for a name is the job of a [FontResolver].
//! A name is resolved and its file parsed at most once per kind of use
//!     (CJK or Western), after which the catalog hands out a [FontId].
//!
//! The catalog also assigns font encodings: a dense 1-based number
//!     for each distinct (font, size) pair seen,
//!     in the order the pairs are first requested.

use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use yuepu_core::Length;

/// A font as stored in the catalog.
pub type CatalogFont = sfnt::Font<BufReader<File>>;

/// Error returned when a font could not be added to the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("font `{name}` not found")]
    FontNotFound { name: String },
    #[error("failed to open font file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font file {path:?} is invalid")]
    InvalidFont {
        path: PathBuf,
        #[source]
        source: sfnt::Error,
    },
}

/// Implementations of this trait find the file containing a named font.
pub trait FontResolver {
    /// Returns the path of the font file and the index of the face within it.
    fn resolve(&self, name: &str) -> Result<(PathBuf, u32), CatalogError>;
}

/// Resolver that interprets font names as file paths.
///
/// A suffix `#N` selects face `N` of a font collection, e.g. `NotoSerifCJK.ttc#2`.
/// Without the suffix face 0 is used.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl FontResolver for PathResolver {
    fn resolve(&self, name: &str) -> Result<(PathBuf, u32), CatalogError> {
        let (path, face_index) = match name.rsplit_once('#') {
            Some((path, index)) => match index.parse::<u32>() {
                Ok(index) => (path, index),
                Err(_) => (name, 0),
            },
            None => (name, 0),
        };
        let path = PathBuf::from(path);
        if !path.is_file() {
            return Err(CatalogError::FontNotFound { name: name.into() });
        }
        Ok((path, face_index))
    }
}

impl<F: Fn(&str) -> Option<(PathBuf, u32)>> FontResolver for F {
    fn resolve(&self, name: &str) -> Result<(PathBuf, u32), CatalogError> {
        self(name).ok_or_else(|| CatalogError::FontNotFound { name: name.into() })
    }
}

/// Identifier of a font in a [FontCatalog].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub usize);

struct Entry {
    name: String,
    font: CatalogFont,
}

pub struct FontCatalog<R> {
    resolver: R,
    entries: Vec<Entry>,
    by_name: HashMap<(String, bool), FontId>,
    encodings: HashMap<(FontId, OrderedFloat<f64>), u32>,
    default_cjk: FontId,
    default_western: FontId,
}

impl<R: FontResolver> FontCatalog<R> {
    /// Creates a catalog and loads its two default fonts.
    ///
    /// Warnings raised while opening the fonts are returned with the catalog.
    pub fn new(
        resolver: R,
        cjk_font: &str,
        western_font: &str,
    ) -> Result<(Self, Vec<(FontId, sfnt::Warning)>), CatalogError> {
        let mut catalog = FontCatalog {
            resolver,
            entries: vec![],
            by_name: Default::default(),
            encodings: Default::default(),
            default_cjk: FontId(0),
            default_western: FontId(0),
        };
        let (default_cjk, cjk_warnings) = catalog.load(cjk_font, false)?;
        let (default_western, western_warnings) = catalog.load(western_font, true)?;
        let warnings = cjk_warnings
            .into_iter()
            .map(|w| (default_cjk, w))
            .chain(western_warnings.into_iter().map(|w| (default_western, w)))
            .collect();
        catalog.default_cjk = default_cjk;
        catalog.default_western = default_western;
        Ok((catalog, warnings))
    }

    /// Returns the font with the given name, opening it if needed.
    ///
    /// Western fonts have their advance widths loaded.
    /// Warnings are only returned the first time a font is opened.
    pub fn load(
        &mut self,
        name: &str,
        western: bool,
    ) -> Result<(FontId, Vec<sfnt::Warning>), CatalogError> {
        if let Some(id) = self.by_name.get(&(name.to_string(), western)) {
            return Ok((*id, vec![]));
        }
        let (path, face_index) = self.resolver.resolve(name)?;
        log::debug!("opening font `{name}` from {path:?}, face {face_index}");
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(source) => return Err(CatalogError::Io { path, source }),
        };
        let (font, warnings) = match sfnt::Font::open(BufReader::new(file), face_index, western) {
            Ok(result) => result,
            Err(source) => return Err(CatalogError::InvalidFont { path, source }),
        };
        for warning in &warnings {
            log::warn!("{name}: {warning}");
        }
        let id = FontId(self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            font,
        });
        self.by_name.insert((name.to_string(), western), id);
        Ok((id, warnings))
    }

    pub fn font(&self, id: FontId) -> &CatalogFont {
        &self.entries[id.0].font
    }

    pub fn name(&self, id: FontId) -> &str {
        &self.entries[id.0].name
    }

    pub fn default_cjk(&self) -> FontId {
        self.default_cjk
    }

    pub fn default_western(&self) -> FontId {
        self.default_western
    }

    /// Number of fonts opened so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the encoding of a font at a size.
    ///
    /// The first pair requested gets 1, the next new pair 2, and so on.
    pub fn encoding(&mut self, font: FontId, size: Length) -> u32 {
        let next = self.encodings.len() as u32 + 1;
        *self
            .encodings
            .entry((font, OrderedFloat(size.0)))
            .or_insert(next)
    }
}
