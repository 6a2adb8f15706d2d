//! Reader for SFNT (TrueType and OpenType) font files.
//!
//! This crate reads just the metrics a typesetter needs
//!     from a font file or font collection:
//!
//! - the typographic fields `unitsPerEm`, ascent and cap height,
//! - the character to glyph mapping from the `cmap` table (formats 4 and 12),
//! - per-glyph advance widths from the `hmtx` table,
//! - whether the font is a CID-keyed CFF font.
//!
//! Shaping is not performed.
//! [Font::kern] and [Font::apply_ligatures] exist so that callers
//!     can be written against the full contract, but they are neutral.
//!
//! ```
//! use std::io::Cursor;
//! let data = sfnt::testutil::FontBuilder::default()
//!     .format_4_segment(0x41, 0x5A, 0, None)
//!     .build();
//! let (font, warnings) = sfnt::Font::open(Cursor::new(data), 0, true).unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(font.glyph_id('B'), 0x42);
//! ```

use std::collections::HashMap;
use std::io::{Read, Seek};

pub mod cmap;
mod cff;
mod read;
pub mod testutil;

pub use cmap::Cmap;
use read::Reader;

/// A 4-byte table tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Leading tag of a font collection.
    pub const TTC: Tag = Tag(*b"ttcf");
    pub const CFF: Tag = Tag(*b"CFF ");
    pub const HEAD: Tag = Tag(*b"head");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const CMAP: Tag = Tag(*b"cmap");
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag(\"{self}\")")
    }
}

/// Location of a table, relative to the start of the font data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub offset: u32,
    pub length: u32,
}

/// Fatal error encountered while opening a font.
///
/// The caller may retry with a different font.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error while reading the font: {0}")]
    Io(#[source] std::io::Error),
    #[error("the font data ends before a structure it declares")]
    Truncated,
    #[error("the font has no `{0}` table")]
    MissingTable(Tag),
    #[error("the `cmap` table has no Windows Unicode subtable")]
    NoUsableCmap,
    #[error("expected a format {want} cmap subtable, found format {got}")]
    UnexpectedCmapFormat { want: u16, got: u16 },
    #[error("malformed CFF table: {0}")]
    MalformedCff(&'static str),
    #[error("the `head` table declares 0 units per em")]
    InvalidUnitsPerEm,
    #[error("the `hhea` table declares no horizontal metrics")]
    NoHorizontalMetrics,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Truncated,
            _ => Error::Io(err),
        }
    }
}

/// Recoverable problem; a fallback value was used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("face index {requested} is out of range for a collection of {available} fonts; using face 0")]
    FaceIndexOutOfRange { requested: u32, available: u32 },
    #[error("advance widths are not available for CID-keyed fonts; using 1em")]
    CidKeyedAdvanceWidth,
    #[error("advance widths were not loaded for this font; using 1em")]
    AdvanceWidthsNotLoaded,
}

/// An open font.
///
/// The font owns its byte source.
/// If [Font::open] fails the source is dropped before the error is returned.
pub struct Font<R> {
    reader: Reader<R>,
    tables: HashMap<Tag, TableRecord>,
    units_per_em: u16,
    ascent: i16,
    caps_height: i16,
    is_cid_keyed: bool,
    cmap: Cmap,
    advance_widths: Option<Vec<u16>>,
}

impl<R: Read + Seek> Font<R> {
    /// Opens the font starting at the current position of the source.
    ///
    /// The face index is only used if the source is a font collection;
    ///     an out of range index falls back to face 0 with a warning.
    /// Advance widths are loaded only if `need_advance_widths` is set
    ///     and the font is not CID-keyed.
    pub fn open(
        source: R,
        face_index: u32,
        need_advance_widths: bool,
    ) -> Result<(Font<R>, Vec<Warning>), Error> {
        let mut warnings = vec![];
        let mut reader = Reader::new(source)?;
        let directory = directory_offset(&mut reader, face_index, &mut warnings)?;
        let tables = read_table_directory(&mut reader, directory)?;
        log::debug!(
            "font at byte {} has {} tables",
            reader.base() + directory as u64,
            tables.len()
        );
        let find = |tag: Tag| tables.get(&tag).copied().ok_or(Error::MissingTable(tag));

        let head = find(Tag::HEAD)?;
        reader.seek(head.offset as u64 + 18)?;
        let units_per_em: u16 = reader.read()?;
        if units_per_em == 0 {
            return Err(Error::InvalidUnitsPerEm);
        }

        let os2 = find(Tag::OS2)?;
        reader.seek(os2.offset as u64 + 68)?;
        let ascent: i16 = reader.read()?;
        reader.seek(os2.offset as u64 + 88)?;
        let caps_height: i16 = reader.read()?;

        let is_cid_keyed = match tables.get(&Tag::CFF) {
            None => false,
            Some(cff) => cff::is_cid_keyed(&mut reader, cff.offset, cff.length)?,
        };

        let cmap_table = find(Tag::CMAP)?;
        let cmap = cmap::parse(&mut reader, cmap_table.offset, cmap_table.length)?;

        let advance_widths = if need_advance_widths && !is_cid_keyed {
            let hhea = find(Tag::HHEA)?;
            let hmtx = find(Tag::HMTX)?;
            reader.seek(hhea.offset as u64 + 34)?;
            let num_metrics: u16 = reader.read()?;
            if num_metrics == 0 {
                return Err(Error::NoHorizontalMetrics);
            }
            reader.seek(hmtx.offset as u64)?;
            let mut widths = Vec::with_capacity(num_metrics as usize);
            for _ in 0..num_metrics {
                widths.push(reader.read::<u16>()?);
                let _left_side_bearing: i16 = reader.read()?;
            }
            Some(widths)
        } else {
            None
        };

        Ok((
            Font {
                reader,
                tables,
                units_per_em,
                ascent,
                caps_height,
                is_cid_keyed,
                cmap,
                advance_widths,
            },
            warnings,
        ))
    }

    /// Reads the raw bytes of a table.
    pub fn read_table(&mut self, tag: Tag) -> Result<Vec<u8>, Error> {
        let record = self.table(tag).ok_or(Error::MissingTable(tag))?;
        self.reader.seek(record.offset as u64)?;
        self.reader.read_bytes(record.length as usize)
    }

    /// Consumes the font and returns the byte source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R> Font<R> {
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// The typographic ascender, in font units.
    pub fn ascent(&self) -> i16 {
        self.ascent
    }

    /// The height of capital letters, in font units.
    pub fn caps_height(&self) -> i16 {
        self.caps_height
    }

    pub fn is_cid_keyed(&self) -> bool {
        self.is_cid_keyed
    }

    pub fn cmap(&self) -> &Cmap {
        &self.cmap
    }

    pub fn table(&self, tag: Tag) -> Option<TableRecord> {
        self.tables.get(&tag).copied()
    }

    pub fn has_table(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Returns the glyph for a character, or 0 (`.notdef`) if there is none.
    pub fn glyph_id(&self, c: char) -> u32 {
        self.cmap.lookup(c as u32)
    }

    /// Returns the advance width of a glyph as a fraction of the em.
    ///
    /// Glyphs past the end of the `hmtx` table share the width of the last entry.
    /// If widths are unavailable the result is 1em together with a warning.
    pub fn advance_width(&self, glyph_id: u32) -> (f64, Option<Warning>) {
        if self.is_cid_keyed {
            return (1.0, Some(Warning::CidKeyedAdvanceWidth));
        }
        let Some(widths) = &self.advance_widths else {
            return (1.0, Some(Warning::AdvanceWidthsNotLoaded));
        };
        let width = widths
            .get(glyph_id as usize)
            .or(widths.last())
            .copied()
            .unwrap_or_default();
        (width as f64 / self.units_per_em as f64, None)
    }

    /// Kerning between two glyphs as a fraction of the em. Always 0.
    pub fn kern(&self, _left: u32, _right: u32) -> f64 {
        0.0
    }

    /// Applies ligature substitution to a glyph run. Always the identity.
    pub fn apply_ligatures(&self, glyphs: Vec<u32>) -> Vec<u32> {
        glyphs
    }
}

impl<R> std::fmt::Debug for Font<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("units_per_em", &self.units_per_em)
            .field("ascent", &self.ascent)
            .field("caps_height", &self.caps_height)
            .field("is_cid_keyed", &self.is_cid_keyed)
            .field("num_tables", &self.tables.len())
            .finish()
    }
}

fn directory_offset<R: Read + Seek>(
    reader: &mut Reader<R>,
    face_index: u32,
    warnings: &mut Vec<Warning>,
) -> Result<u32, Error> {
    reader.seek(0)?;
    let tag = Tag(reader.read()?);
    if tag != Tag::TTC {
        return Ok(0);
    }
    reader.seek(8)?;
    let num_fonts: u32 = reader.read()?;
    let face_index = if face_index < num_fonts {
        face_index
    } else {
        let warning = Warning::FaceIndexOutOfRange {
            requested: face_index,
            available: num_fonts,
        };
        log::warn!("{warning}");
        warnings.push(warning);
        0
    };
    reader.seek(12 + 4 * face_index as u64)?;
    reader.read()
}

fn read_table_directory<R: Read + Seek>(
    reader: &mut Reader<R>,
    directory: u32,
) -> Result<HashMap<Tag, TableRecord>, Error> {
    reader.seek(directory as u64 + 4)?;
    let num_tables: u16 = reader.read()?;
    // searchRange, entrySelector, rangeShift
    reader.skip(6)?;
    let mut tables = HashMap::with_capacity(num_tables as usize);
    for _ in 0..num_tables {
        let tag = Tag(reader.read()?);
        let _checksum: u32 = reader.read()?;
        let offset: u32 = reader.read()?;
        let length: u32 = reader.read()?;
        tables.insert(tag, TableRecord { offset, length });
    }
    Ok(tables)
}
