//! Horizontal list nodes.

use super::class::CharacterClass;
use yuepu_core::{Glue, Length};

/// Horizontal node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Horizontal {
    Glyph(Glyph),
    Glue(Glue),
}

/// A character resolved to a glyph in a specific font and size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    pub char: char,
    pub glyph_id: u32,
    /// Identifier of the font and size pair; see [crate::FontCatalog::encoding].
    pub font_encoding: u32,
    pub width: Length,
    /// How far the glyph is raised above the baseline.
    pub vertical_shift: Length,
    pub class: CharacterClass,
}

impl From<Glyph> for Horizontal {
    fn from(value: Glyph) -> Self {
        Horizontal::Glyph(value)
    }
}

impl From<Glue> for Horizontal {
    fn from(value: Glue) -> Self {
        Horizontal::Glue(value)
    }
}

impl Horizontal {
    pub fn glyph(&self) -> Option<&Glyph> {
        match self {
            Horizontal::Glyph(glyph) => Some(glyph),
            Horizontal::Glue(_) => None,
        }
    }
}

impl std::fmt::Display for Horizontal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Horizontal::Glyph(g) => write!(
                f,
                "glyph {:?} gid={} font={} width={:.3} shift={:.3}",
                g.char, g.glyph_id, g.font_encoding, g.width.0, g.vertical_shift.0
            ),
            Horizontal::Glue(g) => {
                write!(
                    f,
                    "glue {:.3} plus {:.3}@{:?} minus {:.3}@{:?}",
                    g.natural.0, g.stretch.0, g.stretch_priority, g.shrink.0, g.shrink_priority
                )?;
                if g.breakable {
                    write!(f, " breakable")?;
                }
                Ok(())
            }
        }
    }
}
