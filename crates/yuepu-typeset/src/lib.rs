//! # Yuepu typesetting
//!
//! This crate converts markup tokens into horizontal lists:
//!     sequences of glyphs and glue in the box-and-glue model.
//! Each character is classified ([class]), set in the CJK or Western font,
//!     and glue is placed between adjacent glyphs according to their classes ([glue]).
//! Line breaking and page layout happen downstream and are not part of this crate.
//!
//! Fonts are read with the [sfnt] crate and owned by a [FontCatalog].
//! The catalog finds font files through a [FontResolver];
//!     [PathResolver] treats font names as paths.
//!
//! ```no_run
//! use yuepu_typeset::{PathResolver, Typesetter, TypesetterOptions};
//!
//! let options = TypesetterOptions {
//!     cjk_font: "/usr/share/fonts/NotoSerifCJK-Regular.ttc#2".into(),
//!     western_font: "/usr/share/fonts/lmroman10-regular.otf".into(),
//!     ..Default::default()
//! };
//! let mut typesetter = Typesetter::new(PathResolver, options).unwrap();
//! let (tokens, _) = yuepu_lang::lex("春眠不觉晓，处处闻啼鸟。");
//! for paragraph in typesetter.typeset(tokens) {
//!     for node in paragraph {
//!         println!["{node}"];
//!     }
//! }
//! ```

pub mod catalog;
pub mod class;
pub mod glue;
pub mod node;
pub mod session;

pub use catalog::{CatalogError, FontCatalog, FontId, FontResolver, PathResolver};
pub use class::{classify, CharacterClass};
pub use node::{Glyph, Horizontal};
pub use session::{Typesetter, TypesetterOptions, Warning};
