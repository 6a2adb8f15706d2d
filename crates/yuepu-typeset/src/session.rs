//! Typesetting sessions.
//!
//! A [Typesetter] turns markup tokens into horizontal lists, one per paragraph.
//! It owns the font catalog and the current font state:
//!
//! - the CJK font and size, set by `〚字号〛`;
//! - the Western font, scaled so its capitals are 72% of the CJK size;
//! - a baseline shift for CJK glyphs, which aligns an ascent of 0.88em with the Western baseline.
//!
//! The typesetter consumes the flat token stream produced by [yuepu_lang::lex].
//! It does not look at the layout script.
//! Whether it should instead consume the leaves of a parsed document is an open question;
//!     the token stream is the input until prose has a grammar of its own.

use super::catalog::{CatalogError, FontCatalog, FontId, FontResolver};
use super::class::{classify, CharacterClass};
use super::glue;
use super::node::{Glyph, Horizontal};
use yuepu_core::{Glue, GluePriority, Length, LEGACY_POINT_SIZES, MM_PER_POINT};
use yuepu_lang::{CommandId, Token};

/// Cap height of the Western font as a fraction of the CJK size.
const WESTERN_CAPS_RATIO: f64 = 0.72;

/// Ascent, in ems, of a CJK font that needs no baseline shift.
const CJK_REFERENCE_ASCENT: f64 = 0.88;

/// Options for a [Typesetter].
#[derive(Debug, Clone, PartialEq)]
pub struct TypesetterOptions {
    /// Name of the default CJK font, as understood by the font resolver.
    pub cjk_font: String,
    /// Name of the default Western font.
    pub western_font: String,
    /// Initial CJK font size.
    pub cjk_size: Length,
}

impl Default for TypesetterOptions {
    fn default() -> Self {
        Self {
            cjk_font: "Noto Serif CJK SC".into(),
            western_font: "Latin Modern Roman".into(),
            // 五号
            cjk_size: Length(LEGACY_POINT_SIZES[5] * MM_PER_POINT),
        }
    }
}

/// Recoverable problem found while typesetting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Warning {
    #[error("font `{font}`: {warning}")]
    Font {
        font: String,
        warning: sfnt::Warning,
    },
    #[error("font `{font}` has a cap height of {caps_height}; Western text is set at the CJK size")]
    NonPositiveCapsHeight { font: String, caps_height: i16 },
}

pub struct Typesetter<R> {
    catalog: FontCatalog<R>,
    cjk_font: FontId,
    western_font: FontId,
    cjk_size: Length,
    western_size: Length,
    baseline_shift: Length,
    list: Vec<Horizontal>,
    warnings: Vec<Warning>,
}

impl<R: FontResolver> Typesetter<R> {
    /// Creates a session, opening the two default fonts.
    pub fn new(resolver: R, options: TypesetterOptions) -> Result<Self, CatalogError> {
        let (catalog, font_warnings) =
            FontCatalog::new(resolver, &options.cjk_font, &options.western_font)?;
        let mut typesetter = Typesetter {
            cjk_font: catalog.default_cjk(),
            western_font: catalog.default_western(),
            catalog,
            cjk_size: options.cjk_size,
            western_size: options.cjk_size,
            baseline_shift: Length::ZERO,
            list: vec![],
            warnings: vec![],
        };
        for (font, warning) in font_warnings {
            typesetter.font_warning(font, Some(warning));
        }
        typesetter.set_cjk_size(options.cjk_size);
        Ok(typesetter)
    }

    /// Typesets a token stream.
    ///
    /// Returns the horizontal list of each non-empty paragraph in order.
    pub fn typeset(&mut self, tokens: impl IntoIterator<Item = Token>) -> Vec<Vec<Horizontal>> {
        let mut paragraphs = vec![];
        let mut tokens = tokens.into_iter().peekable();
        while let Some(token) = tokens.next() {
            match token {
                Token::Character(c) => self.push_char(c),
                Token::Space => self.push_space(),
                Token::NewParagraph | Token::EndOfFile => {
                    paragraphs.extend(self.finish_paragraph());
                }
                Token::Command(CommandId::FONT_SIZE) => {
                    if let Some(Token::Length(size)) =
                        tokens.next_if(|t| matches!(t, Token::Length(_)))
                    {
                        self.set_cjk_size(size);
                    }
                }
                Token::Command(id) | Token::GroupBegin(id) | Token::GroupEnd(id) => {
                    log::debug!("ignoring {token:?} for command {id}");
                }
                Token::Number(_) | Token::Length(_) => {
                    log::debug!("ignoring parameter {token:?}");
                }
            }
        }
        paragraphs.extend(self.finish_paragraph());
        paragraphs
    }

    /// Appends the glyph for a character to the current paragraph.
    pub fn push_char(&mut self, c: char) {
        let class = classify(c);
        if class == CharacterClass::Western {
            self.push_western(c);
        } else {
            let glyph = self.cjk_glyph(c, class);
            self.list.push(glyph.into());
        }
        glue::adjust(&mut self.list, self.cjk_size);
    }

    /// Appends inter-word glue, unless the paragraph is empty.
    pub fn push_space(&mut self) {
        if self.list.is_empty() {
            return;
        }
        let font = self.catalog.font(self.western_font);
        let (em, warning) = font.advance_width(font.glyph_id(' '));
        let natural = self.western_size * em;
        self.font_warning(self.western_font, warning);
        self.list.push(
            Glue {
                natural,
                stretch: natural / 2.0,
                stretch_priority: GluePriority::Tier1,
                shrink: natural / 3.0,
                shrink_priority: GluePriority::Tier1,
                breakable: true,
            }
            .into(),
        );
    }

    /// Ends the current paragraph and returns its list, if it is not empty.
    ///
    /// Trailing glue is removed.
    pub fn finish_paragraph(&mut self) -> Option<Vec<Horizontal>> {
        while let Some(Horizontal::Glue(_)) = self.list.last() {
            self.list.pop();
        }
        if self.list.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.list))
    }

    /// Sets the CJK size, rescaling the Western font and the baseline shift.
    pub fn set_cjk_size(&mut self, size: Length) {
        log::debug!("CJK size is now {size}");
        self.cjk_size = size;
        let cjk = self.catalog.font(self.cjk_font);
        let ascent = cjk.ascent() as f64 / cjk.units_per_em() as f64;
        self.baseline_shift = size * (ascent - CJK_REFERENCE_ASCENT);

        let western = self.catalog.font(self.western_font);
        let caps_height = western.caps_height();
        let units_per_em = western.units_per_em() as f64;
        self.western_size = if caps_height > 0 {
            size * (WESTERN_CAPS_RATIO * units_per_em / caps_height as f64)
        } else {
            self.warn(Warning::NonPositiveCapsHeight {
                font: self.catalog.name(self.western_font).into(),
                caps_height,
            });
            size
        };
    }

    /// Switches the CJK font.
    pub fn set_cjk_font(&mut self, name: &str) -> Result<(), CatalogError> {
        let (font, warnings) = self.catalog.load(name, false)?;
        for warning in warnings {
            self.font_warning(font, Some(warning));
        }
        self.cjk_font = font;
        self.set_cjk_size(self.cjk_size);
        Ok(())
    }

    /// Switches the Western font.
    pub fn set_western_font(&mut self, name: &str) -> Result<(), CatalogError> {
        let (font, warnings) = self.catalog.load(name, true)?;
        for warning in warnings {
            self.font_warning(font, Some(warning));
        }
        self.western_font = font;
        self.set_cjk_size(self.cjk_size);
        Ok(())
    }

    pub fn cjk_size(&self) -> Length {
        self.cjk_size
    }

    pub fn western_size(&self) -> Length {
        self.western_size
    }

    pub fn baseline_shift(&self) -> Length {
        self.baseline_shift
    }

    pub fn catalog(&self) -> &FontCatalog<R> {
        &self.catalog
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn cjk_glyph(&mut self, c: char, class: CharacterClass) -> Glyph {
        let font_encoding = self.catalog.encoding(self.cjk_font, self.cjk_size);
        let glyph_id = self.catalog.font(self.cjk_font).glyph_id(c);
        let width = if class.is_half_width() {
            self.cjk_size / 2.0
        } else {
            self.cjk_size
        };
        Glyph {
            char: c,
            glyph_id,
            font_encoding,
            width,
            vertical_shift: self.baseline_shift,
            class,
        }
    }

    fn push_western(&mut self, c: char) {
        let font_encoding = self.catalog.encoding(self.western_font, self.western_size);
        let font = self.catalog.font(self.western_font);
        let glyph_ids = font.apply_ligatures(vec![font.glyph_id(c)]);
        let mut warnings = vec![];
        for glyph_id in glyph_ids {
            if let Some(Horizontal::Glyph(prev)) = self.list.last_mut() {
                if prev.font_encoding == font_encoding {
                    prev.width = prev.width + self.western_size * font.kern(prev.glyph_id, glyph_id);
                }
            }
            let (em, warning) = font.advance_width(glyph_id);
            warnings.extend(warning);
            self.list.push(
                Glyph {
                    char: c,
                    glyph_id,
                    font_encoding,
                    width: self.western_size * em,
                    vertical_shift: Length::ZERO,
                    class: CharacterClass::Western,
                }
                .into(),
            );
        }
        for warning in warnings {
            self.font_warning(self.western_font, Some(warning));
        }
    }

    fn font_warning(&mut self, font: FontId, warning: Option<sfnt::Warning>) {
        if let Some(warning) = warning {
            self.warn(Warning::Font {
                font: self.catalog.name(font).into(),
                warning,
            });
        }
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}
