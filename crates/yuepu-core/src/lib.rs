//! Core types and abstractions used in Yuepu.
//!
//! Every physical dimension in Yuepu is a [Length] measured in millimeters.
//! Source documents may write lengths in four units (see [LengthUnit]);
//!     they are converted to millimeters as soon as they are scanned.

/// A physical length, in millimeters.
///
/// Unlike TeX, which works with fixed-point scaled integers,
///     Yuepu uses floating point numbers throughout.
/// Font metrics come in as em fractions and are multiplied by font sizes
///     that are themselves arbitrary decimals, so exactness is not attainable anyway.
#[derive(Default, PartialEq, Debug, Copy, Clone, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Length(pub f64);

impl Length {
    /// Representation of the number 0 as a [Length].
    pub const ZERO: Length = Length(0.0);

    /// Creates a length from a decimal value written in the provided unit.
    ///
    /// This only fails for [LengthUnit::LegacySize], whose values index a fixed table.
    /// The error contains the nearest valid length.
    pub fn new(value: f64, unit: LengthUnit) -> Result<Length, InvalidLegacySize> {
        match unit {
            LengthUnit::LegacySize => legacy_size(value),
            _ => Ok(Length(value * unit.millimeters())),
        }
    }

    /// The length in millimeters.
    pub fn mm(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}mm", self.0)
    }
}

impl std::ops::Add<Length> for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Self::Output {
        Length(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Length> for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Self::Output {
        Length(self.0 - rhs.0)
    }
}

impl std::ops::Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Self::Output {
        Length(self.0 * rhs)
    }
}

impl std::ops::Div<f64> for Length {
    type Output = Length;
    fn div(self, rhs: f64) -> Self::Output {
        Length(self.0 / rhs)
    }
}

impl std::ops::Neg for Length {
    type Output = Length;
    fn neg(self) -> Self::Output {
        Length(-self.0)
    }
}

/// Error returned when parsing a length literal like `10.5pt`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseLengthError {
    #[error("`{0}` does not start with a decimal number")]
    NoNumber(String),
    #[error("`{0}` has no unit; expected one of 号, Q, pt or mm")]
    NoUnit(String),
    #[error("`{0}` has trailing characters after the unit")]
    TrailingCharacters(String),
    #[error(transparent)]
    InvalidLegacySize(#[from] InvalidLegacySize),
}

impl std::str::FromStr for Length {
    type Err = ParseLengthError;

    /// Parses a length literal with an explicit unit.
    ///
    /// Unlike the document lexer, which defaults to [LengthUnit::Q],
    ///     a missing unit is an error here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((value, n)) = scan_decimal(s) else {
            return Err(ParseLengthError::NoNumber(s.into()));
        };
        let Some((unit, m)) = LengthUnit::scan(&s[n..]) else {
            return Err(ParseLengthError::NoUnit(s.into()));
        };
        if n + m != s.len() {
            return Err(ParseLengthError::TrailingCharacters(s.into()));
        }
        Ok(Length::new(value, unit)?)
    }
}

/// Millimeters in one typographic point.
pub const MM_PER_POINT: f64 = 0.3514;

/// Millimeters in one Q (級), the Japanese phototypesetting unit.
pub const MM_PER_Q: f64 = 0.25;

/// Legacy Chinese type sizes (号), in points.
///
/// Index 0 is 初号, index 1 is 一号, and so on up to 八号 at index 8.
pub const LEGACY_POINT_SIZES: [f64; 9] = [42.0, 26.0, 22.0, 16.0, 14.0, 10.5, 7.5, 5.5, 5.0];

/// Unit attached to a length literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    /// The 号 system: the value is an index into [LEGACY_POINT_SIZES].
    ///
    /// This unit is deprecated; the lexer warns whenever it is used.
    LegacySize,
    /// 0.25mm.
    Q,
    /// 0.3514mm.
    Point,
    /// 1mm.
    Millimeter,
}

impl LengthUnit {
    /// Scans a unit suffix at the start of the string.
    ///
    /// Returns the unit and the number of bytes it occupies.
    pub fn scan(s: &str) -> Option<(Self, usize)> {
        use LengthUnit::*;
        for (suffix, unit) in [("号", LegacySize), ("Q", Q), ("pt", Point), ("mm", Millimeter)] {
            if s.starts_with(suffix) {
                return Some((unit, suffix.len()));
            }
        }
        None
    }

    /// Returns the number of millimeters in one of this unit.
    ///
    /// For [LengthUnit::LegacySize] this is the millimeters per point,
    ///     the unit the legacy table is written in.
    pub fn millimeters(&self) -> f64 {
        use LengthUnit::*;
        match self {
            LegacySize | Point => MM_PER_POINT,
            Q => MM_PER_Q,
            Millimeter => 1.0,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LengthUnit::*;
        let s = match self {
            LegacySize => "号",
            Q => "Q",
            Point => "pt",
            Millimeter => "mm",
        };
        write!(f, "{s}")
    }
}

/// A 号 value that is not an integer in the range `[0, 8]`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("{value}号 is not a legacy type size; the nearest one is {nearest}")]
pub struct InvalidLegacySize {
    pub value: f64,
    /// The length of the nearest valid legacy size.
    pub nearest: Length,
}

fn legacy_size(value: f64) -> Result<Length, InvalidLegacySize> {
    let max = (LEGACY_POINT_SIZES.len() - 1) as f64;
    let clamped = value.round().clamp(0.0, max);
    let length = Length(LEGACY_POINT_SIZES[clamped as usize] * MM_PER_POINT);
    if clamped != value {
        return Err(InvalidLegacySize {
            value,
            nearest: length,
        });
    }
    Ok(length)
}

/// Scans a decimal literal at the start of the string.
///
/// The literal is a run of ASCII digits containing at most one decimal point.
/// A second point ends the literal.
/// Returns the value and the number of bytes consumed, or `None` if the string
///     does not start with a digit or a point followed by a digit.
pub fn scan_decimal(s: &str) -> Option<(f64, usize)> {
    let mut seen_point = false;
    let mut seen_digit = false;
    let mut end = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        end += c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok().map(|v| (v, end))
}

/// Glue.
///
/// An elastic piece of space between two glyphs, as in Knuth's box-and-glue model.
/// Yuepu glue additionally records whether a line break may occur at it;
///     pairs of glyphs with no glue between them can never be broken.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glue {
    pub natural: Length,
    pub stretch: Length,
    pub stretch_priority: GluePriority,
    pub shrink: Length,
    pub shrink_priority: GluePriority,
    pub breakable: bool,
}

impl Glue {
    /// Rigid glue of the given width at which no break is permitted.
    pub fn fixed(natural: Length) -> Glue {
        Glue {
            natural,
            ..Default::default()
        }
    }
}

/// Priority tier of a glue stretch or shrink.
///
/// This plays the role of TeX's orders of infinity, but in the other direction:
///     when justifying a line, glue in a lower tier is adjusted first
///     and later tiers are only touched once the earlier ones are exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GluePriority {
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}
