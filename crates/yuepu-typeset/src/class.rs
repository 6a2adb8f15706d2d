//! Character classes.
//!
//! The class of a character decides which font it is set in,
//!     its default width,
//!     and the glue placed around it.

/// Typographic class of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterClass {
    /// Set in the Western font.
    Western,
    /// CJK ideographs, kana, hangul and other characters from the CJK blocks.
    Ideographic,
    /// Opening brackets and quotes.
    LeftPunct,
    /// Closing brackets and quotes.
    RightPunct,
    /// Interpuncts, which take space on both sides.
    MidDot,
    /// Punctuation inside a sentence.
    Comma,
    /// Punctuation at the end of a sentence.
    Period,
    /// Dashes and ellipses spanning two ems.
    LongDash,
    /// Short dashes.
    OtherPunct,
    MathOp,
    MathRel,
}

impl CharacterClass {
    /// Whether the glyph is half an em wide by default.
    pub fn is_half_width(self) -> bool {
        use CharacterClass::*;
        matches!(self, LeftPunct | RightPunct | MidDot | Comma | Period)
    }
}

const LEFT_PUNCT: &str = "([{‘“〔〈《「『【〖（［｛";
const RIGHT_PUNCT: &str = ")]}’”〕〉》」』】〗）］｝";
const MID_DOT: &str = "・·";
const COMMA: &str = ",:;、，：；";
const PERIOD: &str = "!.?。！？";
const LONG_DASH: &str = "—…";
const OTHER_PUNCT: &str = "‐–";
const MATH_OP: &str = "+−±×÷∓";
const MATH_REL: &str = "<=>≠≒≈≡≢≤≥≪≫∧∨⊂⊃⊄⊅⊆⊇⊊⊋∈∋∉∪∩∥∦⇒⇔↔∽≌∝⊥⊕⊗";

/// Unicode blocks set in the CJK font.
const CJK_RANGES: [(u32, u32); 8] = [
    (0x2460, 0x24FF),   // enclosed alphanumerics
    (0x3000, 0x318F),   // CJK symbols, kana, bopomofo, hangul jamo
    (0x3200, 0x32FF),   // enclosed CJK letters
    (0x3400, 0x34BF),   // extension A (start)
    (0x4E00, 0x9FFF),   // unified ideographs
    (0xAC00, 0xD7AF),   // hangul syllables
    (0xF900, 0xFAFF),   // compatibility ideographs
    (0x20000, 0x2FFFF), // supplementary ideographic plane
];

pub fn is_cjk(c: char) -> bool {
    let c = c as u32;
    CJK_RANGES
        .iter()
        .any(|&(start, end)| start <= c && c <= end)
}

/// Returns the class of a character.
///
/// Punctuation sets are checked before the CJK ranges,
///     so CJK punctuation like `。` is never [CharacterClass::Ideographic].
pub fn classify(c: char) -> CharacterClass {
    use CharacterClass::*;
    for (set, class) in [
        (LEFT_PUNCT, LeftPunct),
        (RIGHT_PUNCT, RightPunct),
        (MID_DOT, MidDot),
        (COMMA, Comma),
        (PERIOD, Period),
        (LONG_DASH, LongDash),
        (OTHER_PUNCT, OtherPunct),
        (MATH_OP, MathOp),
        (MATH_REL, MathRel),
    ] {
        if set.contains(c) {
            return class;
        }
    }
    if is_cjk(c) {
        Ideographic
    } else {
        Western
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharacterClass::*;

    macro_rules! classify_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    for c in $input.chars() {
                        assert_eq!(classify(c), $want, "character {c:?}");
                    }
                }
            )+
        };
    }

    classify_tests!(
        (latin, "aZ09 ", Western),
        (greek_and_cyrillic, "αЖ", Western),
        (ideographs, "你好𠀀豈", Ideographic),
        (kana_and_hangul, "かカ한ㄱ", Ideographic),
        (ideographic_space, "\u{3000}", Ideographic),
        (left_brackets, "(「《“（", LeftPunct),
        (right_brackets, ")」》”）", RightPunct),
        (interpuncts, "・·", MidDot),
        (commas, ",、；：", Comma),
        (periods, "。!？.", Period),
        (long_dashes, "—…", LongDash),
        (short_dashes, "‐–", OtherPunct),
        (math_operators, "+×÷", MathOp),
        (math_relations, "=≤⊂", MathRel),
    );

    #[test]
    fn half_width_classes() {
        assert!(Comma.is_half_width());
        assert!(MidDot.is_half_width());
        assert!(!LongDash.is_half_width());
        assert!(!Ideographic.is_half_width());
    }
}
