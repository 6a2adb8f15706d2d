//! Inter-glyph glue.
//!
//! Glue is decided one pair of adjacent glyphs at a time,
//!     right after the second glyph is appended to the list.
//! The first matching rule wins:
//!
//! | # | Previous, next | Glue |
//! |---|----------------|------|
//! | 1 | previous is an interpunct | half of each interpunct, shrinkable |
//! | 2 | next is an interpunct | comma or period keeps its full width, then half the interpunct |
//! | 3 | closing bracket or comma, before anything but closing punctuation | the punctuation's width, shrinkable |
//! | 4 | period, before anything but closing punctuation | the period's width, rigid |
//! | 5 | next is an opening bracket | the bracket's width, shrinkable |
//! | 6 | ideographic next to Western | a quarter em, stretchable |
//! | 7 | two ideographs | nothing, stretchable up to a quarter em |
//!
//! If no rule matches no glue is inserted and the line cannot break between the pair.
//! All glue except the fixed glue of rule 2 is breakable.

use super::class::CharacterClass::{self, *};
use super::node::{Glyph, Horizontal};
use yuepu_core::{Glue, GluePriority, Length};

/// Inserts glue between the last two entries of the list, if both are glyphs.
///
/// `cjk_em` is the current CJK font size.
/// Calling this again without appending a glyph changes nothing.
pub fn adjust(list: &mut Vec<Horizontal>, cjk_em: Length) {
    let n = list.len();
    if n < 2 {
        return;
    }
    let (Some(prev), Some(next)) = (list[n - 2].glyph(), list[n - 1].glyph()) else {
        return;
    };
    let glue = between(prev, next, cjk_em);
    if glue.is_empty() {
        return;
    }
    log::trace!(
        "{} glue between {:?} and {:?}",
        glue.len(),
        prev.char,
        next.char
    );
    let last = list.pop();
    list.extend(glue.into_iter().map(Horizontal::Glue));
    list.extend(last);
}

fn is_closing(class: CharacterClass) -> bool {
    matches!(class, RightPunct | Comma | Period)
}

fn breakable(natural: Length, shrink: Length, shrink_priority: GluePriority) -> Glue {
    Glue {
        natural,
        shrink,
        shrink_priority,
        breakable: true,
        ..Default::default()
    }
}

fn between(prev: &Glyph, next: &Glyph, cjk_em: Length) -> Vec<Glue> {
    let (p, n) = (prev.class, next.class);
    match (p, n) {
        // 1
        (MidDot, _) => {
            let natural = if n == MidDot {
                (prev.width + next.width) / 2.0
            } else {
                prev.width / 2.0
            };
            vec![breakable(natural, natural, GluePriority::Tier2)]
        }
        // 2
        (_, MidDot) => {
            let mut glue = vec![];
            match p {
                Comma => glue.push(Glue {
                    shrink: prev.width,
                    shrink_priority: GluePriority::Tier3,
                    ..Glue::fixed(prev.width)
                }),
                Period => glue.push(Glue::fixed(prev.width)),
                _ => {}
            }
            let half = next.width / 2.0;
            glue.push(breakable(half, half, GluePriority::Tier2));
            glue
        }
        // 3
        (RightPunct | Comma, _) if !is_closing(n) => {
            vec![breakable(prev.width, prev.width, GluePriority::Tier3)]
        }
        // 4
        (Period, _) if !is_closing(n) => {
            vec![breakable(prev.width, Length::ZERO, GluePriority::Tier1)]
        }
        // 5
        (_, LeftPunct) => vec![breakable(next.width, next.width, GluePriority::Tier3)],
        // 6
        (Ideographic, Western) | (Western, Ideographic) => vec![Glue {
            natural: cjk_em / 4.0,
            stretch: cjk_em / 4.0,
            stretch_priority: GluePriority::Tier2,
            shrink: cjk_em / 8.0,
            shrink_priority: GluePriority::Tier4,
            breakable: true,
        }],
        // 7
        (Ideographic, Ideographic) => vec![Glue {
            stretch: cjk_em / 4.0,
            stretch_priority: GluePriority::Tier3,
            breakable: true,
            ..Default::default()
        }],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::classify;

    const EM: Length = Length(4.0);

    fn glyph(c: char) -> Horizontal {
        let class = classify(c);
        let width = if class == Western || class.is_half_width() {
            EM / 2.0
        } else {
            EM
        };
        Horizontal::Glyph(Glyph {
            char: c,
            glyph_id: c as u32,
            font_encoding: 1,
            width,
            vertical_shift: Length::ZERO,
            class,
        })
    }

    /// Appends the glyphs one at a time, adjusting after each.
    fn build(s: &str) -> Vec<String> {
        let mut list = vec![];
        for c in s.chars() {
            list.push(glyph(c));
            adjust(&mut list, EM);
        }
        list.iter()
            .map(|node| match node {
                Horizontal::Glyph(g) => format!("{:?}", g.char),
                Horizontal::Glue(_) => node.to_string(),
            })
            .collect()
    }

    macro_rules! glue_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let want: Vec<&str> = $want;
                    similar_asserts::assert_eq!(build($input), want);
                }
            )+
        };
    }

    glue_tests!(
        (
            rule_1_interpunct_then_ideograph,
            "・你",
            vec![
                "'・'",
                "glue 1.000 plus 0.000@Tier1 minus 1.000@Tier2 breakable",
                "'你'"
            ]
        ),
        (
            rule_1_two_interpuncts,
            "・・",
            vec![
                "'・'",
                "glue 2.000 plus 0.000@Tier1 minus 2.000@Tier2 breakable",
                "'・'"
            ]
        ),
        (
            rule_2_ideograph_then_interpunct,
            "你・",
            vec![
                "'你'",
                "glue 1.000 plus 0.000@Tier1 minus 1.000@Tier2 breakable",
                "'・'"
            ]
        ),
        (
            rule_2_comma_then_interpunct,
            "，・",
            vec![
                "'，'",
                "glue 2.000 plus 0.000@Tier1 minus 2.000@Tier3",
                "glue 1.000 plus 0.000@Tier1 minus 1.000@Tier2 breakable",
                "'・'"
            ]
        ),
        (
            rule_2_period_then_interpunct,
            "。・",
            vec![
                "'。'",
                "glue 2.000 plus 0.000@Tier1 minus 0.000@Tier1",
                "glue 1.000 plus 0.000@Tier1 minus 1.000@Tier2 breakable",
                "'・'"
            ]
        ),
        (
            rule_3_comma,
            "，你",
            vec![
                "'，'",
                "glue 2.000 plus 0.000@Tier1 minus 2.000@Tier3 breakable",
                "'你'"
            ]
        ),
        (
            rule_3_closing_bracket_before_opening_bracket,
            "」「",
            vec![
                "'」'",
                "glue 2.000 plus 0.000@Tier1 minus 2.000@Tier3 breakable",
                "'「'"
            ]
        ),
        (rule_3_not_before_closing_punctuation, "」。", vec!["'」'", "'。'"]),
        (
            rule_4_period,
            "。a",
            vec![
                "'。'",
                "glue 2.000 plus 0.000@Tier1 minus 0.000@Tier1 breakable",
                "'a'"
            ]
        ),
        (
            rule_5_opening_bracket,
            "你「",
            vec![
                "'你'",
                "glue 2.000 plus 0.000@Tier1 minus 2.000@Tier3 breakable",
                "'「'"
            ]
        ),
        (
            rule_6_ideograph_then_western,
            "你a",
            vec![
                "'你'",
                "glue 1.000 plus 1.000@Tier2 minus 0.500@Tier4 breakable",
                "'a'"
            ]
        ),
        (
            rule_6_western_then_ideograph,
            "a你",
            vec![
                "'a'",
                "glue 1.000 plus 1.000@Tier2 minus 0.500@Tier4 breakable",
                "'你'"
            ]
        ),
        (
            rule_7_two_ideographs,
            "你好",
            vec![
                "'你'",
                "glue 0.000 plus 1.000@Tier3 minus 0.000@Tier1 breakable",
                "'好'"
            ]
        ),
        (no_glue_between_western, "ab", vec!["'a'", "'b'"]),
        (no_glue_after_opening_bracket, "「你", vec!["'「'", "'你'"]),
        (no_glue_before_comma, "你，", vec!["'你'", "'，'"]),
        (no_glue_around_dashes, "你—好", vec!["'你'", "'—'", "'好'"]),
    );

    #[test]
    fn adjust_is_idempotent() {
        let mut list = vec![glyph('你'), glyph('，'), glyph('好')];
        adjust(&mut list, EM);
        let once = list.clone();
        adjust(&mut list, EM);
        adjust(&mut list, EM);
        assert_eq!(list, once);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn short_lists() {
        let mut list = vec![];
        adjust(&mut list, EM);
        assert!(list.is_empty());
        list.push(glyph('你'));
        adjust(&mut list, EM);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn only_the_last_pair_is_considered() {
        // The pair (你, 好) is never adjusted because 好 was not the last glyph.
        let mut list = vec![glyph('你'), glyph('好'), glyph('a')];
        adjust(&mut list, EM);
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].glyph().map(|g| g.char), Some('你'));
        assert_eq!(list[1].glyph().map(|g| g.char), Some('好'));
        assert!(list[2].glyph().is_none());
    }
}
