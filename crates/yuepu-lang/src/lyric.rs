//! Segmentation of lyric text into syllables.
//!
//! Each character starts a new syllable, except that closing punctuation
//!     attaches to the syllable before it and opening punctuation
//!     attaches to the syllable after it.

/// Punctuation that attaches to the following character.
pub const LEFT_PUNCTUATION: &str = "([{‘“〔〈《「『【〖（［｛";

/// Punctuation that attaches to the preceding character.
pub const RIGHT_PUNCTUATION: &str = ")]}’”〕〉》」』】〗）］｝,:;、，：；!.?。！？";

/// Splits lyric text into syllables.
///
/// Line breaks count as spaces, and spaces and tabs are dropped.
pub fn segment(source: &str) -> Vec<String> {
    let mut syllables: Vec<String> = vec![];
    for c in source.trim_start().chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            continue;
        }
        match syllables.last_mut() {
            Some(current)
                if RIGHT_PUNCTUATION.contains(c)
                    || current
                        .chars()
                        .next_back()
                        .is_some_and(|last| LEFT_PUNCTUATION.contains(last)) =>
            {
                current.push(c);
            }
            _ => syllables.push(c.to_string()),
        }
    }
    syllables
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! segment_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let want: Vec<&str> = $want;
                    assert_eq!(segment($input), want);
                }
            )+
        };
    }

    segment_tests!(
        (empty, "", vec![]),
        (whitespace_only, " \n\t", vec![]),
        (punctuation, "你好,世界。", vec!["你", "好,", "世", "界。"]),
        (brackets, "「你好」", vec!["「你", "好」"]),
        (spaces_dropped, "  春 眠\t不觉晓", vec!["春", "眠", "不", "觉", "晓"]),
        (newlines_dropped, "春眠\n不觉晓", vec!["春", "眠", "不", "觉", "晓"]),
        (leading_right_punctuation, "。啊", vec!["。", "啊"]),
        (stacked_punctuation, "来!」", vec!["来!」"]),
        (space_between_opening_bracket, "《 书》", vec!["《书》"]),
        (western_letters, "la la", vec!["l", "a", "l", "a"]),
    );
}
