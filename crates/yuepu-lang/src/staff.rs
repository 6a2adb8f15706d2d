//! Lexer for staff notation.
//!
//! Notes are written with relative pitch, in the manner of LilyPond:
//!     a letter `a`–`g`, then an optional accidental, octave marks and a duration.
//! Without octave marks a note is placed in the octave
//!     given by [relative_octave].

/// A note in staff notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffNote {
    pub letter: char,
    /// Sharps (positive) or flats (negative).
    pub accidental: i8,
    pub octave: i32,
    /// Duration as a fraction of a whole note: 4 is a quarter note.
    pub duration: u32,
}

impl StaffNote {
    /// The implicit note before the first note of a body.
    const START: StaffNote = StaffNote {
        letter: 'f',
        accidental: 0,
        octave: 0,
        duration: 4,
    };
}

/// Returns the octave of a note named `letter` following `previous`.
///
/// The octave changes by `round((previous − letter + 3.5) / 7)`,
///     comparing letters by character code and rounding halves to even,
///     and then drops by one if the new letter is `a` or `b`.
pub fn relative_octave(previous: &StaffNote, letter: char) -> i32 {
    let difference = previous.letter as i32 - letter as i32;
    let mut delta = ((difference as f64 + 3.5) / 7.0).round_ties_even() as i32;
    if matches!(letter, 'a' | 'b') {
        delta -= 1;
    }
    previous.octave + delta
}

/// Lexes a staff notation body.
pub fn lex(source: &str) -> Vec<StaffNote> {
    let mut notes = vec![];
    let mut previous = StaffNote::START;
    let mut rest = source;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        if !('a'..='g').contains(&c) {
            continue;
        }
        let mut note = StaffNote {
            letter: c,
            accidental: 0,
            octave: relative_octave(&previous, c),
            duration: previous.duration,
        };
        let (accidental, n) = accidental(c, rest);
        note.accidental = accidental;
        rest = &rest[n..];
        loop {
            if let Some(r) = rest.strip_prefix('\'') {
                note.octave += 1;
                rest = r;
            } else if let Some(r) = rest.strip_prefix(',') {
                note.octave -= 1;
                rest = r;
            } else {
                break;
            }
        }
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if let Ok(duration) = rest[..digits].parse() {
            note.duration = duration;
        }
        rest = &rest[digits..];
        notes.push(note);
        previous = note;
    }
    notes
}

/// Scans the accidental after a note letter; returns its value and length in bytes.
fn accidental(letter: char, s: &str) -> (i8, usize) {
    for (suffix, value) in [("isis", 2), ("is", 1), ("eses", -2), ("es", -1)] {
        if s.starts_with(suffix) {
            return (value, suffix.len());
        }
    }
    // `as` and `es` are the flats of a and e; `ases` and `eses` are double flats.
    if matches!(letter, 'a' | 'e') && s.starts_with('s') {
        if s[1..].starts_with("es") {
            return (-2, 3);
        }
        return (-1, 1);
    }
    (0, 0)
}

impl std::fmt::Display for StaffNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter)?;
        let (accidental, n) = if self.accidental >= 0 {
            ("is", self.accidental)
        } else {
            ("es", -self.accidental)
        };
        for _ in 0..n {
            write!(f, "{accidental}")?;
        }
        let (mark, n) = if self.octave >= 0 {
            ('\'', self.octave)
        } else {
            (',', -self.octave)
        };
        for _ in 0..n {
            write!(f, "{mark}")?;
        }
        write!(f, "{}", self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(letter: char, accidental: i8, octave: i32, duration: u32) -> StaffNote {
        StaffNote {
            letter,
            accidental,
            octave,
            duration,
        }
    }

    macro_rules! staff_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let want: Vec<StaffNote> = $want;
                    assert_eq!(lex($input), want);
                }
            )+
        };
    }

    staff_tests!(
        (empty, "", vec![]),
        (f_to_c_goes_up, "c", vec![note('c', 0, 1, 4)]),
        (c_to_g_stays, "c g", vec![note('c', 0, 1, 4), note('g', 0, 1, 4)]),
        (f_to_a_stays, "a", vec![note('a', 0, 0, 4)]),
        (g_to_c_goes_up, "g c", vec![note('g', 0, 0, 4), note('c', 0, 1, 4)]),
        (sharp, "cis", vec![note('c', 1, 1, 4)]),
        (double_sharp, "fisis", vec![note('f', 2, 0, 4)]),
        (flat, "des", vec![note('d', -1, 1, 4)]),
        (double_flat, "beses", vec![note('b', -2, 0, 4)]),
        (e_flat, "es", vec![note('e', -1, 1, 4)]),
        (a_flat, "as", vec![note('a', -1, 0, 4)]),
        (a_double_flat, "ases", vec![note('a', -2, 0, 4)]),
        (octave_up_marks, "c''", vec![note('c', 0, 3, 4)]),
        (octave_down_mark, "d,", vec![note('d', 0, 0, 4)]),
        (accidental_then_octave, "fis'8", vec![note('f', 1, 1, 8)]),
        (
            duration_is_inherited,
            "c8 d e16 f",
            vec![
                note('c', 0, 1, 8),
                note('d', 0, 1, 8),
                note('e', 0, 1, 16),
                note('f', 0, 1, 16)
            ]
        ),
        (
            octave_marks_carry_forward,
            "c' d",
            vec![note('c', 0, 2, 4), note('d', 0, 2, 4)]
        ),
        (separators_ignored, "|c|", vec![note('c', 0, 1, 4)]),
    );

    #[test]
    fn relative_octave_rounds_halves_to_even() {
        let c = note('c', 0, 0, 4);
        // (99 - 103 + 3.5) / 7 rounds to 0 and g is not a or b.
        assert_eq!(relative_octave(&c, 'g'), 0);
        // A repeated letter is exactly half way and stays put.
        assert_eq!(relative_octave(&c, 'c'), 0);
        // (99 - 100 + 3.5) / 7 rounds to 0.
        assert_eq!(relative_octave(&c, 'd'), 0);
        // (99 - 97 + 3.5) / 7 rounds to 1, then a drops by one.
        assert_eq!(relative_octave(&c, 'a'), 0);
    }

    #[test]
    fn display() {
        let shown: Vec<String> = lex("cis'' beses, d8")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(shown, vec!["cis'''4", "beses''4", "d''8"]);
    }
}
