//! Lexer for jianpu (numbered musical notation).
//!
//! Each digit `0`–`7` is a note; `0` is a rest.
//! A digit may be followed by one octave mark and then one subdivision mark:
//!
//! | Octave mark | `;` | `:` | `,` | `'` | `"` | `` ` `` |
//! |-------------|-----|-----|-----|-----|-----|--------|
//! | Octave      | −3  | −2  | −1  | +1  | +2  | +3     |
//!
//! | Subdivision mark | `_` | `=` | `/` | `\` |
//! |------------------|-----|-----|-----|-----|
//! | Lines under note | 1   | 2   | 3   | 4   |
//!
//! Every other character is ignored.

/// A jianpu note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JianpuNote {
    /// Scale degree from 1 to 7, or 0 for a rest.
    pub degree: u8,
    /// Number of dots above (positive) or below (negative) the note.
    pub octave: i8,
    /// Number of lines under the note; each halves the duration.
    pub subdivision: u8,
}

fn octave_mark(c: char) -> Option<i8> {
    Some(match c {
        ';' => -3,
        ':' => -2,
        ',' => -1,
        '\'' => 1,
        '"' => 2,
        '`' => 3,
        _ => return None,
    })
}

fn subdivision_mark(c: char) -> Option<u8> {
    Some(match c {
        '_' => 1,
        '=' => 2,
        '/' => 3,
        '\\' => 4,
        _ => return None,
    })
}

/// Lexes a jianpu body.
pub fn lex(source: &str) -> Vec<JianpuNote> {
    let mut notes = vec![];
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        let degree = match c.to_digit(10) {
            Some(d @ 0..=7) => d as u8,
            _ => continue,
        };
        let octave = chars.peek().copied().and_then(octave_mark);
        if octave.is_some() {
            chars.next();
        }
        let subdivision = chars.peek().copied().and_then(subdivision_mark);
        if subdivision.is_some() {
            chars.next();
        }
        notes.push(JianpuNote {
            degree,
            octave: octave.unwrap_or(0),
            subdivision: subdivision.unwrap_or(0),
        });
    }
    notes
}

impl std::fmt::Display for JianpuNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degree)?;
        let octave = match self.octave {
            -3 => ";",
            -2 => ":",
            -1 => ",",
            1 => "'",
            2 => "\"",
            3 => "`",
            _ => "",
        };
        let subdivision = match self.subdivision {
            1 => "_",
            2 => "=",
            3 => "/",
            4 => "\\",
            _ => "",
        };
        write!(f, "{octave}{subdivision}")
    }
}
