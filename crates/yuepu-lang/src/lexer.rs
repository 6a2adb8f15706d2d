//! Lexer for Yuepu markup text.
//!
//! Markup text is mostly literal characters.
//! The only structure is bracketed commands, which are named by two characters:
//!
//! | Form | Token |
//! |------|-------|
//! | `〚ab〛` | [Token::Command] |
//! | `〚ab]` | [Token::GroupBegin] |
//! | `[ab〛` | [Token::GroupEnd] |
//!
//! Some commands take a literal parameter immediately after them; see [parameter_kind].
//! A single line break joins two lines.
//! One or more blank lines end a paragraph.

use super::error::Warning;
use std::collections::VecDeque;
use yuepu_core::{scan_decimal, Length, LengthUnit};

/// Opening sentinel of a bracket command.
pub const COMMAND_OPEN: char = '〚';

/// Closing sentinel of a bracket command.
pub const COMMAND_CLOSE: char = '〛';

/// Identifier of a bracket command: its two characters packed into one integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub u64);

impl CommandId {
    /// `〚标题〛`: the title, followed by a number.
    pub const TITLE: CommandId = CommandId::new('标', '题');
    /// `〚字号〛`: the font size, followed by a length.
    pub const FONT_SIZE: CommandId = CommandId::new('字', '号');

    pub const fn new(first: char, second: char) -> CommandId {
        CommandId(first as u64 * 65536 + second as u64)
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let first = u32::try_from(self.0 / 65536).ok().and_then(char::from_u32);
        let second = u32::try_from(self.0 % 65536).ok().and_then(char::from_u32);
        match (first, second) {
            (Some(a), Some(b)) => write!(f, "{COMMAND_OPEN}{a}{b}{COMMAND_CLOSE}"),
            _ => write!(f, "command #{}", self.0),
        }
    }
}

/// Kind of literal a command takes as its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Numeric,
    Length,
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterKind::Numeric => write!(f, "number"),
            ParameterKind::Length => write!(f, "length"),
        }
    }
}

/// Returns the kind of parameter the command takes, if any.
pub fn parameter_kind(id: CommandId) -> Option<ParameterKind> {
    match id {
        CommandId::TITLE => Some(ParameterKind::Numeric),
        CommandId::FONT_SIZE => Some(ParameterKind::Length),
        _ => None,
    }
}

/// Token in markup text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Character(char),
    Command(CommandId),
    GroupBegin(CommandId),
    GroupEnd(CommandId),
    Number(f64),
    Length(Length),
    Space,
    NewParagraph,
    EndOfFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    MidLine,
    AfterSpace,
}

/// Markup lexer.
///
/// The lexer is an iterator over tokens.
/// The last token is always [Token::EndOfFile].
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    state: State,
    pending: VecDeque<Token>,
    warnings: Vec<Warning>,
    /// Whether a token other than [Token::NewParagraph] has been emitted.
    seen_content: bool,
    /// Whether the last emitted token was [Token::NewParagraph].
    after_paragraph: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            state: State::LineStart,
            pending: Default::default(),
            warnings: vec![],
            seen_content: false,
            after_paragraph: false,
            done: false,
        }
    }

    /// Returns the warnings raised so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn emit(&mut self, token: Token) -> Token {
        self.seen_content = true;
        self.after_paragraph = false;
        token
    }

    fn command(&mut self, start: usize) -> Token {
        let mut name = ['\0'; 2];
        let mut complete = true;
        for c in &mut name {
            match self.peek() {
                Some(next) if !matches!(next, '\n' | '\r') => {
                    *c = next;
                    self.pos += next.len_utf8();
                }
                _ => complete = false,
            }
        }
        let id = CommandId::new(name[0], name[1]);
        match (complete, self.peek()) {
            (true, Some(COMMAND_CLOSE)) => {
                self.bump();
                if let Some(kind) = parameter_kind(id) {
                    self.parameter(id, kind);
                }
                Token::Command(id)
            }
            (true, Some(']')) => {
                self.bump();
                Token::GroupBegin(id)
            }
            _ => {
                self.warn(Warning::UnterminatedCommand {
                    span: start..self.pos,
                });
                Token::Command(id)
            }
        }
    }

    /// Matches `[ab〛` at the current position, which is just after the `[`.
    fn group_end(&mut self) -> Option<CommandId> {
        let mut chars = self.source[self.pos..].chars();
        let (first, second) = (chars.next()?, chars.next()?);
        if chars.next()? != COMMAND_CLOSE {
            return None;
        }
        self.pos += first.len_utf8() + second.len_utf8() + COMMAND_CLOSE.len_utf8();
        Some(CommandId::new(first, second))
    }

    fn parameter(&mut self, command: CommandId, kind: ParameterKind) {
        while let Some(' ' | '\t') = self.peek() {
            self.bump();
        }
        let start = self.pos;
        let Some((value, n)) = scan_decimal(&self.source[start..]) else {
            self.warn(Warning::MissingParameter {
                command,
                kind,
                span: start..start,
            });
            self.pending.push_back(match kind {
                ParameterKind::Numeric => Token::Number(0.0),
                ParameterKind::Length => Token::Length(Length::ZERO),
            });
            return;
        };
        self.pos += n;
        if kind == ParameterKind::Numeric {
            self.pending.push_back(Token::Number(value));
            return;
        }
        let unit = match LengthUnit::scan(&self.source[self.pos..]) {
            Some((unit, m)) => {
                self.pos += m;
                unit
            }
            None => {
                self.warn(Warning::UnknownLengthUnit {
                    span: start..self.pos,
                });
                LengthUnit::Q
            }
        };
        let span = start..self.pos;
        if unit == LengthUnit::LegacySize {
            self.warn(Warning::DeprecatedLegacySize { span: span.clone() });
        }
        let length = Length::new(value, unit).unwrap_or_else(|err| {
            let nearest = err.nearest;
            self.warn(Warning::InvalidLegacySize { err, span });
            nearest
        });
        self.pending.push_back(Token::Length(length));
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(self.emit(token));
        }
        if self.done {
            return None;
        }
        loop {
            let start = self.pos;
            let Some(c) = self.bump() else {
                self.done = true;
                return Some(Token::EndOfFile);
            };
            // CRLF and a lone CR both end a line.
            let c = match c {
                '\r' if self.peek() == Some('\n') => continue,
                '\r' => '\n',
                c => c,
            };
            match (c, self.state) {
                ('\n', State::LineStart) => {
                    if self.seen_content && !self.after_paragraph {
                        self.after_paragraph = true;
                        return Some(Token::NewParagraph);
                    }
                }
                ('\n', _) => {
                    self.state = State::LineStart;
                }
                (' ' | '\t', State::MidLine) => {
                    self.state = State::AfterSpace;
                    return Some(self.emit(Token::Space));
                }
                (' ' | '\t', _) => {}
                (COMMAND_OPEN, _) => {
                    self.state = State::MidLine;
                    let token = self.command(start);
                    return Some(self.emit(token));
                }
                ('[', _) => {
                    self.state = State::MidLine;
                    let token = match self.group_end() {
                        Some(id) => Token::GroupEnd(id),
                        None => Token::Character('['),
                    };
                    return Some(self.emit(token));
                }
                (c, _) => {
                    self.state = State::MidLine;
                    return Some(self.emit(Token::Character(c)));
                }
            }
        }
    }
}

/// Lexes markup text.
pub fn lex(source: &str) -> (Vec<Token>, Vec<Warning>) {
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    (tokens, lexer.into_warnings())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::{Character, Command, EndOfFile, GroupBegin, GroupEnd, NewParagraph, Number, Space};

    fn chars(s: &str) -> Vec<Token> {
        s.chars().map(Character).collect()
    }

    macro_rules! lexer_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let (got, warnings) = lex($input);
                    let want: Vec<Token> = $want;
                    similar_asserts::assert_eq!(got, want);
                    assert!(warnings.is_empty(), "{warnings:?}");
                }
            )+
        };
    }

    lexer_tests!(
        (empty, "", vec![EndOfFile]),
        (characters, "乐谱", [chars("乐谱"), vec![EndOfFile]].concat()),
        (
            crlf_line_ends,
            "a\r\n\r\nb\r\nc",
            vec![Character('a'), NewParagraph, Character('b'), Character('c'), EndOfFile]
        ),
        (
            lone_carriage_returns,
            "a\r\rb",
            vec![Character('a'), NewParagraph, Character('b'), EndOfFile]
        ),
        (
            blank_lines_collapse,
            "a\n\n\nb",
            vec![Character('a'), NewParagraph, Character('b'), EndOfFile]
        ),
        (
            single_blank_line,
            "a\n\nb",
            vec![Character('a'), NewParagraph, Character('b'), EndOfFile]
        ),
        (
            whitespace_only_line_is_blank,
            "a\n \t\n\nb",
            vec![Character('a'), NewParagraph, Character('b'), EndOfFile]
        ),
        (
            single_line_break_joins,
            "a\nb",
            vec![Character('a'), Character('b'), EndOfFile]
        ),
        (
            leading_blank_lines,
            "\n\n\na",
            vec![Character('a'), EndOfFile]
        ),
        (
            trailing_blank_lines,
            "a\n\n",
            vec![Character('a'), NewParagraph, EndOfFile]
        ),
        (
            spaces_collapse,
            "a  \t b",
            vec![Character('a'), Space, Character('b'), EndOfFile]
        ),
        (
            leading_spaces_dropped,
            "  a\n  b",
            vec![Character('a'), Character('b'), EndOfFile]
        ),
        (
            command,
            "〚粗体〛x",
            vec![Command(CommandId::new('粗', '体')), Character('x'), EndOfFile]
        ),
        (
            group,
            "〚引用]x[引用〛",
            vec![
                GroupBegin(CommandId::new('引', '用')),
                Character('x'),
                GroupEnd(CommandId::new('引', '用')),
                EndOfFile
            ]
        ),
        (
            lone_bracket,
            "[a]",
            vec![Character('['), Character('a'), Character(']'), EndOfFile]
        ),
        (
            title_parameter,
            "〚标题〛 2.5 x",
            vec![Command(CommandId::TITLE), Number(2.5), Space, Character('x'), EndOfFile]
        ),
        (
            font_size_points,
            "〚字号〛10pt",
            vec![Command(CommandId::FONT_SIZE), Token::Length(yuepu_core::Length(10.0 * yuepu_core::MM_PER_POINT)), EndOfFile]
        ),
        (
            font_size_q,
            "〚字号〛10Q",
            vec![Command(CommandId::FONT_SIZE), Token::Length(yuepu_core::Length(2.5)), EndOfFile]
        ),
        (
            font_size_millimeters,
            "〚字号〛4mm字",
            vec![
                Command(CommandId::FONT_SIZE),
                Token::Length(yuepu_core::Length(4.0)),
                Character('字'),
                EndOfFile
            ]
        ),
    );

    #[test]
    fn never_two_paragraphs_in_a_row() {
        for n in 1..6 {
            let source = format!("a{}b", "\n".repeat(n + 1));
            let (got, _) = lex(&source);
            assert_eq!(
                got.iter().filter(|t| **t == NewParagraph).count(),
                1,
                "{n} blank lines"
            );
        }
    }

    #[test]
    fn command_id_packing() {
        assert_eq!(CommandId::new('a', 'b').0, 97 * 65536 + 98);
        assert_eq!(CommandId::TITLE.to_string(), "〚标题〛");
    }

    #[test]
    fn font_size_without_unit() {
        let (got, warnings) = lex("〚字号〛10");
        assert_eq!(
            got,
            vec![Command(CommandId::FONT_SIZE), Token::Length(yuepu_core::Length(2.5)), EndOfFile]
        );
        assert_eq!(warnings, vec![Warning::UnknownLengthUnit { span: 12..14 }]);
    }

    #[test]
    fn font_size_legacy() {
        let (got, warnings) = lex("〚字号〛3号");
        assert_eq!(
            got,
            vec![
                Command(CommandId::FONT_SIZE),
                Token::Length(yuepu_core::Length(16.0 * yuepu_core::MM_PER_POINT)),
                EndOfFile
            ]
        );
        assert_eq!(warnings, vec![Warning::DeprecatedLegacySize { span: 12..16 }]);
    }

    #[test]
    fn font_size_invalid_legacy() {
        let (got, warnings) = lex("〚字号〛12号");
        assert_eq!(
            got[1],
            Token::Length(yuepu_core::Length(5.0 * yuepu_core::MM_PER_POINT))
        );
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[1], Warning::InvalidLegacySize { .. }));
    }

    #[test]
    fn missing_parameter() {
        let (got, warnings) = lex("〚标题〛x");
        assert_eq!(
            got,
            vec![Command(CommandId::TITLE), Number(0.0), Character('x'), EndOfFile]
        );
        assert!(matches!(warnings[..], [Warning::MissingParameter { .. }]));
    }

    #[test]
    fn unterminated_command() {
        let (got, warnings) = lex("〚粗体x");
        assert_eq!(
            got,
            vec![Command(CommandId::new('粗', '体')), Character('x'), EndOfFile]
        );
        assert_eq!(warnings, vec![Warning::UnterminatedCommand { span: 0..9 }]);
    }

    #[test]
    fn command_cut_off_by_end_of_input() {
        let (got, warnings) = lex("〚粗");
        assert_eq!(
            got,
            vec![Command(CommandId::new('粗', '\0')), EndOfFile]
        );
        assert_eq!(warnings.len(), 1);
    }
}
