//! Scanner for the layout script.
//!
//! The scanner turns source text into grammar terminals.
//! It runs over the whole source, including the bodies of notation blocks;
//!     the parser later replaces those terminals with the notation's own tokens.

use super::error::Warning;
use super::grammar::Terminal;
use super::tree::{Keyword, Value};
use super::Span;
use yuepu_core::{scan_decimal, Length, LengthUnit};

/// A terminal together with its payload and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub terminal: Terminal,
    pub value: Value,
    pub span: Span,
}

impl Item {
    fn mark(terminal: Terminal, span: Span) -> Item {
        Item {
            terminal,
            value: Value::Mark,
            span,
        }
    }
}

/// Scans the source.
///
/// The last item is always [Terminal::EndOfFile].
/// Line ends are only emitted where they separate two clauses.
pub fn scan(source: &str) -> (Vec<Item>, Vec<Warning>) {
    let mut scanner = Scanner {
        source,
        pos: 0,
        items: vec![],
        warnings: vec![],
    };
    scanner.run();
    let Scanner {
        mut items,
        warnings,
        ..
    } = scanner;
    trim_line_ends(&mut items);
    items.push(Item::mark(Terminal::EndOfFile, source.len()..source.len()));
    (items, warnings)
}

fn trim_line_ends(items: &mut Vec<Item>) {
    while items.last().map(|item| item.terminal) == Some(Terminal::EndOfLine) {
        items.pop();
    }
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    items: Vec<Item>,
    warnings: Vec<Warning>,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump_while(&mut self, f: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn warn(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.pos;
            self.pos += c.len_utf8();
            let terminal = match c {
                '\n' => {
                    let suppressed = self.items.last().map_or(true, |item| {
                        matches!(
                            item.terminal,
                            Terminal::EndOfLine | Terminal::BraceLeft | Terminal::Comma | Terminal::Eq
                        )
                    });
                    if suppressed {
                        continue;
                    }
                    Terminal::EndOfLine
                }
                c if c.is_whitespace() => continue,
                '{' => Terminal::BraceLeft,
                '}' => {
                    trim_line_ends(&mut self.items);
                    Terminal::BraceRight
                }
                '=' => Terminal::Eq,
                ',' => Terminal::Comma,
                '“' => {
                    self.string(start);
                    continue;
                }
                '0'..='9' | '.' => {
                    self.pos = start;
                    if self.number(start) {
                        continue;
                    }
                    self.pos += c.len_utf8();
                    Terminal::Stray
                }
                c if c.is_alphabetic() => {
                    self.bump_while(|c| c.is_alphanumeric() || c == '_');
                    let word = &self.source[start..self.pos];
                    let item = match Keyword::lookup(word) {
                        Some(keyword) => Item {
                            terminal: Terminal::Keyword,
                            value: Value::Keyword(keyword),
                            span: start..self.pos,
                        },
                        None => Item {
                            terminal: Terminal::Identifier,
                            value: Value::Identifier(word.into()),
                            span: start..self.pos,
                        },
                    };
                    self.items.push(item);
                    continue;
                }
                _ => Terminal::Stray,
            };
            self.items.push(Item::mark(terminal, start..self.pos));
        }
    }

    fn string(&mut self, start: usize) {
        self.bump_while(|c| !matches!(c, '”' | '\n' | '{' | '}'));
        let content = self.source[start + '“'.len_utf8()..self.pos].to_string();
        if self.peek() == Some('”') {
            self.pos += '”'.len_utf8();
        } else {
            self.warn(Warning::UnterminatedString {
                span: start..self.pos,
            });
        }
        self.items.push(Item {
            terminal: Terminal::String,
            value: Value::String(content),
            span: start..self.pos,
        });
    }

    /// Scans a number or length; returns false if there is no decimal literal here.
    fn number(&mut self, start: usize) -> bool {
        let Some((value, n)) = scan_decimal(&self.source[start..]) else {
            return false;
        };
        self.pos = start + n;
        let Some((unit, m)) = LengthUnit::scan(&self.source[self.pos..]) else {
            self.items.push(Item {
                terminal: Terminal::Number,
                value: Value::Number(value),
                span: start..self.pos,
            });
            return true;
        };
        self.pos += m;
        let span = start..self.pos;
        if unit == LengthUnit::LegacySize {
            self.warn(Warning::DeprecatedLegacySize { span: span.clone() });
        }
        let length = Length::new(value, unit).unwrap_or_else(|err| {
            let nearest = err.nearest;
            self.warn(Warning::InvalidLegacySize {
                err,
                span: span.clone(),
            });
            nearest
        });
        self.items.push(Item {
            terminal: Terminal::Length,
            value: Value::Length(length),
            span,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Terminal::{BraceLeft, BraceRight, Comma, EndOfFile, EndOfLine, Eq, Identifier, Number, Stray};

    fn terminals(source: &str) -> Vec<Terminal> {
        scan(source).0.into_iter().map(|item| item.terminal).collect()
    }

    macro_rules! scan_tests {
        ( $( ($name: ident, $input: expr, $want: expr), )+ ) => {
            $(
                #[test]
                fn $name() {
                    let want: Vec<Terminal> = $want;
                    similar_asserts::assert_eq!(terminals($input), want);
                }
            )+
        };
    }

    scan_tests!(
        (empty, "", vec![EndOfFile]),
        (assignment, "id=1\n", vec![Identifier, Eq, Number, EndOfFile]),
        (
            two_clauses,
            "a=1\n\n\nb=2",
            vec![Identifier, Eq, Number, EndOfLine, Identifier, Eq, Number, EndOfFile]
        ),
        (
            leading_newlines,
            "\n\na=1",
            vec![Identifier, Eq, Number, EndOfFile]
        ),
        (
            block,
            "布局 {\n  宽度 = 170mm\n}\n",
            vec![
                Terminal::Keyword,
                BraceLeft,
                Identifier,
                Eq,
                Terminal::Length,
                BraceRight,
                EndOfFile
            ]
        ),
        (
            newline_after_comma,
            "声部 a,\n b",
            vec![Identifier, Identifier, Comma, Identifier, EndOfFile]
        ),
        (
            string,
            "标题 = “春晓”",
            vec![Identifier, Eq, Terminal::String, EndOfFile]
        ),
        (
            strays,
            "1' 2_",
            vec![Number, Stray, Number, Stray, EndOfFile]
        ),
        (
            identifier_with_digits,
            "track_2",
            vec![Identifier, EndOfFile]
        ),
    );

    #[test]
    fn values_and_spans() {
        let (items, warnings) = scan("速度 = 3.5\n字号 = 10pt");
        assert!(warnings.is_empty());
        assert_eq!(items[0].value, Value::Identifier("速度".into()));
        assert_eq!(items[0].span, 0..6);
        assert_eq!(items[2].value, Value::Number(3.5));
        assert_eq!(
            items[6].value,
            Value::Length(Length::new(10.0, LengthUnit::Point).unwrap())
        );
    }

    #[test]
    fn keywords() {
        let (items, _) = scan("布局 简谱 五线谱 歌词 谱表 布局图");
        let values: Vec<Value> = items.into_iter().map(|item| item.value).collect();
        assert_eq!(
            values,
            vec![
                Value::Keyword(Keyword::Layout),
                Value::Keyword(Keyword::Jianpu),
                Value::Keyword(Keyword::Staff),
                Value::Keyword(Keyword::Lyric),
                Value::Keyword(Keyword::GenericStaff),
                Value::Identifier("布局图".into()),
                Value::Mark,
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let (items, warnings) = scan("a = “abc\nb = 1");
        assert_eq!(items[2].value, Value::String("abc".into()));
        assert_eq!(items[3].terminal, EndOfLine);
        assert_eq!(warnings, vec![Warning::UnterminatedString { span: 4..10 }]);
    }

    #[test]
    fn legacy_length() {
        let (items, warnings) = scan("字号 = 5号");
        assert_eq!(
            items[2].value,
            Value::Length(yuepu_core::Length(10.5 * yuepu_core::MM_PER_POINT))
        );
        assert_eq!(warnings, vec![Warning::DeprecatedLegacySize { span: 9..13 }]);
    }
}
