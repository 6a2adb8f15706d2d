//! Table-driven LL(1) parser for the layout script.
//!
//! When the lookahead is one of the notation keywords `简谱`, `五线谱` or `歌词`,
//!     the parser locates the keyword's brace-delimited bodies,
//!     lexes them with the notation's own lexer,
//!     and replaces the keyword and bodies with a single
//!     [Terminal::Jianpu], [Terminal::Staff] or [Terminal::Lyric] item
//!     before continuing.
//! Jianpu and staff blocks have two bodies: a header, which is itself a document,
//!     and the notes. Lyric blocks have one body.
//!
//! Scanner warnings inside the raw notation bodies are dropped,
//!     since the scanner's reading of that text is discarded.

use super::error::{SyntaxError, Warning};
use super::grammar::{predict, NonTerminal, Symbol, Terminal};
use super::scan::{scan, Item};
use super::tree::{Content, Keyword, MusicBlock, NodeId, Tree, Value};
use super::{jianpu, lyric, staff, Span};

/// Parses a layout script.
pub fn parse(source: &str) -> Result<(Tree, Vec<Warning>), SyntaxError> {
    let (items, warnings) = scan(source);
    let end = items.len() - 1;
    let mut parser = Parser {
        source,
        items,
        end,
        offset: 0,
        raw_bodies: vec![],
    };
    let tree = parser.run()?;
    let warnings = warnings
        .into_iter()
        .filter(|warning| {
            let span = warning.span();
            !parser
                .raw_bodies
                .iter()
                .any(|body| body.start <= span.start && span.end <= body.end)
        })
        .collect();
    Ok((tree, warnings))
}

struct Parser<'a> {
    source: &'a str,
    items: Vec<Item>,
    /// Index of the item that is read as [Terminal::EndOfFile].
    ///
    /// For the whole source this is the real end of file;
    ///     for a header document it is the header's closing brace.
    end: usize,
    offset: usize,
    /// Source ranges handed to notation lexers.
    raw_bodies: Vec<Span>,
}

impl<'a> Parser<'a> {
    fn run(&mut self) -> Result<Tree, SyntaxError> {
        let mut tree = Tree::new();
        let mut stack: Vec<(Symbol, NodeId)> =
            vec![(Symbol::NonTerminal(NonTerminal::Document), tree.root())];
        while let Some((symbol, node)) = stack.pop() {
            let lookahead = self.lookahead()?;
            match symbol {
                Symbol::Terminal(expected) => {
                    if expected != lookahead {
                        return Err(SyntaxError::UnexpectedToken {
                            expected,
                            found: lookahead,
                            span: self.span(),
                        });
                    }
                    let item = &mut self.items[self.offset];
                    let value = std::mem::replace(&mut item.value, Value::Mark);
                    tree.set(
                        node,
                        Content::Leaf {
                            value,
                            span: item.span.clone(),
                        },
                    );
                    self.offset += 1;
                }
                Symbol::NonTerminal(top) => {
                    let Some(production) = predict(top, lookahead) else {
                        return Err(SyntaxError::NoPrediction {
                            symbol: top,
                            found: lookahead,
                            span: self.span(),
                        });
                    };
                    let children: Vec<NodeId> =
                        production.rhs.iter().map(|&symbol| tree.push(symbol)).collect();
                    stack.extend(
                        production
                            .rhs
                            .iter()
                            .zip(children.iter())
                            .rev()
                            .map(|(&symbol, &child)| (symbol, child)),
                    );
                    tree.set(node, Content::Internal(children));
                }
            }
        }
        let lookahead = self.lookahead()?;
        if lookahead != Terminal::EndOfFile {
            return Err(SyntaxError::TrailingInput {
                found: lookahead,
                span: self.span(),
            });
        }
        Ok(tree)
    }

    fn span(&self) -> std::ops::Range<usize> {
        self.items[self.offset.min(self.end)].span.clone()
    }

    /// Returns the current terminal, splicing in a notation block if one starts here.
    fn lookahead(&mut self) -> Result<Terminal, SyntaxError> {
        if self.offset >= self.end {
            return Ok(Terminal::EndOfFile);
        }
        if let Value::Keyword(keyword) = self.items[self.offset].value {
            if let Some(terminal) = keyword.notation() {
                self.splice(keyword, terminal)?;
            }
        }
        Ok(self.items[self.offset].terminal)
    }

    fn splice(&mut self, keyword: Keyword, terminal: Terminal) -> Result<(), SyntaxError> {
        let start = self.offset;
        let mut i = start + 1;
        let header = if terminal == Terminal::Lyric {
            None
        } else {
            let (open, close) = self.body(keyword, i)?;
            i = close + 1;
            while i < self.end && self.items[i].terminal == Terminal::EndOfLine {
                i += 1;
            }
            if close == open + 1 {
                None
            } else {
                log::debug!("parsing the {keyword} header at {:?}", self.items[open].span);
                let items = self.items[open + 1..=close].to_vec();
                let end = items.len() - 1;
                let mut parser = Parser {
                    source: self.source,
                    items,
                    end,
                    offset: 0,
                    raw_bodies: vec![],
                };
                let header = parser.run()?;
                self.raw_bodies.append(&mut parser.raw_bodies);
                Some(header)
            }
        };
        let (open, close) = self.body(keyword, i)?;
        let raw_span = self.items[open].span.end..self.items[close].span.start;
        let raw = &self.source[raw_span.clone()];
        self.raw_bodies.push(raw_span);
        log::debug!("lexing {} bytes of {keyword} notation", raw.len());
        let value = match keyword {
            Keyword::Jianpu => Value::Jianpu(MusicBlock {
                header,
                notes: jianpu::lex(raw),
            }),
            Keyword::Staff => Value::Staff(MusicBlock {
                header,
                notes: staff::lex(raw),
            }),
            _ => Value::Lyric(lyric::segment(raw)),
        };
        let span = self.items[start].span.start..self.items[close].span.end;
        self.items.drain(start + 1..=close);
        self.items[start] = Item {
            terminal,
            value,
            span,
        };
        self.end -= close - start;
        Ok(())
    }

    /// Finds the body starting at index `i`; returns the indices of its braces.
    fn body(&self, keyword: Keyword, i: usize) -> Result<(usize, usize), SyntaxError> {
        if i >= self.end || self.items[i].terminal != Terminal::BraceLeft {
            return Err(SyntaxError::MissingBody {
                keyword,
                span: self.items[self.offset].span.clone(),
            });
        }
        let mut depth = 0_usize;
        for j in i..self.end {
            match self.items[j].terminal {
                Terminal::BraceLeft => depth += 1,
                Terminal::BraceRight => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((i, j));
                    }
                }
                _ => {}
            }
        }
        Err(SyntaxError::UnmatchedBrace {
            span: self.items[i].span.clone(),
        })
    }
}
