//! The layout script grammar.
//!
//! The grammar is LL(1) and has 20 productions:
//!
//! ```text
//!  1  Document             → Clause DocumentSuffix
//!  2  DocumentSuffix       → ε
//!  3  DocumentSuffix       → EndOfLine Clause DocumentSuffix
//!  4  Clause               → LayoutStaff
//!  5  Clause               → AssignmentList
//!  6  LayoutStaff          → Keyword { Document }
//!  7  AssignmentList       → Identifier AssignmentListSuffix
//!  8  AssignmentListSuffix → = RHS
//!  9  AssignmentListSuffix → ItemSuffix ListSuffix
//! 10  ListSuffix           → ε
//! 11  ListSuffix           → , Item ListSuffix
//! 12  RHS                  → Number
//! 13  RHS                  → Length
//! 14  RHS                  → String
//! 15  RHS                  → Jianpu
//! 16  RHS                  → Staff
//! 17  RHS                  → Lyric
//! 18  Item                 → Identifier ItemSuffix
//! 19  ItemSuffix           → ε
//! 20  ItemSuffix           → { Identifier }
//! ```
//!
//! `Jianpu`, `Staff` and `Lyric` never come out of the scanner.
//! The parser produces them by replacing a notation keyword and its bodies.

use self::Symbol::{NonTerminal as N, Terminal as T};

/// A terminal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Keyword,
    Identifier,
    Number,
    Length,
    String,
    BraceLeft,
    BraceRight,
    Eq,
    EndOfLine,
    Comma,
    EndOfFile,
    Jianpu,
    Staff,
    Lyric,
    /// A character that is not part of any terminal.
    ///
    /// Strays are legal only inside notation bodies.
    Stray,
}

impl Terminal {
    pub const ALL: [Terminal; 15] = [
        Terminal::Keyword,
        Terminal::Identifier,
        Terminal::Number,
        Terminal::Length,
        Terminal::String,
        Terminal::BraceLeft,
        Terminal::BraceRight,
        Terminal::Eq,
        Terminal::EndOfLine,
        Terminal::Comma,
        Terminal::EndOfFile,
        Terminal::Jianpu,
        Terminal::Staff,
        Terminal::Lyric,
        Terminal::Stray,
    ];
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Terminal::*;
        let s = match self {
            Keyword => "a keyword",
            Identifier => "an identifier",
            Number => "a number",
            Length => "a length",
            String => "a string",
            BraceLeft => "`{`",
            BraceRight => "`}`",
            Eq => "`=`",
            EndOfLine => "the end of the line",
            Comma => "`,`",
            EndOfFile => "the end of the input",
            Jianpu => "a jianpu block",
            Staff => "a staff notation block",
            Lyric => "a lyric block",
            Stray => "an unexpected character",
        };
        write!(f, "{s}")
    }
}

/// A nonterminal symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Document,
    DocumentSuffix,
    Clause,
    LayoutStaff,
    AssignmentList,
    AssignmentListSuffix,
    ListSuffix,
    RHS,
    Item,
    ItemSuffix,
}

impl std::fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use NonTerminal::*;
        let s = match self {
            Document => "a document",
            DocumentSuffix => "a new line or the end of the block",
            Clause => "a clause",
            LayoutStaff => "a block",
            AssignmentList => "an assignment or list",
            AssignmentListSuffix => "`=` or a list",
            ListSuffix => "`,` or the end of the list",
            RHS => "a value",
            Item => "a list item",
            ItemSuffix => "a list item",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

/// A production rule.
#[derive(Debug, PartialEq, Eq)]
pub struct Production {
    /// 1-based number of the rule, as listed in the module documentation.
    pub number: u8,
    pub lhs: NonTerminal,
    /// Right hand side, leftmost symbol first. Empty for ε.
    pub rhs: &'static [Symbol],
}

macro_rules! productions {
    (@ T $name: ident) => { Terminal::$name };
    (@ N $name: ident) => { NonTerminal::$name };
    ( $( $number: literal : $lhs: ident => [ $( $kind: ident ($name: ident) ),* ], )+ ) => {
        /// All productions, in order.
        pub static PRODUCTIONS: [Production; 20] = [
            $(
                Production {
                    number: $number,
                    lhs: NonTerminal::$lhs,
                    rhs: &[ $( $kind(productions!(@ $kind $name)) ),* ],
                },
            )+
        ];
    };
}

productions!(
    1: Document => [N(Clause), N(DocumentSuffix)],
    2: DocumentSuffix => [],
    3: DocumentSuffix => [T(EndOfLine), N(Clause), N(DocumentSuffix)],
    4: Clause => [N(LayoutStaff)],
    5: Clause => [N(AssignmentList)],
    6: LayoutStaff => [T(Keyword), T(BraceLeft), N(Document), T(BraceRight)],
    7: AssignmentList => [T(Identifier), N(AssignmentListSuffix)],
    8: AssignmentListSuffix => [T(Eq), N(RHS)],
    9: AssignmentListSuffix => [N(ItemSuffix), N(ListSuffix)],
    10: ListSuffix => [],
    11: ListSuffix => [T(Comma), N(Item), N(ListSuffix)],
    12: RHS => [T(Number)],
    13: RHS => [T(Length)],
    14: RHS => [T(String)],
    15: RHS => [T(Jianpu)],
    16: RHS => [T(Staff)],
    17: RHS => [T(Lyric)],
    18: Item => [T(Identifier), N(ItemSuffix)],
    19: ItemSuffix => [],
    20: ItemSuffix => [T(BraceLeft), T(Identifier), T(BraceRight)],
);

/// Returns the production to expand `top` with when the lookahead is `lookahead`.
pub fn predict(top: NonTerminal, lookahead: Terminal) -> Option<&'static Production> {
    use NonTerminal as NT;
    use Terminal::*;
    let number = match (top, lookahead) {
        (NT::Document, Keyword | Identifier) => 1,
        (NT::DocumentSuffix, BraceRight | EndOfFile) => 2,
        (NT::DocumentSuffix, EndOfLine) => 3,
        (NT::Clause, Keyword) => 4,
        (NT::Clause, Identifier) => 5,
        (NT::LayoutStaff, Keyword) => 6,
        (NT::AssignmentList, Identifier) => 7,
        (NT::AssignmentListSuffix, Eq) => 8,
        (NT::AssignmentListSuffix, BraceLeft | BraceRight | Comma | EndOfLine | EndOfFile) => 9,
        (NT::ListSuffix, BraceRight | EndOfLine | EndOfFile) => 10,
        (NT::ListSuffix, Comma) => 11,
        (NT::RHS, Number) => 12,
        (NT::RHS, Length) => 13,
        (NT::RHS, String) => 14,
        (NT::RHS, Jianpu) => 15,
        (NT::RHS, Staff) => 16,
        (NT::RHS, Lyric) => 17,
        (NT::Item, Identifier) => 18,
        (NT::ItemSuffix, BraceRight | Comma | EndOfLine | EndOfFile) => 19,
        (NT::ItemSuffix, BraceLeft) => 20,
        _ => return None,
    };
    PRODUCTIONS.get(number - 1)
}

/// Returns the terminals for which `top` has a prediction.
pub fn expected(top: NonTerminal) -> Vec<Terminal> {
    Terminal::ALL
        .into_iter()
        .filter(|&t| predict(top, t).is_some())
        .collect()
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            T(t) => write!(f, "{t}"),
            N(n) => write!(f, "{n}"),
        }
    }
}
