//! # Yuepu language
//!
//! This crate reads the two languages of a Yuepu document.
//!
//! The *markup* is running text: CJK and Western prose interleaved with
//!     bracket commands like `〚字号〛10.5pt`.
//! The [lexer] turns it into a flat stream of [Token]s,
//!     which is what the typesetter consumes.
//!
//! The *layout script* describes the score: line separated clauses that are either
//!     keyword led blocks or assignments.
//! Values may be embedded music, written in jianpu (`简谱`), staff notation (`五线谱`)
//!     or as lyrics (`歌词`).
//! The [parse] function builds a syntax [Tree], lexing embedded music
//!     with the [jianpu], [staff] and [lyric] sub-lexers as it goes.
//!
//! ```
//! use yuepu_lang::{parse, Value};
//!
//! let source = "标题 = “春晓”\n旋律 = 简谱 {} { 1 2 3 }";
//! let (tree, warnings) = parse(source).unwrap();
//! assert!(warnings.is_empty());
//! let assignments = tree.assignments();
//! assert_eq!(assignments[0], ("标题", &Value::String("春晓".into())));
//! let Value::Jianpu(block) = assignments[1].1 else {
//!     panic!("expected jianpu");
//! };
//! assert_eq!(block.notes.len(), 3);
//! ```
//!
//! Problems that still allow a result are returned as [Warning]s next to it.
//! Syntax errors in the layout script are fatal and returned as a [SyntaxError].
//! With the `ariadne` feature both can be rendered as annotated source reports.

pub mod error;
pub mod grammar;
pub mod jianpu;
pub mod lexer;
pub mod lyric;
pub mod parse;
pub mod scan;
pub mod staff;
pub mod tree;

pub use error::{ErrorLabel, SyntaxError, Warning};
pub use lexer::{lex, CommandId, Lexer, Token};
pub use parse::parse;
pub use tree::{Keyword, MusicBlock, NodeId, Tree, Value};

/// Byte range into the source.
pub type Span = std::ops::Range<usize>;
