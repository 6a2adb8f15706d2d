//! Syntax trees.
//!
//! Nodes live in an arena owned by the [Tree] and refer to each other by [NodeId].
//! The parser creates a node as soon as it predicts the node's symbol,
//!     and fills in its content when the symbol is matched or expanded.

use super::grammar::{NonTerminal, Symbol, Terminal};
use super::jianpu::JianpuNote;
use super::staff::StaffNote;
use super::Span;
use yuepu_core::Length;

/// A reserved word of the layout script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `布局`: a layout block.
    Layout,
    /// `简谱`: a jianpu block.
    Jianpu,
    /// `五线谱`: a staff notation block.
    Staff,
    /// `歌词`: a lyric block.
    Lyric,
    /// `谱表`: a generic staff block.
    GenericStaff,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match word {
            "布局" => Layout,
            "简谱" => Jianpu,
            "五线谱" => Staff,
            "歌词" => Lyric,
            "谱表" => GenericStaff,
            _ => return None,
        })
    }

    pub fn word(&self) -> &'static str {
        use Keyword::*;
        match self {
            Layout => "布局",
            Jianpu => "简谱",
            Staff => "五线谱",
            Lyric => "歌词",
            GenericStaff => "谱表",
        }
    }

    /// Returns the terminal that replaces this keyword and its bodies,
    ///     if the keyword introduces an embedded notation.
    pub fn notation(&self) -> Option<Terminal> {
        match self {
            Keyword::Jianpu => Some(Terminal::Jianpu),
            Keyword::Staff => Some(Terminal::Staff),
            Keyword::Lyric => Some(Terminal::Lyric),
            Keyword::Layout | Keyword::GenericStaff => None,
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.word())
    }
}

/// A block of music: an optional header document and the notes.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicBlock<N> {
    /// The first body, parsed as a document. `None` if the body is empty.
    pub header: Option<Tree>,
    pub notes: Vec<N>,
}

/// Payload of a leaf node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Keyword(Keyword),
    Identifier(String),
    Number(f64),
    Length(Length),
    String(String),
    Jianpu(MusicBlock<JianpuNote>),
    Staff(MusicBlock<StaffNote>),
    Lyric(Vec<String>),
    /// Braces, `=`, `,`, line ends and stray characters carry no payload.
    Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// The node's symbol has been predicted but not yet matched or expanded.
    Pending,
    Leaf { value: Value, span: Span },
    /// Children in left to right order. Empty for an ε expansion.
    Internal(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub symbol: Symbol,
    pub content: Content,
}

/// A syntax tree. The root is always a [NonTerminal::Document].
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new() -> Tree {
        Tree {
            nodes: vec![Node {
                symbol: Symbol::NonTerminal(NonTerminal::Document),
                content: Content::Pending,
            }],
        }
    }

    pub(crate) fn push(&mut self, symbol: Symbol) -> NodeId {
        self.nodes.push(Node {
            symbol,
            content: Content::Pending,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn set(&mut self, id: NodeId, content: Content) {
        self.nodes[id.0].content = content;
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).content {
            Content::Internal(children) => children,
            Content::Pending | Content::Leaf { .. } => &[],
        }
    }

    pub fn value(&self, id: NodeId) -> Option<&Value> {
        match &self.node(id).content {
            Content::Leaf { value, .. } => Some(value),
            Content::Pending | Content::Internal(_) => None,
        }
    }

    /// Returns the leaves in source order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = vec![];
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match &self.node(id).content {
                Content::Leaf { .. } => leaves.push(id),
                Content::Internal(children) => stack.extend(children.iter().rev()),
                Content::Pending => {}
            }
        }
        leaves
    }

    /// Returns all assignments `identifier = value` in source order,
    ///     including those inside nested blocks.
    pub fn assignments(&self) -> Vec<(&str, &Value)> {
        let mut assignments = vec![];
        let leaves = self.leaves();
        for window in leaves.windows(3) {
            let [name, eq, value] = [window[0], window[1], window[2]];
            if self.node(eq).symbol != Symbol::Terminal(Terminal::Eq) {
                continue;
            }
            if let (Some(Value::Identifier(name)), Some(value)) = (self.value(name), self.value(value)) {
                assignments.push((name.as_str(), value));
            }
        }
        assignments
    }

    fn fmt_node(&self, f: &mut std::fmt::Formatter<'_>, id: NodeId, depth: usize) -> std::fmt::Result {
        let node = self.node(id);
        write!(f, "{:width$}", "", width = 2 * depth)?;
        match &node.symbol {
            Symbol::Terminal(t) => write!(f, "{t:?}")?,
            Symbol::NonTerminal(n) => write!(f, "{n:?}")?,
        }
        match &node.content {
            Content::Pending => writeln!(f, " <pending>"),
            Content::Internal(children) => {
                writeln!(f)?;
                for &child in children {
                    self.fmt_node(f, child, depth + 1)?;
                }
                Ok(())
            }
            Content::Leaf { value, .. } => {
                match value {
                    Value::Keyword(k) => writeln!(f, " {k}"),
                    Value::Identifier(s) => writeln!(f, " {s}"),
                    Value::Number(n) => writeln!(f, " {n}"),
                    Value::Length(l) => writeln!(f, " {l}"),
                    Value::String(s) => writeln!(f, " “{s}”"),
                    Value::Jianpu(block) => self.fmt_music(f, block, depth),
                    Value::Staff(block) => self.fmt_music(f, block, depth),
                    Value::Lyric(syllables) => writeln!(f, " {}", syllables.join(" ")),
                    Value::Mark => writeln!(f),
                }
            }
        }
    }

    fn fmt_music<N: std::fmt::Display>(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        block: &MusicBlock<N>,
        depth: usize,
    ) -> std::fmt::Result {
        let notes: Vec<String> = block.notes.iter().map(ToString::to_string).collect();
        writeln!(f, " {}", notes.join(" "))?;
        if let Some(header) = &block.header {
            header.fmt_node(f, header.root(), depth + 1)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_node(f, self.root(), 0)
    }
}
