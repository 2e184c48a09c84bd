//! Format trait and implementations for different document types.
//!
//! A format tells the front end how to read a tree-sitter syntax tree as an ordered list of
//! headings, code blocks and other content: which grammar to parse with, which query finds
//! headings, how their inline markup reduces to text, and what role each block node plays.

pub mod markdown;

use tree_sitter::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Kind of a non-heading, non-code block, kept for presentation.
pub enum ContentKind {
    /// Running text.
    Paragraph,
    /// Bulleted or numbered list, nested items included.
    List,
    /// Quoted block.
    BlockQuote,
    /// Pipe table.
    Table,
    /// Horizontal rule.
    ThematicBreak,
    /// Raw HTML.
    Html,
    /// Anything else the grammar produces at block level.
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How the document walk treats a syntax node.
pub enum NodeRole {
    /// Holds blocks; walk its children.
    Container,
    /// A heading at the given level.
    Heading(u8),
    /// Fenced or indented code.
    Code,
    /// A leaf block of content.
    Content(ContentKind),
    /// Produces nothing visible.
    Ignore,
}

/// Grammar and node classification for one document format.
pub trait Format {
    /// Grammar used to parse the document.
    fn language(&self) -> tree_sitter::Language;
    /// Query whose `@heading` captures are the heading nodes.
    fn heading_query(&self) -> &str;
    /// Reader-visible text of a heading, given its source.
    fn heading_text(&self, source: &str) -> String;
    /// Role of a block-level node in the walk.
    fn classify(&self, node: Node<'_>) -> NodeRole;
}
