//! Markdown format implementation using tree-sitter-md.
//!
//! This module provides the tree-sitter query for headings and the node classification for
//! markdown's block grammar: ATX (`#`) and setext (underlined) headings, fenced and indented
//! code, and the remaining leaf blocks. Heading text goes through pulldown-cmark, so inline
//! markup is dropped while literal punctuation survives.

use crate::formats::{ContentKind, Format, NodeRole};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use tree_sitter::Node;

/// Tree-sitter grammar and queries for markdown documents.
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn heading_query(&self) -> &'static str {
        "(atx_heading) @heading (setext_heading) @heading"
    }

    fn heading_text(&self, source: &str) -> String {
        let mut text = String::new();
        let mut in_heading = false;
        for event in Parser::new(source) {
            match event {
                Event::Start(Tag::Heading { .. }) => in_heading = true,
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak if in_heading => text.push(' '),
                _ => {}
            }
        }
        text.trim().to_string()
    }

    fn classify(&self, node: Node<'_>) -> NodeRole {
        match node.kind() {
            "document" | "section" => NodeRole::Container,
            "atx_heading" => NodeRole::Heading(atx_level(node)),
            "setext_heading" => NodeRole::Heading(setext_level(node)),
            "fenced_code_block" | "indented_code_block" => NodeRole::Code,
            "paragraph" => NodeRole::Content(ContentKind::Paragraph),
            "list" => NodeRole::Content(ContentKind::List),
            "block_quote" => NodeRole::Content(ContentKind::BlockQuote),
            "pipe_table" => NodeRole::Content(ContentKind::Table),
            "thematic_break" => NodeRole::Content(ContentKind::ThematicBreak),
            "html_block" => NodeRole::Content(ContentKind::Html),
            "link_reference_definition" | "minus_metadata" | "plus_metadata" => NodeRole::Ignore,
            _ => NodeRole::Content(ContentKind::Other),
        }
    }
}

/// Level from the `atx_hN_marker` child, defaulting to 1.
fn atx_level(node: Node<'_>) -> u8 {
    let mut cursor = node.walk();
    let level = node
        .children(&mut cursor)
        .find_map(|child| {
            child
                .kind()
                .strip_prefix("atx_h")
                .and_then(|rest| rest.strip_suffix("_marker"))
                .and_then(|digit| digit.parse().ok())
        })
        .unwrap_or(1);
    level
}

/// `===` underlines are level 1, `---` underlines level 2.
fn setext_level(node: Node<'_>) -> u8 {
    let mut cursor = node.walk();
    let is_h2 = node
        .children(&mut cursor)
        .any(|child| child.kind() == "setext_h2_underline");
    if is_h2 {
        2
    } else {
        1
    }
}
