//! Reading documents from disk and flattening their syntax trees into ordered blocks.
//!
//! The render pass only needs blocks in document order, each tagged as a heading, a code block
//! or other content. Section nesting is recovered later from heading levels, so the syntax tree's
//! own `section` containers are walked through rather than kept.

use crate::error::{Error, Result};
use crate::formats::{ContentKind, Format, NodeRole};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs, io};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A heading as written in the source.
pub struct Heading {
    /// Nesting depth (1 for top-level).
    pub level: u8,
    /// Plain heading text without markup.
    pub title: String,
    /// 1-based source line.
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A leaf block that is neither heading nor code.
pub struct Content {
    /// What sort of block this is.
    pub kind: ContentKind,
    /// Source text of the block.
    pub text: String,
    /// 1-based source line.
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A fenced or indented code block.
pub struct CodeBlock {
    /// Info string language, when the fence names one.
    pub language: Option<String>,
    /// Code without fences.
    pub code: String,
    /// 1-based source line.
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One block of a document in reading order.
pub enum Block {
    /// Section heading.
    Heading(Heading),
    /// Code block.
    Code(CodeBlock),
    /// Any other content.
    Content(Content),
}

#[derive(Clone, Debug)]
/// A parsed document.
pub struct Document {
    /// Where the document was read from.
    pub path: PathBuf,
    /// Blocks in document order.
    pub blocks: Vec<Block>,
}

impl Document {
    #[must_use]
    /// Key the document's collapse state is stored under.
    pub fn key(&self) -> String {
        document_key(&self.path)
    }

    /// Headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(heading) => Some(heading),
            _ => None,
        })
    }
}

#[must_use]
/// Canonical form of `path` where it exists, so one file always maps to one key.
pub fn document_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Expand the given paths into document files.
///
/// Files are kept as given. Directories are searched recursively for files whose extension is in
/// `extensions`, in sorted order.
///
/// # Errors
///
/// Returns an error if a path does not exist or a directory cannot be read.
pub fn find_documents(paths: Vec<PathBuf>, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            scan_dir(&path, extensions, &mut found)?;
            found.sort();
            documents.extend(found);
        } else if path.is_file() {
            documents.push(path);
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
    }
    Ok(documents)
}

fn scan_dir(dir: &Path, extensions: &[String], found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, extensions, found)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want == ext))
        {
            found.push(path);
        }
    }
    Ok(())
}

/// Read and parse the document at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_document(path: &Path, format: &dyn Format) -> Result<Document> {
    let text = fs::read_to_string(path)?;
    parse_document(path, &text, format)
}

/// Parse `text` into a flat block list.
///
/// # Errors
///
/// Returns an error if the grammar or heading query cannot be loaded, or the parser fails.
pub fn parse_document(path: &Path, text: &str, format: &dyn Format) -> Result<Document> {
    let language = format.language();
    let mut parser = Parser::new();
    parser.set_language(&language)?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| Error::Parse(path.display().to_string()))?;

    let titles = heading_titles(&language, format, tree.root_node(), text)?;

    let mut blocks = Vec::new();
    walk(tree.root_node(), format, text, &titles, &mut blocks);

    Ok(Document {
        path: path.to_path_buf(),
        blocks,
    })
}

/// Heading text keyed by heading node.
fn heading_titles(
    language: &tree_sitter::Language,
    format: &dyn Format,
    root: Node<'_>,
    text: &str,
) -> Result<HashMap<usize, String>> {
    let query = Query::new(language, format.heading_query())?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, text.as_bytes());

    let mut titles = HashMap::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let node = capture.node;
            titles.insert(node.id(), format.heading_text(&text[node.byte_range()]));
        }
    }
    Ok(titles)
}

fn walk(
    node: Node<'_>,
    format: &dyn Format,
    text: &str,
    titles: &HashMap<usize, String>,
    blocks: &mut Vec<Block>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let line = child.start_position().row + 1;
        match format.classify(child) {
            NodeRole::Container => walk(child, format, text, titles, blocks),
            NodeRole::Heading(level) => blocks.push(Block::Heading(Heading {
                level,
                title: titles.get(&child.id()).cloned().unwrap_or_default(),
                line,
            })),
            NodeRole::Code => blocks.push(Block::Code(code_block(child, text, line))),
            NodeRole::Content(kind) => {
                let source = text[child.byte_range()].trim_end();
                if !source.trim().is_empty() {
                    blocks.push(Block::Content(Content {
                        kind,
                        text: source.to_string(),
                        line,
                    }));
                }
            }
            NodeRole::Ignore => {}
        }
    }
}

fn code_block(node: Node<'_>, text: &str, line: usize) -> CodeBlock {
    if node.kind() == "indented_code_block" {
        let code = text[node.byte_range()]
            .lines()
            .map(|l| l.strip_prefix("    ").or_else(|| l.strip_prefix('\t')).unwrap_or(l))
            .collect::<Vec<_>>()
            .join("\n");
        return CodeBlock {
            language: None,
            code: code.trim_end().to_string(),
            line,
        };
    }

    let mut language = None;
    let mut code = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "info_string" => {
                let info = text[child.byte_range()].trim();
                language = info
                    .split_whitespace()
                    .next()
                    .map(std::string::ToString::to_string);
            }
            "code_fence_content" => {
                code = text[child.byte_range()].trim_end().to_string();
            }
            _ => {}
        }
    }

    CodeBlock {
        language,
        code,
        line,
    }
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
