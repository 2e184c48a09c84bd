use super::{
    code_block_id, content_indent, heading_wrapper, outline_lines, render_pass, RenderItem,
    Visibility,
};
use crate::collapse_state::{CollapseState, CollapsedSet};
use crate::formats::ContentKind;
use crate::heading_id::HeadingIdGenerator;
use crate::input::{Block, CodeBlock, Content, Document, Heading};
use crate::section::SectionStack;
use std::path::PathBuf;

fn heading(level: u8, title: &str) -> Block {
    Block::Heading(Heading {
        level,
        title: title.to_string(),
        line: 0,
    })
}

fn para(text: &str) -> Block {
    Block::Content(Content {
        kind: ContentKind::Paragraph,
        text: text.to_string(),
        line: 0,
    })
}

fn code(text: &str) -> Block {
    Block::Code(CodeBlock {
        language: Some("sh".to_string()),
        code: text.to_string(),
        line: 0,
    })
}

fn document(blocks: Vec<Block>) -> Document {
    Document {
        path: PathBuf::from("test.md"),
        blocks,
    }
}

fn collapsed(ids: &[&str]) -> CollapseState {
    CollapseState {
        collapsed_headings: ids.iter().map(|id| (*id).to_string()).collect(),
        collapsed_code_blocks: CollapsedSet::new(),
    }
}

fn visible(layout: &[RenderItem]) -> Vec<bool> {
    layout.iter().map(RenderItem::is_visible).collect()
}

fn nested() -> Document {
    document(vec![
        heading(1, "Top"),
        heading(2, "Middle"),
        heading(3, "Bottom"),
        para("deep content"),
        heading(1, "Next"),
        para("after"),
    ])
}

#[test]
fn test_everything_visible_by_default() {
    let layout = render_pass(&nested(), &mut HeadingIdGenerator::new(), &CollapseState::default());
    assert!(layout.iter().all(RenderItem::is_visible));
}

#[test]
fn test_content_hidden_under_collapsed_top_level() {
    let state = collapsed(&["heading-1-top-0"]);
    let layout = render_pass(&nested(), &mut HeadingIdGenerator::new(), &state);

    assert_eq!(
        visible(&layout),
        vec![true, false, false, false, true, true]
    );
}

#[test]
fn test_collapsed_heading_stays_visible_with_collapsed_icon() {
    let state = collapsed(&["heading-2-middle-0"]);
    let layout = render_pass(&nested(), &mut HeadingIdGenerator::new(), &state);

    let RenderItem::Heading(middle) = &layout[1] else {
        panic!("expected heading");
    };
    assert_eq!(middle.visibility, Visibility::Shown);
    assert!(middle.collapsed);
    assert_eq!(
        visible(&layout),
        vec![true, true, false, false, true, true]
    );
}

#[test]
fn test_hidden_heading_keeps_own_flag() {
    let state = collapsed(&["heading-1-top-0", "heading-3-bottom-0"]);
    let layout = render_pass(&nested(), &mut HeadingIdGenerator::new(), &state);

    let RenderItem::Heading(bottom) = &layout[2] else {
        panic!("expected heading");
    };
    assert_eq!(bottom.visibility, Visibility::HiddenByAncestor);
    assert!(bottom.collapsed);
}

#[test]
fn test_sibling_after_collapsed_section_is_visible() {
    let doc = document(vec![
        heading(1, "Doc"),
        heading(2, "Intro"),
        heading(3, "Details"),
        para("hidden"),
        heading(2, "Usage"),
        para("shown"),
    ]);
    let state = collapsed(&["heading-2-intro-0"]);
    let layout = render_pass(&doc, &mut HeadingIdGenerator::new(), &state);

    assert_eq!(
        visible(&layout),
        vec![true, true, false, false, true, true]
    );
}

#[test]
fn test_self_exclusion_in_wrapper() {
    let set: CollapsedSet = ["h-2-intro-0".to_string()].into_iter().collect();
    let mut stack = SectionStack::new();
    stack.reset();

    let intro = heading_wrapper(&mut stack, "h-2-intro-0".to_string(), 2, "Intro", &set);
    let details = heading_wrapper(&mut stack, "h-3-details-0".to_string(), 3, "Details", &set);

    assert_eq!(intro.visibility, Visibility::Shown);
    assert!(intro.collapsed);
    assert_eq!(details.visibility, Visibility::HiddenByAncestor);
    assert!(!details.collapsed);
}

#[test]
fn test_indent_follows_enclosing_section() {
    let doc = document(vec![
        para("preamble"),
        heading(1, "A"),
        heading(3, "B"),
        para("inside b"),
    ]);
    let layout = render_pass(&doc, &mut HeadingIdGenerator::new(), &CollapseState::default());

    let levels: Vec<u8> = layout
        .iter()
        .filter_map(|item| match item {
            RenderItem::Content(view) => Some(view.indent_level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 3]);
    assert_eq!(content_indent(3, 2), 6);
}

#[test]
fn test_code_blocks_collapse_independently() {
    let doc = document(vec![heading(1, "A"), code("ls\npwd"), code("echo hi")]);
    let mut state = CollapseState::default();
    state.collapsed_code_blocks.insert(code_block_id(0));

    let layout = render_pass(&doc, &mut HeadingIdGenerator::new(), &state);
    let lines = outline_lines(&layout, 2);

    assert_eq!(
        lines,
        vec![
            "▼ A",
            "  ▶ ```sh (2 lines)",
            "  ▼ ```sh",
            "    echo hi",
            "    ```",
        ]
    );
}

#[test]
fn test_collapsed_section_hides_code_blocks() {
    let doc = document(vec![heading(1, "A"), code("ls"), heading(1, "B")]);
    let layout = render_pass(&doc, &mut HeadingIdGenerator::new(), &collapsed(&["heading-1-a-0"]));
    assert_eq!(visible(&layout), vec![true, false, true]);
}

#[test]
fn test_outline_of_collapsed_document() {
    let doc = document(vec![
        heading(1, "Guide"),
        para("Intro."),
        heading(2, "Overview"),
        para("Details."),
        heading(2, "Overview"),
    ]);
    let state = collapsed(&["heading-2-overview-0"]);
    let layout = render_pass(&doc, &mut HeadingIdGenerator::new(), &state);

    assert_eq!(
        outline_lines(&layout, 2),
        vec!["▼ Guide", "  Intro.", "  ▶ Overview", "  ▼ Overview"]
    );
}

#[test]
fn test_repeated_passes_are_identical() {
    let doc = nested();
    let state = collapsed(&["heading-2-middle-0"]);
    let mut ids = HeadingIdGenerator::new();

    let first = render_pass(&doc, &mut ids, &state);
    let second = render_pass(&doc, &mut ids, &state);
    assert_eq!(first, second);
}
