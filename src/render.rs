//! The render pass: visibility-aware wrappers around every block of a document.
//!
//! A pass walks the blocks top to bottom with a fresh [`SectionStack`]. Each heading first asks
//! whether its ancestors leave it visible and only then pushes itself, so it never counts as its
//! own ancestor. Each content or code block asks whether any open section is collapsed. The pass
//! yields a [`Layout`]: one item per block, hidden ones included, so callers can map positions
//! between passes.
//!
//! Per heading, the own collapse flag only ever affects descendants:
//!
//! ```text
//!              | ancestors expanded | an ancestor collapsed
//! -------------+--------------------+----------------------
//! expanded     | shown, ▼           | hidden
//! collapsed    | shown, ▶           | hidden
//! ```

use crate::collapse_state::{CollapseState, CollapsedSet};
use crate::formats::ContentKind;
use crate::heading_id::HeadingIdGenerator;
use crate::input::{Block, Document};
use crate::section::SectionStack;
use ratatui::style::{Color, Modifier, Style};

/// Icon for an expanded heading or code block.
pub const EXPANDED_ICON: &str = "▼";
/// Icon for a collapsed heading or code block.
pub const COLLAPSED_ICON: &str = "▶";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Whether an item takes up any space.
pub enum Visibility {
    /// Rendered in full (or as a preview, for a collapsed code block).
    Shown,
    /// Zero height: some ancestor section is collapsed.
    HiddenByAncestor,
}

impl Visibility {
    fn from_visible(visible: bool) -> Self {
        if visible {
            Self::Shown
        } else {
            Self::HiddenByAncestor
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A heading after visibility resolution.
pub struct HeadingView {
    /// Stable heading ID.
    pub id: String,
    /// Heading depth.
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Own collapse flag, which picks the toggle icon.
    pub collapsed: bool,
    /// Whether the heading is drawn at all.
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A code block after visibility resolution.
pub struct CodeView {
    /// Stable code block ID.
    pub id: String,
    /// Fence language.
    pub language: Option<String>,
    /// Code body.
    pub code: String,
    /// Own collapse flag; a collapsed block shows a one-line preview.
    pub collapsed: bool,
    /// Depth of the enclosing section, for indentation.
    pub indent_level: u8,
    /// Whether the block is drawn at all.
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Any other block after visibility resolution.
pub struct ContentView {
    /// Block kind.
    pub kind: ContentKind,
    /// Source text.
    pub text: String,
    /// Depth of the enclosing section, for indentation.
    pub indent_level: u8,
    /// Whether the block is drawn at all.
    pub visibility: Visibility,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One block of a render pass.
pub enum RenderItem {
    /// Heading with its toggle.
    Heading(HeadingView),
    /// Collapsible code block.
    Code(CodeView),
    /// Other content.
    Content(ContentView),
}

impl RenderItem {
    #[must_use]
    /// Whether the item occupies any rows.
    pub fn is_visible(&self) -> bool {
        let visibility = match self {
            Self::Heading(view) => view.visibility,
            Self::Code(view) => view.visibility,
            Self::Content(view) => view.visibility,
        };
        visibility == Visibility::Shown
    }

    #[must_use]
    /// Whether the item has a collapse toggle of its own.
    pub fn is_toggleable(&self) -> bool {
        matches!(self, Self::Heading(_) | Self::Code(_))
    }

    #[must_use]
    /// Heading level, for headings.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading(view) => Some(view.level),
            _ => None,
        }
    }
}

/// Every block of one render pass, hidden items included.
pub type Layout = Vec<RenderItem>;

/// Render a heading: check visibility against the ancestors, then open its section.
pub fn heading_wrapper(
    stack: &mut SectionStack,
    id: String,
    level: u8,
    title: &str,
    collapsed: &CollapsedSet,
) -> HeadingView {
    let visible = stack.is_heading_visible(&id, level, collapsed);
    stack.push_section(&id, level);

    HeadingView {
        collapsed: collapsed.contains(&id),
        id,
        level,
        title: title.to_string(),
        visibility: Visibility::from_visible(visible),
    }
}

#[must_use]
/// Resolve visibility and indentation for non-heading content at the current position.
pub fn content_wrapper(stack: &SectionStack, collapsed: &CollapsedSet) -> (Visibility, u8) {
    (
        Visibility::from_visible(stack.is_content_visible(collapsed)),
        stack.current_level(),
    )
}

#[must_use]
/// ID of the `ordinal`-th code block in a document.
pub fn code_block_id(ordinal: usize) -> String {
    format!("code-block-{ordinal}")
}

/// Run a full render pass over `document`.
pub fn render_pass(
    document: &Document,
    ids: &mut HeadingIdGenerator,
    state: &CollapseState,
) -> Layout {
    let mut stack = SectionStack::new();
    stack.reset();
    ids.begin_pass();

    let mut code_ordinal = 0;
    document
        .blocks
        .iter()
        .map(|block| match block {
            Block::Heading(heading) => {
                let id = ids.assign(heading.level, &heading.title);
                RenderItem::Heading(heading_wrapper(
                    &mut stack,
                    id,
                    heading.level,
                    &heading.title,
                    &state.collapsed_headings,
                ))
            }
            Block::Code(code) => {
                let id = code_block_id(code_ordinal);
                code_ordinal += 1;
                let (visibility, indent_level) =
                    content_wrapper(&stack, &state.collapsed_headings);
                RenderItem::Code(CodeView {
                    collapsed: state.collapsed_code_blocks.contains(&id),
                    id,
                    language: code.language.clone(),
                    code: code.code.clone(),
                    indent_level,
                    visibility,
                })
            }
            Block::Content(content) => {
                let (visibility, indent_level) =
                    content_wrapper(&stack, &state.collapsed_headings);
                RenderItem::Content(ContentView {
                    kind: content.kind,
                    text: content.text.clone(),
                    indent_level,
                    visibility,
                })
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
/// Presentation of one heading level.
pub struct LevelStyle {
    /// Text colour.
    pub color: Color,
    /// Extra modifiers.
    pub modifier: Modifier,
}

/// Styles for levels 1 to 4; deeper levels reuse the last entry.
pub const LEVEL_STYLES: [LevelStyle; 4] = [
    LevelStyle {
        color: Color::Magenta,
        modifier: Modifier::BOLD.union(Modifier::UNDERLINED),
    },
    LevelStyle {
        color: Color::Cyan,
        modifier: Modifier::BOLD,
    },
    LevelStyle {
        color: Color::Green,
        modifier: Modifier::BOLD,
    },
    LevelStyle {
        color: Color::Yellow,
        modifier: Modifier::empty(),
    },
];

#[must_use]
/// Style for a heading at `level`.
pub fn level_style(level: u8) -> Style {
    let index = usize::from(level.clamp(1, 4)) - 1;
    let LevelStyle { color, modifier } = LEVEL_STYLES[index];
    Style::default().fg(color).add_modifier(modifier)
}

#[must_use]
/// Leading spaces for a heading at `level`.
pub fn heading_indent(level: u8, indent_width: usize) -> usize {
    usize::from(level.saturating_sub(1)) * indent_width
}

#[must_use]
/// Leading spaces for content inside a section at `level`, lined up with the heading text.
pub fn content_indent(level: u8, indent_width: usize) -> usize {
    heading_indent(level, indent_width) + EXPANDED_ICON.chars().count() + 1
}

#[must_use]
/// One-line summary of a collapsed code block.
pub fn code_preview(view: &CodeView) -> String {
    let lines = view.code.lines().count();
    let noun = if lines == 1 { "line" } else { "lines" };
    match &view.language {
        Some(language) => format!("```{language} ({lines} {noun})"),
        None => format!("``` ({lines} {noun})"),
    }
}

#[must_use]
/// Plain-text rendering of the visible items.
pub fn outline_lines(layout: &[RenderItem], indent_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for item in layout.iter().filter(|item| item.is_visible()) {
        match item {
            RenderItem::Heading(view) => {
                let icon = if view.collapsed {
                    COLLAPSED_ICON
                } else {
                    EXPANDED_ICON
                };
                let pad = " ".repeat(heading_indent(view.level, indent_width));
                lines.push(format!("{pad}{icon} {}", view.title));
            }
            RenderItem::Code(view) => {
                let pad = " ".repeat(content_indent(view.indent_level, indent_width));
                if view.collapsed {
                    lines.push(format!("{pad}{COLLAPSED_ICON} {}", code_preview(view)));
                } else {
                    let fence = view.language.as_deref().unwrap_or("");
                    lines.push(format!("{pad}{EXPANDED_ICON} ```{fence}"));
                    lines.extend(view.code.lines().map(|l| format!("{pad}  {l}")));
                    lines.push(format!("{pad}  ```"));
                }
            }
            RenderItem::Content(view) => {
                let pad = " ".repeat(content_indent(view.indent_level, indent_width));
                lines.extend(view.text.lines().map(|l| format!("{pad}{l}")));
            }
        }
    }
    lines
}

#[cfg(test)]
#[path = "tests/render.rs"]
mod tests;
