//! Section stack tracking for a single top-to-bottom walk of a document.
//!
//! A section is the span of a document owned by a heading: everything after it up to the next
//! heading at the same or a shallower level. While walking blocks in order, the stack holds the
//! headings whose sections are currently open, shallowest first. Visibility of any block is then
//! a question about the stack alone: is any open ancestor collapsed?
//!
//! The stack is rebuilt from empty on every render pass (`reset`, then `push_section` as each
//! heading is reached). Scope exit is never signalled explicitly; a push evicts whatever it
//! closes.

use crate::collapse_state::CollapsedSet;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One open ancestor heading.
pub struct SectionEntry {
    /// ID of the heading that opened this section.
    pub heading_id: String,
    /// Heading depth (1 for top-level).
    pub level: u8,
}

#[derive(Default, Debug)]
/// Open ancestor headings during a document walk, ordered shallow to deep.
pub struct SectionStack {
    entries: Vec<SectionEntry>,
}

impl SectionStack {
    #[must_use]
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every open section. Call before the first heading of a pass pushes itself.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Open a section for `heading_id`, closing any open section at `level` or deeper.
    pub fn push_section(&mut self, heading_id: &str, level: u8) {
        self.pop_section(level);
        self.entries.push(SectionEntry {
            heading_id: heading_id.to_string(),
            level,
        });
    }

    /// Close every open section at `level` or deeper.
    pub fn pop_section(&mut self, level: u8) {
        self.entries.retain(|entry| entry.level < level);
    }

    #[must_use]
    /// Whether a heading at `level` is shown given the currently open sections.
    ///
    /// Only ancestors count: entries at a shallower level that are not this heading. A heading's
    /// own collapse flag never hides it, and neither does a collapsed sibling still on the stack
    /// when the check runs ahead of the push.
    pub fn is_heading_visible(
        &self,
        heading_id: &str,
        level: u8,
        collapsed: &CollapsedSet,
    ) -> bool {
        !self
            .entries
            .iter()
            .filter(|entry| entry.level < level && entry.heading_id != heading_id)
            .any(|entry| collapsed.contains(&entry.heading_id))
    }

    #[must_use]
    /// Whether non-heading content at the current position is shown.
    pub fn is_content_visible(&self, collapsed: &CollapsedSet) -> bool {
        !self
            .entries
            .iter()
            .any(|entry| collapsed.contains(&entry.heading_id))
    }

    #[must_use]
    /// Level of the innermost open section, or 1 outside any section.
    pub fn current_level(&self) -> u8 {
        self.entries.last().map_or(1, |entry| entry.level)
    }

    #[must_use]
    /// Open sections, shallowest first.
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
