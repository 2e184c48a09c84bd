//! The core state machine bridging parsed documents, collapse state and the terminal view.
//!
//! A TUI needs a single source of truth that can be interrogated and mutated as the user
//! navigates and toggles. The open document keeps its last render pass cached: visibility is
//! recomputed when the structure changes (load, reload, toggle, bulk collapse, reset), not on
//! every frame. The cursor only ever rests on a visible item that has a toggle of its own.

use crate::collapse_state::CollapseStore;
use crate::config::Config;
use crate::formats::markdown::MarkdownFormat;
use crate::heading_id::HeadingIdGenerator;
use crate::input::{self, Document};
use crate::render::{self, Layout, RenderItem};
use crate::storage::{MemoryStorage, Storage};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(PartialEq, Debug)]
/// Determines navigation scope and quit behavior based on project size.
pub enum FileMode {
    /// Single-file mode quits directly to shell.
    Single,
    /// Multi-file mode returns to file list before quitting.
    Multi,
}

#[derive(PartialEq, Debug)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Displays available files for multi-file projects.
    FileList,
    /// Shows the open document with its collapse toggles.
    Document,
    /// Captures vim-style command input after ':' keystroke.
    Command,
}

/// One open document: its blocks, heading IDs, collapse state and cached render pass.
pub struct DocumentSession {
    /// Parsed document.
    pub document: Document,
    ids: HeadingIdGenerator,
    /// Collapse state persisted for this document.
    pub store: CollapseStore,
    /// Result of the latest render pass.
    pub layout: Layout,
}

impl DocumentSession {
    #[must_use]
    /// Open `document`, loading its collapse state from `storage`.
    pub fn open(document: Document, storage: Box<dyn Storage>, debounce: Duration) -> Self {
        let store = CollapseStore::load(&document.key(), storage, debounce);
        let mut session = Self {
            document,
            ids: HeadingIdGenerator::new(),
            store,
            layout: Layout::new(),
        };
        session.relayout();
        session
    }

    /// Recompute visibility for every block.
    pub fn relayout(&mut self) {
        self.layout = render::render_pass(&self.document, &mut self.ids, self.store.state());
    }

    /// Flip the toggle of the item at `index`. Returns the new collapsed flag, or `None` if the
    /// item has no toggle.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let collapsed = match self.layout.get(index)? {
            RenderItem::Heading(view) => {
                let id = view.id.clone();
                self.store.toggle_heading(&id)
            }
            RenderItem::Code(view) => {
                let id = view.id.clone();
                self.store.toggle_code_block(&id)
            }
            RenderItem::Content(_) => return None,
        };
        self.relayout();
        Some(collapsed)
    }

    #[must_use]
    /// IDs of every heading, in document order.
    pub fn heading_ids(&self) -> Vec<String> {
        self.layout
            .iter()
            .filter_map(|item| match item {
                RenderItem::Heading(view) => Some(view.id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Collapse every heading in the document.
    pub fn collapse_all(&mut self) {
        let ids = self.heading_ids();
        self.store.collapse_headings(ids);
        self.relayout();
    }

    /// Expand every heading and code block.
    pub fn expand_all(&mut self) {
        self.store.expand_all();
        self.relayout();
    }

    /// Forget all collapse state for the document, persisted copy included.
    pub fn reset(&mut self) {
        self.store.reset();
        self.relayout();
    }

    /// Swap in a freshly parsed copy of the document, keeping heading IDs from this session.
    pub fn reload(&mut self, document: Document) {
        self.document = document;
        self.relayout();
    }

    /// Flush pending writes and release the storage.
    #[must_use]
    pub fn into_storage(self) -> Box<dyn Storage> {
        self.store.into_storage()
    }
}

/// Bridges documents and the interactive view, maintaining session state.
pub struct AppState {
    /// Document paths available for viewing.
    pub files: Vec<PathBuf>,
    /// Selected file in the file list view.
    pub current_file_index: usize,
    /// Controls navigation behavior and file list visibility.
    pub file_mode: FileMode,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// Document currently open, if any.
    pub session: Option<DocumentSession>,
    /// Storage held while no document is open.
    idle_storage: Option<Box<dyn Storage>>,
    /// Index into the open document's layout.
    pub cursor: usize,
    /// First rendered row shown in the document view.
    pub scroll: usize,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Columns of indentation per heading level.
    pub indent_width: usize,
    /// Coalescing window for collapse-state writes.
    pub debounce: Duration,
}

impl AppState {
    #[must_use]
    /// Initialises application state and determines file mode.
    ///
    /// Single-file sessions open the document straight away and quit directly to shell, while
    /// multi-file sessions show a file selector and return to it on 'q'.
    pub fn new(files: Vec<PathBuf>, storage: Box<dyn Storage>, cfg: &Config) -> Self {
        let file_mode = if files.len() == 1 {
            FileMode::Single
        } else {
            FileMode::Multi
        };

        let mut state = Self {
            files,
            current_file_index: 0,
            file_mode,
            current_view: View::FileList,
            session: None,
            idle_storage: Some(storage),
            cursor: 0,
            scroll: 0,
            command_buffer: String::new(),
            message: None,
            indent_width: cfg.indent_width,
            debounce: cfg.debounce(),
        };

        if state.file_mode == FileMode::Single {
            state.open_current_file();
        }
        state
    }

    fn take_storage(&mut self) -> Box<dyn Storage> {
        if let Some(session) = self.session.take() {
            return session.into_storage();
        }
        self.idle_storage
            .take()
            .unwrap_or_else(|| Box::new(MemoryStorage::new()))
    }

    /// Parse the selected file and show it. On failure the file list stays up with a message.
    pub fn open_current_file(&mut self) {
        let Some(path) = self.files.get(self.current_file_index).cloned() else {
            return;
        };

        match input::load_document(&path, &MarkdownFormat) {
            Ok(document) => {
                let storage = self.take_storage();
                info!(path = %path.display(), blocks = document.blocks.len(), "opened document");
                self.session = Some(DocumentSession::open(document, storage, self.debounce));
                self.cursor = 0;
                self.scroll = 0;
                self.settle_cursor();
                self.current_view = View::Document;
                self.message = None;
            }
            Err(e) => {
                self.message = Some(format!("Cannot open {}: {e}", path.display()));
            }
        }
    }

    /// Close the open document and return to the file list.
    pub fn close_document(&mut self) {
        if let Some(session) = self.session.take() {
            self.idle_storage = Some(session.into_storage());
        }
        self.current_view = View::FileList;
    }

    fn layout(&self) -> &[RenderItem] {
        match &self.session {
            Some(session) => &session.layout,
            None => &[],
        }
    }

    fn is_selectable(&self, index: usize) -> bool {
        self.layout()
            .get(index)
            .is_some_and(|item| item.is_visible() && item.is_toggleable())
    }

    /// Keep the cursor on a visible toggle, preferring the nearest one above.
    pub fn settle_cursor(&mut self) {
        if self.is_selectable(self.cursor) {
            return;
        }
        let above = (0..self.cursor.min(self.layout().len()))
            .rev()
            .find(|&i| self.is_selectable(i));
        let below = (self.cursor..self.layout().len()).find(|&i| self.is_selectable(i));
        self.cursor = above.or(below).unwrap_or(0);
    }

    #[must_use]
    /// Next visible toggle below the cursor.
    pub fn find_next_toggle(&self) -> Option<usize> {
        (self.cursor + 1..self.layout().len()).find(|&i| self.is_selectable(i))
    }

    #[must_use]
    /// Previous visible toggle above the cursor.
    pub fn find_prev_toggle(&self) -> Option<usize> {
        (0..self.cursor).rev().find(|&i| self.is_selectable(i))
    }

    #[must_use]
    /// First visible toggle in the document.
    pub fn find_first_toggle(&self) -> Option<usize> {
        (0..self.layout().len()).find(|&i| self.is_selectable(i))
    }

    #[must_use]
    /// Last visible toggle in the document.
    pub fn find_last_toggle(&self) -> Option<usize> {
        (0..self.layout().len()).rev().find(|&i| self.is_selectable(i))
    }

    #[must_use]
    /// Heading whose section contains the cursor item.
    pub fn find_parent_heading(&self) -> Option<usize> {
        let layout = self.layout();
        let bound = layout.get(self.cursor)?.heading_level().unwrap_or(u8::MAX);
        (0..self.cursor)
            .rev()
            .find(|&i| layout[i].heading_level().is_some_and(|level| level < bound))
    }

    #[must_use]
    /// Next heading at the cursor heading's level within the same parent section.
    pub fn find_next_sibling(&self) -> Option<usize> {
        let layout = self.layout();
        let level = layout.get(self.cursor)?.heading_level()?;
        let (index, _) = layout
            .iter()
            .enumerate()
            .skip(self.cursor + 1)
            .find(|(_, item)| item.heading_level().is_some_and(|l| l <= level))?;
        (layout[index].heading_level() == Some(level) && self.is_selectable(index)).then_some(index)
    }

    /// Toggle the item under the cursor.
    pub fn toggle_current(&mut self) {
        let cursor = self.cursor;
        if let Some(session) = self.session.as_mut() {
            if let Some(collapsed) = session.toggle(cursor) {
                self.message = Some(if collapsed { "Collapsed" } else { "Expanded" }.to_string());
            }
        }
        self.settle_cursor();
    }

    /// Collapse every heading.
    pub fn collapse_all(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.collapse_all();
        }
        self.settle_cursor();
    }

    /// Expand every heading and code block.
    pub fn expand_all(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.expand_all();
        }
        self.settle_cursor();
    }

    /// Drop the document's collapse state, persisted copy included.
    pub fn reset_collapse_state(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
            self.message = Some("Collapse state reset".to_string());
        }
        self.settle_cursor();
    }

    /// Re-read the open document from disk.
    pub fn reload(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match input::load_document(&session.document.path, &MarkdownFormat) {
            Ok(document) => {
                session.reload(document);
                self.message = Some("Reloaded".to_string());
            }
            Err(e) => self.message = Some(format!("Reload failed: {e}")),
        }
        self.settle_cursor();
    }

    /// Persist collapse state whose debounce window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.store.flush_due(now);
        }
    }

    #[must_use]
    /// When the next debounced write falls due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().and_then(|s| s.store.next_deadline())
    }

    /// Persist everything pending, e.g. before exit.
    pub fn flush(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.store.flush();
        }
    }

    /// Run a `:` command. Returns `true` when the application should quit.
    pub fn execute_command(&mut self, command: &str) -> bool {
        match command.trim() {
            "q" | "q!" | "quit" => {
                if self.file_mode == FileMode::Single || self.session.is_none() {
                    return true;
                }
                self.close_document();
            }
            "reset" => self.reset_collapse_state(),
            "collapse-all" | "ca" => self.collapse_all(),
            "expand-all" | "ea" => self.expand_all(),
            "reload" | "e" => self.reload(),
            "w" => {
                self.flush();
                self.message = Some("Saved".to_string());
            }
            other => self.message = Some(format!("Unknown command: {other}")),
        }
        false
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
