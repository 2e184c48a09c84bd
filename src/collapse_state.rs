//! Per-document collapse state with debounced persistence.
//!
//! Membership in a collapsed set is the only collapse signal: an ID that is absent is expanded.
//! State is loaded once per document key and written back through a [`Storage`] no sooner than
//! the debounce window after the latest change, so rapid toggling costs one write.
//!
//! Persisted records look like:
//!
//! ```text
//! markdown-collapse-state-{path} = {"collapsedHeadings": [...], "collapsedCodeBlocks": [...]}
//! ```
//!
//! An older layout, `{"expandedHeadings": [...]}`, cannot be inverted without knowing every
//! heading in the document, so it is discarded and the document opens fully expanded.

use crate::storage::{MemoryStorage, Storage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Set of collapsed heading or code block IDs.
pub type CollapsedSet = BTreeSet<String>;

/// Prefix of every storage key written by the store.
pub const KEY_PREFIX: &str = "markdown-collapse-state-";

/// Default coalescing window for writes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[must_use]
/// Storage key for the document at `file_path`.
pub fn storage_key(file_path: &str) -> String {
    format!("{KEY_PREFIX}{file_path}")
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Collapsed headings and code blocks of one document.
pub struct CollapseState {
    /// Collapsed heading IDs.
    pub collapsed_headings: CollapsedSet,
    /// Collapsed code block IDs.
    #[serde(default)]
    pub collapsed_code_blocks: CollapsedSet,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Current(CollapseState),
    Legacy(LegacyRecord),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    #[allow(dead_code)]
    expanded_headings: Vec<String>,
}

#[must_use]
/// Decode a persisted record, treating anything unusable as fully expanded.
pub fn decode_record(raw: &str) -> CollapseState {
    match serde_json::from_str::<StoredRecord>(raw) {
        Ok(StoredRecord::Current(state)) => state,
        Ok(StoredRecord::Legacy(_)) => {
            debug!("discarding legacy expandedHeadings record");
            CollapseState::default()
        }
        Err(e) => {
            warn!("Ignoring unreadable collapse state: {e}");
            CollapseState::default()
        }
    }
}

/// Collapse state for one document, bound to the storage it persists to.
pub struct CollapseStore {
    key: String,
    state: CollapseState,
    storage: Box<dyn Storage>,
    debounce: Duration,
    /// Deadline of the single pending write, if any.
    pending: Option<Instant>,
}

impl CollapseStore {
    /// Load the state stored for `file_path`, or start fully expanded.
    pub fn load(file_path: &str, storage: Box<dyn Storage>, debounce: Duration) -> Self {
        let key = storage_key(file_path);
        let state = match storage.get(&key) {
            Ok(Some(raw)) => decode_record(&raw),
            Ok(None) => CollapseState::default(),
            Err(e) => {
                warn!("Failed to read collapse state for {file_path}: {e}");
                CollapseState::default()
            }
        };
        debug!(
            key = %key,
            headings = state.collapsed_headings.len(),
            code_blocks = state.collapsed_code_blocks.len(),
            "loaded collapse state"
        );

        Self {
            key,
            state,
            storage,
            debounce,
            pending: None,
        }
    }

    #[must_use]
    /// A store that never persists beyond this process.
    pub fn in_memory(file_path: &str) -> Self {
        Self::load(file_path, Box::new(MemoryStorage::new()), DEFAULT_DEBOUNCE)
    }

    #[must_use]
    /// Storage key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    /// Current in-memory state.
    pub fn state(&self) -> &CollapseState {
        &self.state
    }

    #[must_use]
    /// Collapsed heading IDs.
    pub fn collapsed_headings(&self) -> &CollapsedSet {
        &self.state.collapsed_headings
    }

    #[must_use]
    /// Collapsed code block IDs.
    pub fn collapsed_code_blocks(&self) -> &CollapsedSet {
        &self.state.collapsed_code_blocks
    }

    #[must_use]
    /// Whether the heading's descendants are hidden.
    pub fn is_heading_collapsed(&self, id: &str) -> bool {
        self.state.collapsed_headings.contains(id)
    }

    #[must_use]
    /// Whether the code block shows only its preview line.
    pub fn is_code_block_collapsed(&self, id: &str) -> bool {
        self.state.collapsed_code_blocks.contains(id)
    }

    /// Flip a heading between collapsed and expanded. Returns the new collapsed flag.
    pub fn toggle_heading(&mut self, id: &str) -> bool {
        let collapsed = flip(&mut self.state.collapsed_headings, id);
        self.schedule_write(Instant::now());
        collapsed
    }

    /// Flip a code block between collapsed and expanded. Returns the new collapsed flag.
    pub fn toggle_code_block(&mut self, id: &str) -> bool {
        let collapsed = flip(&mut self.state.collapsed_code_blocks, id);
        self.schedule_write(Instant::now());
        collapsed
    }

    /// Mark every heading in `ids` collapsed.
    pub fn collapse_headings<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .collapsed_headings
            .extend(ids.into_iter().map(Into::into));
        self.schedule_write(Instant::now());
    }

    /// Expand every heading and code block.
    pub fn expand_all(&mut self) {
        self.state = CollapseState::default();
        self.schedule_write(Instant::now());
    }

    /// Clear both sets and delete the persisted record.
    pub fn reset(&mut self) {
        self.state = CollapseState::default();
        self.pending = None;
        if let Err(e) = self.storage.remove(&self.key) {
            warn!("Failed to remove collapse state {}: {e}", self.key);
        }
    }

    /// Replace any pending write with one due a debounce window after `now`.
    pub fn schedule_write(&mut self, now: Instant) {
        self.pending = Some(now + self.debounce);
    }

    #[must_use]
    /// When the pending write falls due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Write the state if the pending deadline has passed. Returns whether a write was attempted.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.flush();
                true
            }
            _ => false,
        }
    }

    /// Write any pending change now.
    pub fn flush(&mut self) {
        if self.pending.take().is_none() {
            return;
        }
        let written = serde_json::to_string(&self.state)
            .map_err(crate::Error::from)
            .and_then(|json| self.storage.set(&self.key, &json));
        match written {
            Ok(()) => debug!(key = %self.key, "persisted collapse state"),
            Err(e) => warn!("Failed to persist collapse state {}: {e}", self.key),
        }
    }

    #[must_use]
    /// Backing storage.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    #[must_use]
    /// Flush and hand back the storage, e.g. to reopen the document later.
    pub fn into_storage(mut self) -> Box<dyn Storage> {
        self.flush();
        std::mem::replace(&mut self.storage, Box::new(MemoryStorage::new()))
    }
}

impl Drop for CollapseStore {
    fn drop(&mut self) {
        self.flush();
    }
}

fn flip(set: &mut CollapsedSet, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}

#[cfg(test)]
#[path = "tests/collapse_state.rs"]
mod tests;
