//! Stable, unique identifiers for heading occurrences.
//!
//! Collapse state is stored by heading ID, so an ID has to survive re-rendering the same
//! document and must still tell two headings with identical text apart. The generator lives for
//! one document session: per-pass counters are reset by [`HeadingIdGenerator::begin_pass`], while
//! the memo maps persist so an occurrence resolves to the ID it was given on the first pass.

use std::collections::{HashMap, HashSet};

/// Longest slug kept after normalisation.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when heading text normalises to nothing.
pub const UNTITLED: &str = "untitled";

#[must_use]
/// Normalise heading text to an ID-safe slug.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a single hyphen, trims
/// hyphens from both ends and truncates to [`MAX_SLUG_LEN`] characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        return UNTITLED.to_string();
    }

    slug.chars().take(MAX_SLUG_LEN).collect()
}

#[derive(Default, Debug)]
/// Assigns heading IDs for one document session.
pub struct HeadingIdGenerator {
    /// Headings seen per level in the current pass.
    level_counters: HashMap<u8, usize>,
    /// Occurrences of each `(level, slug)` in the current pass.
    occurrences: HashMap<(u8, String), usize>,
    /// Bare ID fixed by the first occurrence of each `(level, slug)`.
    bare_ids: HashMap<(u8, String), String>,
    /// Final ID per `(level, slug, occurrence)`.
    assigned: HashMap<(u8, String, usize), String>,
    /// Every ID handed out this session.
    issued: HashSet<String>,
}

impl HeadingIdGenerator {
    #[must_use]
    /// Create a generator with no session history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render pass over the document.
    ///
    /// Occurrence and level counters restart; IDs already assigned stay memoized.
    pub fn begin_pass(&mut self) {
        self.level_counters.clear();
        self.occurrences.clear();
    }

    /// Resolve the ID for the next heading in document order.
    pub fn assign(&mut self, level: u8, text: &str) -> String {
        let slug = slugify(text);

        let level_counter = self.level_counters.entry(level).or_insert(0);
        let level_ordinal = *level_counter;
        *level_counter += 1;

        let composite = (level, slug.clone());
        let occurrence_counter = self.occurrences.entry(composite.clone()).or_insert(0);
        let occurrence = *occurrence_counter;
        *occurrence_counter += 1;

        let unique_key = (level, slug.clone(), occurrence);
        if let Some(id) = self.assigned.get(&unique_key) {
            return id.clone();
        }

        let bare = self
            .bare_ids
            .entry(composite)
            .or_insert_with(|| format!("heading-{level}-{slug}-{level_ordinal}"))
            .clone();

        let candidate = if occurrence == 0 {
            bare
        } else {
            format!("{bare}-{occurrence}")
        };
        let id = self.claim(candidate);

        self.assigned.insert(unique_key, id.clone());
        id
    }

    /// Reserve `candidate`, suffixing it further if another occurrence already owns it.
    fn claim(&mut self, candidate: String) -> String {
        if self.issued.insert(candidate.clone()) {
            return candidate;
        }
        let mut n = 1;
        loop {
            let next = format!("{candidate}-{n}");
            if self.issued.insert(next.clone()) {
                return next;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
#[path = "tests/heading_id.rs"]
mod tests;
