use super::{AppState, DocumentSession, FileMode, View};
use crate::config::Config;
use crate::formats::markdown::MarkdownFormat;
use crate::input::parse_document;
use crate::render::RenderItem;
use crate::storage::{MemoryStorage, Storage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const GUIDE: &str = "# Guide

Intro.

## Install

Run it.

### From source

```sh
cargo build
```

## Usage

Use it.
";

fn write_doc(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn app_for(paths: Vec<PathBuf>) -> AppState {
    AppState::new(paths, Box::new(MemoryStorage::new()), &Config::default())
}

fn current_title(app: &AppState) -> Option<String> {
    match &app.session.as_ref()?.layout[app.cursor] {
        RenderItem::Heading(view) => Some(view.title.clone()),
        RenderItem::Code(view) => Some(view.id.clone()),
        RenderItem::Content(_) => None,
    }
}

#[test]
fn test_single_file_opens_directly() {
    let dir = TempDir::new().unwrap();
    let app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    assert_eq!(app.file_mode, FileMode::Single);
    assert_eq!(app.current_view, View::Document);
    assert_eq!(current_title(&app).as_deref(), Some("Guide"));
}

#[test]
fn test_navigation_skips_content() {
    let dir = TempDir::new().unwrap();
    let mut app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    let mut titles = vec![current_title(&app).unwrap()];
    while let Some(next) = app.find_next_toggle() {
        app.cursor = next;
        titles.push(current_title(&app).unwrap());
    }

    assert_eq!(
        titles,
        vec!["Guide", "Install", "From source", "code-block-0", "Usage"]
    );
}

#[test]
fn test_toggle_hides_descendants_and_keeps_cursor() {
    let dir = TempDir::new().unwrap();
    let mut app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    app.cursor = app.find_next_toggle().unwrap();
    assert_eq!(current_title(&app).as_deref(), Some("Install"));
    app.toggle_current();

    assert_eq!(current_title(&app).as_deref(), Some("Install"));
    assert_eq!(app.message.as_deref(), Some("Collapsed"));

    app.cursor = app.find_next_toggle().unwrap();
    assert_eq!(current_title(&app).as_deref(), Some("Usage"));
}

#[test]
fn test_collapse_all_moves_cursor_to_visible_ancestor() {
    let dir = TempDir::new().unwrap();
    let mut app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    app.cursor = app.find_last_toggle().unwrap();
    app.cursor = app.find_prev_toggle().unwrap();
    assert_eq!(current_title(&app).as_deref(), Some("code-block-0"));

    app.collapse_all();
    assert_eq!(current_title(&app).as_deref(), Some("Guide"));
    assert_eq!(app.find_next_toggle(), None);

    app.expand_all();
    app.cursor = app.find_last_toggle().unwrap();
    assert_eq!(current_title(&app).as_deref(), Some("Usage"));
}

#[test]
fn test_parent_and_sibling_navigation() {
    let dir = TempDir::new().unwrap();
    let mut app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    // Guide -> Install -> From source
    app.cursor = app.find_next_toggle().unwrap();
    let install = app.cursor;
    app.cursor = app.find_next_toggle().unwrap();
    assert_eq!(current_title(&app).as_deref(), Some("From source"));

    assert_eq!(app.find_parent_heading(), Some(install));

    app.cursor = install;
    let usage = app.find_next_sibling().unwrap();
    app.cursor = usage;
    assert_eq!(current_title(&app).as_deref(), Some("Usage"));
    assert_eq!(app.find_next_sibling(), None);
}

#[test]
fn test_state_survives_reopening() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);
    let mut app = app_for(vec![path.clone(), write_doc(&dir, "other.md", "# Other\n")]);
    assert_eq!(app.file_mode, FileMode::Multi);
    assert_eq!(app.current_view, View::FileList);

    app.open_current_file();
    app.cursor = app.find_next_toggle().unwrap();
    app.toggle_current();
    assert!(!app.execute_command("q"));
    assert_eq!(app.current_view, View::FileList);

    app.current_file_index = 1;
    app.open_current_file();
    assert_eq!(current_title(&app).as_deref(), Some("Other"));
    app.close_document();

    app.current_file_index = 0;
    app.open_current_file();
    let session = app.session.as_ref().unwrap();
    assert!(session.store.is_heading_collapsed("heading-2-install-0"));
}

#[test]
fn test_reset_command_clears_persisted_state() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);
    let mut app = app_for(vec![path]);

    app.collapse_all();
    app.flush();
    assert!(!app.execute_command("reset"));

    let session = app.session.take().unwrap();
    let key = crate::collapse_state::storage_key(&session.document.key());
    let storage = session.into_storage();
    assert_eq!(storage.get(&key).unwrap(), None);
}

#[test]
fn test_unknown_command_and_quit() {
    let dir = TempDir::new().unwrap();
    let mut app = app_for(vec![write_doc(&dir, "guide.md", GUIDE)]);

    assert!(!app.execute_command("frobnicate"));
    assert_eq!(app.message.as_deref(), Some("Unknown command: frobnicate"));
    assert!(app.execute_command("q"));
}

#[test]
fn test_reload_keeps_ids_for_unchanged_headings() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);
    let mut app = app_for(vec![path.clone()]);

    let before = app.session.as_ref().unwrap().heading_ids();
    fs::write(&path, format!("{GUIDE}\n## Appendix\n")).unwrap();
    app.reload();

    let after = app.session.as_ref().unwrap().heading_ids();
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(app.message.as_deref(), Some("Reloaded"));
}

#[test]
fn test_session_heading_ids_and_toggle() {
    let document = parse_document(Path::new("mem.md"), GUIDE, &MarkdownFormat).unwrap();
    let mut session = DocumentSession::open(
        document,
        Box::new(MemoryStorage::new()),
        Duration::from_millis(100),
    );

    assert_eq!(
        session.heading_ids(),
        vec![
            "heading-1-guide-0",
            "heading-2-install-0",
            "heading-3-from-source-0",
            "heading-2-usage-1",
        ]
    );

    // Index 1 is the "Intro." paragraph
    assert_eq!(session.toggle(1), None);
    assert_eq!(session.toggle(0), Some(true));
    assert_eq!(
        session.layout.iter().filter(|item| item.is_visible()).count(),
        1
    );
}
