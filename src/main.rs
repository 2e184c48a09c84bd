//! foldmark: a markdown viewer with collapsible, persisted heading sections.
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::Parser;
use foldmark::app_state::{self, AppState, DocumentSession};
use foldmark::formats::markdown::MarkdownFormat;
use foldmark::{config, input, render, storage, ui};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Longest the event loop sleeps when nothing is pending.
const IDLE_POLL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "foldmark")]
#[command(about = "Markdown viewer with collapsible, persisted headings", long_about = None)]
struct Args {
    /// Files or directories to view
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Print the visible outline of each document instead of opening the viewer
    #[arg(long)]
    outline: bool,

    /// Print every heading ID with its level and title
    #[arg(long)]
    ids: bool,

    /// Toggle a heading ID before printing (repeatable; implies --outline)
    #[arg(long, value_name = "ID")]
    toggle: Vec<String>,

    /// Forget persisted collapse state for the given documents
    #[arg(long)]
    reset: bool,

    /// Config file (defaults to ./foldmark.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the collapse-state file
    #[arg(long, value_name = "DIR")]
    state_dir: Option<String>,

    /// Write logs here (the viewer otherwise discards them)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// File extensions to match
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,
}

impl Args {
    fn interactive(&self) -> bool {
        !(self.outline || self.ids || self.reset || !self.toggle.is_empty())
    }
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env("FOLDMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if interactive => {}
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.interactive())?;

    let mut cfg = config::Config::load(args.config.as_deref());

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions.clone_from(&args.ext);
    }
    if let Some(dir) = &args.state_dir {
        cfg.state_dir.clone_from(dir);
    }

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let documents = input::find_documents(paths, &cfg.file_extensions)?;

    if documents.is_empty() {
        eprintln!("No matching files found");
        return Ok(());
    }

    let storage = storage::open_storage(&cfg.state_dir);

    if args.interactive() {
        let state = AppState::new(documents, storage, &cfg);
        return run_tui(state).map_err(Into::into);
    }

    run_batch(&args, &cfg, documents, storage)
}

/// Non-interactive modes: reset, toggle, list IDs, print outlines.
fn run_batch(
    args: &Args,
    cfg: &config::Config,
    documents: Vec<PathBuf>,
    mut storage: Box<dyn storage::Storage>,
) -> anyhow::Result<()> {
    let multiple = documents.len() > 1;

    for path in documents {
        let document = input::load_document(&path, &MarkdownFormat)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let mut session = DocumentSession::open(document, storage, cfg.debounce());

        if args.reset {
            session.reset();
            println!("Reset collapse state for {}", path.display());
        }

        if !args.toggle.is_empty() {
            let ids = session.heading_ids();
            for id in &args.toggle {
                if ids.contains(id) {
                    session.store.toggle_heading(id);
                } else {
                    eprintln!("{}: no heading with ID {id}", path.display());
                }
            }
            session.relayout();
        }

        if multiple && (args.ids || args.outline || !args.toggle.is_empty()) {
            println!("==> {} <==", path.display());
        }

        if args.ids {
            for item in &session.layout {
                if let render::RenderItem::Heading(view) = item {
                    let mark = if view.collapsed { "*" } else { " " };
                    println!("{mark} {} {} {}", view.level, view.id, view.title);
                }
            }
        }

        if args.outline || !args.toggle.is_empty() {
            for line in render::outline_lines(&session.layout, cfg.indent_width) {
                println!("{line}");
            }
        }

        storage = session.into_storage();
    }

    Ok(())
}

fn run_tui(mut app: AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    app.flush();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = app.next_deadline().map_or(IDLE_POLL, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        if !event::poll(timeout)? {
            app.tick(Instant::now());
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.current_view {
            app_state::View::FileList => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => {
                    app.current_file_index = app.current_file_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if app.current_file_index + 1 < app.files.len() {
                        app.current_file_index += 1;
                    }
                }
                KeyCode::Enter => app.open_current_file(),
                _ => {}
            },
            app_state::View::Document => {
                app.message = None;
                match key.code {
                    KeyCode::Char('q') => {
                        if app.file_mode == app_state::FileMode::Multi {
                            app.close_document();
                        } else {
                            return Ok(());
                        }
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let next = if key.modifiers.contains(KeyModifiers::SHIFT) {
                            app.find_next_sibling()
                        } else {
                            app.find_next_toggle()
                        };
                        if let Some(next) = next {
                            app.cursor = next;
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        if let Some(prev) = app.find_prev_toggle() {
                            app.cursor = prev;
                        }
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        if let Some(parent) = app.find_parent_heading() {
                            app.cursor = parent;
                        }
                    }
                    KeyCode::Home | KeyCode::Char('g') => {
                        if let Some(first) = app.find_first_toggle() {
                            app.cursor = first;
                        }
                    }
                    KeyCode::End | KeyCode::Char('G') => {
                        if let Some(last) = app.find_last_toggle() {
                            app.cursor = last;
                        }
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => app.toggle_current(),
                    KeyCode::Char('c') => app.collapse_all(),
                    KeyCode::Char('e') => app.expand_all(),
                    KeyCode::Char('r') => app.reload(),
                    KeyCode::Char(':') => {
                        app.current_view = app_state::View::Command;
                        app.command_buffer.clear();
                    }
                    _ => {}
                }
            }
            app_state::View::Command => match key.code {
                KeyCode::Char(c) => app.command_buffer.push(c),
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    let cmd = std::mem::take(&mut app.command_buffer);
                    app.current_view = app_state::View::Document;
                    if app.execute_command(&cmd) {
                        return Ok(());
                    }
                }
                KeyCode::Esc => {
                    app.current_view = app_state::View::Document;
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }

        app.tick(Instant::now());
    }
}
