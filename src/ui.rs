//! The UI renders the application state into something visible and toggleable.
//!
//! The draw function dispatches based on the current view (file list or document). The document
//! view draws the cached render pass: hidden items take no rows, headings carry their toggle icon
//! and level style, and content is indented to line up with the text of its heading.

use crate::app_state::{AppState, FileMode, View};
use crate::render::{
    code_preview, content_indent, heading_indent, level_style, RenderItem, COLLAPSED_ICON,
    EXPANDED_ICON,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    match app.current_view {
        View::FileList => draw_file_list(f, app, chunks[0]),
        View::Document | View::Command => draw_document(f, app, chunks[0]),
    }

    draw_status(f, app, chunks[1]);
}

fn draw_file_list(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let style = if i == app.current_file_index {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Blue)
            };
            ListItem::new(format!("📄 {}", path.display())).style(style)
        })
        .collect();

    let title = format!("Files ({})", app.files.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

/// Rows for every visible item, plus the first row of the item under the cursor.
fn document_lines(app: &AppState) -> (Vec<Line<'static>>, usize) {
    let Some(session) = app.session.as_ref() else {
        return (Vec::new(), 0);
    };

    let width = app.indent_width;
    let mut lines = Vec::new();
    let mut cursor_row = 0;

    for (i, item) in session.layout.iter().enumerate() {
        if !item.is_visible() {
            continue;
        }
        let selected = i == app.cursor;
        if selected {
            cursor_row = lines.len();
        }
        let highlight = |style: Style| {
            if selected {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            }
        };

        match item {
            RenderItem::Heading(view) => {
                let icon = if view.collapsed {
                    COLLAPSED_ICON
                } else {
                    EXPANDED_ICON
                };
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(heading_indent(view.level, width))),
                    Span::styled(
                        format!("{icon} {}", view.title),
                        highlight(level_style(view.level)),
                    ),
                ]));
            }
            RenderItem::Code(view) => {
                let pad = " ".repeat(content_indent(view.indent_level, width));
                let fence_style = Style::default().fg(Color::DarkGray);
                if view.collapsed {
                    lines.push(Line::from(vec![
                        Span::raw(pad),
                        Span::styled(
                            format!("{COLLAPSED_ICON} {}", code_preview(view)),
                            highlight(fence_style),
                        ),
                    ]));
                } else {
                    let language = view.language.clone().unwrap_or_default();
                    lines.push(Line::from(vec![
                        Span::raw(pad.clone()),
                        Span::styled(
                            format!("{EXPANDED_ICON} ```{language}"),
                            highlight(fence_style),
                        ),
                    ]));
                    for code_line in view.code.lines() {
                        lines.push(Line::from(vec![
                            Span::raw(format!("{pad}  ")),
                            Span::styled(code_line.to_string(), Style::default().fg(Color::Gray)),
                        ]));
                    }
                    lines.push(Line::from(vec![
                        Span::raw(format!("{pad}  ")),
                        Span::styled("```", fence_style),
                    ]));
                }
            }
            RenderItem::Content(view) => {
                let pad = " ".repeat(content_indent(view.indent_level, width));
                for text_line in view.text.lines() {
                    lines.push(Line::from(format!("{pad}{text_line}")));
                }
            }
        }
    }

    (lines, cursor_row)
}

fn draw_document(f: &mut Frame, app: &mut AppState, area: ratatui::layout::Rect) {
    let (lines, cursor_row) = document_lines(app);

    let height = usize::from(area.height.saturating_sub(2)).max(1);
    if cursor_row < app.scroll {
        app.scroll = cursor_row;
    } else if cursor_row >= app.scroll + height {
        app.scroll = cursor_row + 1 - height;
    }

    let title = app.session.as_ref().map_or_else(String::new, |session| {
        let collapsed = session.store.collapsed_headings().len();
        format!("{} ({collapsed} collapsed)", session.document.path.display())
    });

    let visible: Vec<Line> = lines.into_iter().skip(app.scroll).take(height).collect();
    let paragraph =
        Paragraph::new(visible).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let text = match (&app.current_view, &app.message) {
        (View::Command, _) => format!(":{}", app.command_buffer),
        (_, Some(message)) => message.clone(),
        (View::FileList, None) => "↑/↓: Select | Enter: Open | q: Quit".to_string(),
        (View::Document, None) => {
            let back = if app.file_mode == FileMode::Multi {
                "q: Files"
            } else {
                "q: Quit"
            };
            format!(
                "↑/↓: Move | Space/Enter: Toggle | ←: Parent | Shift+↓: Sibling | c/e: Collapse/Expand all | r: Reload | :reset | {back}"
            )
        }
    };

    let title = if app.current_view == View::Command {
        "Command"
    } else {
        ""
    };
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(widget, area);
}
