use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use rfp_shared::{NodeKind, ParsingStatus};

use crate::app::{App, Mode};
use crate::bulk::MoveOption;
use crate::tree::Row;

const DATE_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 8;
const SIZE_WIDTH: usize = 10;

/// Returns (label, color) for a file's parsing status badge
fn status_badge(status: Option<ParsingStatus>) -> (&'static str, Color) {
    match status {
        Some(s @ ParsingStatus::Completed) => (s.label(), Color::Green),
        Some(s @ ParsingStatus::Failed) => (s.label(), Color::Red),
        Some(s) => (s.label(), Color::Yellow),
        None => ("-", Color::DarkGray),
    }
}

/// Name colour keyed on the file extension
fn file_color(name: &str) -> Color {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xls" => Color::Green,
        "pptx" | "ppt" => Color::LightRed,
        "docx" | "doc" | "hwp" => Color::LightBlue,
        "pdf" => Color::Red,
        _ => Color::Gray,
    }
}

/// Render an upload timestamp as YYYY-MM-DD, falling back to the raw text.
fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Tree
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_tree(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    match &app.mode {
        Mode::NewFolder { parent } => {
            let title = if parent.is_some() {
                " New Folder (inside) "
            } else {
                " New Folder "
            };
            draw_input_popup(f, title, " Name ", &app.input);
        }
        Mode::Upload => draw_input_popup(f, " Upload Documents ", " File paths (separate with ;) ", &app.input),
        Mode::ConfirmDelete(pending) => draw_delete_confirm_popup(f, &pending.prompt()),
        Mode::Move { options, cursor } => draw_move_popup(f, options, *cursor),
        Mode::Browse | Mode::Filter => {}
    }

    // Draw error overlay if present
    if let Some(ref error) = app.error_message {
        draw_error_popup(f, error);
    }

    // Draw loading overlay if loading
    if app.loading {
        draw_loading_overlay(f, &app.loading_message);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "RFP KNOWLEDGE OS",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled("Source Documents", Style::default().fg(Color::Yellow)),
    ];

    if !app.filter.is_empty() || app.mode == Mode::Filter {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("/{}", app.filter),
            Style::default().fg(Color::Magenta),
        ));
    }

    let selected = app.store.state().selection_len();
    if selected > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{} selected", selected),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_tree(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Documents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if !app.store.load_attempted() || app.store.tree().is_empty() {
        let message = if !app.store.load_attempted() {
            "Loading..."
        } else if app.store.is_loaded() {
            "No documents registered."
        } else {
            "No documents registered. Press r to retry."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Keep the cursor row inside the visible window
    let visible_height = area.height.saturating_sub(2) as usize;
    let offset = (app.cursor + 1).saturating_sub(visible_height);
    let name_width = (area.width as usize)
        .saturating_sub(2 + 4 + DATE_WIDTH + STATUS_WIDTH + SIZE_WIDTH + 3);

    let items: Vec<ListItem> = app
        .store
        .rows(&app.filter)
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(i, row)| {
            let selected = app.store.state().is_selected(&row.node.id);
            let expanded = app.store.state().is_expanded(&row.node.id);
            ListItem::new(tree_line(&row, selected, expanded, i == app.cursor, name_width))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn tree_line<'a>(row: &Row<'a>, selected: bool, expanded: bool, is_cursor: bool, name_width: usize) -> Line<'a> {
    let bg_style = if is_cursor {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let node = row.node;
    let checkbox = if selected { "[x] " } else { "[ ] " };
    let indent = "  ".repeat(row.depth);

    let (marker, name_style) = match row.kind {
        NodeKind::Folder => (
            if expanded { "▾ " } else { "▸ " },
            bg_style.fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        NodeKind::File => ("  ", bg_style.fg(file_color(&node.name))),
    };

    let label: String = format!("{}{}{}", indent, marker, node.name)
        .chars()
        .take(name_width)
        .collect();
    let pad = name_width.saturating_sub(label.chars().count());

    let mut spans = vec![
        Span::styled(checkbox, bg_style.fg(Color::Green)),
        Span::styled(label, name_style),
        Span::styled(" ".repeat(pad + 1), bg_style),
    ];

    match row.kind {
        NodeKind::Folder => {
            spans.push(Span::styled(
                format!(
                    "{:<dw$} {:<sw$} {:>zw$}",
                    "-",
                    "-",
                    "-",
                    dw = DATE_WIDTH,
                    sw = STATUS_WIDTH,
                    zw = SIZE_WIDTH
                ),
                bg_style.fg(Color::DarkGray),
            ));
        }
        NodeKind::File => {
            let date = node
                .uploaded_at
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string());
            let (badge, badge_color) = status_badge(node.parsing_status);
            spans.push(Span::styled(
                format!("{:<dw$} ", date, dw = DATE_WIDTH),
                bg_style.fg(Color::Gray),
            ));
            spans.push(Span::styled(
                format!("{:<sw$} ", badge, sw = STATUS_WIDTH),
                bg_style.fg(badge_color),
            ));
            spans.push(Span::styled(
                format!("{:>zw$}", node.file_size.as_deref().unwrap_or("-"), zw = SIZE_WIDTH),
                bg_style.fg(Color::Gray),
            ));
        }
    }

    Line::from(spans)
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (mode, mode_color) = match app.mode {
        Mode::Browse => ("BROWSE", Color::Blue),
        Mode::Filter => ("FILTER", Color::Magenta),
        Mode::NewFolder { .. } | Mode::Upload => ("INPUT", Color::Green),
        Mode::ConfirmDelete(_) => ("DELETE", Color::Red),
        Mode::Move { .. } => ("MOVE", Color::Magenta),
    };

    let hints = match app.mode {
        Mode::Browse => {
            "Enter: open | Space: select | a: all | /: filter | d: delete | m: move | R: re-parse | n/N: folder | u: upload | r: refresh | q: quit"
        }
        Mode::Filter => "Type to filter | Enter: keep | Esc: clear",
        Mode::NewFolder { .. } | Mode::Upload => "Enter: submit | Esc: cancel",
        Mode::ConfirmDelete(_) => "y: confirm | n/Esc: cancel",
        Mode::Move { .. } => "j/k: choose folder | Enter: move | Esc: cancel",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().bg(mode_color).fg(Color::White),
        ),
        Span::raw(" "),
    ];
    match &app.status_message {
        Some(message) => spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Green))),
        None => spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input_popup(f: &mut Frame, title: &str, field: &str, value: &str) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let input_block = Block::default()
        .title(field)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(value).block(input_block), chunks[0]);

    let hint = Paragraph::new("Enter: submit | Esc: cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);

    f.set_cursor_position((
        chunks[0].x + 1 + value.chars().count() as u16,
        chunks[0].y + 1,
    ));
}

fn draw_delete_confirm_popup(f: &mut Frame, prompt: &str) {
    let area = centered_rect(50, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Message
            Constraint::Length(2), // Hint
            Constraint::Min(0),    // Spacer
        ])
        .split(inner);

    let message = Paragraph::new(prompt)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[0]);

    let hint = Paragraph::new("y: yes, delete | n: no, cancel")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_move_popup(f: &mut Frame, options: &[MoveOption], cursor: usize) {
    let area = centered_rect(50, 50, f.area());

    f.render_widget(Clear, area);

    let visible_height = area.height.saturating_sub(2) as usize;
    let offset = (cursor + 1).saturating_sub(visible_height);

    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(i, option)| {
            let style = if i == cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            let indent = "  ".repeat(option.depth);
            ListItem::new(Line::from(Span::styled(
                format!("{}{}", indent, option.label),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Move To ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    f.render_widget(list, area);
}

fn draw_loading_overlay(f: &mut Frame, message: &str) {
    let area = centered_rect(40, 10, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Loading ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(block);

    f.render_widget(text, area);
}

fn draw_error_popup(f: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
