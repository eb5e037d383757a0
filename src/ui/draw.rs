use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::{
    app::{App, Focus},
    dialogs,
    panel::{self, ListingView},
    preview,
    theme::Theme,
};
use crate::keybindings::{BrowserAction, Keybindings};

const APP_TITLE: &str = concat!("ffnav v", env!("CARGO_PKG_VERSION"));

pub fn draw(frame: &mut Frame, app: &mut App, view: &ListingView, theme: &Theme) {
    let area = frame.area();

    // Fill entire screen with background color first
    let background = Block::default().style(Style::default().bg(theme.palette.bg));
    frame.render_widget(background, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // path box
            Constraint::Min(3),    // listing + preview
            Constraint::Length(1), // message
            Constraint::Length(1), // key hints
        ])
        .split(area);

    draw_path_box(frame, app, chunks[0], theme);

    if app.settings.enable_preview {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        panel::draw(frame, app, view, columns[0], theme);
        preview::draw(frame, app.preview.as_ref(), columns[1], theme);
    } else {
        panel::draw(frame, app, view, chunks[1], theme);
    }

    draw_status_bar(frame, app, chunks[2], theme);
    draw_function_bar(frame, &app.keybindings, chunks[3], theme);

    // Dialogs sit on top of everything
    if let Some(ref modal) = app.modal {
        dialogs::draw_modal(frame, modal, area, theme);
    }
}

fn draw_path_box(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::PathInput && app.modal.is_none();
    let block = Block::default()
        .title(format!(" {} ", APP_TITLE))
        .title_style(Style::default().fg(theme.palette.fg_dim))
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_style = Style::default()
        .fg(theme.path_box.text)
        .add_modifier(Modifier::BOLD);
    let cursor_style = Style::default()
        .fg(theme.path_box.cursor_fg)
        .bg(theme.path_box.cursor_bg);
    let line = dialogs::input_line(
        &app.path_input,
        inner.width as usize,
        focused,
        text_style,
        cursor_style,
    );
    frame.render_widget(Paragraph::new(line), inner);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let (left_text, left_style) = match app.message {
        Some(ref msg) if msg.is_error => (
            msg.text.clone(),
            Style::default()
                .fg(theme.status_bar.error_text)
                .bg(theme.status_bar.bg)
                .add_modifier(Modifier::BOLD),
        ),
        Some(ref msg) => (
            msg.text.clone(),
            Style::default().fg(theme.state.success).bg(theme.status_bar.bg),
        ),
        None => (
            app.navigator
                .current_selection()
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            theme.status_bar_style(),
        ),
    };

    let right_text = match app.register.source() {
        Some(entry) => format!("copied: {}", entry.name),
        None => format!("{} entries", app.navigator.entries().len()),
    };

    let padding = (area.width as usize).saturating_sub(left_text.width() + right_text.width() + 4);
    let status = Line::from(vec![
        Span::styled(format!(" {} ", left_text), left_style),
        Span::styled(" ".repeat(padding), theme.status_bar_style()),
        Span::styled(format!(" {} ", right_text), theme.status_bar_style()),
    ]);
    frame.render_widget(Paragraph::new(status).style(theme.status_bar_style()), area);
}

/// (key, label) pairs for the hint line, taken from the active bindings.
pub fn hint_items(kb: &Keybindings) -> Vec<(String, &'static str)> {
    let items = [
        (BrowserAction::ParentDir, "up "),
        (BrowserAction::EnterDir, "open "),
        (BrowserAction::Delete, "del "),
        (BrowserAction::Copy, "copy "),
        (BrowserAction::Paste, "paste "),
        (BrowserAction::Mkdir, "mkdir "),
        (BrowserAction::Mkfile, "touch "),
        (BrowserAction::Rename, "ren "),
        (BrowserAction::Edit, "edit "),
        (BrowserAction::FocusPath, "path "),
        (BrowserAction::HistoryBack, "back "),
        (BrowserAction::HistoryForward, "fwd "),
        (BrowserAction::Quit, "quit"),
    ];
    items
        .iter()
        .filter(|(action, _)| !kb.browser_first_key(*action).is_empty())
        .map(|(action, label)| (kb.browser_first_key(*action).to_string(), *label))
        .collect()
}

fn draw_function_bar(frame: &mut Frame, kb: &Keybindings, area: Rect, theme: &Theme) {
    let key_style = Style::default().fg(theme.status_bar.key);
    let label_style = Style::default().fg(theme.status_bar.label);

    let mut spans = Vec::new();
    for (key, label) in hint_items(kb) {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(":", label_style));
        spans.push(Span::styled(label, label_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
