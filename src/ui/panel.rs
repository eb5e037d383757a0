use std::path::{Path, PathBuf};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::app::{App, Focus, UiEvent};
use super::theme::Theme;
use crate::browser::entry::Entry;
use crate::browser::navigator::HEADER_ROWS;
use crate::utils::format::{ellipsize, format_permissions, format_size, pad_to_display_width};

const PERM_COL: usize = 10;
const SIZE_COL: usize = 9;
const DATE_COL: usize = 16;

/// Listing state owned by the view rather than the browser.
#[derive(Debug, Default)]
pub struct ListingView {
    copied: Option<PathBuf>,
}

impl ListingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, events: impl IntoIterator<Item = UiEvent>) {
        for event in events {
            match event {
                UiEvent::Copied(path) => self.copied = Some(path),
            }
        }
    }

    pub fn is_copied(&self, path: &Path) -> bool {
        self.copied.as_deref() == Some(path)
    }
}

/// First visible entry index so that `selected` stays on screen.
///
/// Keeps the current offset while the selection is visible, otherwise
/// scrolls just enough to bring it back.
pub fn scroll_for(selected: Option<usize>, offset: usize, visible: usize, total: usize) -> usize {
    if visible == 0 || total <= visible {
        return 0;
    }
    let max_offset = total - visible;
    let offset = offset.min(max_offset);
    match selected {
        Some(index) if index < offset => index,
        Some(index) if index >= offset + visible => index + 1 - visible,
        _ => offset,
    }
}

pub fn draw(frame: &mut Frame, app: &mut App, view: &ListingView, area: Rect, theme: &Theme) {
    let is_active = app.focus == Focus::Listing && app.modal.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(is_active))
        .style(Style::default().bg(theme.panel.bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 || inner.width < 10 {
        return;
    }

    let width = inner.width as usize;
    let show_columns = width > PERM_COL + SIZE_COL + DATE_COL + 16;
    let name_col = if show_columns {
        width - (PERM_COL + SIZE_COL + DATE_COL + 3)
    } else {
        width
    };

    frame.render_widget(
        Paragraph::new(header_line(name_col, show_columns, theme)),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );

    let visible = (inner.height as usize).saturating_sub(HEADER_ROWS);
    let selected_index = app.navigator.row().checked_sub(HEADER_ROWS);
    let total = app.navigator.entries().len();
    let start = scroll_for(selected_index, app.navigator.scroll_offset(), visible, total);
    app.navigator.set_scroll_offset(start);

    for (i, entry) in app.navigator.entries().iter().skip(start).take(visible).enumerate() {
        let is_cursor = Some(start + i) == selected_index;
        let line = entry_line(
            entry,
            is_cursor,
            view.is_copied(&entry.path),
            name_col,
            show_columns,
            theme,
        );
        frame.render_widget(
            Paragraph::new(line),
            Rect::new(inner.x, inner.y + (HEADER_ROWS + i) as u16, inner.width, 1),
        );
    }

    if total > visible {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut state = ScrollbarState::new(total).position(selected_index.unwrap_or(0));
        frame.render_stateful_widget(
            scrollbar,
            Rect::new(inner.x + inner.width - 1, inner.y + 1, 1, visible as u16),
            &mut state,
        );
    }

    if total == 0 {
        frame.render_widget(
            Paragraph::new(Span::styled(" (empty)", theme.dim_style())),
            Rect::new(inner.x, inner.y + 1, inner.width, 1),
        );
    }
}

fn header_line(name_col: usize, show_columns: bool, theme: &Theme) -> Line<'static> {
    let style = theme.header_style();
    let mut spans = vec![Span::styled(pad_to_display_width(" Name", name_col), style)];
    if show_columns {
        spans.push(Span::styled(format!(" {:<w$}", "Perms", w = PERM_COL), style));
        spans.push(Span::styled(format!(" {:>w$}", "Size", w = SIZE_COL), style));
        spans.push(Span::styled(format!(" {:>w$}", "Modified", w = DATE_COL), style));
    }
    Line::from(spans)
}

fn entry_line(
    entry: &Entry,
    is_cursor: bool,
    is_copied: bool,
    name_col: usize,
    show_columns: bool,
    theme: &Theme,
) -> Line<'static> {
    let name = if entry.is_directory {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };
    let name_text = pad_to_display_width(&format!(" {}", ellipsize(&name, name_col.saturating_sub(1))), name_col);

    // The cursor takes the entry's own colour as background
    let entry_color = if is_copied {
        theme.panel.copied_text
    } else if entry.is_directory {
        theme.panel.directory_text
    } else {
        theme.panel.file_text
    };
    let cursor_style = Style::default().fg(theme.panel.selected_text).bg(entry_color);
    let column_style = |color| {
        if is_cursor {
            cursor_style
        } else {
            Style::default().fg(color)
        }
    };
    let name_style = if is_cursor {
        cursor_style
    } else if is_copied {
        theme.copied_style().add_modifier(Modifier::BOLD)
    } else if entry.is_directory {
        theme.directory_style()
    } else {
        theme.normal_style()
    };

    let mut spans = vec![Span::styled(name_text, name_style)];
    if show_columns {
        let perms = entry
            .mode
            .map(|m| format_permissions(m, entry.is_directory))
            .unwrap_or_default();
        let size = if entry.is_directory {
            String::new()
        } else {
            format_size(entry.size)
        };
        let modified = entry
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        spans.push(Span::styled(format!(" {:<w$}", perms, w = PERM_COL), column_style(theme.panel.permission_text)));
        spans.push(Span::styled(format!(" {:>w$}", size, w = SIZE_COL), column_style(theme.panel.size_text)));
        spans.push(Span::styled(format!(" {:>w$}", modified, w = DATE_COL), column_style(theme.panel.date_text)));
    }
    Line::from(spans)
}
