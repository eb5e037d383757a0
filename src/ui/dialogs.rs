use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::browser::entry::Entry;
use super::theme::Theme;

/// What runs once a dialog resolves positively.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Delete(Entry),
    Paste(Entry),
    Mkdir,
    Mkfile,
    Rename,
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub prompt: String,
    pub action_label: String,
    /// 0: the action button, 1: cancel
    pub selected_button: usize,
    pub action: PendingAction,
}

impl ConfirmDialog {
    pub fn new(prompt: impl Into<String>, action_label: impl Into<String>, action: PendingAction) -> Self {
        Self {
            prompt: prompt.into(),
            action_label: action_label.into(),
            selected_button: 0,
            action,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    /// Cursor position in chars
    pub cursor_pos: usize,
}

impl FormField {
    pub fn new(label: impl Into<String>, default: impl Into<String>) -> Self {
        let value = default.into();
        let cursor_pos = value.chars().count();
        Self {
            label: label.into(),
            value,
            cursor_pos,
        }
    }

    /// Replace the text and put the cursor at its end
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor_pos = self.value.chars().count();
    }

    /// Apply a line-editing key. Returns false for keys that do not edit.
    pub fn edit(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Left => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_pos = (self.cursor_pos + 1).min(self.value.chars().count());
            }
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.value.chars().count(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => self.set_value(""),
            KeyCode::Char(ch) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert(ch)
            }
            _ => return false,
        }
        true
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor_pos);
        self.value.insert(at, ch);
        self.cursor_pos += 1;
    }

    fn backspace(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        self.cursor_pos -= 1;
        let at = self.byte_index(self.cursor_pos);
        self.value.remove(at);
    }

    fn delete(&mut self) {
        if self.cursor_pos < self.value.chars().count() {
            let at = self.byte_index(self.cursor_pos);
            self.value.remove(at);
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormDialog {
    pub title: String,
    pub submit_label: String,
    pub fields: Vec<FormField>,
    pub focused: usize,
    pub action: PendingAction,
}

impl FormDialog {
    pub fn new(
        title: impl Into<String>,
        submit_label: impl Into<String>,
        fields: Vec<FormField>,
        action: PendingAction,
    ) -> Self {
        Self {
            title: title.into(),
            submit_label: submit_label.into(),
            fields,
            focused: 0,
            action,
        }
    }

    /// Single-field form, the shape every browser command uses.
    pub fn single(
        title: impl Into<String>,
        submit_label: impl Into<String>,
        label: impl Into<String>,
        default: impl Into<String>,
        action: PendingAction,
    ) -> Self {
        Self::new(title, submit_label, vec![FormField::new(label, default)], action)
    }

    fn values(&self) -> FormValues {
        FormValues(
            self.fields
                .iter()
                .map(|f| (f.label.clone(), f.value.clone()))
                .collect(),
        )
    }

    fn focused_field(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focused)
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }
}

/// Submitted form values, label → text, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues(Vec<(String, String)>);

impl FormValues {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// The dialog that currently owns keyboard input.
#[derive(Debug, Clone)]
pub enum Modal {
    Confirm(ConfirmDialog),
    Form(FormDialog),
}

/// Result of feeding one key to a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalInput {
    Pending,
    Confirmed,
    Submitted(FormValues),
    Cancelled,
}

impl Modal {
    pub fn into_action(self) -> PendingAction {
        match self {
            Modal::Confirm(d) => d.action,
            Modal::Form(d) => d.action,
        }
    }

    pub fn handle_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> ModalInput {
        // Escape always cancels, whatever the dialog
        if code == KeyCode::Esc {
            return ModalInput::Cancelled;
        }
        match self {
            Modal::Confirm(dialog) => handle_confirm_input(dialog, code),
            Modal::Form(dialog) => handle_form_input(dialog, code, modifiers),
        }
    }
}

fn handle_confirm_input(dialog: &mut ConfirmDialog, code: KeyCode) -> ModalInput {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => ModalInput::Confirmed,
        KeyCode::Char('n') | KeyCode::Char('N') => ModalInput::Cancelled,
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            dialog.selected_button = 1 - dialog.selected_button;
            ModalInput::Pending
        }
        KeyCode::Enter => {
            if dialog.selected_button == 0 {
                ModalInput::Confirmed
            } else {
                ModalInput::Cancelled
            }
        }
        _ => ModalInput::Pending,
    }
}

fn handle_form_input(dialog: &mut FormDialog, code: KeyCode, modifiers: KeyModifiers) -> ModalInput {
    match code {
        KeyCode::Enter => {
            if dialog.focused + 1 >= dialog.fields.len() {
                return ModalInput::Submitted(dialog.values());
            }
            dialog.focus_next();
        }
        KeyCode::Tab | KeyCode::Down => dialog.focus_next(),
        KeyCode::BackTab | KeyCode::Up => dialog.focus_prev(),
        _ => {
            if let Some(field) = dialog.focused_field() {
                field.edit(code, modifiers);
            }
        }
    }
    ModalInput::Pending
}

// ─── Drawing ───────────────────────────────────────────────────────────

/// Center a `width` x `height` box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn draw_modal(frame: &mut Frame, modal: &Modal, area: Rect, theme: &Theme) {
    match modal {
        Modal::Confirm(dialog) => draw_confirm_dialog(frame, dialog, area, theme),
        Modal::Form(dialog) => draw_form_dialog(frame, dialog, area, theme),
    }
}

fn button<'a>(label: &str, selected: bool, theme: &Theme) -> Span<'a> {
    let style = if selected {
        Style::default()
            .fg(theme.dialog.button_selected_text)
            .bg(theme.dialog.button_selected_bg)
    } else {
        Style::default().fg(theme.dialog.button_text)
    };
    Span::styled(format!(" {} ", label), style)
}

fn draw_confirm_dialog(frame: &mut Frame, dialog: &ConfirmDialog, area: Rect, theme: &Theme) {
    let width = (dialog.prompt.chars().count() as u16 + 8).max(30);
    let rect = centered(area, width, 6);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(Style::default().fg(theme.dialog.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog.border))
        .style(Style::default().bg(theme.dialog.bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    if inner.height < 3 {
        return;
    }

    frame.render_widget(
        Paragraph::new(dialog.prompt.clone())
            .style(Style::default().fg(theme.dialog.text))
            .alignment(Alignment::Center),
        Rect::new(inner.x, inner.y, inner.width, 1),
    );

    let buttons = Line::from(vec![
        button(&dialog.action_label, dialog.selected_button == 0, theme),
        Span::raw("    "),
        button("cancel", dialog.selected_button == 1, theme),
    ]);
    frame.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
    );
}

/// Render a field so the cursor stays visible in `max_width` columns.
pub fn input_line<'a>(
    field: &FormField,
    max_width: usize,
    focused: bool,
    text_style: Style,
    cursor_style: Style,
) -> Line<'a> {
    let chars: Vec<char> = field.value.chars().collect();
    let cursor = field.cursor_pos.min(chars.len());

    // Drop chars from the left until the cursor fits
    let mut start = 0;
    let width_to_cursor = |from: usize| -> usize {
        chars[from..cursor].iter().map(|c| c.width().unwrap_or(1)).sum::<usize>() + 1
    };
    while start < cursor && width_to_cursor(start) > max_width {
        start += 1;
    }

    let before: String = chars[start..cursor].iter().collect();
    let under: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(cursor + 1).collect();

    if !focused {
        let shown: String = chars[start..].iter().collect();
        return Line::from(Span::styled(shown, text_style));
    }

    Line::from(vec![
        Span::styled(before, text_style),
        Span::styled(under, cursor_style),
        Span::styled(after, text_style),
    ])
}

fn draw_form_dialog(frame: &mut Frame, dialog: &FormDialog, area: Rect, theme: &Theme) {
    let label_width = dialog
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0) as u16
        + 2;
    let height = dialog.fields.len() as u16 * 2 + 4;
    let rect = centered(area, 50.max(label_width + 20), height);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .title_style(Style::default().fg(theme.dialog.title).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog.border))
        .style(Style::default().bg(theme.dialog.bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    if inner.width <= label_width + 2 {
        return;
    }

    let input_width = (inner.width - label_width - 2) as usize;
    let text_style = Style::default().fg(theme.dialog.input_text);
    let cursor_style = Style::default()
        .fg(theme.dialog.input_cursor_fg)
        .bg(theme.dialog.input_cursor_bg);
    for (i, field) in dialog.fields.iter().enumerate() {
        let y = inner.y + 1 + i as u16 * 2;
        if y >= inner.y + inner.height {
            break;
        }
        let focused = i == dialog.focused;
        frame.render_widget(
            Paragraph::new(format!("{}:", field.label))
                .style(Style::default().fg(theme.dialog.input_prompt)),
            Rect::new(inner.x + 1, y, label_width, 1),
        );
        frame.render_widget(
            Paragraph::new(input_line(field, input_width, focused, text_style, cursor_style)),
            Rect::new(inner.x + 1 + label_width, y, input_width as u16, 1),
        );
    }

    let hint = Line::from(vec![
        button(&dialog.submit_label, false, theme),
        Span::styled("  Enter submit, Esc cancel", Style::default().fg(theme.dialog.text_dim)),
    ]);
    frame.render_widget(
        Paragraph::new(hint).alignment(Alignment::Center),
        Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
    );
}
