use ratatui::style::{Color, Modifier, Style};

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub bg_alt: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_strong: Color,
    pub accent: Color,
    pub shortcut: Color,
}

#[derive(Clone, Copy)]
pub struct StateColors {
    pub success: Color,
    pub error: Color,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Listing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy)]
pub struct PanelColors {
    pub bg: Color,
    pub border: Color,
    pub border_active: Color,
    pub header_text: Color,
    pub file_text: Color,
    pub directory_text: Color,
    pub selected_text: Color,
    /// Row currently held in the copy register
    pub copied_text: Color,
    pub size_text: Color,
    pub date_text: Color,
    pub permission_text: Color,
}

#[derive(Clone, Copy)]
pub struct PathBoxColors {
    pub text: Color,
    pub cursor_fg: Color,
    pub cursor_bg: Color,
}

#[derive(Clone, Copy)]
pub struct PreviewColors {
    pub bg: Color,
    pub border: Color,
    pub text: Color,
    pub directory_text: Color,
    pub notice_text: Color,
}

#[derive(Clone, Copy)]
pub struct StatusBarColors {
    pub bg: Color,
    pub text: Color,
    pub key: Color,
    pub label: Color,
    pub error_text: Color,
}

#[derive(Clone, Copy)]
pub struct DialogColors {
    pub bg: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub text_dim: Color,
    pub input_text: Color,
    pub input_cursor_fg: Color,
    pub input_cursor_bg: Color,
    pub input_prompt: Color,
    pub button_text: Color,
    pub button_selected_bg: Color,
    pub button_selected_text: Color,
}

#[derive(Clone)]
pub struct Theme {
    pub palette: Palette,
    pub state: StateColors,
    pub panel: PanelColors,
    pub path_box: PathBoxColors,
    pub preview: PreviewColors,
    pub status_bar: StatusBarColors,
    pub dialog: DialogColors,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dawn_of_coding()
    }
}

impl Theme {
    /// Dark pastel theme on the 256-colour palette
    pub fn dawn_of_coding() -> Self {
        let palette = Palette {
            bg: Color::Indexed(234),
            bg_alt: Color::Indexed(235),
            fg: Color::Indexed(188),
            fg_dim: Color::Indexed(102),
            fg_strong: Color::Indexed(195),
            accent: Color::Indexed(110),
            shortcut: Color::Indexed(146),
        };

        let state = StateColors {
            success: Color::Indexed(108),
            error: Color::Indexed(167),
        };

        let panel = PanelColors {
            bg: palette.bg,
            border: Color::Indexed(102),
            border_active: Color::Indexed(146),
            header_text: Color::Indexed(145),
            file_text: palette.fg,
            directory_text: palette.accent,
            selected_text: palette.bg,
            copied_text: Color::Indexed(174),
            size_text: palette.fg_dim,
            date_text: palette.fg_dim,
            permission_text: Color::Indexed(145),
        };

        let path_box = PathBoxColors {
            text: palette.fg_strong,
            cursor_fg: palette.bg,
            cursor_bg: Color::Indexed(146),
        };

        let preview = PreviewColors {
            bg: palette.bg,
            border: Color::Indexed(102),
            text: palette.fg,
            directory_text: palette.accent,
            notice_text: palette.fg_dim,
        };

        let status_bar = StatusBarColors {
            bg: palette.bg_alt,
            text: palette.fg,
            key: palette.shortcut,
            label: palette.fg_dim,
            error_text: Color::Indexed(174),
        };

        let dialog = DialogColors {
            bg: palette.bg_alt,
            border: Color::Indexed(146),
            title: palette.fg_strong,
            text: palette.fg,
            text_dim: palette.fg_dim,
            input_text: palette.fg,
            input_cursor_fg: palette.bg,
            input_cursor_bg: Color::Indexed(146),
            input_prompt: palette.accent,
            button_text: palette.fg_dim,
            button_selected_bg: Color::Indexed(60),
            button_selected_text: palette.fg_strong,
        };

        Self {
            palette,
            state,
            panel,
            path_box,
            preview,
            status_bar,
            dialog,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Style helpers
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.panel.file_text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.palette.fg_dim)
    }

    pub fn directory_style(&self) -> Style {
        Style::default()
            .fg(self.panel.directory_text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn copied_style(&self) -> Style {
        Style::default().fg(self.panel.copied_text)
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.panel.header_text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.panel.border_active)
        } else {
            Style::default().fg(self.panel.border)
        }
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.state.error)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar.text)
            .bg(self.status_bar.bg)
    }
}
