use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::browser::entry::Entry;
use crate::services::file_ops::FileSystem;
use crate::utils::format::ellipsize;

/// Bytes read from a file for its preview
const PREVIEW_BYTES: u64 = 64 * 1024;

/// Lines kept from a text file
const PREVIEW_LINES: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    /// Child names, directories first
    Directory(Vec<(String, bool)>),
    Text(Vec<String>),
    Binary,
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub path: PathBuf,
    pub content: PreviewContent,
}

impl Preview {
    pub fn load(fs: &dyn FileSystem, entry: &Entry) -> Self {
        let content = if entry.is_directory {
            match fs.list_directory(&entry.path) {
                Ok(listing) => PreviewContent::Directory(
                    listing
                        .entries()
                        .iter()
                        .map(|e| (e.name.clone(), e.is_directory))
                        .collect(),
                ),
                Err(e) => PreviewContent::Unreadable(e.to_string()),
            }
        } else {
            match read_head(&entry.path) {
                Ok(bytes) if bytes.contains(&0) => PreviewContent::Binary,
                Ok(bytes) => PreviewContent::Text(
                    String::from_utf8_lossy(&bytes)
                        .lines()
                        .take(PREVIEW_LINES)
                        .map(|l| l.replace('\t', "    "))
                        .collect(),
                ),
                Err(e) => PreviewContent::Unreadable(e.to_string()),
            }
        };

        Self {
            path: entry.path.clone(),
            content,
        }
    }
}

fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?.take(PREVIEW_BYTES).read_to_end(&mut bytes)?;
    Ok(bytes)
}

pub fn draw(frame: &mut Frame, preview: Option<&Preview>, area: Rect, theme: &Theme) {
    let title = preview
        .and_then(|p| p.path.file_name())
        .map(|n| format!(" {} ", n.to_string_lossy()))
        .unwrap_or_default();
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.preview.border))
        .style(Style::default().bg(theme.preview.bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(preview) = preview else {
        return;
    };
    let width = inner.width as usize;
    let height = inner.height as usize;
    let notice = Style::default().fg(theme.preview.notice_text);

    let lines: Vec<Line> = match &preview.content {
        PreviewContent::Directory(children) if children.is_empty() => {
            vec![Line::from(Span::styled("(empty)", notice))]
        }
        PreviewContent::Directory(children) => children
            .iter()
            .take(height)
            .map(|(name, is_dir)| {
                if *is_dir {
                    Line::from(Span::styled(
                        ellipsize(&format!("{}/", name), width),
                        Style::default().fg(theme.preview.directory_text),
                    ))
                } else {
                    Line::from(Span::styled(
                        ellipsize(name, width),
                        Style::default().fg(theme.preview.text),
                    ))
                }
            })
            .collect(),
        PreviewContent::Text(text) => text
            .iter()
            .take(height)
            .map(|l| Line::from(Span::styled(ellipsize(l, width), Style::default().fg(theme.preview.text))))
            .collect(),
        PreviewContent::Binary => vec![Line::from(Span::styled("binary file", notice))],
        PreviewContent::Unreadable(reason) => {
            vec![Line::from(Span::styled(ellipsize(reason, width), theme.error_style()))]
        }
    };

    frame.render_widget(Paragraph::new(lines), inner);
}
