use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes >= GB {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format mode bits as `drwxr-xr-x`
pub fn format_permissions(mode: u32, is_directory: bool) -> String {
    let mut perms = String::with_capacity(10);
    perms.push(if is_directory { 'd' } else { '-' });
    let flags = [
        (0o400, 'r'), (0o200, 'w'), (0o100, 'x'),
        (0o040, 'r'), (0o020, 'w'), (0o010, 'x'),
        (0o004, 'r'), (0o002, 'w'), (0o001, 'x'),
    ];
    for (bit, ch) in &flags {
        perms.push(if mode & bit != 0 { *ch } else { '-' });
    }
    perms
}

/// Longest prefix of `s` that fits in `max_width` display columns
pub fn truncate_to_display_width(s: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (i, c) in s.char_indices() {
        let cw = c.width().unwrap_or(0);
        if width + cw > max_width {
            return &s[..i];
        }
        width += cw;
    }
    s
}

/// Pad (or cut) `s` to exactly `width` display columns
pub fn pad_to_display_width(s: &str, width: usize) -> String {
    let cut = truncate_to_display_width(s, width);
    let pad = width.saturating_sub(cut.width());
    format!("{}{}", cut, " ".repeat(pad))
}

/// Fit a name into `width` columns, ending in "..." when cut
pub fn ellipsize(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return truncate_to_display_width("...", width).to_string();
    }
    format!("{}...", truncate_to_display_width(s, width - 3))
}
