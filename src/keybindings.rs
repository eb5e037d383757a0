use std::collections::HashMap;
use std::hash::Hash;
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

// ─── Key strings ───────────────────────────────────────────────────────

/// A key combination (key code + modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Named keys: config spelling(s), key code, display label.
const NAMED_KEYS: &[(&[&str], KeyCode, &str)] = &[
    (&["up"], KeyCode::Up, "Up"),
    (&["down"], KeyCode::Down, "Down"),
    (&["left"], KeyCode::Left, "Left"),
    (&["right"], KeyCode::Right, "Right"),
    (&["enter", "return"], KeyCode::Enter, "Enter"),
    (&["esc", "escape"], KeyCode::Esc, "Esc"),
    (&["tab"], KeyCode::Tab, "Tab"),
    (&["backtab"], KeyCode::BackTab, "BackTab"),
    (&["space"], KeyCode::Char(' '), "Space"),
    (&["backspace"], KeyCode::Backspace, "BkSp"),
    (&["delete", "del"], KeyCode::Delete, "Del"),
    (&["home"], KeyCode::Home, "Home"),
    (&["end"], KeyCode::End, "End"),
    (&["pageup"], KeyCode::PageUp, "PgUp"),
    (&["pagedown"], KeyCode::PageDown, "PgDn"),
];

fn named_key(name: &str) -> Option<(KeyCode, &'static str)> {
    NAMED_KEYS
        .iter()
        .find(|(names, _, _)| names.contains(&name))
        .map(|(_, code, label)| (*code, *label))
}

fn function_key(name: &str) -> Option<u8> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

/// Strings starting with `//` are comments kept in the config for humans.
fn is_comment(s: &str) -> bool {
    s.trim().starts_with("//")
}

/// Parse a key string like `"ctrl+r"`, `"pageup"`, `"h"` or `"f2"`.
///
/// Letters produce both the lowercase and the uppercase bind so a binding
/// works with caps lock on. Comments and unknown names produce nothing.
pub fn parse_key(s: &str) -> Vec<KeyBind> {
    if is_comment(s) {
        return Vec::new();
    }
    let s = s.trim().to_lowercase();
    let (modifier_parts, key_part) = match s.rsplit_once('+') {
        // "+" on its own or "ctrl++" bind the plus key
        Some((mods, "")) => (mods.trim_end_matches('+'), "+"),
        Some((mods, key)) => (mods, key),
        None => ("", s.as_str()),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts.split('+').filter(|p| !p.is_empty()) {
        match part {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => {}
        }
    }

    let code = if let Some((code, _)) = named_key(key_part) {
        code
    } else if let Some(n) = function_key(key_part) {
        KeyCode::F(n)
    } else {
        let mut chars = key_part.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => KeyCode::Char(ch),
            _ => return Vec::new(),
        }
    };

    match code {
        KeyCode::Char(ch) if ch.is_ascii_alphabetic() => vec![
            KeyBind { code: KeyCode::Char(ch.to_ascii_lowercase()), modifiers },
            KeyBind { code: KeyCode::Char(ch.to_ascii_uppercase()), modifiers },
        ],
        _ => vec![KeyBind { code, modifiers }],
    }
}

/// Format a key string for the hint line: `"ctrl+r"` → `"Ctrl+R"`,
/// `"pageup"` → `"PgUp"`.
pub fn format_key_display(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let mut parts: Vec<&str> = lower.split('+').collect();
    let key = parts.pop().unwrap_or_default();

    let mut out: Vec<String> = parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| match *p {
            "ctrl" | "control" => "Ctrl".to_string(),
            "shift" => "Shift".to_string(),
            "alt" => "Alt".to_string(),
            other => other.to_string(),
        })
        .collect();

    let key_label = if let Some((_, label)) = named_key(key) {
        label.to_string()
    } else if function_key(key).is_some() {
        key.to_uppercase()
    } else if key.is_empty() {
        "+".to_string()
    } else {
        key.to_string()
    };
    out.push(key_label);
    out.join("+")
}

// ─── Action maps ───────────────────────────────────────────────────────

/// Reverse lookup KeyBind → action, plus the display strings per action.
pub struct ActionMap<A> {
    map: HashMap<KeyBind, A>,
    display: HashMap<A, Vec<String>>,
}

impl<A: Copy + Eq + Hash + Ord + std::fmt::Debug> ActionMap<A> {
    /// Merge user overrides over the defaults. An action present in
    /// `overrides` loses all of its default keys.
    ///
    /// When two actions claim the same key, a user-bound action beats a
    /// default one; between equals the action declared first keeps it.
    pub fn build(
        defaults: &HashMap<A, Vec<String>>,
        overrides: &HashMap<A, Vec<String>>,
    ) -> Self {
        let mut merged = defaults.clone();
        for (action, keys) in overrides {
            merged.insert(*action, keys.clone());
        }

        let mut actions: Vec<(bool, A)> = merged
            .keys()
            .map(|action| (overrides.contains_key(action), *action))
            .collect();
        actions.sort();

        let mut owners: HashMap<KeyBind, (bool, A)> = HashMap::new();
        for &(user_bound, action) in &actions {
            for bind in merged[&action].iter().flat_map(|k| parse_key(k)) {
                match owners.get(&bind) {
                    Some(&(owner_user_bound, owner)) if owner != action => {
                        let replaces = user_bound && !owner_user_bound;
                        tracing::warn!(
                            key = ?bind,
                            kept = ?if replaces { action } else { owner },
                            dropped = ?if replaces { owner } else { action },
                            "key bound to more than one action"
                        );
                        if replaces {
                            owners.insert(bind, (user_bound, action));
                        }
                    }
                    _ => {
                        owners.insert(bind, (user_bound, action));
                    }
                }
            }
        }
        let map: HashMap<KeyBind, A> = owners
            .into_iter()
            .map(|(bind, (_, action))| (bind, action))
            .collect();

        let mut display = HashMap::new();
        for (action, key_strings) in &merged {
            // Keys lost to another action are not advertised
            let shown: Vec<String> = key_strings
                .iter()
                .filter(|k| !is_comment(k))
                .filter(|k| {
                    let binds = parse_key(k);
                    binds.is_empty() || binds.iter().any(|b| map.get(b) == Some(action))
                })
                .map(|k| format_key_display(k))
                .collect();
            display.insert(*action, shown);
        }

        Self { map, display }
    }

    pub fn keys(&self, action: A) -> &[String] {
        self.display.get(&action).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Empty string when the action is unbound.
    pub fn first_key(&self, action: A) -> &str {
        self.keys(action).first().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<A> {
        if let Some(action) = self.map.get(&KeyBind { code, modifiers }) {
            return Some(*action);
        }
        // crossterm reports SHIFT for uppercase letters and shifted symbols
        if matches!(code, KeyCode::Char(_)) && modifiers.contains(KeyModifiers::SHIFT) {
            let stripped = modifiers & !KeyModifiers::SHIFT;
            return self.map.get(&KeyBind { code, modifiers: stripped }).copied();
        }
        None
    }
}

// ─── Browser context ───────────────────────────────────────────────────

/// Everything a key can do while the listing has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserAction {
    Quit,
    ParentDir,
    EnterDir,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoFirst,
    GoLast,
    Delete,
    Copy,
    Paste,
    Mkdir,
    Mkfile,
    Rename,
    Edit,
    FocusPath,
    Refresh,
    HistoryBack,
    HistoryForward,
}

pub fn default_browser_keybindings() -> HashMap<BrowserAction, Vec<String>> {
    let mut m = HashMap::new();

    m.insert(BrowserAction::Quit, vec!["//Quit".into(), "q".into(), "esc".into()]);

    // Navigation
    m.insert(BrowserAction::ParentDir, vec!["//Go to parent directory".into(), "h".into(), "left".into()]);
    m.insert(BrowserAction::EnterDir, vec!["//Enter selected directory".into(), "l".into(), "right".into(), "enter".into()]);
    m.insert(BrowserAction::MoveUp, vec!["//Move cursor up".into(), "k".into(), "up".into()]);
    m.insert(BrowserAction::MoveDown, vec!["//Move cursor down".into(), "j".into(), "down".into()]);
    m.insert(BrowserAction::PageUp, vec!["//Page up".into(), "pageup".into()]);
    m.insert(BrowserAction::PageDown, vec!["//Page down".into(), "pagedown".into()]);
    m.insert(BrowserAction::GoFirst, vec!["//First entry".into(), "home".into()]);
    m.insert(BrowserAction::GoLast, vec!["//Last entry".into(), "end".into()]);
    m.insert(BrowserAction::FocusPath, vec!["//Focus the path box".into(), "tab".into()]);
    m.insert(BrowserAction::Refresh, vec!["//Re-read the directory".into(), "ctrl+r".into()]);

    // History has no default key; add one in settings.json, e.g. "ctrl+o"
    m.insert(BrowserAction::HistoryBack, vec!["//Previous directory in history".into()]);
    m.insert(BrowserAction::HistoryForward, vec!["//Next directory in history".into()]);

    // File operations
    m.insert(BrowserAction::Delete, vec!["//Remove selected entry".into(), "d".into()]);
    m.insert(BrowserAction::Copy, vec!["//Copy selected entry".into(), "y".into()]);
    m.insert(BrowserAction::Paste, vec!["//Paste copied entry".into(), "p".into()]);
    m.insert(BrowserAction::Mkdir, vec!["//Create directory".into(), "m".into()]);
    m.insert(BrowserAction::Mkfile, vec!["//Create empty file".into(), "n".into()]);
    m.insert(BrowserAction::Rename, vec!["//Rename selected entry".into(), "r".into()]);
    m.insert(BrowserAction::Edit, vec!["//Open in $EDITOR".into(), "e".into()]);

    m
}

// ─── JSON config & runtime container ───────────────────────────────────

/// JSON-serializable keybindings, stored under `"keybindings"` in
/// settings.json. Partial maps are merged over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_browser_keybindings")]
    pub browser: HashMap<BrowserAction, Vec<String>>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            browser: default_browser_keybindings(),
        }
    }
}

pub struct Keybindings {
    browser: ActionMap<BrowserAction>,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl Keybindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        Self {
            browser: ActionMap::build(&default_browser_keybindings(), &config.browser),
        }
    }

    pub fn browser_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<BrowserAction> {
        self.browser.lookup(code, modifiers)
    }

    #[allow(dead_code)]
    pub fn browser_keys(&self, action: BrowserAction) -> &[String] {
        self.browser.keys(action)
    }

    pub fn browser_first_key(&self, action: BrowserAction) -> &str {
        self.browser.first_key(action)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────
