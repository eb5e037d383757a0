use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::browser::history::DEFAULT_HISTORY_DEPTH;
use crate::keybindings::KeybindingsConfig;

fn default_true() -> bool {
    true
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_editor_env() -> String {
    "EDITOR".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application settings, stored as `~/.ffnav/settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Show the preview pane next to the listing
    #[serde(default = "default_true")]
    pub enable_preview: bool,
    /// Maximum number of directories kept in the back/forward history
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Environment variable holding the editor command for `e`
    #[serde(default = "default_editor_env")]
    pub editor_env: String,
    /// Directory to open when no path is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_path: Option<String>,
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_preview: true,
            history_depth: DEFAULT_HISTORY_DEPTH,
            editor_env: default_editor_env(),
            start_path: None,
            log_level: default_log_level(),
            keybindings: KeybindingsConfig::default(),
        }
    }
}

impl Settings {
    /// Returns the config directory path (~/.ffnav)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ffnav"))
    }

    /// Returns the config file path (~/.ffnav/settings.json)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.json"))
    }

    /// Returns the log file path (~/.ffnav/ffnav.log)
    pub fn log_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("ffnav.log"))
    }

    /// Create ~/.ffnav and a default settings.json on first start
    pub fn ensure_config_exists() {
        let Some(config_path) = Self::config_path() else {
            return;
        };
        if !config_path.exists() {
            let _ = Self::default().save_to(&config_path);
        }
    }

    /// Loads settings with error information.
    /// Returns Ok(settings) on success, Err(error_message) on failure
    pub fn load_with_error() -> Result<Self, String> {
        Self::ensure_config_exists();

        let config_path = Self::config_path()
            .ok_or_else(|| "Could not determine config path".to_string())?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in settings.json: {}", e))
    }

    /// Atomic write: temp file first, then rename over the target
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
                }
            }
        }

        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Resolves a path setting to a valid directory.
    /// Only absolute paths are accepted; a missing directory falls back to
    /// its nearest existing ancestor.
    pub fn resolve_path<F>(&self, path_opt: Option<&str>, fallback: F) -> PathBuf
    where
        F: FnOnce() -> PathBuf,
    {
        if let Some(path_str) = path_opt {
            let path = PathBuf::from(path_str);
            if !path.is_absolute() {
                return fallback();
            }

            let mut current = Some(path.as_path());
            while let Some(candidate) = current {
                if let Ok(canonical) = candidate.canonicalize() {
                    if canonical.is_dir() {
                        return canonical;
                    }
                }
                current = candidate.parent();
            }
        }
        fallback()
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
