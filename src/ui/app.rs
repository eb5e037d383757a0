use std::io;
use std::path::{Component, Path, PathBuf};

use crossterm::event::{KeyCode, KeyModifiers};

use super::dialogs::{ConfirmDialog, FormDialog, FormField, FormValues, Modal, ModalInput, PendingAction};
use super::preview::Preview;
use crate::browser::entry::Entry;
use crate::browser::navigator::Navigator;
use crate::browser::register::Register;
use crate::config::Settings;
use crate::error::CommandError;
use crate::keybindings::{BrowserAction, Keybindings};
use crate::services::editor::{editor_invocation, ProcessLauncher, SystemLauncher};
use crate::services::file_ops::{is_valid_filename, FileSystem, LocalFs};

/// Rows moved by page up/down
pub const PAGE_ROWS: isize = 10;

const NAME_FIELD: &str = "name";
const NEW_NAME_FIELD: &str = "new name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Listing,
    PathInput,
}

/// Presentation side effects the views pick up after each key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Copied(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Hands the terminal to a child process and takes it back.
pub trait TerminalHooks {
    fn suspend(&mut self) -> io::Result<()>;
    fn resume(&mut self) -> io::Result<()>;
}

/// Environment variable lookup, injected so tests need not touch the process env.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// All browser state, owned in one place and passed to every view.
pub struct App {
    pub navigator: Navigator,
    pub register: Register,
    pub modal: Option<Modal>,
    pub focus: Focus,
    pub path_input: FormField,
    pub message: Option<StatusMessage>,
    pub preview: Option<Preview>,
    pub settings: Settings,
    pub keybindings: Keybindings,
    fs: Box<dyn FileSystem>,
    launcher: Box<dyn ProcessLauncher>,
    env: EnvLookup,
    events: Vec<UiEvent>,
}

impl App {
    pub fn new(start: &Path, settings: Settings) -> Result<Self, CommandError> {
        Self::with_services(
            start,
            settings,
            Box::new(LocalFs),
            Box::new(SystemLauncher),
            Box::new(|name| std::env::var(name).ok()),
        )
    }

    pub fn with_services(
        start: &Path,
        settings: Settings,
        fs: Box<dyn FileSystem>,
        launcher: Box<dyn ProcessLauncher>,
        env: EnvLookup,
    ) -> Result<Self, CommandError> {
        let navigator = Navigator::open(fs.as_ref(), start, settings.history_depth)?;
        let keybindings = Keybindings::from_config(&settings.keybindings);

        let mut app = Self {
            navigator,
            register: Register::new(),
            modal: None,
            focus: Focus::Listing,
            path_input: FormField::new("path", start.display().to_string()),
            message: None,
            preview: None,
            settings,
            keybindings,
            fs,
            launcher,
            env,
            events: Vec::new(),
        };
        app.refresh_preview();
        Ok(app)
    }

    pub fn show_message(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    /// Events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Route one key. Returns true when the application should quit.
    pub fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        hooks: &mut dyn TerminalHooks,
    ) -> bool {
        // An open dialog owns every key
        if let Some(modal) = self.modal.as_mut() {
            let input = modal.handle_input(code, modifiers);
            self.resolve_modal(input);
            return false;
        }

        if self.focus == Focus::PathInput {
            self.handle_path_input(code, modifiers);
            return false;
        }

        match self.keybindings.browser_action(code, modifiers) {
            Some(action) => self.dispatch(action, hooks),
            None => false,
        }
    }

    fn dispatch(&mut self, action: BrowserAction, hooks: &mut dyn TerminalHooks) -> bool {
        self.message = None;
        match action {
            BrowserAction::Quit => return true,
            BrowserAction::ParentDir => {
                let result = self.go_to_parent();
                self.report("parent", result);
            }
            BrowserAction::EnterDir => {
                let result = self.enter_selected();
                self.report("enter", result);
            }
            BrowserAction::MoveUp => self.move_selection(-1),
            BrowserAction::MoveDown => self.move_selection(1),
            BrowserAction::PageUp => self.move_selection(-PAGE_ROWS),
            BrowserAction::PageDown => self.move_selection(PAGE_ROWS),
            BrowserAction::GoFirst => {
                self.navigator.select_first();
                self.refresh_preview();
            }
            BrowserAction::GoLast => {
                self.navigator.select_last();
                self.refresh_preview();
            }
            BrowserAction::Delete => self.show_delete_confirm(),
            BrowserAction::Copy => self.copy_selected(),
            BrowserAction::Paste => {
                let result = self.show_paste_form();
                self.report("paste", result);
            }
            BrowserAction::Mkdir => self.show_mkdir_form(),
            BrowserAction::Mkfile => self.show_mkfile_form(),
            BrowserAction::Rename => {
                let result = self.show_rename_form();
                self.report("rename", result);
            }
            BrowserAction::Edit => {
                let result = self.edit_selected(hooks);
                self.report("edit", result);
            }
            BrowserAction::FocusPath => self.focus_path_input(),
            BrowserAction::Refresh => {
                let result = self.refresh();
                self.report("refresh", result);
            }
            BrowserAction::HistoryBack => {
                let result = self.history_back();
                self.report("history", result);
            }
            BrowserAction::HistoryForward => {
                let result = self.history_forward();
                self.report("history", result);
            }
        }
        false
    }

    /// Log a failed command and show it in the status line.
    fn report(&mut self, command: &str, result: Result<(), CommandError>) {
        let Err(err) = result else {
            return;
        };
        match &err {
            CommandError::Editor(_) => tracing::error!(command, error = %err, "command failed"),
            _ => tracing::warn!(command, error = %err, validation = err.is_validation(), "command failed"),
        }
        self.message = Some(StatusMessage {
            text: format!("{}: {}", command, err),
            is_error: true,
        });
    }

    // ─── Navigation ────────────────────────────────────────────────────

    pub fn go_to_parent(&mut self) -> Result<(), CommandError> {
        if self.navigator.go_to_parent(self.fs.as_ref())? {
            self.after_navigation();
        }
        Ok(())
    }

    pub fn enter_selected(&mut self) -> Result<(), CommandError> {
        let Some(entry) = self.navigator.current_selection().cloned() else {
            return Ok(());
        };
        if self.navigator.enter_child(self.fs.as_ref(), &entry)? {
            self.after_navigation();
        }
        Ok(())
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.navigator.move_selection(delta);
        self.refresh_preview();
    }

    pub fn refresh(&mut self) -> Result<(), CommandError> {
        self.navigator.refresh(self.fs.as_ref())?;
        self.refresh_preview();
        Ok(())
    }

    pub fn history_back(&mut self) -> Result<(), CommandError> {
        if self.navigator.history_back(self.fs.as_ref())? {
            self.after_navigation();
        }
        Ok(())
    }

    pub fn history_forward(&mut self) -> Result<(), CommandError> {
        if self.navigator.history_forward(self.fs.as_ref())? {
            self.after_navigation();
        }
        Ok(())
    }

    fn after_navigation(&mut self) {
        self.sync_path_text();
        self.refresh_preview();
    }

    pub fn refresh_preview(&mut self) {
        self.preview = if self.settings.enable_preview {
            self.navigator
                .current_selection()
                .map(|entry| Preview::load(self.fs.as_ref(), entry))
        } else {
            None
        };
    }

    // ─── Path box ──────────────────────────────────────────────────────

    pub fn focus_path_input(&mut self) {
        self.focus = Focus::PathInput;
        self.sync_path_text();
    }

    fn sync_path_text(&mut self) {
        self.path_input
            .set_value(self.navigator.current_path().display().to_string());
    }

    fn handle_path_input(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let leaves_box = code == KeyCode::Tab
            || self.keybindings.browser_action(code, modifiers) == Some(BrowserAction::FocusPath);
        match code {
            KeyCode::Enter => {
                let result = self.go_to_typed_path();
                self.report("go to", result);
            }
            // Leaving the box drops any unsubmitted edit
            _ if code == KeyCode::Esc || leaves_box => {
                self.focus = Focus::Listing;
                self.sync_path_text();
            }
            _ => {
                self.path_input.edit(code, modifiers);
            }
        }
    }

    fn go_to_typed_path(&mut self) -> Result<(), CommandError> {
        let typed = expand_path(&self.path_input.value, self.env.as_ref());
        let target = if typed.is_absolute() {
            typed
        } else {
            self.navigator.current_path().join(typed)
        };
        let target = normalize_path(&target);

        self.navigator.go_to(self.fs.as_ref(), &target)?;
        self.focus = Focus::Listing;
        self.after_navigation();
        Ok(())
    }

    // ─── Commands ──────────────────────────────────────────────────────

    pub fn show_delete_confirm(&mut self) {
        let Some(entry) = self.navigator.current_selection().cloned() else {
            return;
        };
        self.modal = Some(Modal::Confirm(ConfirmDialog::new(
            format!("do you want to remove {}?", entry.name),
            "remove",
            PendingAction::Delete(entry),
        )));
    }

    pub fn copy_selected(&mut self) {
        let Some(entry) = self.navigator.current_selection().cloned() else {
            return;
        };
        tracing::debug!(path = %entry.path.display(), "copied to register");
        self.show_message(format!("Copied: {}", entry.name));
        self.events.push(UiEvent::Copied(entry.path.clone()));
        self.register.copy(entry);
    }

    pub fn show_paste_form(&mut self) -> Result<(), CommandError> {
        let source = self
            .register
            .source()
            .cloned()
            .ok_or(CommandError::NothingToPaste)?;
        self.modal = Some(Modal::Form(FormDialog::single(
            "new name",
            "paste",
            NAME_FIELD,
            source.name.clone(),
            PendingAction::Paste(source),
        )));
        Ok(())
    }

    pub fn show_mkdir_form(&mut self) {
        self.modal = Some(Modal::Form(FormDialog::single(
            "new directory",
            "create",
            NAME_FIELD,
            "",
            PendingAction::Mkdir,
        )));
    }

    pub fn show_mkfile_form(&mut self) {
        self.modal = Some(Modal::Form(FormDialog::single(
            "new file",
            "create",
            NAME_FIELD,
            "",
            PendingAction::Mkfile,
        )));
    }

    pub fn show_rename_form(&mut self) -> Result<(), CommandError> {
        if self.navigator.current_selection().is_none() {
            return Err(CommandError::NoFileOrDir);
        }
        self.modal = Some(Modal::Form(FormDialog::single(
            "new name",
            "rename",
            NEW_NAME_FIELD,
            "",
            PendingAction::Rename,
        )));
        Ok(())
    }

    fn resolve_modal(&mut self, input: ModalInput) {
        let values = match input {
            ModalInput::Pending => return,
            ModalInput::Cancelled => {
                self.modal = None;
                return;
            }
            ModalInput::Confirmed => None,
            ModalInput::Submitted(values) => Some(values),
        };
        if let Some(modal) = self.modal.take() {
            self.run_pending(modal.into_action(), values);
        }
    }

    fn run_pending(&mut self, action: PendingAction, values: Option<FormValues>) {
        let field = |label: &str| {
            values
                .as_ref()
                .and_then(|v| v.get(label))
                .unwrap_or_default()
                .to_string()
        };

        match action {
            PendingAction::Delete(entry) => {
                let result = self.execute_delete(&entry);
                self.report("delete", result);
            }
            PendingAction::Paste(source) => {
                let result = self.execute_paste(&source, &field(NAME_FIELD));
                self.report("paste", result);
            }
            PendingAction::Mkdir => {
                let result = self.execute_mkdir(&field(NAME_FIELD));
                self.report("mkdir", result);
            }
            PendingAction::Mkfile => {
                let result = self.execute_mkfile(&field(NAME_FIELD));
                self.report("new file", result);
            }
            PendingAction::Rename => {
                let result = self.execute_rename(&field(NEW_NAME_FIELD));
                self.report("rename", result);
            }
        }
    }

    /// Validate a typed name and join it to the current directory.
    fn target_path(&self, name: &str, when_empty: CommandError) -> Result<PathBuf, CommandError> {
        if name.trim().is_empty() {
            return Err(when_empty);
        }
        is_valid_filename(name).map_err(CommandError::InvalidName)?;
        Ok(self.navigator.current_path().join(name))
    }

    fn execute_delete(&mut self, entry: &Entry) -> Result<(), CommandError> {
        if entry.is_directory {
            self.fs.remove_dir_recursive(&entry.path)?;
        } else {
            self.fs.remove_file(&entry.path)?;
        }
        tracing::info!(path = %entry.path.display(), "removed");
        self.refresh()?;
        self.show_message(format!("Removed: {}", entry.name));
        Ok(())
    }

    fn execute_paste(&mut self, source: &Entry, name: &str) -> Result<(), CommandError> {
        let target = self.target_path(name, CommandError::NoNewName)?;
        self.fs.copy(&source.path, &target)?;
        tracing::info!(from = %source.path.display(), to = %target.display(), "pasted");
        self.refresh()?;
        self.show_message(format!("Pasted: {}", name));
        Ok(())
    }

    fn execute_mkdir(&mut self, name: &str) -> Result<(), CommandError> {
        let target = self.target_path(name, CommandError::NoDirName)?;
        self.fs.create_directory(&target)?;
        tracing::info!(path = %target.display(), "created directory");
        self.refresh()?;
        self.show_message(format!("Created directory: {}", name));
        Ok(())
    }

    fn execute_mkfile(&mut self, name: &str) -> Result<(), CommandError> {
        let target = self.target_path(name, CommandError::NoFileOrDirName)?;
        self.fs.create_empty_file(&target)?;
        tracing::info!(path = %target.display(), "created file");
        self.refresh()?;
        self.show_message(format!("Created file: {}", name));
        Ok(())
    }

    fn execute_rename(&mut self, name: &str) -> Result<(), CommandError> {
        if name.trim().is_empty() {
            return Err(CommandError::NoFileName);
        }
        let entry = self
            .navigator
            .current_selection()
            .cloned()
            .ok_or(CommandError::NoFileOrDir)?;
        let target = self.target_path(name, CommandError::NoFileName)?;
        self.fs.rename(&entry.path, &target)?;
        tracing::info!(from = %entry.path.display(), to = %target.display(), "renamed");
        self.refresh()?;
        self.show_message(format!("Renamed: {} -> {}", entry.name, name));
        Ok(())
    }

    /// Run the editor from the configured variable on the selection.
    ///
    /// The terminal is suspended for the editor's whole lifetime and is
    /// resumed even when the editor fails.
    pub fn edit_selected(&mut self, hooks: &mut dyn TerminalHooks) -> Result<(), CommandError> {
        let Some(entry) = self.navigator.current_selection().cloned() else {
            return Ok(());
        };
        let variable = self.settings.editor_env.clone();
        let invocation = (self.env)(&variable)
            .and_then(|editor| editor_invocation(&editor, &entry.path));
        let Some((program, args)) = invocation else {
            tracing::warn!(variable = %variable, "no editor configured");
            self.show_message(format!("${} is not set", variable));
            return Ok(());
        };

        tracing::info!(program = %program, path = %entry.path.display(), "launching editor");
        if let Err(e) = hooks.suspend() {
            let _ = hooks.resume();
            return Err(e.into());
        }
        let result = self.launcher.run_interactive(&program, &args);
        let resumed = hooks.resume();
        self.refresh_preview();
        result?;
        resumed?;
        Ok(())
    }
}

/// Expand `$VAR`, `${VAR}` and a leading `~`. Unset variables expand to
/// nothing.
pub fn expand_path(input: &str, env: &dyn Fn(&str) -> Option<String>) -> PathBuf {
    let mut out = String::new();
    let mut chars = input.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed {
                out.push_str("${");
                out.push_str(&name);
                continue;
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                out.push('$');
                continue;
            }
            name
        };
        out.push_str(&env(&name).unwrap_or_default());
    }

    if out == "~" || out.starts_with("~/") {
        let home = env("HOME").map(PathBuf::from).or_else(dirs::home_dir);
        if let Some(home) = home {
            return home.join(out[1..].trim_start_matches('/'));
        }
    }
    PathBuf::from(out)
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::navigator::FIRST_ROW;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeHooks {
        suspended: usize,
        resumed: usize,
    }

    impl TerminalHooks for FakeHooks {
        fn suspend(&mut self) -> io::Result<()> {
            self.suspended += 1;
            Ok(())
        }

        fn resume(&mut self) -> io::Result<()> {
            self.resumed += 1;
            Ok(())
        }
    }

    type Calls = Rc<RefCell<Vec<(String, Vec<String>)>>>;

    struct FakeLauncher {
        calls: Calls,
        fail: bool,
    }

    impl ProcessLauncher for FakeLauncher {
        fn run_interactive(&mut self, program: &str, args: &[String]) -> Result<(), CommandError> {
            self.calls.borrow_mut().push((program.to_string(), args.to_vec()));
            if self.fail {
                Err(CommandError::Editor(format!("{} exited with 1", program)))
            } else {
                Ok(())
            }
        }
    }

    /// home/
    ///   docs/      (empty)
    ///   music/     a.mp3 b.mp3 c.mp3
    ///   projects/  x.rs y.rs
    ///   notes.txt
    fn tree() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().canonicalize().unwrap().join("home");
        fs::create_dir_all(home.join("docs")).unwrap();
        fs::create_dir_all(home.join("music")).unwrap();
        fs::create_dir_all(home.join("projects")).unwrap();
        for name in ["a.mp3", "b.mp3", "c.mp3"] {
            fs::write(home.join("music").join(name), "").unwrap();
        }
        fs::write(home.join("projects/x.rs"), "fn main() {}\n").unwrap();
        fs::write(home.join("projects/y.rs"), "").unwrap();
        fs::write(home.join("notes.txt"), "hello\n").unwrap();
        (dir, home)
    }

    fn app_with(path: &Path, settings: Settings, vars: &[(&str, &str)], fail: bool) -> (App, Calls) {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let calls: Calls = Rc::default();
        let launcher = FakeLauncher {
            calls: Rc::clone(&calls),
            fail,
        };
        let app = App::with_services(
            path,
            settings,
            Box::new(LocalFs),
            Box::new(launcher),
            Box::new(move |name| vars.get(name).cloned()),
        )
        .unwrap();
        (app, calls)
    }

    fn app_at(path: &Path) -> App {
        app_with(path, Settings::default(), &[], false).0
    }

    fn key(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(code, KeyModifiers::NONE, &mut FakeHooks::default())
    }

    fn ctrl(app: &mut App, ch: char) -> bool {
        app.handle_key(KeyCode::Char(ch), KeyModifiers::CONTROL, &mut FakeHooks::default())
    }

    fn press(app: &mut App, ch: char) -> bool {
        key(app, KeyCode::Char(ch))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, ch);
        }
    }

    fn names(app: &App) -> Vec<String> {
        app.navigator.entries().iter().map(|e| e.name.clone()).collect()
    }

    fn select(app: &mut App, name: &str) {
        let index = app
            .navigator
            .entries()
            .iter()
            .position(|e| e.name == name)
            .unwrap();
        app.navigator.select_row(index + FIRST_ROW);
    }

    fn error_text(app: &App) -> String {
        let message = app.message.clone().unwrap();
        assert!(message.is_error, "expected an error, got {:?}", message);
        message.text
    }

    #[test]
    fn test_l_enters_directory_and_h_restores_row() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        // docs, music, projects, notes.txt
        select(&mut app, "projects");
        assert_eq!(app.navigator.row(), 3);
        press(&mut app, 'l');
        assert_eq!(app.navigator.current_path(), home.join("projects"));
        assert_eq!(app.navigator.row(), FIRST_ROW);
        assert_eq!(app.path_input.value, home.join("projects").display().to_string());

        press(&mut app, 'j');
        press(&mut app, 'h');
        assert_eq!(app.navigator.current_path(), home);
        assert_eq!(app.navigator.row(), 3);

        press(&mut app, 'l');
        assert_eq!(app.navigator.row(), 2);
        assert_eq!(app.navigator.current_selection().unwrap().name, "y.rs");
    }

    #[test]
    fn test_l_on_file_is_noop() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        let row = app.navigator.row();

        press(&mut app, 'l');
        assert_eq!(app.navigator.current_path(), home);
        assert_eq!(app.navigator.row(), row);
        assert!(app.message.is_none());
    }

    #[test]
    fn test_entering_empty_directory_has_no_selection() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "docs");
        press(&mut app, 'l');

        assert!(app.navigator.current_selection().is_none());
        assert!(app.preview.is_none());
        // Selection-dependent commands do nothing here
        press(&mut app, 'd');
        press(&mut app, 'y');
        assert!(app.modal.is_none());
        assert!(app.register.is_empty());
    }

    #[test]
    fn test_preview_follows_selection() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        assert_eq!(app.preview.as_ref().unwrap().path, home.join("docs"));

        press(&mut app, 'j');
        assert_eq!(app.preview.as_ref().unwrap().path, home.join("music"));

        press(&mut app, 'l');
        assert_eq!(app.preview.as_ref().unwrap().path, home.join("music/a.mp3"));
    }

    #[test]
    fn test_preview_disabled() {
        let (_dir, home) = tree();
        let settings = Settings {
            enable_preview: false,
            ..Settings::default()
        };
        let (mut app, _) = app_with(&home, settings, &[], false);
        press(&mut app, 'j');
        assert!(app.preview.is_none());
    }

    #[test]
    fn test_mkdir_creates_directory() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        press(&mut app, 'm');
        assert!(app.modal.is_some());
        type_text(&mut app, "notes");
        key(&mut app, KeyCode::Enter);

        assert!(app.modal.is_none());
        assert!(home.join("notes").is_dir());
        assert!(names(&app).contains(&"notes".to_string()));
        assert_eq!(app.message.clone().unwrap().text, "Created directory: notes");
    }

    #[test]
    fn test_mkdir_empty_name() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        let before = names(&app);

        press(&mut app, 'm');
        key(&mut app, KeyCode::Enter);
        assert!(app.modal.is_none());
        assert_eq!(error_text(&app), "mkdir: no directory name");
        assert_eq!(names(&app), before);
    }

    #[test]
    fn test_mkdir_existing_name_reports_io_error() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        let row = app.navigator.row();

        press(&mut app, 'm');
        type_text(&mut app, "music");
        key(&mut app, KeyCode::Enter);

        assert!(app.modal.is_none());
        assert!(error_text(&app).starts_with("mkdir: "));
        assert_eq!(app.navigator.row(), row);
    }

    #[test]
    fn test_mkdir_invalid_name() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        press(&mut app, 'm');
        type_text(&mut app, "a/b");
        key(&mut app, KeyCode::Enter);
        assert!(error_text(&app).contains("invalid name"));
        assert!(!home.join("a").exists());
    }

    #[test]
    fn test_new_file() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        press(&mut app, 'n');
        key(&mut app, KeyCode::Enter);
        assert_eq!(error_text(&app), "new file: no file or directory name");

        press(&mut app, 'n');
        type_text(&mut app, "todo.md");
        key(&mut app, KeyCode::Enter);
        assert!(home.join("todo.md").is_file());
        assert!(names(&app).contains(&"todo.md".to_string()));
    }

    #[test]
    fn test_modal_owns_keys() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        press(&mut app, 'm');
        // 'q' and 'h' are typed into the form, not dispatched
        assert!(!press(&mut app, 'q'));
        press(&mut app, 'h');
        assert_eq!(app.navigator.current_path(), home);
        key(&mut app, KeyCode::Enter);
        assert!(home.join("qh").is_dir());
    }

    #[test]
    fn test_modal_escape_cancels() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        press(&mut app, 'm');
        type_text(&mut app, "never");
        key(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert!(!home.join("never").exists());
        assert!(app.message.is_none());
    }

    #[test]
    fn test_copy_emits_event_and_fills_register() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");

        press(&mut app, 'y');
        assert_eq!(app.register.source().unwrap().name, "notes.txt");
        assert_eq!(app.drain_events(), vec![UiEvent::Copied(home.join("notes.txt"))]);
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn test_paste_with_empty_name() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        press(&mut app, 'y');
        let before = names(&app);

        press(&mut app, 'p');
        ctrl(&mut app, 'u');
        key(&mut app, KeyCode::Enter);

        assert_eq!(error_text(&app), "paste: no new name");
        assert_eq!(names(&app), before);
        assert_eq!(fs::read_dir(&home).unwrap().count(), before.len());
    }

    #[test]
    fn test_paste_into_other_directory_twice() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        press(&mut app, 'y');

        select(&mut app, "docs");
        press(&mut app, 'l');
        // Default name is the source's own
        press(&mut app, 'p');
        key(&mut app, KeyCode::Enter);
        assert_eq!(fs::read_to_string(home.join("docs/notes.txt")).unwrap(), "hello\n");

        // The register is not consumed
        press(&mut app, 'p');
        ctrl(&mut app, 'u');
        type_text(&mut app, "again.txt");
        key(&mut app, KeyCode::Enter);
        assert_eq!(names(&app), vec!["again.txt", "notes.txt"]);
    }

    #[test]
    fn test_paste_onto_existing_name_fails() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        press(&mut app, 'y');
        press(&mut app, 'p');
        key(&mut app, KeyCode::Enter);
        assert!(error_text(&app).starts_with("paste: "));
    }

    #[test]
    fn test_paste_without_copy() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        press(&mut app, 'p');
        assert!(app.modal.is_none());
        assert_eq!(error_text(&app), "paste: nothing to paste, copy an entry first");
    }

    #[test]
    fn test_rename_without_selection() {
        let (_dir, home) = tree();
        let mut app = app_at(&home.join("docs"));
        press(&mut app, 'r');
        assert!(app.modal.is_none());
        assert_eq!(error_text(&app), "rename: no file or directory");
    }

    #[test]
    fn test_rename_with_empty_name() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        press(&mut app, 'r');
        key(&mut app, KeyCode::Enter);
        assert_eq!(error_text(&app), "rename: no file name");
        assert!(home.join("notes.txt").exists());
    }

    #[test]
    fn test_rename() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        press(&mut app, 'r');
        type_text(&mut app, "journal.txt");
        key(&mut app, KeyCode::Enter);

        assert!(!home.join("notes.txt").exists());
        assert!(home.join("journal.txt").exists());
        assert!(names(&app).contains(&"journal.txt".to_string()));
    }

    #[test]
    fn test_delete_directory_after_confirm() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "music");

        press(&mut app, 'd');
        assert!(matches!(app.modal, Some(Modal::Confirm(_))));
        key(&mut app, KeyCode::Enter);

        assert!(!home.join("music").exists());
        assert!(!names(&app).contains(&"music".to_string()));
    }

    #[test]
    fn test_delete_last_row_clamps_selection() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");
        let last = app.navigator.row();

        press(&mut app, 'd');
        press(&mut app, 'y');
        assert_eq!(app.navigator.row(), last - 1);
        assert_eq!(app.navigator.current_selection().unwrap().name, "projects");
    }

    #[test]
    fn test_delete_cancelled() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        select(&mut app, "notes.txt");

        press(&mut app, 'd');
        key(&mut app, KeyCode::Esc);
        press(&mut app, 'd');
        press(&mut app, 'n');
        assert!(home.join("notes.txt").exists());
        assert!(app.modal.is_none());
    }

    #[test]
    fn test_edit_runs_editor_between_suspend_and_resume() {
        let (_dir, home) = tree();
        let (mut app, calls) = app_with(&home, Settings::default(), &[("EDITOR", "vim -u NONE")], false);
        select(&mut app, "notes.txt");

        let mut hooks = FakeHooks::default();
        app.handle_key(KeyCode::Char('e'), KeyModifiers::NONE, &mut hooks);

        assert_eq!((hooks.suspended, hooks.resumed), (1, 1));
        let expected = vec![(
            "vim".to_string(),
            vec!["-u".to_string(), "NONE".to_string(), home.join("notes.txt").display().to_string()],
        )];
        assert_eq!(*calls.borrow(), expected);
        assert!(app.message.is_none());
    }

    #[test]
    fn test_edit_without_editor_is_noop() {
        let (_dir, home) = tree();
        let (mut app, calls) = app_with(&home, Settings::default(), &[], false);
        select(&mut app, "notes.txt");

        let mut hooks = FakeHooks::default();
        app.handle_key(KeyCode::Char('e'), KeyModifiers::NONE, &mut hooks);
        assert_eq!(hooks.suspended, 0);
        assert!(calls.borrow().is_empty());
        assert_eq!(app.message.clone().unwrap().text, "$EDITOR is not set");
    }

    #[test]
    fn test_edit_uses_configured_variable() {
        let (_dir, home) = tree();
        let settings = Settings {
            editor_env: "VISUAL".into(),
            ..Settings::default()
        };
        let (mut app, calls) = app_with(&home, settings, &[("EDITOR", "vi"), ("VISUAL", "nano")], false);
        select(&mut app, "notes.txt");
        press(&mut app, 'e');
        assert_eq!(calls.borrow()[0].0, "nano");
    }

    #[test]
    fn test_edit_failure_still_resumes() {
        let (_dir, home) = tree();
        let (mut app, _) = app_with(&home, Settings::default(), &[("EDITOR", "false")], true);
        select(&mut app, "notes.txt");

        let mut hooks = FakeHooks::default();
        app.handle_key(KeyCode::Char('e'), KeyModifiers::NONE, &mut hooks);
        assert_eq!((hooks.suspended, hooks.resumed), (1, 1));
        assert_eq!(error_text(&app), "edit: editor failed: false exited with 1");
    }

    #[test]
    fn test_quit() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);
        assert!(!press(&mut app, 'j'));
        assert!(press(&mut app, 'q'));
    }

    #[test]
    fn test_path_box_go_to() {
        let (_dir, home) = tree();
        let projects = home.join("projects").display().to_string();
        let (mut app, _) = app_with(&home, Settings::default(), &[("PROJ", projects.as_str())], false);
        let history_before = app.navigator.history().len();

        key(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::PathInput);
        // Keys edit the box instead of running commands
        ctrl(&mut app, 'u');
        type_text(&mut app, "${PROJ}/../music");
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Listing);
        assert_eq!(app.navigator.current_path(), home.join("music"));
        assert_eq!(app.path_input.value, home.join("music").display().to_string());
        assert_eq!(app.navigator.history().len(), history_before + 1);
    }

    #[test]
    fn test_path_box_bad_path_keeps_state() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        key(&mut app, KeyCode::Tab);
        ctrl(&mut app, 'u');
        type_text(&mut app, "missing");
        key(&mut app, KeyCode::Enter);

        assert_eq!(app.navigator.current_path(), home);
        assert_eq!(app.focus, Focus::PathInput);
        assert!(error_text(&app).starts_with("go to: "));
    }

    #[test]
    fn test_path_box_escape_restores_text() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        key(&mut app, KeyCode::Tab);
        type_text(&mut app, "zzz");
        key(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::Listing);
        assert_eq!(app.path_input.value, home.display().to_string());

        key(&mut app, KeyCode::Tab);
        key(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Listing);
    }

    #[test]
    fn test_path_box_tab_drops_unsubmitted_edit() {
        let (_dir, home) = tree();
        let mut app = app_at(&home);

        key(&mut app, KeyCode::Tab);
        type_text(&mut app, "/half/typed");
        key(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Listing);
        assert_eq!(app.path_input.value, home.display().to_string());
        assert_eq!(app.navigator.current_path(), home.as_path());
    }

    #[test]
    fn test_history_keys_when_bound() {
        let (_dir, home) = tree();
        let mut settings = Settings::default();
        settings
            .keybindings
            .browser
            .insert(BrowserAction::HistoryBack, vec!["ctrl+o".into()]);
        settings
            .keybindings
            .browser
            .insert(BrowserAction::HistoryForward, vec!["ctrl+p".into()]);
        let (mut app, _) = app_with(&home, settings, &[], false);

        select(&mut app, "music");
        press(&mut app, 'l');
        press(&mut app, 'j');
        let remembered_home_row = app.navigator.memory().recall(&home);

        ctrl(&mut app, 'o');
        assert_eq!(app.navigator.current_path(), home);
        assert_eq!(app.navigator.row(), FIRST_ROW);
        assert_eq!(app.navigator.memory().recall(&home), remembered_home_row);

        ctrl(&mut app, 'p');
        assert_eq!(app.navigator.current_path(), home.join("music"));
        assert_eq!(app.navigator.row(), FIRST_ROW);
    }

    #[test]
    fn test_expand_path() {
        let env = |name: &str| match name {
            "HOME" => Some("/home/alice".to_string()),
            "WORK" => Some("/srv/work".to_string()),
            _ => None,
        };
        assert_eq!(expand_path("$WORK/src", &env), PathBuf::from("/srv/work/src"));
        assert_eq!(expand_path("${WORK}src", &env), PathBuf::from("/srv/worksrc"));
        assert_eq!(expand_path("~", &env), PathBuf::from("/home/alice"));
        assert_eq!(expand_path("~/docs", &env), PathBuf::from("/home/alice/docs"));
        assert_eq!(expand_path("/a/$UNSET/b", &env), PathBuf::from("/a//b"));
        assert_eq!(expand_path("/cost$", &env), PathBuf::from("/cost$"));
        assert_eq!(expand_path("/x/${OPEN", &env), PathBuf::from("/x/${OPEN"));
        assert_eq!(expand_path("  /trimmed  ", &env), PathBuf::from("/trimmed"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d/")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/../..")), PathBuf::from("/"));
    }
}
