mod browser;
mod config;
mod error;
mod keybindings;
mod services;
mod ui;
mod utils;

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::Settings;
use crate::ui::app::{App, TerminalHooks};
use crate::ui::panel::ListingView;
use crate::ui::theme::Theme;

const VERSION: &str = env!("CARGO_PKG_VERSION");

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn print_help() {
    println!("ffnav {} - Terminal file browser", VERSION);
    println!();
    println!("USAGE:");
    println!("    ffnav [OPTIONS] [PATH]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help              Print help information");
    println!("    -v, --version           Print version information");
    println!();
    println!("Settings and log live in ~/.ffnav/");
}

fn print_version() {
    println!("ffnav {}", VERSION);
}

/// Log to ~/.ffnav/ffnav.log; the terminal belongs to the UI.
fn init_logging(settings: &Settings) {
    let Some(log_path) = Settings::log_path() else {
        return;
    };
    if let Some(dir) = log_path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(settings.tracing_level())
        .try_init();
}

/// Restores the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leaves the alternate screen while an editor runs.
struct CrosstermHooks<'a> {
    terminal: &'a mut Tui,
}

impl TerminalHooks for CrosstermHooks<'_> {
    fn suspend(&mut self) -> io::Result<()> {
        restore_terminal(self.terminal)
    }

    fn resume(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()
    }
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut cli_path = None;
    if let Some(arg) = args.get(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                print_version();
                return Ok(());
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Use --help for usage information");
                return Ok(());
            }
            path => cli_path = Some(path.to_string()),
        }
    }

    let (settings, settings_error) = match Settings::load_with_error() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(&settings);
    if let Some(ref e) = settings_error {
        tracing::warn!(error = %e, "using default settings");
    }

    let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    // Relative command-line paths are taken from the working directory
    let requested = cli_path
        .map(|p| current_dir.join(p).display().to_string())
        .or_else(|| settings.start_path.clone());
    let start = settings.resolve_path(requested.as_deref(), || current_dir.clone());
    tracing::info!(path = %start.display(), "starting");

    let mut app = App::new(&start, settings).map_err(|e| io::Error::other(e.to_string()))?;
    if let Some(e) = settings_error {
        app.show_message(format!("{} (using defaults)", e));
    }

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    if let Err(err) = result {
        tracing::error!(error = %err, "terminal failure");
        eprintln!("Error: {}", err);
    }
    Ok(())
}

fn run_app(terminal: &mut Tui, app: &mut App) -> io::Result<()> {
    let theme = Theme::default();
    let mut view = ListingView::new();

    loop {
        view.apply(app.drain_events());
        terminal.draw(|f| ui::draw::draw(f, app, &view, &theme))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            // Windows also reports key releases
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let mut hooks = CrosstermHooks { terminal: &mut *terminal };
            if app.handle_key(key.code, key.modifiers, &mut hooks) {
                return Ok(());
            }
        }
    }
}
