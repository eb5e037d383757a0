use std::io;
use std::path::Path;
use std::process::Command;

use crate::error::CommandError;

/// Runs a child process that takes over the terminal until it exits.
pub trait ProcessLauncher {
    fn run_interactive(&mut self, program: &str, args: &[String]) -> Result<(), CommandError>;
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run_interactive(&mut self, program: &str, args: &[String]) -> Result<(), CommandError> {
        let status = Command::new(program).args(args).status().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CommandError::Editor(format!("{}: command not found", program))
            } else {
                CommandError::Io(e)
            }
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Editor(format!("{} exited with {}", program, status)))
        }
    }
}

/// Split an editor setting such as `"code --wait"` into program and
/// arguments, then append the file to edit.
///
/// Returns `None` for a blank setting.
pub fn editor_invocation(editor: &str, file: &Path) -> Option<(String, Vec<String>)> {
    let mut parts = editor.split_whitespace();
    let program = parts.next()?.to_string();
    let mut args: Vec<String> = parts.map(str::to_string).collect();
    args.push(file.display().to_string());
    Some((program, args))
}
