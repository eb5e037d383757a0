use thiserror::Error;

/// Failure of a single browser command.
///
/// None of these are fatal: the dispatcher logs them, shows them in the
/// status line and returns to normal input.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no directory name")]
    NoDirName,

    #[error("no file name")]
    NoFileName,

    #[error("no file or directory name")]
    NoFileOrDirName,

    #[error("no file or directory")]
    NoFileOrDir,

    #[error("no new name")]
    NoNewName,

    #[error("nothing to paste, copy an entry first")]
    NothingToPaste,

    #[error("invalid name: {0}")]
    InvalidName(&'static str),

    #[error("editor failed: {0}")]
    Editor(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// True for errors produced by the command's own input checks rather
    /// than by the filesystem or the editor process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CommandError::NoDirName
                | CommandError::NoFileName
                | CommandError::NoFileOrDirName
                | CommandError::NoFileOrDir
                | CommandError::NoNewName
                | CommandError::NothingToPaste
                | CommandError::InvalidName(_)
        )
    }
}
