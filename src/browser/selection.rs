use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Last highlighted row per directory, kept for the life of the process.
#[derive(Debug, Default)]
pub struct SelectionMemory {
    rows: HashMap<PathBuf, usize>,
}

impl SelectionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, path: &Path, row: usize) {
        self.rows.insert(path.to_path_buf(), row);
    }

    pub fn recall(&self, path: &Path) -> Option<usize> {
        self.rows.get(path).copied()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_and_recall() {
        let mut memory = SelectionMemory::new();
        assert_eq!(memory.recall(Path::new("/home")), None);

        memory.remember(Path::new("/home"), 3);
        memory.remember(Path::new("/home"), 5);
        memory.remember(Path::new("/tmp"), 1);

        assert_eq!(memory.recall(Path::new("/home")), Some(5));
        assert_eq!(memory.recall(Path::new("/tmp")), Some(1));
        assert_eq!(memory.len(), 2);
    }
}
