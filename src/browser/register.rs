use super::entry::Entry;

/// Single-slot clipboard.
///
/// Pasting reads the source without clearing it, so one copy can be pasted
/// any number of times until the next copy replaces it.
#[derive(Debug, Default)]
pub struct Register {
    copy_source: Option<Entry>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, entry: Entry) {
        self.copy_source = Some(entry);
    }

    pub fn source(&self) -> Option<&Entry> {
        self.copy_source.as_ref()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.copy_source.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_overwrites_and_source_is_not_consumed() {
        let mut register = Register::new();
        assert!(register.is_empty());

        register.copy(Entry::new("a", "/a", false));
        register.copy(Entry::new("b", "/b", true));

        assert_eq!(register.source().map(|e| e.name.as_str()), Some("b"));
        assert_eq!(register.source().map(|e| e.name.as_str()), Some("b"));
        assert!(!register.is_empty());
    }
}
