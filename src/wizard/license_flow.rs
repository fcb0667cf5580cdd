/// Cursor over the plugins whose license must be shown, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseFlow {
    ids: Vec<String>,
    cursor: usize,
}

impl LicenseFlow {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids, cursor: 0 }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.ids.get(self.cursor).map(String::as_str)
    }

    /// Moves to the next license. Returns `false` when the cursor ran past the
    /// last one.
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.ids.len() {
            self.cursor += 1;
        }
        self.cursor < self.ids.len()
    }

    /// Moves to the previous license. The cursor never goes below the first
    /// one; returns whether it moved.
    pub fn retreat(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn can_retreat(&self) -> bool {
        self.cursor > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(ids: &[&str]) -> LicenseFlow {
        LicenseFlow::new(ids.iter().map(|id| id.to_string()).collect())
    }

    #[test]
    fn test_empty_flow() {
        let mut flow = flow(&[]);
        assert!(flow.is_empty());
        assert_eq!(flow.current(), None);
        assert!(!flow.advance());
        assert!(!flow.retreat());
    }

    #[test]
    fn test_advance_past_end() {
        let mut flow = flow(&["a", "c"]);
        assert_eq!(flow.current(), Some("a"));
        assert!(flow.advance());
        assert_eq!(flow.current(), Some("c"));
        assert!(!flow.advance());
        assert_eq!(flow.current(), None);
    }

    #[test]
    fn test_retreat_is_clamped_at_first() {
        let mut flow = flow(&["a", "c"]);
        assert!(!flow.retreat());
        assert_eq!(flow.position(), 0);
        flow.advance();
        assert!(flow.can_retreat());
        assert!(flow.retreat());
        assert_eq!(flow.current(), Some("a"));
        assert!(!flow.can_retreat());
    }
}
