use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::wizard::Stage;

/// Navigation shell driven by the wizard.
///
/// `advance(None)` moves to the next page, `advance(Some(stage))` jumps to the
/// page of that stage.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send {
    fn advance(&mut self, stage: Option<Stage>);
    fn set_can_advance(&mut self, enabled: bool);
    fn set_can_rewind(&mut self, enabled: bool);
    fn set_can_cancel(&mut self, enabled: bool);
}

/// Snapshot of the shell's buttons and the number of page changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub can_advance: bool,
    pub can_rewind: bool,
    pub can_cancel: bool,
    pub page_changes: usize,
    pub last_jump: Option<Stage>,
}

/// Navigator for the command line: there are no buttons, so it records their
/// state for the command driving the wizard and logs every change.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNavigator {
    state: Arc<Mutex<NavigationState>>,
}

impl ConsoleNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the navigation state, readable after the navigator was
    /// handed to the wizard.
    pub fn state(&self) -> Arc<Mutex<NavigationState>> {
        self.state.clone()
    }

    pub fn snapshot(state: &Mutex<NavigationState>) -> NavigationState {
        state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, change: impl FnOnce(&mut NavigationState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        change(&mut state);
    }
}

impl Navigator for ConsoleNavigator {
    fn advance(&mut self, stage: Option<Stage>) {
        match stage {
            Some(stage) => debug!("Jumping to page: {}", stage),
            None => debug!("Advancing to next page"),
        }
        self.update(|state| {
            state.page_changes += 1;
            state.last_jump = stage;
        });
    }

    fn set_can_advance(&mut self, enabled: bool) {
        debug!("Forward navigation enabled: {}", enabled);
        self.update(|state| state.can_advance = enabled);
    }

    fn set_can_rewind(&mut self, enabled: bool) {
        debug!("Backward navigation enabled: {}", enabled);
        self.update(|state| state.can_rewind = enabled);
    }

    fn set_can_cancel(&mut self, enabled: bool) {
        debug!("Cancel enabled: {}", enabled);
        self.update(|state| state.can_cancel = enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_navigator_tracks_flags() {
        let mut navigator = ConsoleNavigator::new();
        let state = navigator.state();

        navigator.set_can_advance(true);
        navigator.set_can_rewind(true);
        navigator.set_can_cancel(false);

        let snapshot = ConsoleNavigator::snapshot(&state);
        assert!(snapshot.can_advance);
        assert!(snapshot.can_rewind);
        assert!(!snapshot.can_cancel);
    }

    #[test]
    fn test_console_navigator_counts_page_changes() {
        let mut navigator = ConsoleNavigator::new();
        let state = navigator.state();

        navigator.advance(None);
        navigator.advance(Some(Stage::ShowingResults));

        let snapshot = ConsoleNavigator::snapshot(&state);
        assert_eq!(snapshot.page_changes, 2);
        assert_eq!(snapshot.last_jump, Some(Stage::ShowingResults));
    }

    #[test]
    fn test_mock_navigator() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_set_can_advance()
            .with(mockall::predicate::eq(false))
            .times(1)
            .return_const(());
        navigator.set_can_advance(false);
    }
}
