//! Async action state tracking.

/// Outcome of a settled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Ok,
    Error,
}

/// Lifecycle of a fire-and-forget async action: idle, then pending, then
/// settled. Once issued an action runs to completion or failure; there is
/// no cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Pending,
    Settled(TaskOutcome),
}

impl TaskState {
    /// Move to pending unless an action is already outstanding.
    pub fn try_begin(&mut self) -> bool {
        if matches!(self, TaskState::Pending) {
            return false;
        }
        *self = TaskState::Pending;
        true
    }

    pub fn settle_ok(&mut self) {
        *self = TaskState::Settled(TaskOutcome::Ok);
    }

    pub fn settle_err(&mut self) {
        *self = TaskState::Settled(TaskOutcome::Error);
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_reentry_while_pending() {
        let mut state = TaskState::default();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert!(state.is_pending());
    }

    #[test]
    fn test_settled_state_can_begin_again() {
        let mut state = TaskState::default();
        assert!(state.try_begin());
        state.settle_ok();
        assert_eq!(state, TaskState::Settled(TaskOutcome::Ok));
        assert!(state.try_begin());

        state.settle_err();
        assert_eq!(state, TaskState::Settled(TaskOutcome::Error));
        assert!(state.try_begin());
    }
}
