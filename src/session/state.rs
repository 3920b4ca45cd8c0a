//! Session state machine
//!
//! The session's lifecycle is an explicit state machine with guarded
//! transitions. Terminal outcomes all funnel through [`SessionState::Disposed`];
//! once disposed, no further transition is accepted.

use tracing::debug;

/// Lifecycle state of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing acquired
    Idle,
    /// Stream requested, waiting for the camera
    AwaitingStream,
    /// Live preview showing, waiting for the user
    Previewing,
    /// Take requested, rendering and submitting
    Taking,
    /// User abandoned the session
    Cancelled,
    /// Stream acquisition or delivery failed
    StreamError,
    /// Completion callback or pre-submit hook failed
    CallbackError,
    /// Torn down; terminal
    Disposed,
}

impl SessionState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition(&self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, AwaitingStream) => true,
            (AwaitingStream, Previewing) => true,
            (AwaitingStream, StreamError) => true,
            (AwaitingStream, Cancelled) => true,
            (Previewing, Taking) => true,
            (Previewing, Cancelled) => true,
            (Previewing, StreamError) => true,
            (Taking, CallbackError) => true,
            (Taking, StreamError) => true,
            // Every non-terminal state may dispose directly
            (Idle | AwaitingStream | Previewing | Taking, Disposed) => true,
            (Cancelled | StreamError | CallbackError, Disposed) => true,
            _ => false,
        }
    }

    /// Whether the session has reached an outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Disposed)
    }
}

/// Guarded state holder
#[derive(Debug)]
pub struct SessionStateMachine {
    state: SessionState,
}

impl SessionStateMachine {
    /// New machine in [`SessionState::Idle`]
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Attempt a transition; returns whether it was accepted
    ///
    /// Rejected transitions leave the state unchanged. Rejection is not
    /// an error at this level: disposal races resolve to whichever
    /// transition lands first.
    pub fn transition(&mut self, next: SessionState) -> bool {
        if self.state.can_transition(next) {
            debug!(from = ?self.state, to = ?next, "session state transition");
            self.state = next;
            true
        } else {
            debug!(from = ?self.state, to = ?next, "rejected session state transition");
            false
        }
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn test_happy_path() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(AwaitingStream));
        assert!(sm.transition(Previewing));
        assert!(sm.transition(Taking));
        assert!(sm.transition(Disposed));
        assert!(sm.state().is_terminal());
    }

    #[test]
    fn test_cancel_paths() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(AwaitingStream));
        assert!(sm.transition(Cancelled));
        assert!(sm.transition(Disposed));

        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(AwaitingStream));
        assert!(sm.transition(Previewing));
        assert!(sm.transition(Cancelled));
        assert!(sm.transition(Disposed));
    }

    #[test]
    fn test_disposed_is_terminal() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(Disposed));
        assert!(!sm.transition(AwaitingStream));
        assert!(!sm.transition(Disposed));
        assert_eq!(sm.state(), Disposed);
    }

    #[test]
    fn test_illegal_jumps_rejected() {
        let mut sm = SessionStateMachine::new();
        assert!(!sm.transition(Taking));
        assert!(!sm.transition(Previewing));
        // Nothing can fail out of Idle; errors start at acquisition
        assert!(!sm.transition(StreamError));
        assert_eq!(sm.state(), Idle);
    }

    #[test]
    fn test_hook_failure_path() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.transition(AwaitingStream));
        assert!(sm.transition(Previewing));
        assert!(sm.transition(Taking));
        assert!(sm.transition(CallbackError));
        assert!(sm.transition(Disposed));
    }
}
