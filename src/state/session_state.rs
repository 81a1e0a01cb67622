/// Session state definitions for tracking crawl progress
///
/// A crawl session moves strictly forward: `Init -> Running -> Done`. There
/// is no error state; page failures are absorbed inside `Running`.
use crate::SiftError;
use std::fmt;

/// Represents the lifecycle state of one crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Session created, frontier not seeded yet
    #[default]
    Init,

    /// Frontier seeded, traversal loop in progress
    Running,

    /// Loop exited (frontier empty or page budget reached)
    Done,
}

impl SessionState {
    /// Returns true if `next` is the single legal successor of this state
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Running) | (Self::Running, Self::Done)
        )
    }

    /// Moves to `next`, rejecting anything but the forward step
    pub fn transition(&mut self, next: SessionState) -> Result<(), SiftError> {
        if !self.can_transition_to(next) {
            return Err(SiftError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Returns true once the session has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
