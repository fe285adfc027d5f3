use std::time::Instant;

use jobfill_core::ProfileFieldPath;
use tracing::debug;

/// Per-field progress through a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Unresolved,
    Skipped,
    Detecting,
    NotFound,
    Found,
    NotInteractable,
    Interactable,
    Setting,
    Success,
    SetFailed,
}

impl FieldState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FieldState::Skipped
                | FieldState::NotFound
                | FieldState::NotInteractable
                | FieldState::Success
                | FieldState::SetFailed
        )
    }

    /// Edges of the per-field state machine
    pub fn can_transition_to(&self, next: FieldState) -> bool {
        use FieldState::*;
        matches!(
            (self, next),
            (Unresolved, Skipped)
                | (Unresolved, Detecting)
                | (Unresolved, SetFailed)
                | (Detecting, NotFound)
                | (Detecting, Found)
                | (Found, NotInteractable)
                | (Found, Interactable)
                | (Interactable, Setting)
                | (Setting, Success)
                | (Setting, SetFailed)
        )
    }
}

#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: FieldState,
    pub to: FieldState,
    pub details: Option<String>,
}

/// Transition log for one field
#[derive(Debug)]
pub struct FieldContext {
    pub path: ProfileFieldPath,
    pub state: FieldState,
    pub evidence: Vec<StateTransition>,
    pub started_at: Instant,
}

impl FieldContext {
    pub fn new(path: ProfileFieldPath) -> Self {
        Self {
            path,
            state: FieldState::Unresolved,
            evidence: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn transition(&mut self, next: FieldState, details: Option<String>) {
        if !self.state.can_transition_to(next) {
            debug!("{}: unexpected transition {:?} -> {:?}", self.path, self.state, next);
        }
        debug!(
            "{}: {:?} -> {:?}{}",
            self.path,
            self.state,
            next,
            details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default()
        );

        self.evidence.push(StateTransition {
            from: self.state,
            to: next,
            details,
        });
        self.state = next;
    }

    pub fn duration(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
