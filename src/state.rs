//! Session status state machine.
//!
//! [`WorkflowState`] is a tagged union over the session lifecycle and
//! [`WorkflowState::reduce`] is a pure `(state, event) -> state` function.
//! The only output consumed by the presentation layer is the
//! [`NavigationDirective`] of the current state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TransitionError, WorkflowError};
use crate::session::SessionConfig;
use crate::types::{GenerationResult, SessionStatus};

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    /// A generation attempt begins.
    Start,
    /// The attempt produced an artifact (real or degraded).
    Completed(GenerationResult),
    /// The attempt hit a local error outside the handled fallback.
    Errored(String),
    /// Run again with the same parameters.
    Regenerate,
    /// Return to the configuration screen to change parameters.
    Edit,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::Start => "start",
            WorkflowEvent::Completed(_) => "completed",
            WorkflowEvent::Errored(_) => "errored",
            WorkflowEvent::Regenerate => "regenerate",
            WorkflowEvent::Edit => "edit",
        }
    }
}

/// Current position of one session in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    /// `CREATED`: parameters are editable.
    Configuring(SessionConfig),
    /// `RUNNING`: parameters are frozen while the attempt is in flight.
    Running(SessionConfig),
    /// `SUCCEEDED`: the config carries the artifact.
    Succeeded(SessionConfig),
    /// `FAILED`: no artifact; `reason` is shown next to the form.
    Failed {
        config: SessionConfig,
        reason: String,
    },
}

impl WorkflowState {
    /// Open the configuration screen for `config`.
    ///
    /// A config hydrated from an earlier run (reused prompt, retry after
    /// failure) keeps its id and parameters but is reset to `CREATED` and
    /// loses any previous output.
    pub fn open(mut config: SessionConfig) -> Self {
        config.reset();
        WorkflowState::Configuring(config)
    }

    pub fn status(&self) -> SessionStatus {
        self.config().status()
    }

    pub fn config(&self) -> &SessionConfig {
        match self {
            WorkflowState::Configuring(c)
            | WorkflowState::Running(c)
            | WorkflowState::Succeeded(c)
            | WorkflowState::Failed { config: c, .. } => c,
        }
    }

    /// Mutable access to the parameters, only while configuring.
    pub fn config_mut(&mut self) -> Option<&mut SessionConfig> {
        match self {
            WorkflowState::Configuring(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_config(self) -> SessionConfig {
        match self {
            WorkflowState::Configuring(c)
            | WorkflowState::Running(c)
            | WorkflowState::Succeeded(c)
            | WorkflowState::Failed { config: c, .. } => c,
        }
    }

    /// The produced artifact, present only in `Succeeded`.
    pub fn artifact(&self) -> Option<&GenerationResult> {
        match self {
            WorkflowState::Succeeded(c) => c.output(),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            WorkflowState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Apply `event`, returning the next state. `self` is left untouched, so
    /// a rejected event leaves the caller's state valid.
    ///
    /// `Start` is guarded by [`SessionConfig::validate`]. A `Completed`
    /// result without a usable url moves to `Failed`.
    pub fn reduce(&self, event: WorkflowEvent) -> Result<WorkflowState, WorkflowError> {
        let from = self.status();
        let next = match (self, event) {
            (WorkflowState::Configuring(c), WorkflowEvent::Start) => {
                c.validate()?;
                let mut c = c.clone();
                c.mark_running();
                WorkflowState::Running(c)
            }
            (WorkflowState::Running(c), WorkflowEvent::Completed(result)) => {
                let mut c = c.clone();
                if result.has_usable_url() {
                    c.mark_succeeded(result);
                    WorkflowState::Succeeded(c)
                } else {
                    c.mark_failed();
                    WorkflowState::Failed {
                        config: c,
                        reason: "Generation returned no usable image url".to_string(),
                    }
                }
            }
            (WorkflowState::Running(c), WorkflowEvent::Errored(reason)) => {
                let mut c = c.clone();
                c.mark_failed();
                WorkflowState::Failed { config: c, reason }
            }
            (
                WorkflowState::Succeeded(c) | WorkflowState::Failed { config: c, .. },
                WorkflowEvent::Regenerate | WorkflowEvent::Edit,
            ) => WorkflowState::open(c.clone()),
            (_, event) => {
                return Err(TransitionError {
                    from,
                    event: event.name(),
                }
                .into())
            }
        };

        debug!(
            session_id = %next.config().session_id,
            from = %from,
            to = %next.status(),
            "Session transition"
        );
        debug_assert!(next.config().is_consistent());
        Ok(next)
    }

    /// Which screen to show for this state, with the session as payload.
    pub fn directive(&self) -> NavigationDirective {
        match self {
            WorkflowState::Configuring(c) | WorkflowState::Failed { config: c, .. } => {
                NavigationDirective::Edit(c.clone())
            }
            WorkflowState::Running(c) => NavigationDirective::Generating(c.clone()),
            WorkflowState::Succeeded(c) => NavigationDirective::Result(c.clone()),
        }
    }
}

/// Instruction to the presentation layer: the next screen and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "session", rename_all = "camelCase")]
pub enum NavigationDirective {
    /// Configuration screen. The session status is `CREATED` or `FAILED`.
    Edit(SessionConfig),
    /// Progress screen while the attempt runs.
    Generating(SessionConfig),
    /// Result screen with the finished artifact.
    Result(SessionConfig),
}

impl NavigationDirective {
    pub fn route(&self) -> &'static str {
        match self {
            NavigationDirective::Edit(_) => "/edit",
            NavigationDirective::Generating(_) => "/generating",
            NavigationDirective::Result(_) => "/result",
        }
    }

    pub fn session(&self) -> &SessionConfig {
        match self {
            NavigationDirective::Edit(c)
            | NavigationDirective::Generating(c)
            | NavigationDirective::Result(c) => c,
        }
    }

    pub fn into_session(self) -> SessionConfig {
        match self {
            NavigationDirective::Edit(c)
            | NavigationDirective::Generating(c)
            | NavigationDirective::Result(c) => c,
        }
    }
}
