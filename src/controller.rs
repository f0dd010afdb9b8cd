use std::sync::Arc;
use tracing::{error, info, warn};

use crate::backend::EditBackend;
use crate::config::StudioConfig;
use crate::error::{ConfigError, RemoteErrorKind, Result, TransitionError};
use crate::generation::GenerationClient;
use crate::polish::PromptPolisher;
use crate::share::{ShareGateway, ShareOutcome};
use crate::state::{WorkflowEvent, WorkflowState};

/// Decides, per class of remote failure, whether a generation attempt
/// degrades to the placeholder result or fails the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegradationPolicy {
    /// Every remote failure degrades. The session always succeeds.
    #[default]
    DegradeAll,
    /// Transport failures degrade; a backend that answers with an error
    /// status or an unusable body fails the session.
    FailOnStatus,
    /// Every remote failure fails the session.
    FailAll,
}

impl DegradationPolicy {
    pub fn degrades(&self, kind: RemoteErrorKind) -> bool {
        match self {
            DegradationPolicy::DegradeAll => true,
            DegradationPolicy::FailOnStatus => kind == RemoteErrorKind::Transport,
            DegradationPolicy::FailAll => false,
        }
    }
}

/// Coordinates one session through polish → generate → share.
///
/// Every method takes the current [`WorkflowState`] and returns the next
/// one; render [`WorkflowState::directive`] to decide which screen to show.
///
/// # Example
/// ```no_run
/// use edit_session::{HttpBackend, SessionConfig, StudioConfig, WorkflowController, WorkflowState};
///
/// # async fn example() -> edit_session::Result<()> {
/// let config = StudioConfig::from_env();
/// let controller = WorkflowController::new(HttpBackend::from_config(&config), &config);
///
/// let mut state = WorkflowState::open(
///     SessionConfig::new().with_prompt("a cat").with_input_image("blob:abc"),
/// );
/// controller.polish_prompt(&mut state).await?;
///
/// let done = controller.generate(&state).await?;
/// println!("navigate to {}", done.directive().route());
/// # Ok(())
/// # }
/// ```
pub struct WorkflowController<B: EditBackend> {
    generation: GenerationClient<B>,
    gateway: ShareGateway<B>,
    polisher: PromptPolisher,
    policy: DegradationPolicy,
}

impl<B: EditBackend> WorkflowController<B> {
    pub fn new(backend: B, config: &StudioConfig) -> Self {
        let backend = Arc::new(backend);
        Self {
            generation: GenerationClient::new(Arc::clone(&backend), config),
            gateway: ShareGateway::new(backend, config),
            polisher: PromptPolisher::new(config),
            policy: DegradationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DegradationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_polisher(mut self, polisher: PromptPolisher) -> Self {
        self.polisher = polisher;
        self
    }

    pub fn policy(&self) -> DegradationPolicy {
        self.policy
    }

    pub fn generation_client(&self) -> &GenerationClient<B> {
        &self.generation
    }

    pub fn share_gateway(&self) -> &ShareGateway<B> {
        &self.gateway
    }

    /// Replace the prompt of a configuring session with its polished form.
    /// Never fails on remote errors.
    pub async fn polish_prompt(&self, state: &mut WorkflowState) -> Result<()> {
        let status = state.status();
        let config = state.config_mut().ok_or(TransitionError {
            from: status,
            event: "polish",
        })?;
        if config.prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt.into());
        }
        config.prompt = self.polisher.polish(&config.prompt).await;
        Ok(())
    }

    /// Validate and move a configuring session to `RUNNING`. Contacts no
    /// remote service.
    pub fn begin(&self, state: &WorkflowState) -> Result<WorkflowState> {
        state.reduce(WorkflowEvent::Start)
    }

    /// Run the generation attempt for a `RUNNING` session and return its
    /// terminal state.
    ///
    /// The attempt runs on its own task. Dropping the returned future
    /// abandons the attempt: the backend is not told, and whatever it
    /// produces is discarded.
    pub async fn run(&self, running: &WorkflowState) -> Result<WorkflowState> {
        let WorkflowState::Running(config) = running else {
            return Err(TransitionError {
                from: running.status(),
                event: "run",
            }
            .into());
        };

        let client = self.generation.clone();
        let policy = self.policy;
        let snapshot = config.clone();
        let attempt = tokio::spawn(async move {
            match client.generate(&snapshot).await {
                Ok(result) => Ok(result),
                Err(e) if policy.degrades(e.kind()) => {
                    warn!(
                        session_id = %snapshot.session_id,
                        error = %e,
                        "Primary generation path abandoned, using placeholder"
                    );
                    Ok(client.fallback().await)
                }
                Err(e) => Err(e),
            }
        });

        let event = match attempt.await {
            Ok(Ok(result)) => WorkflowEvent::Completed(result),
            Ok(Err(e)) => WorkflowEvent::Errored(e.to_string()),
            Err(e) => {
                error!(session_id = %config.session_id, error = %e, "Generation task aborted");
                WorkflowEvent::Errored(format!("Generation task aborted: {}", e))
            }
        };

        let next = running.reduce(event)?;
        info!(
            session_id = %next.config().session_id,
            status = %next.status(),
            "Generation attempt finished"
        );
        Ok(next)
    }

    /// One "generate" user action: validate, start, run.
    ///
    /// Fails with [`crate::WorkflowError::InvalidConfig`] before any network
    /// call if the prompt is empty or no source image is attached.
    pub async fn generate(&self, state: &WorkflowState) -> Result<WorkflowState> {
        let running = self.begin(state)?;
        self.run(&running).await
    }

    /// Back to the configuration screen with the same parameters.
    pub fn regenerate(&self, state: &WorkflowState) -> Result<WorkflowState> {
        state.reduce(WorkflowEvent::Regenerate)
    }

    /// Back to the configuration screen for full reconfiguration.
    pub fn edit(&self, state: &WorkflowState) -> Result<WorkflowState> {
        state.reduce(WorkflowEvent::Edit)
    }

    /// Publish the session's artifact to the public gallery.
    pub async fn share(&self, state: &WorkflowState) -> Result<ShareOutcome> {
        Ok(self.gateway.share(state.config()).await?)
    }
}
