use thiserror::Error;

use crate::types::SessionStatus;

/// Broad class of a remote failure, used by the degradation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The request never produced a response (connect, timeout, TLS).
    Transport,
    /// The backend answered with a non-success status.
    Status,
    /// The backend answered 2xx but the body was unusable.
    Malformed,
}

/// Failure of one step of the create → attach → generate protocol.
#[derive(Error, Debug)]
pub enum RemoteProtocolError {
    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// The backend returned a non-success HTTP status.
    #[error("Edit backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// The generate call succeeded but produced no images.
    #[error("Generation returned an empty image list")]
    EmptyImageList,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RemoteProtocolError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteProtocolError::Network { .. } => RemoteErrorKind::Transport,
            RemoteProtocolError::Http { .. } => RemoteErrorKind::Status,
            RemoteProtocolError::InvalidResponse(_)
            | RemoteProtocolError::EmptyImageList
            | RemoteProtocolError::Json(_) => RemoteErrorKind::Malformed,
        }
    }
}

/// Prompt polishing failed. Always absorbed by [`crate::PromptPolisher::polish`].
#[derive(Error, Debug)]
pub enum PolishError {
    #[error("No API key configured for the polish service")]
    NotConfigured,

    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    #[error("Polish service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Polish service returned no text")]
    EmptyCompletion,
}

/// Publishing a result to the public gallery failed.
#[derive(Error, Debug)]
pub enum ShareError {
    /// The session has not produced an output image.
    #[error("No image to share")]
    NoOutput,

    /// The backend refused to publish the image.
    #[error("Share rejected with HTTP {status}: {body}")]
    PublishRejected { status: u16, body: String },

    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },
}

/// A generation precondition does not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("A source image is required before generating")]
    MissingSourceImage,
}

/// An event was fed to the state machine in a state that does not accept it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot apply '{event}' while session is {from}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub event: &'static str,
}

/// Errors surfaced by the workflow controller.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Share(#[from] ShareError),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
