//! # edit-session
//!
//! Async edit-session workflow for a prompt-driven image generation app:
//! configure a request, optionally polish the prompt, run the remote
//! generation protocol, and publish the result to the public gallery.
//!
//! ## Features
//!
//! - **Three-step remote protocol**: create session → attach source image →
//!   generate, strictly sequential, with a non-fatal attach step
//! - **Guaranteed termination**: remote failures degrade to a fixed
//!   placeholder result under a configurable [`DegradationPolicy`]
//! - **Explicit state machine**: [`WorkflowState`] with a pure reducer and a
//!   [`NavigationDirective`] telling the UI which screen to show
//! - **Strong-reference sharing**: the server-assigned image id travels with
//!   the session and is read from there when publishing
//! - **Advisory prompt polishing**: an LLM rewrite that silently falls back
//!   to a template
//!
//! ## Quick Start
//!
//! ```no_run
//! use edit_session::{
//!     HttpBackend, ModelName, SessionConfig, StudioConfig, WorkflowController, WorkflowState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StudioConfig::builder()
//!         .with_endpoint("http://localhost:5000")
//!         .build();
//!     let controller = WorkflowController::new(HttpBackend::from_config(&config), &config);
//!
//!     let state = WorkflowState::open(
//!         SessionConfig::new()
//!             .with_prompt("a cat")
//!             .with_model(ModelName::StableDiffusionV15)
//!             .with_input_image("blob:abc"),
//!     );
//!
//!     let done = controller.generate(&state).await?;
//!     println!("{:?}", done.config().output_image_url());
//!
//!     controller.share(&done).await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod polish;
pub mod session;
pub mod share;
pub mod state;
pub mod types;

pub use backend::{CreateSessionRequest, EditBackend, HttpBackend};
pub use config::{StudioConfig, StudioConfigBuilder, DEFAULT_PLACEHOLDER_URL};
pub use controller::{DegradationPolicy, WorkflowController};
pub use error::{
    ConfigError, PolishError, RemoteErrorKind, RemoteProtocolError, Result, ShareError,
    TransitionError, WorkflowError,
};
pub use generation::GenerationClient;
pub use polish::PromptPolisher;
pub use session::SessionConfig;
pub use share::{ShareGateway, ShareOutcome};
pub use state::{NavigationDirective, WorkflowEvent, WorkflowState};
pub use types::{GeneratedImage, GenerationResult, ModelName, Sampler, SessionStatus};
