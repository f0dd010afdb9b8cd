use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::backend::EditBackend;
use crate::config::StudioConfig;
use crate::error::ShareError;
use crate::session::SessionConfig;
use crate::types::SessionStatus;

/// How a share request was fulfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Published through the backend by server-assigned image id.
    Published { image_id: String },
    /// Degraded result with nothing durable to publish; acknowledged locally.
    Simulated,
}

/// Publishes a finished session's artifact to the public gallery.
///
/// The strong reference comes from the session's own output, so a share can
/// never pick up an image produced by a different session.
pub struct ShareGateway<B: EditBackend> {
    backend: Arc<B>,
    fallback_delay: Duration,
}

impl<B: EditBackend> Clone for ShareGateway<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            fallback_delay: self.fallback_delay,
        }
    }
}

impl<B: EditBackend> ShareGateway<B> {
    pub fn new(backend: Arc<B>, config: &StudioConfig) -> Self {
        Self {
            backend,
            fallback_delay: config.share_fallback_delay,
        }
    }

    /// Share `config`'s output.
    ///
    /// # Errors
    ///
    /// - [`ShareError::NoOutput`] unless the session succeeded with an output url
    /// - [`ShareError::PublishRejected`] if the backend refuses the image id
    /// - [`ShareError::Network`] if the backend is unreachable
    pub async fn share(&self, config: &SessionConfig) -> Result<ShareOutcome, ShareError> {
        let output = match config.output() {
            Some(o) if config.status() == SessionStatus::Succeeded && o.has_usable_url() => o,
            _ => return Err(ShareError::NoOutput),
        };

        match output.remote_image_id.as_deref() {
            Some(image_id) => {
                self.backend.share_image(image_id).await?;
                info!(session_id = %config.session_id, image_id = %image_id, "Image shared");
                Ok(ShareOutcome::Published {
                    image_id: image_id.to_string(),
                })
            }
            None => {
                warn!(
                    session_id = %config.session_id,
                    url = %output.url,
                    "No strong reference for this result, simulating publish"
                );
                tokio::time::sleep(self.fallback_delay).await;
                Ok(ShareOutcome::Simulated)
            }
        }
    }
}
