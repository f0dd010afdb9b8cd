use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{CreateSessionRequest, EditBackend};
use crate::config::StudioConfig;
use crate::error::RemoteProtocolError;
use crate::session::SessionConfig;
use crate::types::GenerationResult;

/// Images requested per generation attempt.
const IMAGES_PER_REQUEST: u32 = 1;

/// Runs the create → attach source image → generate protocol against an
/// [`EditBackend`].
///
/// The three calls are strictly sequential. A failed attach is logged and
/// skipped; a failed create or generate, or a first image without a url,
/// abandons the attempt with a [`RemoteProtocolError`]. Whether that error degrades to the placeholder
/// result or fails the session is the caller's decision, see
/// [`GenerationClient::generate_or_fallback`] and
/// [`crate::DegradationPolicy`].
pub struct GenerationClient<B: EditBackend> {
    backend: Arc<B>,
    fallback_delay: Duration,
    placeholder_url: String,
    user_id: Option<String>,
}

impl<B: EditBackend> Clone for GenerationClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            fallback_delay: self.fallback_delay,
            placeholder_url: self.placeholder_url.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

impl<B: EditBackend> GenerationClient<B> {
    pub fn new(backend: Arc<B>, config: &StudioConfig) -> Self {
        Self {
            backend,
            fallback_delay: config.fallback_delay,
            placeholder_url: config.placeholder_url.clone(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }

    /// Run the primary protocol once. No retries.
    pub async fn generate(
        &self,
        config: &SessionConfig,
    ) -> Result<GenerationResult, RemoteProtocolError> {
        let request = CreateSessionRequest {
            prompt: config.prompt.clone(),
            model_name: config.model_name.as_str().to_string(),
            user_id: self.user_id.clone(),
        };
        let remote_session = self.backend.create_session(&request).await?;
        debug!(
            session_id = %config.session_id,
            remote_session = %remote_session,
            "Created remote edit session"
        );

        if let Some(url) = config.input_image_url.as_deref() {
            if let Err(e) = self
                .backend
                .attach_source_images(&remote_session, &[url.to_string()])
                .await
            {
                // Non-fatal: local preview urls may not be fetchable server-side.
                warn!(
                    session_id = %config.session_id,
                    remote_session = %remote_session,
                    error = %e,
                    "Source image not registered, generating without it"
                );
            }
        }

        let images = self
            .backend
            .generate_images(&remote_session, IMAGES_PER_REQUEST)
            .await?;
        let first = images
            .into_iter()
            .next()
            .ok_or(RemoteProtocolError::EmptyImageList)?;
        if first.url.trim().is_empty() {
            return Err(RemoteProtocolError::InvalidResponse(format!(
                "Generated image {} has no url",
                first.id
            )));
        }

        info!(
            session_id = %config.session_id,
            image_id = %first.id,
            "Generation completed"
        );
        Ok(GenerationResult::remote(first.id, first.url))
    }

    /// The degraded result, delivered after the simulated delay.
    pub async fn fallback(&self) -> GenerationResult {
        tokio::time::sleep(self.fallback_delay).await;
        GenerationResult::degraded(self.placeholder_url.clone())
    }

    /// Run the protocol, substituting the placeholder result on any failure.
    /// Always resolves.
    pub async fn generate_or_fallback(&self, config: &SessionConfig) -> GenerationResult {
        match self.generate(config).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    session_id = %config.session_id,
                    error = %e,
                    "Primary generation path abandoned, using placeholder"
                );
                self.fallback().await
            }
        }
    }
}
