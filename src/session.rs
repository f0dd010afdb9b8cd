use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::ConfigError;
use crate::types::{GenerationResult, ModelName, Sampler, SessionStatus};

pub const CFG_SCALE_RANGE: RangeInclusive<f64> = 1.0..=20.0;
pub const STEPS_RANGE: RangeInclusive<u32> = 10..=150;
pub const STRENGTH_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Upper bound (exclusive) for randomly chosen default seeds.
const DEFAULT_SEED_SPAN: u64 = 100_000;

/// The full parameter set for one user-requested image generation.
///
/// Parameters are plain fields and may be edited while the session is
/// `CREATED`. `status` and `output` are owned by the state machine: `output`
/// is present exactly when `status` is `SUCCEEDED`.
///
/// Numeric parameters outside their documented ranges are a caller bug; the
/// `with_*` setters check them with `debug_assert!` only.
///
/// # Example
/// ```
/// use edit_session::{ModelName, SessionConfig, SessionStatus};
///
/// let config = SessionConfig::new()
///     .with_prompt("a cat")
///     .with_model(ModelName::StableDiffusionV15)
///     .with_input_image("blob:abc");
///
/// assert_eq!(config.status(), SessionStatus::Created);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session_id: String,
    pub prompt: String,
    pub model_name: ModelName,
    pub sampler: Sampler,
    pub cfg_scale: f64,
    pub steps: u32,
    pub strength: f64,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image_url: Option<String>,
    status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<GenerationResult>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// A fresh session with a new id, default parameters, and a random seed.
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            prompt: String::new(),
            model_name: ModelName::default(),
            sampler: Sampler::default(),
            cfg_scale: 7.5,
            steps: 20,
            strength: 0.8,
            seed: rand::rng().random_range(0..DEFAULT_SEED_SPAN),
            input_image_url: None,
            status: SessionStatus::Created,
            output: None,
        }
    }

    /// Start a new session from a published prompt, reusing its preview
    /// image as the source image when it has one.
    pub fn from_published_prompt(content: impl Into<String>, preview_image_url: Option<String>) -> Self {
        Self {
            prompt: content.into(),
            input_image_url: preview_image_url,
            ..Self::new()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: ModelName) -> Self {
        self.model_name = model;
        self
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_cfg_scale(mut self, cfg: f64) -> Self {
        debug_assert!(CFG_SCALE_RANGE.contains(&cfg), "cfg_scale out of range: {}", cfg);
        self.cfg_scale = cfg;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        debug_assert!(STEPS_RANGE.contains(&steps), "steps out of range: {}", steps);
        self.steps = steps;
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        debug_assert!(STRENGTH_RANGE.contains(&strength), "strength out of range: {}", strength);
        self.strength = strength;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Attach the locally-held source image (e.g. a `blob:` preview url).
    pub fn with_input_image(mut self, url: impl Into<String>) -> Self {
        self.input_image_url = Some(url.into());
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The produced artifact, including its strong reference if any.
    pub fn output(&self) -> Option<&GenerationResult> {
        self.output.as_ref()
    }

    pub fn output_image_url(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.url.as_str())
    }

    pub fn remote_image_id(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.remote_image_id.as_deref())
    }

    /// Check the preconditions for starting a generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug_assert!(self.parameters_in_range(), "session parameters out of range");
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        match self.input_image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingSourceImage),
        }
    }

    pub fn parameters_in_range(&self) -> bool {
        CFG_SCALE_RANGE.contains(&self.cfg_scale)
            && STEPS_RANGE.contains(&self.steps)
            && STRENGTH_RANGE.contains(&self.strength)
    }

    /// `output` is set if and only if the session succeeded.
    pub fn is_consistent(&self) -> bool {
        self.output.is_some() == (self.status == SessionStatus::Succeeded)
    }

    /// File name offered when the user downloads the result.
    pub fn download_file_name(&self) -> String {
        format!("generation-{}.jpg", self.session_id)
    }

    pub(crate) fn mark_running(&mut self) {
        self.status = SessionStatus::Running;
        self.output = None;
    }

    pub(crate) fn mark_succeeded(&mut self, result: GenerationResult) {
        self.status = SessionStatus::Succeeded;
        self.output = Some(result);
    }

    pub(crate) fn mark_failed(&mut self) {
        self.status = SessionStatus::Failed;
        self.output = None;
    }

    /// Back to `CREATED` keeping id and parameters, dropping any output.
    pub(crate) fn reset(&mut self) {
        self.status = SessionStatus::Created;
        self.output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.model_name, ModelName::StableDiffusionV15);
        assert_eq!(config.sampler, Sampler::EulerAncestral);
        assert_eq!(config.cfg_scale, 7.5);
        assert_eq!(config.steps, 20);
        assert_eq!(config.strength, 0.8);
        assert!(config.seed < DEFAULT_SEED_SPAN);
        assert_eq!(config.status(), SessionStatus::Created);
        assert!(config.output().is_none());
        assert!(config.parameters_in_range());
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionConfig::new().session_id, SessionConfig::new().session_id);
    }

    #[test]
    fn test_validate_empty_prompt() {
        let config = SessionConfig::new().with_input_image("blob:abc");
        assert_eq!(config.validate(), Err(ConfigError::EmptyPrompt));

        let blank = config.with_prompt("   ");
        assert_eq!(blank.validate(), Err(ConfigError::EmptyPrompt));
    }

    #[test]
    fn test_validate_missing_image() {
        let config = SessionConfig::new().with_prompt("a cat");
        assert_eq!(config.validate(), Err(ConfigError::MissingSourceImage));
    }

    #[test]
    fn test_from_published_prompt() {
        let config = SessionConfig::from_published_prompt(
            "neon city at dusk",
            Some("https://cdn/preview.png".to_string()),
        );
        assert_eq!(config.prompt, "neon city at dusk");
        assert_eq!(config.input_image_url.as_deref(), Some("https://cdn/preview.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_tracks_status() {
        let mut config = SessionConfig::new().with_prompt("a cat").with_input_image("blob:abc");
        config.mark_running();
        assert!(config.is_consistent());
        config.mark_succeeded(GenerationResult::remote("img-9", "https://cdn/9.png"));
        assert!(config.is_consistent());
        assert_eq!(config.output_image_url(), Some("https://cdn/9.png"));
        assert_eq!(config.remote_image_id(), Some("img-9"));
        config.reset();
        assert!(config.is_consistent());
        assert!(config.output_image_url().is_none());
    }

    #[test]
    fn test_download_file_name() {
        let mut config = SessionConfig::new();
        config.session_id = "abc-123".into();
        assert_eq!(config.download_file_name(), "generation-abc-123.jpg");
    }

    #[test]
    fn test_payload_json_shape() {
        let mut config = SessionConfig::new()
            .with_prompt("a cat")
            .with_input_image("blob:abc")
            .with_seed(42);
        config.mark_running();
        config.mark_succeeded(GenerationResult::degraded("https://picsum.photos/512/512"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["status"], "SUCCEEDED");
        assert_eq!(json["modelName"], "Stable-Diffusion-v1-5");
        assert_eq!(json["inputImageUrl"], "blob:abc");
        assert_eq!(json["output"]["url"], "https://picsum.photos/512/512");

        let back: SessionConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
