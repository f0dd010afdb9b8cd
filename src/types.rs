use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session lifecycle: Created -> Running -> Succeeded/Failed, with an explicit
/// reset back to Created for regenerate and edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Created,
    Running,
    Succeeded,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "CREATED",
            SessionStatus::Running => "RUNNING",
            SessionStatus::Succeeded => "SUCCEEDED",
            SessionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(SessionStatus::Created),
            "RUNNING" => Some(SessionStatus::Running),
            "SUCCEEDED" => Some(SessionStatus::Succeeded),
            "FAILED" => Some(SessionStatus::Failed),
            _ => None,
        }
    }

    /// Succeeded and Failed end a run; both still admit a reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Succeeded | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation models offered to the user. Display names go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelName {
    #[default]
    #[serde(rename = "Stable-Diffusion-v1-5")]
    StableDiffusionV15,
    #[serde(rename = "DALL-E-2")]
    DallE2,
    #[serde(rename = "Midjourney-v4")]
    MidjourneyV4,
}

impl ModelName {
    pub const ALL: [ModelName; 3] = [
        ModelName::StableDiffusionV15,
        ModelName::DallE2,
        ModelName::MidjourneyV4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::StableDiffusionV15 => "Stable-Diffusion-v1-5",
            ModelName::DallE2 => "DALL-E-2",
            ModelName::MidjourneyV4 => "Midjourney-v4",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown model '{}'", s))
    }
}

/// Sampling algorithms offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sampler {
    #[default]
    #[serde(rename = "Euler a")]
    EulerAncestral,
    #[serde(rename = "DPM++")]
    DpmPlusPlus,
    #[serde(rename = "LMS")]
    Lms,
    #[serde(rename = "DDIM")]
    Ddim,
}

impl Sampler {
    pub const ALL: [Sampler; 4] = [
        Sampler::EulerAncestral,
        Sampler::DpmPlusPlus,
        Sampler::Lms,
        Sampler::Ddim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sampler::EulerAncestral => "Euler a",
            Sampler::DpmPlusPlus => "DPM++",
            Sampler::Lms => "LMS",
            Sampler::Ddim => "DDIM",
        }
    }
}

impl fmt::Display for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sampler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sampler::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown sampler '{}'", s))
    }
}

/// The artifact produced by one generation attempt.
///
/// `remote_image_id` is the strong reference assigned by the backend; it is
/// absent for degraded results, which can only be published best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_image_id: Option<String>,
    pub url: String,
}

impl GenerationResult {
    /// A result backed by a server-assigned image id.
    pub fn remote(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            remote_image_id: Some(id.into()),
            url: url.into(),
        }
    }

    /// A placeholder result with no strong reference.
    pub fn degraded(url: impl Into<String>) -> Self {
        Self {
            remote_image_id: None,
            url: url.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.remote_image_id.is_none()
    }

    /// Whether the url can be shown to the user at all.
    pub fn has_usable_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// An image entry returned by the generate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            SessionStatus::Created,
            SessionStatus::Running,
            SessionStatus::Succeeded,
            SessionStatus::Failed,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("completed"), None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&SessionStatus::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionStatus::Succeeded.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Running.is_terminal());
        assert!(!SessionStatus::Created.is_terminal());
    }

    #[test]
    fn test_model_name_wire_format() {
        let json = serde_json::to_string(&ModelName::StableDiffusionV15).unwrap();
        assert_eq!(json, "\"Stable-Diffusion-v1-5\"");
        assert_eq!(ModelName::default(), ModelName::StableDiffusionV15);
        assert_eq!("DALL-E-2".parse::<ModelName>(), Ok(ModelName::DallE2));
        assert!("dall-e-3".parse::<ModelName>().is_err());
    }

    #[test]
    fn test_sampler_parse() {
        assert_eq!("Euler a".parse::<Sampler>(), Ok(Sampler::EulerAncestral));
        assert_eq!(Sampler::default().as_str(), "Euler a");
        let s: Sampler = serde_json::from_str("\"DDIM\"").unwrap();
        assert_eq!(s, Sampler::Ddim);
    }

    #[test]
    fn test_generation_result_constructors() {
        let real = GenerationResult::remote("img-1", "https://cdn/img-1.png");
        assert!(!real.is_degraded());
        let fallback = GenerationResult::degraded("https://picsum.photos/512/512");
        assert!(fallback.is_degraded());
        assert!(!GenerationResult::degraded("  ").has_usable_url());
    }

    #[test]
    fn test_generation_result_omits_missing_id() {
        let json = serde_json::to_string(&GenerationResult::degraded("u")).unwrap();
        assert_eq!(json, r#"{"url":"u"}"#);
    }
}
