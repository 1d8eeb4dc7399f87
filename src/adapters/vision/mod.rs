//! Vision model gateway: one `VisionModel` contract, two backends.
//!
//! Both backends send an instruction and a JPEG in a single multimodal
//! request and hand back the model's text with any markdown code fence
//! removed, so the caller always sees the bare JSON payload.

pub mod gemini;
pub mod openai;

use crate::config::{ModelConfig, VisionConfig};
use crate::domain::ports::VisionModel;
use crate::utils::error::{LabelError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionBackend {
    Gemini,
    #[default]
    OpenAi,
}

impl std::str::FromStr for VisionBackend {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(VisionBackend::Gemini),
            "openai" => Ok(VisionBackend::OpenAi),
            other => Err(LabelError::InvalidConfigValueError {
                field: "vision.backend".to_string(),
                value: other.to_string(),
                reason: "Valid backends: gemini, openai".to_string(),
            }),
        }
    }
}

/// 依設定建立對應的模型後端
pub fn build_vision_model(config: &VisionConfig) -> Result<Arc<dyn VisionModel>> {
    match config.backend {
        VisionBackend::Gemini => {
            let settings = section(config.gemini.as_ref(), "vision.gemini")?;
            let mut model = GeminiModel::new(&settings.model, &settings.api_key)?;
            if let Some(base_url) = &settings.base_url {
                model = model.with_base_url(base_url);
            }
            Ok(Arc::new(model))
        }
        VisionBackend::OpenAi => {
            let settings = section(config.openai.as_ref(), "vision.openai")?;
            let mut model = OpenAiModel::new(&settings.model, &settings.api_key)?;
            if let Some(base_url) = &settings.base_url {
                model = model.with_base_url(base_url);
            }
            if let Some(max_tokens) = settings.max_tokens {
                model = model.with_max_tokens(max_tokens);
            }
            Ok(Arc::new(model))
        }
    }
}

fn section<'a>(settings: Option<&'a ModelConfig>, field: &str) -> Result<&'a ModelConfig> {
    settings.ok_or_else(|| LabelError::MissingConfigError {
        field: field.to_string(),
    })
}

pub(crate) fn require_credentials(model: &str, api_key: &str) -> Result<()> {
    if model.trim().is_empty() {
        return Err(LabelError::config("model is not set"));
    }
    if api_key.trim().is_empty() {
        return Err(LabelError::config("api key is not set"));
    }
    Ok(())
}

/// Removes a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing ```` ``` ```` fence. Content without fences is returned as is.
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    let opened = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"));
    let closed = opened.unwrap_or(trimmed).strip_suffix("```");

    match (opened, closed) {
        (None, None) => content.to_string(),
        (_, Some(body)) => body.trim().to_string(),
        (Some(body), None) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fenced_json() {
        let content = "```json\n{\"addressLine1\":\"123 Main St\"}\n```\n";
        let stripped = strip_code_fence(content);
        assert_eq!(stripped, "{\"addressLine1\":\"123 Main St\"}");
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["addressLine1"], "123 Main St");
    }

    #[test]
    fn test_strip_bare_and_one_sided_fences() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_content_is_untouched() {
        for content in ["{\"a\":1}", "  {\"a\": 1}\n", "not json at all", ""] {
            assert_eq!(strip_code_fence(content), content);
        }

        let once = strip_code_fence("```json\n{\"a\":1}\n```");
        assert_eq!(strip_code_fence(&once), once);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Gemini".parse::<VisionBackend>().unwrap(), VisionBackend::Gemini);
        assert_eq!("openai".parse::<VisionBackend>().unwrap(), VisionBackend::OpenAi);
        assert!("claude".parse::<VisionBackend>().is_err());
    }

    #[test]
    fn test_build_requires_selected_section() {
        let config = VisionConfig {
            backend: VisionBackend::Gemini,
            gemini: None,
            openai: Some(ModelConfig {
                model: "gpt-4o".to_string(),
                api_key: "sk-test".to_string(),
                base_url: None,
                max_tokens: None,
            }),
        };
        assert!(matches!(
            build_vision_model(&config),
            Err(LabelError::MissingConfigError { .. })
        ));

        let config = VisionConfig {
            backend: VisionBackend::OpenAi,
            ..config
        };
        let model = build_vision_model(&config).unwrap();
        assert_eq!(model.name(), "openai");
    }
}
