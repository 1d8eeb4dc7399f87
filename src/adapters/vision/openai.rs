use crate::adapters::http::{build_client, read_json, HttpTimeouts};
use crate::adapters::vision::{require_credentials, strip_code_fence};
use crate::domain::context::RequestContext;
use crate::domain::ports::{PromptResponse, RawResponse, VisionModel};
use crate::utils::error::{LabelError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TOKENS: u32 = 300;
const SYSTEM_PROMPT: &str = "You are a visual reasoning assistant.";
const SOURCE_NAME: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// OpenAI chat-completions 後端
#[derive(Debug, Clone)]
pub struct OpenAiModel {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let api_key = api_key.into();
        require_credentials(&model, &api_key)?;

        Ok(Self {
            client: build_client(&HttpTimeouts::vision())?,
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request(&self, prompt: &str, image: &[u8]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: vec![ContentPart::Text {
                        text: SYSTEM_PROMPT.to_string(),
                    }],
                },
                Message {
                    role: "user",
                    content: vec![
                        ContentPart::Text {
                            text: prompt.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: format!("data:image/jpeg;base64,{}", STANDARD.encode(image)),
                            },
                        },
                    ],
                },
            ],
            max_tokens: self.max_tokens,
        }
    }

    async fn complete(&self, prompt: &str, image: &[u8]) -> Result<ChatCompletionResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(prompt, image))
            .send()
            .await?;

        read_json(response, SOURCE_NAME).await
    }
}

#[async_trait]
impl VisionModel for OpenAiModel {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn prompt(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        image: &[u8],
    ) -> Result<PromptResponse> {
        tracing::debug!(model = %self.model, image_bytes = image.len(), "Sending request to OpenAI");

        let response = ctx.run("vision", self.complete(prompt, image)).await?;
        let message = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone().unwrap_or_default())
            .ok_or_else(|| LabelError::malformed(SOURCE_NAME, "no choices in response"))?;

        Ok(PromptResponse {
            content: strip_code_fence(&message),
            raw: RawResponse::OpenAi(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_model_or_key() {
        assert!(matches!(
            OpenAiModel::new("", "sk-test"),
            Err(LabelError::ConfigError { .. })
        ));
        assert!(matches!(
            OpenAiModel::new("gpt-4o", ""),
            Err(LabelError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_request_wire_shape() {
        let model = OpenAiModel::new("gpt-4o", "sk-test").unwrap();
        let value = serde_json::to_value(model.build_request("read the label", b"jpeg")).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][1]["content"][0]["text"], "read the label");
        assert_eq!(value["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,anBlZw=="
        );
    }
}
