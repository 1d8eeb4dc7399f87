use crate::adapters::http::{build_client, read_json, HttpTimeouts};
use crate::adapters::vision::{require_credentials, strip_code_fence};
use crate::domain::context::RequestContext;
use crate::domain::ports::{PromptResponse, RawResponse, VisionModel};
use crate::utils::error::{LabelError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const SOURCE_NAME: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    Text(String),
    InlineData(Blob),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part. Only one of the fields is populated by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<Blob>,
    #[serde(default)]
    pub function_call: Option<serde_json::Value>,
}

/// Gemini generate-content 後端，每次呼叫建立一個短期的 client
#[derive(Debug, Clone)]
pub struct GeminiModel {
    model: String,
    api_key: String,
    base_url: String,
    timeouts: HttpTimeouts,
}

impl GeminiModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let api_key = api_key.into();
        require_credentials(&model, &api_key)?;

        Ok(Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: HttpTimeouts::vision(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, prompt: &str, image: &[u8]) -> Result<GenerateContentResponse> {
        let client = build_client(&self.timeouts)?;

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![
                    RequestPart::Text(prompt.to_string()),
                    RequestPart::InlineData(Blob {
                        mime_type: "image/jpeg".to_string(),
                        data: STANDARD.encode(image),
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        read_json(response, SOURCE_NAME).await
    }
}

/// 取出第一個候選回應的第一個片段，必須是文字
fn first_text(response: &GenerateContentResponse) -> Result<&str> {
    let part = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .ok_or_else(|| LabelError::malformed(SOURCE_NAME, "no candidates in response"))?;

    part.text
        .as_deref()
        .ok_or_else(|| LabelError::malformed(SOURCE_NAME, "invalid response type"))
}

#[async_trait]
impl VisionModel for GeminiModel {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn prompt(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        image: &[u8],
    ) -> Result<PromptResponse> {
        tracing::debug!(model = %self.model, image_bytes = image.len(), "Sending request to Gemini");

        let response = ctx.run("vision", self.generate(prompt, image)).await?;
        let content = strip_code_fence(first_text(&response)?);

        Ok(PromptResponse {
            content,
            raw: RawResponse::Gemini(response),
        })
    }
}
