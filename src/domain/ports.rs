use crate::adapters::vision::gemini::GenerateContentResponse;
use crate::adapters::vision::openai::ChatCompletionResponse;
use crate::domain::context::RequestContext;
use crate::domain::model::TrackingDetails;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Backend payload kept next to the normalized content for diagnostics.
#[derive(Debug, Clone)]
pub enum RawResponse {
    Gemini(GenerateContentResponse),
    OpenAi(ChatCompletionResponse),
}

#[derive(Debug, Clone)]
pub struct PromptResponse {
    pub content: String,
    pub raw: RawResponse,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &str;

    async fn prompt(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        image: &[u8],
    ) -> Result<PromptResponse>;
}

#[async_trait]
pub trait TrackingProvider: Send + Sync {
    async fn get_tracking_details(
        &self,
        ctx: &RequestContext,
        tracking_number: &str,
    ) -> Result<TrackingDetails>;
}
