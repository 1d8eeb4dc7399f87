use crate::core::raster::{decode_base64_image, encode_jpeg};
use crate::domain::compare::{compare_addresses, MatchPolicy};
use crate::domain::context::RequestContext;
use crate::domain::model::{PromptResult, ValidationResult};
use crate::domain::ports::{TrackingProvider, VisionModel};
use crate::utils::error::{LabelError, Result};
use image::DynamicImage;
use std::sync::Arc;

/// 標籤驗證流程：讀取圖片 → 模型擷取 → 查詢承運商 → 比對地址
///
/// Each call is one sequential pipeline. Any stage failing ends the call
/// with that error; a result is only returned once every stage succeeded.
#[derive(Clone)]
pub struct LabelValidator {
    vision: Arc<dyn VisionModel>,
    carrier: Arc<dyn TrackingProvider>,
    prompt: Arc<str>,
    policy: MatchPolicy,
}

impl LabelValidator {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        carrier: Arc<dyn TrackingProvider>,
        prompt: impl Into<Arc<str>>,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            vision,
            carrier,
            prompt: prompt.into(),
            policy,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub async fn validate(
        &self,
        ctx: &RequestContext,
        tracking_number: Option<&str>,
        image: &DynamicImage,
    ) -> Result<ValidationResult> {
        let image_bytes = encode_jpeg(image)?;
        tracing::debug!("Encoded label image ({} bytes)", image_bytes.len());

        // 請模型讀出地址與追蹤號碼
        let response = self.vision.prompt(ctx, &self.prompt, &image_bytes).await?;
        let scanned = parse_prompt_result(self.vision.name(), &response.content)?;
        if let Some(error) = &scanned.error {
            tracing::warn!("⚠️ {} reported a problem reading the label: {}", self.vision.name(), error);
        }
        if scanned.address.is_empty() {
            tracing::warn!("⚠️ {} returned no address fields", self.vision.name());
        }

        let tracking_number = resolve_tracking_number(tracking_number, scanned.tracking_number.as_deref());
        if tracking_number.is_empty() {
            tracing::warn!("No tracking number supplied or read from the label");
        }

        // 以追蹤號碼向承運商查詢收件地址
        let details = self
            .carrier
            .get_tracking_details(ctx, &tracking_number)
            .await?;
        let expected = details
            .destination_address()
            .cloned()
            .ok_or_else(|| LabelError::AddressNotFound {
                tracking_number: tracking_number.clone(),
            })?;

        let valid = compare_addresses(&scanned.address, &expected.address, self.policy);
        tracing::info!(
            tracking_number = %tracking_number,
            policy = ?self.policy,
            valid,
            "✅ Label validated"
        );

        Ok(ValidationResult {
            scanned_address: scanned.address,
            expected_address: expected,
            valid,
        })
    }

    /// Decodes a base64 image from the caller, then validates it.
    pub async fn validate_base64(
        &self,
        ctx: &RequestContext,
        tracking_number: Option<&str>,
        image_base64: &str,
    ) -> Result<ValidationResult> {
        let image = decode_base64_image(image_base64)?;
        self.validate(ctx, tracking_number, &image).await
    }

    /// 舊版介面：只回傳是否相符，追蹤號碼一律由圖片讀取
    pub async fn check_label(&self, ctx: &RequestContext, image_base64: &str) -> Result<bool> {
        let result = self.validate_base64(ctx, None, image_base64).await?;
        Ok(result.valid)
    }
}

fn parse_prompt_result(source_name: &str, content: &str) -> Result<PromptResult> {
    serde_json::from_str(content).map_err(|e| {
        tracing::debug!("Undecodable model content: {}", content);
        LabelError::malformed(source_name, format!("content is not a label record: {}", e))
    })
}

fn resolve_tracking_number(explicit: Option<&str>, scanned: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or(scanned.map(str::trim))
        .unwrap_or_default()
        .to_string()
}
