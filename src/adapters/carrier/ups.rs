use crate::adapters::http::{build_client, read_json};
use crate::config::CarrierConfig;
use crate::domain::context::RequestContext;
use crate::domain::model::TrackingDetails;
use crate::domain::ports::TrackingProvider;
use crate::utils::error::{LabelError, Result};
use crate::utils::validation::validate_non_empty_string;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const SOURCE_NAME: &str = "ups";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
    #[serde(default)]
    pub issued_at: Option<serde_json::Value>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// UPS 追蹤 API client
///
/// The bearer token is acquired once in [`UpsClient::connect`] and never
/// refreshed. Rotating credentials means building a new client.
#[derive(Debug, Clone)]
pub struct UpsClient {
    client: Client,
    access_token: String,
    tracking_url: Url,
    transaction_src: String,
}

impl UpsClient {
    /// 以 client credentials 交換 access token 後建立 client
    pub async fn connect(config: &CarrierConfig) -> Result<Self> {
        validate_non_empty_string("carrier.client_id", &config.client_id)?;
        validate_non_empty_string("carrier.client_secret", &config.client_secret)?;

        let client = build_client(&config.timeouts)?;
        let token = fetch_access_token(&client, config).await?;
        tracing::info!("🔑 Acquired carrier access token");

        Self::assemble(client, config, token.access_token)
    }

    /// Builds a client around a token obtained elsewhere.
    pub fn with_token(config: &CarrierConfig, access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        validate_non_empty_string("carrier.access_token", &access_token)?;

        let client = build_client(&config.timeouts)?;
        Self::assemble(client, config, access_token)
    }

    fn assemble(client: Client, config: &CarrierConfig, access_token: String) -> Result<Self> {
        let tracking_url = Url::parse(&config.tracking_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| LabelError::InvalidConfigValueError {
                field: "carrier.tracking_url".to_string(),
                value: config.tracking_url.clone(),
                reason: "Must be an absolute http(s) URL".to_string(),
            })?;

        Ok(Self {
            client,
            access_token,
            tracking_url,
            transaction_src: config.transaction_src.clone(),
        })
    }

    /// 追蹤號碼可能來自模型輸出，作為單一路徑片段編碼後附加
    fn tracking_endpoint(&self, tracking_number: &str) -> Url {
        let mut endpoint = self.tracking_url.clone();
        if let Ok(mut segments) = endpoint.path_segments_mut() {
            segments.pop_if_empty().push(tracking_number);
        }
        endpoint
    }

    async fn fetch_tracking(&self, tracking_number: &str) -> Result<TrackingDetails> {
        if matches!(tracking_number, "." | "..") {
            return Err(LabelError::InvalidInput {
                message: format!("invalid tracking number {:?}", tracking_number),
            });
        }

        let endpoint = self.tracking_endpoint(tracking_number);
        tracing::debug!("📡 Requesting tracking details from: {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(&self.access_token)
            .header("transId", chrono::Utc::now().timestamp().to_string())
            .header("transactionSrc", &self.transaction_src)
            .send()
            .await?;

        tracing::debug!("📡 Tracking response status: {}", response.status());
        read_json(response, SOURCE_NAME).await
    }
}

async fn fetch_access_token(client: &Client, config: &CarrierConfig) -> Result<TokenInfo> {
    tracing::debug!("📡 Requesting access token from: {}", config.token_url);

    let response = client
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&[("grant_type", "client_credentials"), ("scope", "public")])
        .send()
        .await?;

    read_json(response, SOURCE_NAME).await
}

#[async_trait]
impl TrackingProvider for UpsClient {
    async fn get_tracking_details(
        &self,
        ctx: &RequestContext,
        tracking_number: &str,
    ) -> Result<TrackingDetails> {
        ctx.run("carrier tracking", self.fetch_tracking(tracking_number))
            .await
    }
}
