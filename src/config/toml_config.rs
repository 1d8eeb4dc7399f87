use crate::adapters::http::HttpTimeouts;
use crate::adapters::vision::VisionBackend;
use crate::domain::compare::MatchPolicy;
use crate::utils::error::{LabelError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PROMPT: &str = include_str!("../../prompts/label_prompt.txt");

const UPS_TOKEN_URL: &str = "https://onlinetools.ups.com/security/v1/oauth/token";
const UPS_TRACKING_URL: &str = "https://onlinetools.ups.com/api/track/v1/details";
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub request_timeout_seconds: u64,
    /// 請求內容上限，base64 後的手機照片常超過 2 MB
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            request_timeout_seconds: 90,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// 只有 `environment = "local"` 時綁定 loopback，其餘綁定 `host`
    pub fn bind_address(&self) -> String {
        let host = if self.is_local() { "127.0.0.1" } else { &self.host };
        format!("{}:{}", host, self.port)
    }

    pub fn is_local(&self) -> bool {
        self.environment == "local"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub backend: VisionBackend,
    pub gemini: Option<ModelConfig>,
    pub openai: Option<ModelConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub tracking_url: String,
    pub transaction_src: String,
    pub timeouts: HttpTimeouts,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: UPS_TOKEN_URL.to_string(),
            tracking_url: UPS_TRACKING_URL.to_string(),
            transaction_src: "label-validator".to_string(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub match_policy: MatchPolicy,
    pub prompt_file: Option<String>,
}

impl ValidationConfig {
    /// 載入模型提示詞，未指定檔案時使用內建版本
    pub fn load_prompt(&self) -> Result<String> {
        match &self.prompt_file {
            Some(path) => {
                let prompt = std::fs::read_to_string(path)?;
                validate_non_empty_string("validation.prompt_file", &prompt)?;
                Ok(prompt)
            }
            None => Ok(DEFAULT_PROMPT.to_string()),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LabelError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LabelError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 從環境變數建立配置
    pub fn from_env() -> Result<Self> {
        let env = |name: &str| std::env::var(name).unwrap_or_default();
        let optional = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        // anything other than "gemini" selects the chat-completions backend
        let backend = if env("GPT").eq_ignore_ascii_case("gemini") {
            VisionBackend::Gemini
        } else {
            VisionBackend::OpenAi
        };

        let port = match optional("HTTP_PORT") {
            Some(port) => port.parse().map_err(|_| LabelError::InvalidConfigValueError {
                field: "HTTP_PORT".to_string(),
                value: port.clone(),
                reason: "Port must be a number between 1 and 65535".to_string(),
            })?,
            None => ServerConfig::default().port,
        };

        let match_policy = match optional("MATCH_POLICY") {
            Some(policy) => serde_json::from_value(serde_json::Value::String(policy.to_lowercase()))
                .map_err(|_| LabelError::InvalidConfigValueError {
                    field: "MATCH_POLICY".to_string(),
                    value: policy.clone(),
                    reason: "Valid policies: strict, lenient".to_string(),
                })?,
            None => MatchPolicy::default(),
        };

        Ok(Self {
            server: ServerConfig {
                port,
                environment: optional("APP_ENV")
                    .unwrap_or_else(|| ServerConfig::default().environment),
                ..ServerConfig::default()
            },
            vision: VisionConfig {
                backend,
                gemini: Some(ModelConfig {
                    model: env("GEMINI_MODEL"),
                    api_key: env("GEMINI_API_KEY"),
                    base_url: optional("GEMINI_BASE_URL"),
                    max_tokens: None,
                }),
                openai: Some(ModelConfig {
                    model: env("OPENAI_MODEL"),
                    api_key: env("OPENAI_API_KEY"),
                    base_url: optional("OPENAI_BASE_URL"),
                    max_tokens: None,
                }),
            },
            carrier: CarrierConfig {
                client_id: env("UPS_CLIENT_ID"),
                client_secret: env("UPS_CLIENT_SECRET"),
                ..CarrierConfig::default()
            },
            validation: ValidationConfig {
                match_policy,
                prompt_file: optional("PROMPT_FILE"),
            },
        })
    }

    /// 取得目前選用的模型設定
    pub fn selected_model(&self) -> Option<&ModelConfig> {
        match self.vision.backend {
            VisionBackend::Gemini => self.vision.gemini.as_ref(),
            VisionBackend::OpenAi => self.vision.openai.as_ref(),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validate_range(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
            600,
        )?;
        validate_range(
            "server.max_body_bytes",
            self.server.max_body_bytes,
            1024,
            256 * 1024 * 1024,
        )?;

        validate_non_empty_string("carrier.client_id", &self.carrier.client_id)?;
        validate_non_empty_string("carrier.client_secret", &self.carrier.client_secret)?;
        validate_url("carrier.token_url", &self.carrier.token_url)?;
        validate_url("carrier.tracking_url", &self.carrier.tracking_url)?;
        validate_non_empty_string("carrier.transaction_src", &self.carrier.transaction_src)?;

        let section = match self.vision.backend {
            VisionBackend::Gemini => "vision.gemini",
            VisionBackend::OpenAi => "vision.openai",
        };
        let model = self
            .selected_model()
            .ok_or_else(|| LabelError::MissingConfigError {
                field: section.to_string(),
            })?;
        validate_non_empty_string(&format!("{}.model", section), &model.model)?;
        validate_non_empty_string(&format!("{}.api_key", section), &model.api_key)?;
        if let Some(base_url) = &model.base_url {
            validate_url(&format!("{}.base_url", section), base_url)?;
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
