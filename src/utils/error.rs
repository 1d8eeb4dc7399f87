use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{body}")]
    StatusError { status: u16, body: String },

    #[error("Deadline exceeded during {stage}")]
    DeadlineExceeded { stage: &'static str },

    #[error("Malformed response from {source_name}: {message}")]
    MalformedResponse {
        source_name: String,
        message: String,
    },

    #[error("no address found for the tracking number {tracking_number:?}")]
    AddressNotFound { tracking_number: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{source}")]
    WithStatus {
        status: u16,
        #[source]
        source: Box<LabelError>,
    },
}

/// 錯誤分類，用於日誌與 HTTP 狀態對應
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Transport,
    MalformedResponse,
    NotFound,
    InvalidInput,
    Internal,
}

impl LabelError {
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        LabelError::MalformedResponse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        LabelError::ConfigError {
            message: message.into(),
        }
    }

    /// 附加明確的 HTTP 狀態碼
    pub fn with_status(self, status: u16) -> Self {
        LabelError::WithStatus {
            status,
            source: Box::new(self),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LabelError::ConfigError { .. }
            | LabelError::MissingConfigError { .. }
            | LabelError::InvalidConfigValueError { .. }
            | LabelError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            LabelError::ApiError(_)
            | LabelError::StatusError { .. }
            | LabelError::DeadlineExceeded { .. } => ErrorCategory::Transport,
            LabelError::MalformedResponse { .. } => ErrorCategory::MalformedResponse,
            LabelError::AddressNotFound { .. } => ErrorCategory::NotFound,
            LabelError::InvalidInput { .. } => ErrorCategory::InvalidInput,
            LabelError::ImageError(_)
            | LabelError::IoError(_)
            | LabelError::SerializationError(_) => ErrorCategory::Internal,
            LabelError::WithStatus { source, .. } => source.category(),
        }
    }

    /// 對應到回應的 HTTP 狀態碼，未明確指定時一律視為伺服器錯誤
    pub fn status_code(&self) -> u16 {
        match self {
            LabelError::WithStatus { status, .. } => *status,
            LabelError::InvalidInput { .. } => 400,
            _ => 500,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Transport => format!("Upstream service unavailable: {}", self),
            ErrorCategory::MalformedResponse => {
                format!("Upstream service returned an unexpected response: {}", self)
            }
            ErrorCategory::NotFound => format!("Nothing to compare against: {}", self),
            ErrorCategory::InvalidInput => format!("Request rejected: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let input = LabelError::InvalidInput {
            message: "bad base64".to_string(),
        };
        assert_eq!(input.status_code(), 400);
        assert_eq!(input.category(), ErrorCategory::InvalidInput);

        let not_found = LabelError::AddressNotFound {
            tracking_number: "1Z".to_string(),
        };
        assert_eq!(not_found.status_code(), 500);
        assert_eq!(not_found.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_with_status_keeps_category_and_message() {
        let err = LabelError::malformed("openai", "no choices in response").with_status(502);
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.category(), ErrorCategory::MalformedResponse);
        assert_eq!(
            err.to_string(),
            "Malformed response from openai: no choices in response"
        );
    }

    #[test]
    fn test_status_error_message_is_raw_body() {
        let err = LabelError::StatusError {
            status: 401,
            body: r#"{"response":{"errors":[{"code":"250002"}]}}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"{"response":{"errors":[{"code":"250002"}]}}"#);
        assert_eq!(err.category(), ErrorCategory::Transport);
    }
}
