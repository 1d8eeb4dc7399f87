use crate::domain::context::RequestContext;
use crate::domain::model::ValidationResult;
use crate::server::ServiceState;
use crate::utils::error::LabelError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub result: ValidationResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckLabelRequest {
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckLabelResponse {
    pub valid: bool,
}

pub async fn heartbeat() -> StatusCode {
    StatusCode::OK
}

/// 無法解析的請求一律 400，超過大小上限則回 413
fn bad_request(rejection: JsonRejection) -> Response {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    LabelError::InvalidInput {
        message: rejection.body_text(),
    }
    .with_status(status.as_u16())
    .into_response()
}

/// `POST /api/latest/shipping/label/validate`
pub async fn validate(
    State(state): State<ServiceState>,
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    let ctx = RequestContext::with_timeout(state.request_timeout);
    match state
        .validator
        .validate_base64(&ctx, request.tracking_number.as_deref(), &request.image)
        .await
    {
        Ok(result) => Json(ValidationResponse { result }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /api/latest/shipping/label/check`
pub async fn check_label(
    State(state): State<ServiceState>,
    payload: Result<Json<CheckLabelRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection),
    };

    let ctx = RequestContext::with_timeout(state.request_timeout);
    match state.validator.check_label(&ctx, &request.image).await {
        Ok(valid) => Json(CheckLabelResponse { valid }).into_response(),
        Err(e) => e.into_response(),
    }
}
