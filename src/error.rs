use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::extract::ExtractionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Serviciul Bedrock (Claude) nu este disponibil. Verifică token-ul AWS_BEARER_TOKEN_BEDROCK.")]
    ServiceUnavailable,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("{context}: {error}")]
    Processing {
        context: &'static str,
        error: anyhow::Error,
    },
}

impl ApiError {
    pub fn processing(context: &'static str, error: impl Into<anyhow::Error>) -> Self {
        ApiError::Processing {
            context,
            error: error.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Extraction(_) | ApiError::Processing { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Processing { context, error } => {
                tracing::error!(context, error = ?error, "request failed");
            }
            ApiError::Extraction(e) => {
                tracing::error!(error = ?e, "could not extract JSON from completion");
            }
            ApiError::ServiceUnavailable | ApiError::BadRequest(_) => {
                tracing::debug!(%status, detail = %self, "request rejected");
            }
        }
        (status, Json(json!({"detail": self.to_string()}))).into_response()
    }
}
