use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use thiserror::Error;

use shared::ErrorResponse;

use crate::classifier::model::ModelError;

/// Request-path failures; the HTTP mapping lives here and nowhere else.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No file uploaded!")]
    MissingFile,
    #[error("unsupported file type: {0:?}")]
    InvalidType(String),
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("malformed upload: {0}")]
    Upload(String),
    #[error("Model not loaded. Service unavailable.")]
    ModelUnavailable,
    #[error("{labels} labels configured but the model produced {outputs} scores")]
    LabelMismatch { labels: usize, outputs: usize },
    #[error(transparent)]
    Inference(#[from] ModelError),
}

impl PredictError {
    /// Stable tag carried in the error body; match on this, not the message.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::MissingFile => "missing_file",
            PredictError::InvalidType(_) => "invalid_type",
            PredictError::PayloadTooLarge { .. } => "payload_too_large",
            PredictError::Decode(_) => "decode_error",
            PredictError::Upload(_) => "upload_error",
            PredictError::ModelUnavailable => "model_unavailable",
            PredictError::LabelMismatch { .. } => "configuration_error",
            PredictError::Inference(_) => "inference_error",
        }
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingFile
            | PredictError::InvalidType(_)
            | PredictError::Decode(_)
            | PredictError::Upload(_) => StatusCode::BAD_REQUEST,
            PredictError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::LabelMismatch { .. } | PredictError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", self.kind(), self);
        } else {
            warn!("Request rejected ({}): {}", self.kind(), self);
        }

        // 500 bodies carry a fixed message; the detail stays in the log line
        // above. The 503 keeps its public wording.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An error occurred during processing".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: self.kind().to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(PredictError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PredictError::InvalidType("a.gif".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PredictError::PayloadTooLarge { size: 1, limit: 0 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            PredictError::ModelUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PredictError::LabelMismatch { labels: 4, outputs: 2 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PredictError::from(ModelError::Inference("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn kinds_are_stable_tags() {
        assert_eq!(PredictError::MissingFile.kind(), "missing_file");
        assert_eq!(PredictError::ModelUnavailable.kind(), "model_unavailable");
        assert_eq!(
            PredictError::Decode("bad magic".to_string()).kind(),
            "decode_error"
        );
        assert_eq!(
            PredictError::LabelMismatch { labels: 4, outputs: 2 }.kind(),
            "configuration_error"
        );
    }

    #[test]
    fn messages_keep_their_public_wording() {
        assert_eq!(PredictError::MissingFile.to_string(), "No file uploaded!");
        assert_eq!(
            PredictError::ModelUnavailable.to_string(),
            "Model not loaded. Service unavailable."
        );
    }

    #[actix_web::test]
    async fn internal_errors_do_not_leak_detail_into_the_body() {
        let err = PredictError::from(ModelError::Inference(
            "tensor shape mismatch in layer 3".to_string(),
        ));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "inference_error");
        assert_eq!(body.message, "An error occurred during processing");
        assert!(!body.message.contains("layer 3"));
    }

    #[actix_web::test]
    async fn unavailability_keeps_its_public_message() {
        let resp = PredictError::ModelUnavailable.error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "model_unavailable");
        assert_eq!(body.message, "Model not loaded. Service unavailable.");
    }
}
