use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use uuid::Uuid;

use shared::{HealthResponse, PredictResponse};

use crate::classifier::decode::MAX_UPLOAD_BYTES;
use crate::classifier::service::{InferenceService, UploadedFile};
use crate::error::PredictError;

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    cfg.service(web::resource("/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(Files::new("/", static_dir).index_file("index.html"));
}

async fn handle_predict(
    service: web::Data<InferenceService>,
    mut payload: Multipart,
) -> Result<HttpResponse, PredictError> {
    let request_id = Uuid::new_v4();
    let upload = read_file_field(&mut payload).await?;

    match &upload {
        Some(file) => info!(
            "[{}] Received upload {:?} ({} bytes)",
            request_id,
            file.filename,
            file.bytes.len()
        ),
        None => warn!("[{}] Received request without a file field", request_id),
    }

    let prediction = service.handle(upload)?;
    info!(
        "[{}] Prediction complete: class={} confidence={:.4}",
        request_id, prediction.index, prediction.confidence
    );

    Ok(HttpResponse::Ok().json(PredictResponse {
        success: true,
        prediction: prediction.index,
        confidence: prediction.confidence,
        label: prediction.label,
        message: "Analysis complete".to_string(),
    }))
}

/// Streams the `file` field into memory, cutting oversized uploads off mid-read.
async fn read_file_field(payload: &mut Multipart) -> Result<Option<UploadedFile>, PredictError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| PredictError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            // Unrelated fields still have to be drained for the stream to
            // make progress.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| PredictError::Upload(e.to_string()))?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| PredictError::Upload(e.to_string()))?;
            if bytes.len() + data.len() > MAX_UPLOAD_BYTES {
                return Err(PredictError::PayloadTooLarge {
                    size: bytes.len() + data.len(),
                    limit: MAX_UPLOAD_BYTES,
                });
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(Some(UploadedFile { filename, bytes }));
    }

    Ok(None)
}

async fn health(service: web::Data<InferenceService>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: service.model_loaded(),
    })
}
