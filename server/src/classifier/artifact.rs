use std::fs;
use std::path::Path;

use log::info;
use url::Url;

use crate::classifier::model::ModelError;

/// Downloads the model artifact when it is not already on disk.
pub async fn ensure_artifact(url: Option<&Url>, path: &Path) -> Result<(), ModelError> {
    if path.exists() {
        info!("Model artifact already present at {}", path.display());
        return Ok(());
    }

    let url = url.ok_or_else(|| {
        ModelError::Fetch(format!(
            "artifact {} is missing and MODEL_URL is not set",
            path.display()
        ))
    })?;

    info!("Downloading model artifact from {}", url);
    let response = reqwest::get(url.clone())
        .await
        .map_err(|e| ModelError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(ModelError::Fetch(format!(
            "download from {} failed with status {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ModelError::Fetch(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ModelError::Fetch(e.to_string()))?;
        }
    }
    fs::write(path, &bytes).map_err(|e| ModelError::Fetch(e.to_string()))?;
    info!(
        "Model artifact saved to {} ({} bytes)",
        path.display(),
        bytes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[actix_web::test]
    async fn existing_artifact_is_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        fs::write(&path, b"cached").unwrap();

        ensure_artifact(None, &path).await.unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"cached");
    }

    #[actix_web::test]
    async fn missing_artifact_without_source_is_a_fetch_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");

        let err = ensure_artifact(None, &path).await.unwrap_err();
        assert!(matches!(err, ModelError::Fetch(_)));
        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn unreachable_source_is_a_fetch_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        let url = Url::parse("http://127.0.0.1:9/model.onnx").unwrap();

        let err = ensure_artifact(Some(&url), &path).await.unwrap_err();
        assert!(matches!(err, ModelError::Fetch(_)));
        assert!(!path.exists());
    }
}
