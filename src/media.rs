use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::MediaConfig;
use crate::error::{ErrorMessage, HttpError};

/// Identifier and public URL of an uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub public_id: String,
    pub url: String,
}

/// Object storage used for style images.
pub trait ImageStore {
    /// Upload a remote URL or base64 data URI, returning where it landed.
    async fn upload(&self, source: &str) -> Result<StoredImage, HttpError>;

    /// Remove a previously uploaded image.
    async fn destroy(&self, public_id: &str) -> Result<(), HttpError>;
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResult {
    result: String,
}

/// Cloudinary client over the signed REST upload API.
///
/// Cloning is cheap: reqwest::Client is an Arc internally.
#[derive(Clone)]
pub struct MediaClient {
    pub conn: reqwest::Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(conn: reqwest::Client, config: MediaConfig) -> Self {
        Self { conn, config }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    /// Adds api key, signature and algorithm to the signed parameters.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign_params(&params, &self.config.api_secret);
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn post_form(
        &self,
        action: &str,
        form: &[(&'static str, String)],
    ) -> Result<reqwest::Response, HttpError> {
        let response = self
            .conn
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image store request error, {}: {}", action, e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Image store rejected {}: {}", action, body);
            return Err(HttpError::server_error(
                ErrorMessage::ServerError.to_string(),
            ));
        }

        Ok(response)
    }
}

impl ImageStore for MediaClient {
    async fn upload(&self, source: &str) -> Result<StoredImage, HttpError> {
        let params = vec![
            ("folder", self.config.folder.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
            (
                "transformation",
                format!("c_scale,w_{}", self.config.upload_width),
            ),
        ];

        let mut form = self.signed_form(params);
        // file is sent but never signed
        form.push(("file", source.to_string()));

        let uploaded: UploadResult = self
            .post_form("upload", &form)
            .await?
            .json()
            .await
            .map_err(|e| {
                tracing::error!("Image store response error, upload: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;

        tracing::info!(public_id = %uploaded.public_id, "image uploaded");
        Ok(StoredImage {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), HttpError> {
        let params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let form = self.signed_form(params);

        let destroyed: DestroyResult = self
            .post_form("destroy", &form)
            .await?
            .json()
            .await
            .map_err(|e| {
                tracing::error!("Image store response error, destroy: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            })?;

        // "not found" means it is already gone
        if destroyed.result != "ok" {
            tracing::warn!(%public_id, result = %destroyed.result, "image destroy was a no-op");
        }
        Ok(())
    }
}

/// Signature over the request parameters: sorted `key=value` pairs joined
/// by `&`, the API secret appended, SHA-256, lowercase hex.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
