use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{AssetStore, StoredAsset};
use crate::config::CloudinaryConfig;
use crate::upload::UploadedFile;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Applied on ingest: fit within 1200x800, automatic quality and format.
pub const TRANSFORMATION: &str = "c_limit,h_800,w_1200/q_auto/f_auto";

pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.config.cloud_name)
    }

    fn public_id(&self, key: &str) -> String {
        let folder = self.config.folder.trim_matches('/');
        if folder.is_empty() {
            key.to_string()
        } else {
            format!("{folder}/{key}")
        }
    }

    async fn error_message(resp: reqwest::Response) -> String {
        let status = resp.status();
        match resp.json::<ErrorResponse>().await {
            Ok(body) => format!("{} ({status})", body.error.message),
            Err(_) => format!("asset store responded with {status}"),
        }
    }
}

/// Sign request parameters: `k=v` pairs sorted by key, joined with `&`, with
/// the API secret appended, hashed with SHA-256.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, key: &str, file: &UploadedFile) -> Result<StoredAsset, String> {
        let public_id = self.public_id(key);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("transformation", TRANSFORMATION),
            ],
            &self.config.api_secret,
        );

        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| format!("Invalid content type: {e}"))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("public_id", public_id)
            .text("timestamp", timestamp)
            .text("transformation", TRANSFORMATION)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Upload request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(Self::error_message(resp).await);
        }

        let body: UploadResponse = resp
            .json()
            .await
            .map_err(|e| format!("Unexpected upload response: {e}"))?;

        Ok(StoredAsset {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let resp = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| format!("Destroy request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(Self::error_message(resp).await);
        }

        let body: DestroyResponse = resp
            .json()
            .await
            .map_err(|e| format!("Unexpected destroy response: {e}"))?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(format!("Destroy returned '{other}'")),
        }
    }
}
