//! Cloudinary media store client
//!
//! Talks to the upload API (signed multipart requests) and the admin API
//! (basic auth) over `reqwest`. Every non-success response is classified into
//! a [`StorageError`] so the upload executor can decide whether to retry.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use utkrisht_core::{mask_secret, CloudinarySettings};

use crate::traits::{
    BATCH_DELETE_LIMIT, CredentialFingerprint, MediaStore, ResourcePage, StorageError, StorageResult,
    UploadDescriptor, UploadSignature, LIST_PAGE_SIZE,
};
use crate::StorageBackend;

const RESOURCE_TYPE: &str = "image";
const SIGNATURE_ALGORITHM: &str = "sha256";

static AUTH_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)invalid\s*(api[_\s-]?key|signature|credentials)|api\s*key\s*invalid")
        .expect("auth pattern compiles")
});

static TOO_LARGE_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)file size too large").expect("size pattern compiles"));

static BAD_IMAGE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)invalid image|unsupported|corrupt|unknown file format")
        .expect("image pattern compiles")
});

#[derive(Clone)]
struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

/// Cloudinary-backed media store
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base_url: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    width: Option<i32>,
    height: Option<i32>,
    format: Option<String>,
    bytes: Option<i64>,
    resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    resources: Vec<ListedResource>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedResource {
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sign request parameters: sorted `key=value` pairs joined by `&`, secret appended, SHA-256 hex.
pub fn sign_params(params: &BTreeMap<String, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Map an unsuccessful HTTP response to a storage error.
pub fn classify_response(status: u16, body: &str) -> StorageError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        401 | 403 => StorageError::AuthRejected(message),
        413 => StorageError::TooLarge(message),
        429 => StorageError::RateLimited(message),
        s if s >= 500 => StorageError::Upstream { status: s, message },
        _ if AUTH_MESSAGE.is_match(&message) => StorageError::AuthRejected(message),
        _ if TOO_LARGE_MESSAGE.is_match(&message) => StorageError::TooLarge(message),
        400 | 415 if BAD_IMAGE_MESSAGE.is_match(&message) => StorageError::BadImage(message),
        404 => StorageError::NotFound(message),
        s => StorageError::BackendError(format!("HTTP {}: {}", s, message)),
    }
}

fn classify_transport(err: reqwest::Error) -> StorageError {
    if err.is_timeout() {
        StorageError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        StorageError::Network(err.to_string())
    } else if err.is_decode() || err.is_body() {
        StorageError::MalformedResponse(err.to_string())
    } else {
        StorageError::BackendError(err.to_string())
    }
}

impl CloudinaryStore {
    /// Build a client. Missing credentials are reported on first use.
    pub fn new(settings: &CloudinarySettings, request_timeout: Duration) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let credentials = match (
            settings.cloud_name.clone(),
            settings.api_key.clone(),
            settings.api_secret.clone(),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(Credentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn credentials(&self) -> StorageResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| StorageError::ConfigError("Cloudinary not configured".to_string()))
    }

    fn endpoint(&self, creds: &Credentials, path: &str) -> String {
        format!("{}/{}/{}", self.api_base_url, creds.cloud_name, path)
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> StorageResult<T> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_transport)?;

        if !(200..300).contains(&status) {
            return Err(classify_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(100).collect();
            StorageError::MalformedResponse(format!("invalid JSON response ({}): {}", e, preview))
        })
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, data: Vec<u8>, folder: &str) -> StorageResult<UploadDescriptor> {
        let creds = self.credentials()?;
        let size = data.len();
        let start = Instant::now();

        let mut params = BTreeMap::new();
        params.insert("folder".to_string(), folder.to_string());
        params.insert("timestamp".to_string(), Self::timestamp());
        let signature = sign_params(&params, &creds.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(data).file_name("upload"))
            .text("api_key", creds.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", SIGNATURE_ALGORITHM);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint(creds, &format!("{}/upload", RESOURCE_TYPE)))
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        let uploaded: UploadResponse = Self::read_json(response).await?;

        tracing::info!(
            folder = %folder,
            public_id = %uploaded.public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        Ok(UploadDescriptor {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
            width: uploaded.width,
            height: uploaded.height,
            format: uploaded.format,
            bytes: uploaded.bytes.unwrap_or(size as i64),
            resource_type: uploaded
                .resource_type
                .unwrap_or_else(|| RESOURCE_TYPE.to_string()),
            folder: folder.to_string(),
        })
    }

    async fn destroy(&self, public_id: &str) -> StorageResult<()> {
        let creds = self.credentials()?;
        let start = Instant::now();

        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), public_id.to_string());
        params.insert("timestamp".to_string(), Self::timestamp());
        let signature = sign_params(&params, &creds.api_secret);

        let mut form: Vec<(String, String)> = params.into_iter().collect();
        form.push(("api_key".to_string(), creds.api_key.clone()));
        form.push(("signature".to_string(), signature));
        form.push((
            "signature_algorithm".to_string(),
            SIGNATURE_ALGORITHM.to_string(),
        ));

        let response = self
            .client
            .post(self.endpoint(creds, &format!("{}/destroy", RESOURCE_TYPE)))
            .form(&form)
            .send()
            .await
            .map_err(classify_transport)?;

        let _: serde_json::Value = Self::read_json(response).await?;

        tracing::info!(
            public_id = %public_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary destroy successful"
        );

        Ok(())
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
        cursor: Option<&str>,
    ) -> StorageResult<ResourcePage> {
        let creds = self.credentials()?;
        let max_results = LIST_PAGE_SIZE.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("type", "upload"),
            ("prefix", prefix),
            ("max_results", max_results.as_str()),
        ];
        if let Some(cursor) = cursor {
            query.push(("next_cursor", cursor));
        }

        let response = self
            .client
            .get(self.endpoint(creds, &format!("resources/{}/upload", RESOURCE_TYPE)))
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .query(&query)
            .send()
            .await
            .map_err(classify_transport)?;

        let listed: ListResponse = Self::read_json(response).await?;

        Ok(ResourcePage {
            public_ids: listed.resources.into_iter().map(|r| r.public_id).collect(),
            next_cursor: listed.next_cursor.filter(|c| !c.is_empty()),
        })
    }

    async fn batch_delete(&self, public_ids: &[String]) -> StorageResult<()> {
        if public_ids.is_empty() {
            return Ok(());
        }
        if public_ids.len() > BATCH_DELETE_LIMIT {
            return Err(StorageError::InvalidKey(format!(
                "batch delete accepts at most {} ids",
                BATCH_DELETE_LIMIT
            )));
        }

        let creds = self.credentials()?;
        let query: Vec<(&str, &str)> = public_ids
            .iter()
            .map(|id| ("public_ids[]", id.as_str()))
            .collect();

        let response = self
            .client
            .delete(self.endpoint(creds, &format!("resources/{}/upload", RESOURCE_TYPE)))
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .query(&query)
            .send()
            .await
            .map_err(classify_transport)?;

        let _: serde_json::Value = Self::read_json(response).await?;

        tracing::info!(count = public_ids.len(), "Cloudinary batch delete successful");
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> StorageResult<()> {
        let creds = self.credentials()?;
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let response = self
            .client
            .delete(self.endpoint(creds, &format!("folders/{}", encoded)))
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .send()
            .await
            .map_err(classify_transport)?;

        let _: serde_json::Value = Self::read_json(response).await?;
        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        let creds = self.credentials()?;

        let response = self
            .client
            .get(self.endpoint(creds, "ping"))
            .basic_auth(&creds.api_key, Some(&creds.api_secret))
            .send()
            .await
            .map_err(classify_transport)?;

        let body: serde_json::Value = Self::read_json(response).await?;
        match body.get("status").and_then(|s| s.as_str()) {
            Some("ok") => Ok(()),
            _ => Err(StorageError::MalformedResponse(format!(
                "unexpected ping response: {}",
                body
            ))),
        }
    }

    fn sign_upload_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> StorageResult<UploadSignature> {
        let creds = self.credentials()?;
        Ok(UploadSignature {
            signature: sign_params(params, &creds.api_secret),
            signature_algorithm: SIGNATURE_ALGORITHM,
            api_key: creds.api_key.clone(),
            cloud_name: creds.cloud_name.clone(),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Cloudinary
    }

    fn credential_fingerprint(&self) -> CredentialFingerprint {
        match &self.credentials {
            Some(creds) => CredentialFingerprint {
                cloud_name_last4: Some(mask_secret(&creds.cloud_name)),
                api_key_last4: Some(mask_secret(&creds.api_key)),
                have_secret: !creds.api_secret.is_empty(),
            },
            None => CredentialFingerprint::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings(base_url: &str) -> CloudinarySettings {
        CloudinarySettings {
            cloud_name: Some("demo".to_string()),
            api_key: Some("123456789012345".to_string()),
            api_secret: Some("shhh".to_string()),
            api_base_url: base_url.to_string(),
        }
    }

    fn store(base_url: &str) -> CloudinaryStore {
        CloudinaryStore::new(&settings(base_url), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_sign_params_is_deterministic_and_sorted() {
        let mut a = BTreeMap::new();
        a.insert("timestamp".to_string(), "1700000000".to_string());
        a.insert("folder".to_string(), "utkrisht".to_string());

        let mut hasher = Sha256::new();
        hasher.update(b"folder=utkrisht&timestamp=1700000000secret");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(sign_params(&a, "secret"), expected);
        assert_eq!(sign_params(&a, "secret"), sign_params(&a.clone(), "secret"));
        assert_ne!(sign_params(&a, "secret"), sign_params(&a, "other"));
    }

    #[test]
    fn test_classify_response() {
        assert!(matches!(
            classify_response(401, r#"{"error":{"message":"Invalid api_key"}}"#),
            StorageError::AuthRejected(_)
        ));
        assert!(matches!(
            classify_response(400, r#"{"error":{"message":"Invalid Signature abc"}}"#),
            StorageError::AuthRejected(_)
        ));
        assert!(matches!(
            classify_response(429, "{}"),
            StorageError::RateLimited(_)
        ));
        assert!(matches!(
            classify_response(503, "<html>busy</html>"),
            StorageError::Upstream { status: 503, .. }
        ));
        assert!(matches!(
            classify_response(
                400,
                r#"{"error":{"message":"File size too large. Got 12000000."}}"#
            ),
            StorageError::TooLarge(_)
        ));
        let rejected = classify_response(413, r#"{"error":{"message":"Request Entity Too Large"}}"#);
        assert!(!rejected.is_transient());
        assert!(matches!(rejected, StorageError::TooLarge(ref m) if m == "Request Entity Too Large"));
        assert!(matches!(
            classify_response(400, r#"{"error":{"message":"Invalid image file"}}"#),
            StorageError::BadImage(_)
        ));
    }

    #[tokio::test]
    async fn test_upload_success_parses_descriptor() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"public_id":"utkrisht/hero/abc","secure_url":"https://res.cloudinary.com/demo/abc.png",
                    "width":1,"height":1,"format":"png","bytes":68,"resource_type":"image"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let descriptor = store(&server.url())
            .upload(vec![1, 2, 3], "utkrisht/hero")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(descriptor.public_id, "utkrisht/hero/abc");
        assert_eq!(descriptor.url, "https://res.cloudinary.com/demo/abc.png");
        assert_eq!(descriptor.width, Some(1));
        assert_eq!(descriptor.bytes, 68);
        assert_eq!(descriptor.folder, "utkrisht/hero");
    }

    #[tokio::test]
    async fn test_upload_html_body_is_malformed_and_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body("<html><body>Bad Gateway</body></html>")
            .create_async()
            .await;

        let err = store(&server.url())
            .upload(vec![1], "utkrisht/gallery")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::MalformedResponse(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_upload_rejected_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid api_key 123456789012345"}}"#)
            .create_async()
            .await;

        let err = store(&server.url())
            .upload(vec![1], "utkrisht/gallery")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::AuthRejected(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_upload_entity_too_large_is_terminal_413() {
        use utkrisht_core::{AppError, ErrorMetadata};

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(413)
            .with_body(r#"{"error":{"message":"Request Entity Too Large"}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = store(&server.url())
            .upload(vec![1], "utkrisht/gallery")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, StorageError::TooLarge(_)));
        assert!(!err.is_transient());
        let app_err: AppError = err.into();
        assert_eq!(app_err.http_status_code(), 413);
        assert_eq!(app_err.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_batch_delete_over_limit_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let ids: Vec<String> = (0..=BATCH_DELETE_LIMIT).map(|i| format!("utkrisht/x/{}", i)).collect();

        let err = store(&server.url()).batch_delete(&ids).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_list_by_prefix_pages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/demo/resources/image/upload".to_string()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prefix".into(), "utkrisht/projects/p1".into()),
                Matcher::UrlEncoded("max_results".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"resources":[{"public_id":"utkrisht/projects/p1/a"},{"public_id":"utkrisht/projects/p1/b"}],
                    "next_cursor":"c2"}"#,
            )
            .create_async()
            .await;

        let page = store(&server.url())
            .list_by_prefix("utkrisht/projects/p1", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.public_ids.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_ping_ok() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/demo/ping")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        assert!(store(&server.url()).ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails_without_network() {
        let settings = CloudinarySettings {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let store = CloudinaryStore::new(&settings, Duration::from_secs(1)).unwrap();
        let err = store.upload(vec![1], "utkrisht").await.unwrap_err();
        assert!(matches!(err, StorageError::ConfigError(_)));
        assert_eq!(store.credential_fingerprint(), CredentialFingerprint::default());
    }

    #[test]
    fn test_fingerprint_only_exposes_last_four() {
        let store = store("http://localhost");
        let fp = store.credential_fingerprint();
        assert_eq!(fp.api_key_last4.as_deref(), Some("****2345"));
        assert!(fp.have_secret);
    }
}
