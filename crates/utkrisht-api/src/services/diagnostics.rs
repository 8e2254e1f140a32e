//! Remote media store diagnostics
//!
//! Two probes for operators: a credentials ping and a real upload of a 1×1
//! PNG that is removed again afterwards. Reports carry only credential
//! fingerprints (last four characters), never the secrets themselves.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use utkrisht_core::FolderResolver;
use utkrisht_storage::{CredentialFingerprint, FailureKind, MediaStore};
use utoipa::ToSchema;

use super::upload::{upload_with_retry, RetryPolicy};

const PROBE_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR4nGNgYAAAAAMAAWgmWQ0AAAAASUVORK5CYII=";

/// Result of `ping`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PingReport {
    Ok {
        ok: bool,
        cloud: &'static str,
    },
    Failed {
        ok: bool,
        error: &'static str,
        #[serde(rename = "httpCode")]
        http_code: Option<u16>,
    },
}

impl PingReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, PingReport::Ok { .. })
    }
}

pub async fn ping_store(store: &dyn MediaStore) -> PingReport {
    match store.ping().await {
        Ok(()) => PingReport::Ok {
            ok: true,
            cloud: "ok",
        },
        Err(err) => {
            tracing::warn!(kind = err.kind().code(), "Media store ping failed");
            let error = if err.kind() == FailureKind::Auth {
                "credentials rejected. Verify CLOUDINARY_* env vars."
            } else {
                "ping failed. Check network and credentials."
            };
            PingReport::Failed {
                ok: false,
                error,
                http_code: err.http_status(),
            }
        }
    }
}

/// What the probe upload stored before it was removed again
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeUpload {
    pub public_id: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub bytes: i64,
    pub resource_type: String,
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProbeReport {
    Ok {
        ok: bool,
        uploaded: ProbeUpload,
        #[schema(value_type = Object)]
        env: CredentialFingerprint,
    },
    Failed {
        ok: bool,
        code: &'static str,
        #[serde(rename = "httpCode")]
        http_code: Option<u16>,
        hint: &'static str,
        #[schema(value_type = Object)]
        env: CredentialFingerprint,
        #[serde(skip)]
        kind: FailureKind,
    },
}

impl ProbeReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeReport::Ok { .. })
    }

    /// Missing configuration is a server fault; every other outcome is a report.
    pub fn http_status(&self) -> u16 {
        match self {
            ProbeReport::Failed {
                kind: FailureKind::Config,
                ..
            } => 500,
            _ => 200,
        }
    }
}

pub async fn probe_upload(
    store: &dyn MediaStore,
    policy: &RetryPolicy,
    folders: &FolderResolver,
) -> ProbeReport {
    let env = store.credential_fingerprint();
    let data = match STANDARD.decode(PROBE_PNG_BASE64) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!(error = %err, "Probe image failed to decode");
            return ProbeReport::Failed {
                ok: false,
                code: FailureKind::Unexpected.code(),
                http_code: None,
                hint: FailureKind::Unexpected.hint(),
                env,
                kind: FailureKind::Unexpected,
            };
        }
    };
    let folder = folders.health_check_folder();

    match upload_with_retry(store, policy, &data, &folder).await {
        Ok(descriptor) => {
            if let Err(err) = store.destroy(&descriptor.public_id).await {
                tracing::warn!(public_id = %descriptor.public_id, error = %err, "Probe cleanup failed");
            }
            ProbeReport::Ok {
                ok: true,
                uploaded: ProbeUpload {
                    public_id: descriptor.public_id,
                    width: descriptor.width,
                    height: descriptor.height,
                    bytes: descriptor.bytes,
                    resource_type: descriptor.resource_type,
                    folder: descriptor.folder,
                },
                env,
            }
        }
        Err(err) => {
            let kind = err.kind();
            tracing::warn!(
                code = kind.code(),
                cloud_name = ?env.cloud_name_last4,
                api_key = ?env.api_key_last4,
                have_secret = env.have_secret,
                "Media store upload probe failed"
            );
            ProbeReport::Failed {
                ok: false,
                code: kind.code(),
                http_code: err.http_status(),
                hint: kind.hint(),
                env,
                kind,
            }
        }
    }
}
