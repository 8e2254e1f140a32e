use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media store backend types
///
/// Cloudinary is the production backend; the local filesystem backend serves
/// development setups without CDN credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Cloudinary,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Ok(StorageBackend::Cloudinary),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Cloudinary => write!(f, "cloudinary"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}
