use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A file held by the remote media store, tracked locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    pub public_id: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub resource_type: String,
    pub folder: String,
    pub bytes: i64,
    pub title: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new Media row, taken from a confirmed remote upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub public_id: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub resource_type: String,
    pub folder: String,
    pub bytes: i64,
    pub title: Option<String>,
    pub category: Option<String>,
}

impl NewMedia {
    pub fn into_media(self, id: Uuid, created_at: DateTime<Utc>) -> Media {
        Media {
            id,
            public_id: self.public_id,
            url: self.url,
            width: self.width,
            height: self.height,
            format: self.format,
            resource_type: self.resource_type,
            folder: self.folder,
            bytes: self.bytes,
            title: self.title,
            category: self.category,
            created_at,
        }
    }
}

/// Filters for media listings
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MediaFilter {
    /// Folder prefix: matches the folder itself and anything below it
    pub folder: Option<String>,
    /// Exact category match
    pub category: Option<String>,
}

impl MediaFilter {
    /// Whether a media folder falls under `prefix` (`folder == prefix` or `folder` starts with `prefix/`).
    pub fn folder_matches(prefix: &str, folder: &str) -> bool {
        let prefix = prefix.trim_end_matches('/');
        folder == prefix
            || folder
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn matches(&self, media: &Media) -> bool {
        let folder_ok = self
            .folder
            .as_deref()
            .is_none_or(|prefix| Self::folder_matches(prefix, &media.folder));
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| media.category.as_deref() == Some(c));
        folder_ok && category_ok
    }
}
