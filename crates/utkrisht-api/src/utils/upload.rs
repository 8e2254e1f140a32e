//! Multipart helpers for the upload handler

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::{header, HeaderMap, StatusCode};
use utkrisht_core::AppError;

use crate::services::upload::UploadRequest;

/// Reject anything that is not `multipart/form-data` before touching the body.
pub fn require_multipart(headers: &HeaderMap) -> Result<(), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mime = content_type.split(';').next().map(str::trim).unwrap_or("");
    if mime.eq_ignore_ascii_case("multipart/form-data") {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType(
            "Expected multipart/form-data".to_string(),
        ))
    }
}

fn file_too_large(max_file_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File exceeds {}MB limit",
        max_file_size / (1024 * 1024)
    ))
}

/// A body cut off by the request size limit surfaces as a 413 multipart error.
fn multipart_error(err: MultipartError, max_file_size: usize, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        file_too_large(max_file_size)
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err))
    }
}

/// Collect the upload form: one `file` field plus optional text fields.
/// Only one field named "file" is accepted; unknown fields are ignored.
/// The file is streamed and rejected as soon as it grows past `max_file_size`.
pub async fn read_upload_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size, "Failed to read multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if request.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, max_file_size, "Failed to read file data"))?
                {
                    if data.len() + chunk.len() > max_file_size {
                        tracing::info!(max_file_size, "Upload rejected while streaming: file too large");
                        return Err(file_too_large(max_file_size));
                    }
                    data.extend_from_slice(&chunk);
                }
                request.file = Some(data);
            }
            "title" | "category" | "projectId" | "portfolioId" => {
                let context = format!("Failed to read field {}", field_name);
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_file_size, &context))?;
                let slot = match field_name.as_str() {
                    "title" => &mut request.title,
                    "category" => &mut request.category,
                    "projectId" => &mut request.project_id,
                    _ => &mut request.portfolio_id,
                };
                *slot = Some(value);
            }
            _ => {}
        }
    }

    Ok(request)
}
