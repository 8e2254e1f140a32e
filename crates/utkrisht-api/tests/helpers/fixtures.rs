//! Upload payloads.

use axum_test::multipart::{MultipartForm, Part};

/// A 1x1 PNG.
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xB5,
        0x1C, 0x0C, 0x02, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
        0x60, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x68, 0x26, 0x59, 0x0D, 0x00, 0x00, 0x00, 0x00,
        0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

pub fn file_part(bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name("photo.png")
        .mime_type("image/png")
}

/// Multipart form with a PNG and the given text fields.
pub fn upload_form(fields: &[(&str, &str)]) -> MultipartForm {
    fields
        .iter()
        .fold(
            MultipartForm::new().add_part("file", file_part(minimal_png())),
            |form, (name, value)| form.add_text(name.to_string(), value.to_string()),
        )
}
