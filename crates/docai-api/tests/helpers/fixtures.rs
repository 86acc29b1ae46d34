//! Multipart bodies and document bytes for upload tests.

use axum_test::multipart::{MultipartForm, Part};

/// Smallest byte sequence the tests treat as a PDF. Content is never parsed.
pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n%";

pub fn pdf_form(data: &[u8]) -> MultipartForm {
    file_form(data, "document.pdf", "application/pdf")
}

pub fn file_form(data: &[u8], file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data.to_vec())
            .file_name(file_name)
            .mime_type(mime_type),
    )
}

pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ]
}
