/// MIME types the uploader accepts
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg"];

/// Multi-picture JPEGs often arrive with an empty or generic MIME type
pub fn is_mpo_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("mpo"))
}

/// JPEG by MIME type, or an `.mpo` file. Everything else is rejected
/// before decode.
pub fn validate_file_type(filename: &str, mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    ACCEPTED_MIME_TYPES.contains(&mime.as_str()) || is_mpo_filename(filename)
}
