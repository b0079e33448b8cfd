pub mod s3;
pub mod supabase_storage;

/// Content type for an uploaded object, from its filename extension.
pub fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_upload_types() {
        assert_eq!(guess_content_type("certificate.pdf"), "application/pdf");
        assert_eq!(guess_content_type("proof.jpg"), "image/jpeg");
        assert_eq!(guess_content_type("unknown.bin77"), "application/octet-stream");
    }
}
