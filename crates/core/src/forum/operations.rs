use super::error::ValidationError;

pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_CONTENT_LEN: usize = 20_000;
pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_FILENAME_LEN: usize = 255;

/// Content type recorded when the uploader gives none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    validate_text("title", title, MAX_TITLE_LEN)
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    validate_text("content", content, MAX_CONTENT_LEN)
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    validate_text("username", username, MAX_USERNAME_LEN)
}

/// Filenames become part of a blob key, so path separators are refused.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    validate_text("filename", filename, MAX_FILENAME_LEN)?;
    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        return Err(ValidationError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Blob key for an uploaded attachment.
///
/// Pattern: `attachments/<post_id>/<file_id>-<filename>`
pub fn attachment_blob_key(post_id: &str, file_id: &str, filename: &str) -> String {
    format!("attachments/{post_id}/{file_id}-{filename}")
}

/// Returns the caller's content type, or the generic binary type when absent or blank.
pub fn resolve_content_type(content_type: Option<&str>) -> String {
    content_type
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Case-sensitive substring match over title and content.
pub fn matches_search(title: &str, content: &str, query: &str) -> bool {
    title.contains(query) || content.contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Exam schedule").is_ok());
        assert_eq!(validate_title("   "), Err(ValidationError::Empty("title")));
        assert!(matches!(
            validate_title(&"x".repeat(MAX_TITLE_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_filename_rejects_paths() {
        assert!(validate_filename("notes.pdf").is_ok());
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("a\\b").is_err());
        assert!(validate_filename("").is_err());
    }

    #[test]
    fn test_attachment_blob_key() {
        assert_eq!(
            attachment_blob_key("p1", "f1", "notes.pdf"),
            "attachments/p1/f1-notes.pdf"
        );
    }

    #[test]
    fn test_resolve_content_type() {
        assert_eq!(resolve_content_type(None), DEFAULT_CONTENT_TYPE);
        assert_eq!(resolve_content_type(Some(" ")), DEFAULT_CONTENT_TYPE);
        assert_eq!(resolve_content_type(Some("application/pdf")), "application/pdf");
    }

    #[test]
    fn test_matches_search_is_case_sensitive() {
        assert!(matches_search("Exam schedule", "", "Exam"));
        assert!(!matches_search("Exam schedule", "", "exam"));
        assert!(matches_search("Hello", "the midterm is on friday", "midterm"));
    }
}
