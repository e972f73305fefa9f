/// Fallback when the image response carries no usable `Content-Type`.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Maps an upstream `Content-Type` header onto a MIME type the vision API
/// accepts. Parameters (`; charset=...`) and case are ignored; anything
/// unrecognized becomes [`DEFAULT_IMAGE_MIME`].
#[must_use]
pub fn resolve_mime_type(content_type: Option<&str>) -> &'static str {
    let Some(raw) = content_type else {
        return DEFAULT_IMAGE_MIME;
    };
    let lowered = raw.to_ascii_lowercase();

    if lowered.contains("image/jpeg") || lowered.contains("image/jpg") {
        "image/jpeg"
    } else if lowered.contains("image/png") {
        "image/png"
    } else if lowered.contains("image/webp") {
        "image/webp"
    } else if lowered.contains("image/gif") {
        "image/gif"
    } else {
        DEFAULT_IMAGE_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_are_kept() {
        assert_eq!(resolve_mime_type(Some("image/png")), "image/png");
        assert_eq!(resolve_mime_type(Some("image/webp")), "image/webp");
        assert_eq!(resolve_mime_type(Some("IMAGE/GIF; charset=binary")), "image/gif");
        assert_eq!(resolve_mime_type(Some("image/jpg")), "image/jpeg");
    }

    #[test]
    fn missing_or_unknown_defaults_to_jpeg() {
        assert_eq!(resolve_mime_type(None), "image/jpeg");
        assert_eq!(resolve_mime_type(Some("application/octet-stream")), "image/jpeg");
        assert_eq!(resolve_mime_type(Some("image/heic")), "image/jpeg");
    }
}
