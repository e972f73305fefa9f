//! Operator photo uploads: an image file tagged with the position it shows.
//!
//! The store runs extraction on uploaded photos and adds the resulting POIs
//! to its list.

use std::path::Path;

use crate::{parse_coordinate_input, Coordinate, CoreError};

/// A photo ready to be sent to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub coordinate: Coordinate,
}

/// Image MIME type implied by a file extension.
#[must_use]
pub fn image_mime_for(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Checks an upload the way the upload form does: a non-empty image file and
/// an in-range latitude/longitude pair.
///
/// A declared `content_type` is trusted when it is an `image/*` type;
/// otherwise the type is inferred from the file extension.
///
/// # Errors
///
/// - [`CoreError::EmptyUpload`] when `bytes` is empty.
/// - [`CoreError::NotAnImage`] when no image type can be established.
/// - The errors of [`parse_coordinate_input`] for the position.
pub fn validate_upload(
    filename: &str,
    content_type: Option<&str>,
    bytes: Vec<u8>,
    latitude: &str,
    longitude: &str,
) -> Result<UploadForm, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::EmptyUpload {
            filename: filename.to_string(),
        });
    }

    let declared = content_type
        .map(str::trim)
        .filter(|ct| ct.to_ascii_lowercase().starts_with("image/"));
    let mime_type = match declared {
        Some(ct) => ct.to_string(),
        None => image_mime_for(filename)
            .ok_or_else(|| CoreError::NotAnImage {
                filename: filename.to_string(),
            })?
            .to_string(),
    };

    let coordinate = parse_coordinate_input(latitude, longitude)?;
    Ok(UploadForm {
        filename: filename.to_string(),
        mime_type,
        bytes,
        coordinate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_comes_from_extension() {
        assert_eq!(image_mime_for("shop.JPG"), Some("image/jpeg"));
        assert_eq!(image_mime_for("dir/front.webp"), Some("image/webp"));
        assert_eq!(image_mime_for("notes.txt"), None);
        assert_eq!(image_mime_for("no-extension"), None);
    }

    #[test]
    fn accepts_image_with_valid_position() {
        let form = validate_upload("shop.png", None, vec![1, 2], "23.81", "90.41").unwrap();
        assert_eq!(form.mime_type, "image/png");
        assert!((form.coordinate.longitude - 90.41).abs() < 1e-9);
    }

    #[test]
    fn declared_image_type_wins_over_extension() {
        let form = validate_upload("upload", Some("image/webp"), vec![1], "0", "0").unwrap();
        assert_eq!(form.mime_type, "image/webp");
    }

    #[test]
    fn rejects_non_images_and_empty_files() {
        assert!(matches!(
            validate_upload("report.pdf", Some("application/pdf"), vec![1], "0", "0"),
            Err(CoreError::NotAnImage { .. })
        ));
        assert!(matches!(
            validate_upload("shop.jpg", None, Vec::new(), "0", "0"),
            Err(CoreError::EmptyUpload { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_position() {
        assert!(matches!(
            validate_upload("shop.jpg", None, vec![1], "91", "0"),
            Err(CoreError::InvalidCoordinate { field: "latitude", .. })
        ));
        assert!(matches!(
            validate_upload("shop.jpg", None, vec![1], "10", ""),
            Err(CoreError::MissingCoordinate { field: "longitude" })
        ));
    }
}
