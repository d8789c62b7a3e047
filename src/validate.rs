//! Structural image validation.

use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::insights::RejectReason;

/// Check that `path` is a non-empty, decodable image.
///
/// Zero-byte files are rejected before any decoding is attempted. The file
/// handle is dropped before returning.
pub fn validate_image(path: &Path) -> (bool, Option<RejectReason>) {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => return (false, Some(RejectReason::ZeroByte)),
        Ok(_) => {}
        Err(err) => {
            log::debug!("stat failed for {}: {}", path.display(), err);
            return (false, Some(RejectReason::Unreadable));
        }
    }

    match decode_image(path) {
        Ok(_) => (true, None),
        Err(err) => {
            log::debug!("{} is not a readable image: {}", path.display(), err);
            (false, Some(RejectReason::Unreadable))
        }
    }
}

/// Decode `path`, picking the format from the file content rather than its
/// extension. Shared by validation and detection so both agree on what an
/// image is.
pub fn decode_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn zero_byte_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("09-57-27_D02-1.jpg");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(validate_image(&path), (false, Some(RejectReason::ZeroByte)));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("09-57-27_D03-1.jpg");
        std::fs::write(&path, "not an image").unwrap();
        assert_eq!(validate_image(&path), (false, Some(RejectReason::Unreadable)));
    }

    #[test]
    fn real_images_are_valid_regardless_of_extension() {
        let dir = tempdir().unwrap();
        let img = RgbImage::from_pixel(12, 12, Rgb([120, 90, 60]));

        let jpg = dir.path().join("09-57-27_D02-1.jpg");
        img.save(&jpg).unwrap();
        assert_eq!(validate_image(&jpg), (true, None));

        // PNG bytes behind a .jpg name still decode; format is sniffed.
        let png_bytes = dir.path().join("tmp.png");
        img.save(&png_bytes).unwrap();
        let disguised = dir.path().join("09-57-28_D02-2.jpg");
        std::fs::rename(&png_bytes, &disguised).unwrap();
        assert_eq!(validate_image(&disguised), (true, None));
    }

    #[test]
    fn png_bytes_behind_jpg_name_decode_to_the_original_size() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("tmp.png");
        RgbImage::from_pixel(7, 5, Rgb([1, 2, 3])).save(&png).unwrap();
        let disguised = dir.path().join("09-57-28_D02-2.jpg");
        std::fs::rename(&png, &disguised).unwrap();

        // A decoder chosen by extension would try JPEG here and fail.
        assert!(image::open(&disguised).is_err());
        let decoded = decode_image(&disguised).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.jpg");
        assert_eq!(validate_image(&path), (false, Some(RejectReason::Unreadable)));
    }
}
