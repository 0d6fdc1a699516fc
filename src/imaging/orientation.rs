//! Orientation correction.
//!
//! The decoder reports the EXIF orientation tag as an
//! [`Orientation`]. Only the three pure rotations are corrected:
//!
//! | Tag | Variant | Stored as | Correction |
//! |---|---|---|---|
//! | 3 | `Rotate180` | upside down | rotate 180° |
//! | 6 | `Rotate90` | rotated 90° counter-clockwise | rotate 90° clockwise |
//! | 8 | `Rotate270` | rotated 90° clockwise | rotate 90° counter-clockwise |
//! | anything else, or no tag | | as shown | none |
//!
//! The `image` crate's quarter-turn rotations swap width and height, so the
//! canvas always grows to hold every pixel.

use image::DynamicImage;
use image::metadata::Orientation;

/// Apply the compensating rotation for a decoded orientation.
pub fn correct(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Rotate180 => image.rotate180(),
        Orientation::Rotate90 => image.rotate90(),
        Orientation::Rotate270 => image.rotate270(),
        _ => image,
    }
}
