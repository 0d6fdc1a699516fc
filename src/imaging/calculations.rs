//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::BoundingBox;

/// Largest dimensions that fit inside `bounds` while keeping the source aspect ratio.
///
/// Never enlarges: a source already inside the box is returned unchanged.
/// Neither dimension drops below 1.
///
/// ```
/// # use sizegate::imaging::{BoundingBox, fit_within};
/// // 4000x3000 landscape into 1920x1080 → height-bound
/// assert_eq!(fit_within((4000, 3000), BoundingBox::new(1920, 1080)), (1440, 1080));
///
/// // already small enough
/// assert_eq!(fit_within((800, 600), BoundingBox::new(1920, 1080)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), bounds: BoundingBox) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= bounds.width && src_h <= bounds.height {
        return source;
    }

    let scale_w = bounds.width as f64 / src_w as f64;
    let scale_h = bounds.height as f64 / src_h as f64;

    if scale_w <= scale_h {
        // Width is the binding edge
        let h = (src_h as f64 * scale_w).round() as u32;
        (bounds.width, h.max(1))
    } else {
        // Height is the binding edge
        let w = (src_w as f64 * scale_h).round() as u32;
        (w.max(1), bounds.height)
    }
}
