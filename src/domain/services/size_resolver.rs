//! Target size resolution
//!
//! Turns an intrinsic size plus optional width/height constraints into the
//! size a decoder should sample to. A single constraint keeps the source
//! aspect ratio; two constraints are honored as given, even if that
//! distorts the image.

use crate::domain::entities::{Dimensions, clamp_side};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cannot resolve a target size from intrinsic size {intrinsic}")]
pub struct SizeResolutionError {
    /// The intrinsic size, returned unchanged
    pub intrinsic: Dimensions,
}

/// Resolves the target size for a decode
///
/// Constraints that are absent, zero, negative or non-finite are ignored.
/// Every side of the result is rounded and clamped to at least 1.
///
/// # Errors
///
/// Fails when either intrinsic side is zero, since no aspect ratio exists.
/// The error carries the intrinsic size unchanged.
///
/// # Example
///
/// ```
/// use avif_stream::domain::entities::Dimensions;
/// use avif_stream::domain::services::resolve;
///
/// let target = resolve(Dimensions::new(1920, 1080), Some(640.0), None).unwrap();
/// assert_eq!(target, Dimensions::new(640, 360));
/// ```
pub fn resolve(
    intrinsic: Dimensions,
    requested_width: Option<f64>,
    requested_height: Option<f64>,
) -> Result<Dimensions, SizeResolutionError> {
    if intrinsic.is_degenerate() {
        return Err(SizeResolutionError { intrinsic });
    }

    let source_width = intrinsic.width as f64;
    let source_height = intrinsic.height as f64;

    let resolved = match (usable(requested_width), usable(requested_height)) {
        (None, None) => intrinsic,
        (Some(width), None) => Dimensions::new(
            clamp_side(width),
            clamp_side(source_height * (width / source_width)),
        ),
        (None, Some(height)) => Dimensions::new(
            clamp_side(source_width * (height / source_height)),
            clamp_side(height),
        ),
        (Some(width), Some(height)) => Dimensions::new(clamp_side(width), clamp_side(height)),
    };

    Ok(resolved)
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HD: Dimensions = Dimensions::new(1920, 1080);

    #[test]
    fn no_constraints_keep_intrinsic() {
        assert_eq!(resolve(HD, None, None), Ok(HD));
        assert_eq!(resolve(HD, Some(0.0), Some(0.0)), Ok(HD));
    }

    #[test]
    fn width_only_keeps_ratio() {
        assert_eq!(resolve(HD, Some(640.0), None), Ok(Dimensions::new(640, 360)));
        assert_eq!(resolve(HD, Some(640.0), Some(0.0)), Ok(Dimensions::new(640, 360)));
    }

    #[test]
    fn height_only_keeps_ratio() {
        assert_eq!(resolve(HD, None, Some(360.0)), Ok(Dimensions::new(640, 360)));
    }

    #[test]
    fn both_constraints_win_over_ratio() {
        assert_eq!(
            resolve(HD, Some(640.0), Some(480.0)),
            Ok(Dimensions::new(640, 480))
        );
    }

    #[test]
    fn degenerate_intrinsic_fails() {
        let zero_width = Dimensions::new(0, 100);
        assert_eq!(
            resolve(zero_width, Some(50.0), None),
            Err(SizeResolutionError {
                intrinsic: zero_width
            })
        );
        let zero_height = Dimensions::new(100, 0);
        assert_eq!(
            resolve(zero_height, None, Some(50.0)).unwrap_err().intrinsic,
            zero_height
        );
        assert!(resolve(Dimensions::new(0, 0), None, None).is_err());
    }

    #[test]
    fn tiny_results_clamp_to_one() {
        let wide = Dimensions::new(4000, 10);
        assert_eq!(resolve(wide, Some(100.0), None), Ok(Dimensions::new(100, 1)));
        assert_eq!(resolve(HD, Some(0.3), None), Ok(Dimensions::new(1, 1)));
    }

    #[test]
    fn non_finite_constraints_are_ignored() {
        assert_eq!(resolve(HD, Some(f64::NAN), None), Ok(HD));
        assert_eq!(resolve(HD, Some(f64::INFINITY), Some(-3.0)), Ok(HD));
    }

    proptest! {
        #[test]
        fn single_width_preserves_ratio(w in 1u32..10_000, h in 1u32..10_000, target in 1u32..10_000) {
            let intrinsic = Dimensions::new(w, h);
            let resolved = resolve(intrinsic, Some(target as f64), None).unwrap();
            prop_assert_eq!(resolved.width, target);
            let exact = (h as f64 * target as f64 / w as f64).max(1.0);
            prop_assert!((resolved.height as f64 - exact).abs() <= 1.0);
        }

        #[test]
        fn single_height_preserves_ratio(w in 1u32..10_000, h in 1u32..10_000, target in 1u32..10_000) {
            let intrinsic = Dimensions::new(w, h);
            let resolved = resolve(intrinsic, None, Some(target as f64)).unwrap();
            prop_assert_eq!(resolved.height, target);
            let exact = (w as f64 * target as f64 / h as f64).max(1.0);
            prop_assert!((resolved.width as f64 - exact).abs() <= 1.0);
        }

        #[test]
        fn both_constraints_are_exact(w in 1u32..10_000, h in 1u32..10_000, tw in 1u32..10_000, th in 1u32..10_000) {
            let resolved = resolve(Dimensions::new(w, h), Some(tw as f64), Some(th as f64)).unwrap();
            prop_assert_eq!(resolved, Dimensions::new(tw, th));
        }
    }
}
