//! Rotated brush texture atlas for orientation-aware stamping.

use std::f32::consts::TAU;

use crate::buffer::ImageBuf;
use crate::resample::rotate;

/// Build `n_angles` discretely rotated copies of a brush stencil.
///
/// `atlas[0]` is the input unchanged and `atlas[i]` is `atlas[i - 1]`
/// rotated by `2π / n_angles`. Rotation is cumulative: each step resamples
/// the previous element, so interpolation softening compounds along the
/// sequence. The gradual softening reads as natural bristle variation, so
/// the entries are built this way rather than by rotating the unrotated
/// stencil by `i · 2π / n` each time.
///
/// Panics if `n_angles` is zero.
pub fn build_rotated_atlas(texture: &ImageBuf, n_angles: usize) -> Vec<ImageBuf> {
    assert!(n_angles >= 1, "atlas needs at least one orientation");
    let step = TAU / n_angles as f32;
    let mut atlas = Vec::with_capacity(n_angles);
    atlas.push(texture.clone());
    for i in 1..n_angles {
        atlas.push(rotate(&atlas[i - 1], step));
    }
    atlas
}

/// Atlas index for an angle in radians. Negative angles wrap into
/// `[0, 2π)` before quantizing to the nearest of `n_angles` bins.
pub fn atlas_index(angle: f32, n_angles: usize) -> usize {
    let mut angle = angle;
    if angle < 0.0 {
        angle += TAU;
    }
    ((angle * n_angles as f32 / TAU).round() as usize) % n_angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn atlas_has_requested_length_and_unrotated_head() {
        let mut brush = ImageBuf::new(7, 3, 1);
        *brush.at_mut(3, 1, 0) = 1.0;
        for n in [1, 4, 36] {
            let atlas = build_rotated_atlas(&brush, n);
            assert_eq!(atlas.len(), n);
            assert_eq!(atlas[0], brush);
        }
    }

    #[test]
    fn quarter_turn_transposes_a_bar() {
        // A horizontal bar through the center becomes vertical one quarter
        // of the way around a 4-entry atlas.
        let mut bar = ImageBuf::new(5, 5, 1);
        for x in 0..5 {
            *bar.at_mut(x, 2, 0) = 1.0;
        }
        let atlas = build_rotated_atlas(&bar, 4);
        assert!(atlas[1].at(2, 0, 0) > 0.9);
        assert!(atlas[1].at(2, 4, 0) > 0.9);
        assert!(atlas[1].at(0, 2, 0) < 0.1);
    }

    #[test]
    fn index_quantizes_and_wraps() {
        assert_eq!(atlas_index(0.0, 36), 0);
        assert_eq!(atlas_index(FRAC_PI_2, 36), 9);
        assert_eq!(atlas_index(-FRAC_PI_2, 36), 27);
        assert_eq!(atlas_index(PI, 4), 2);
        // Just below a full turn rounds up and wraps back to zero.
        assert_eq!(atlas_index(TAU - 1e-3, 36), 0);
    }
}
