//! Orientation field estimation from the image structure tensor.
//!
//! The dominant local edge-flow direction at a pixel is the eigenvector of
//! the smaller eigenvalue of the smoothed gradient outer-product matrix:
//! the direction of least gradient change runs *along* an edge, not across
//! it. Smoothing the tensor channels (not just the luminance) integrates
//! gradient statistics over a neighborhood; without it the per-pixel
//! angles are too noisy to drive brush rotation.

use crate::buffer::ImageBuf;
use crate::filter::{gaussian_blur, gradient_x, gradient_y, lumi_chromi};

/// Smoothed structure tensor of an image: a 3-channel buffer holding
/// (gx², gx·gy, gy²) of the blurred luminance, each channel blurred again
/// with `sigma * factor`.
pub fn structure_tensor(im: &ImageBuf, sigma: f32, factor: f32) -> ImageBuf {
    let (lum, _chrom) = lumi_chromi(im);
    let blurred = gaussian_blur(&lum, sigma);
    let gx = gradient_x(&blurred);
    let gy = gradient_y(&blurred);

    let mut tensor = ImageBuf::new(im.width(), im.height(), 3);
    for y in 0..im.height() {
        for x in 0..im.width() {
            let dx = gx.at(x, y, 0);
            let dy = gy.at(x, y, 0);
            *tensor.at_mut(x, y, 0) = dx * dx;
            *tensor.at_mut(x, y, 1) = dx * dy;
            *tensor.at_mut(x, y, 2) = dy * dy;
        }
    }
    gaussian_blur(&tensor, sigma * factor)
}

/// Eigenvector of the smaller eigenvalue of the symmetric matrix
/// `[[a, b], [b, d]]`, unnormalized.
///
/// The matrix is positive semi-definite by construction, so both
/// eigenvalues are real. When the tensor is isotropic (equal eigenvalues,
/// including the all-zero tensor of a flat region) the direction is
/// undefined; this resolves the tie deterministically to the +x axis.
pub fn smallest_eigenvector(a: f32, b: f32, d: f32) -> [f32; 2] {
    let half_diff = 0.5 * (a - d);
    let disc = (half_diff * half_diff + b * b).sqrt();
    let scale = a.abs() + d.abs() + b.abs();
    if disc <= f32::EPSILON * scale || scale == 0.0 {
        return [1.0, 0.0];
    }
    let lambda_min = 0.5 * (a + d) - disc;
    // Both rows of (A - λI) describe the eigenvector; take the one with the
    // larger norm for numerical stability.
    let row0 = [b, lambda_min - a];
    let row1 = [lambda_min - d, b];
    let n0 = row0[0] * row0[0] + row0[1] * row0[1];
    let n1 = row1[0] * row1[0] + row1[1] * row1[1];
    if n0 >= n1 { row0 } else { row1 }
}

/// Per-pixel dominant edge-flow angle in radians, in `(-π, π]`.
///
/// `sigma` blurs the luminance before differentiation; `factor` scales the
/// tensor-smoothing blur (`sigma * factor`).
pub fn estimate_orientation(im: &ImageBuf, sigma: f32, factor: f32) -> ImageBuf {
    let tensor = structure_tensor(im, sigma, factor);
    let mut angles = ImageBuf::new(im.width(), im.height(), 1);
    for y in 0..im.height() {
        for x in 0..im.width() {
            let v = smallest_eigenvector(
                tensor.at(x, y, 0),
                tensor.at(x, y, 1),
                tensor.at(x, y, 2),
            );
            *angles.at_mut(x, y, 0) = v[1].atan2(v[0]);
        }
    }
    angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn eigenvector_of_diagonal_matrix() {
        // Smaller eigenvalue 1.0 belongs to the y axis.
        let v = smallest_eigenvector(4.0, 0.0, 1.0);
        assert!(v[0].abs() < 1e-6 * v[1].abs());

        // And the other way around.
        let v = smallest_eigenvector(1.0, 0.0, 4.0);
        assert!(v[1].abs() < 1e-6 * v[0].abs());
    }

    #[test]
    fn isotropic_tensor_resolves_to_x_axis() {
        assert_eq!(smallest_eigenvector(0.0, 0.0, 0.0), [1.0, 0.0]);
        assert_eq!(smallest_eigenvector(2.0, 0.0, 2.0), [1.0, 0.0]);
    }

    #[test]
    fn eigenvector_satisfies_definition() {
        let (a, b, d) = (3.0, 1.5, 2.0);
        let v = smallest_eigenvector(a, b, d);
        let half = 0.5 * (a - d);
        let lambda = 0.5 * (a + d) - (half * half + b * b).sqrt();
        let rx = a * v[0] + b * v[1] - lambda * v[0];
        let ry = b * v[0] + d * v[1] - lambda * v[1];
        let norm = (v[0] * v[0] + v[1] * v[1]).sqrt();
        assert!(rx.abs() / norm < 1e-5);
        assert!(ry.abs() / norm < 1e-5);
    }

    #[test]
    fn vertical_edge_flows_vertically() {
        // Left half dark, right half bright: the edge runs vertically, so
        // the least-change direction is ±π/2 along it.
        let mut im = ImageBuf::new(32, 32, 3);
        for y in 0..32 {
            for x in 16..32 {
                for c in 0..3 {
                    *im.at_mut(x, y, c) = 1.0;
                }
            }
        }
        let angles = estimate_orientation(&im, 1.0, 4.0);
        for y in 8..24 {
            let angle = angles.at(16, y, 0);
            assert!(
                (angle.abs() - FRAC_PI_2).abs() < 0.1,
                "angle at edge was {angle}"
            );
        }
    }

    #[test]
    fn flat_image_has_zero_angles() {
        let im = ImageBuf::new_fill(16, 16, 3, 0.5);
        let angles = estimate_orientation(&im, 1.0, 4.0);
        for &a in angles.data() {
            assert_eq!(a, 0.0);
        }
    }
}
