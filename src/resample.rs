//! Geometric resampling: bicubic rescale and same-size rotation.

use crate::buffer::ImageBuf;

/// Mitchell–Netravali cubic kernel with free parameters `b` and `c`.
/// `b = c = 1/3` is the recommended filter and the default used for brush
/// downscaling.
fn mitchell(x: f32, b: f32, c: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

/// Bicubic rescale by a uniform factor. Output dimensions round to the
/// nearest pixel (at least 1). Border taps clamp to the source edge.
pub fn scale_bicubic(im: &ImageBuf, factor: f32, b: f32, c: f32) -> ImageBuf {
    let out_w = ((im.width() as f32 * factor).round() as usize).max(1);
    let out_h = ((im.height() as f32 * factor).round() as usize).max(1);
    let mut out = ImageBuf::new(out_w, out_h, im.channels());

    for y in 0..out_h {
        for x in 0..out_w {
            // Pixel-center mapping back into source coordinates.
            let sx = (x as f32 + 0.5) / factor - 0.5;
            let sy = (y as f32 + 0.5) / factor - 0.5;
            let x0 = sx.floor() as isize - 1;
            let y0 = sy.floor() as isize - 1;

            for ch in 0..im.channels() {
                let mut acc = 0.0;
                let mut weight_sum = 0.0;
                for j in 0..4 {
                    let yi = y0 + j;
                    let wy = mitchell(sy - yi as f32, b, c);
                    for i in 0..4 {
                        let xi = x0 + i;
                        let w = wy * mitchell(sx - xi as f32, b, c);
                        acc += w * im.at_clamped(xi, yi, ch);
                        weight_sum += w;
                    }
                }
                *out.at_mut(x, y, ch) = acc / weight_sum;
            }
        }
    }
    out
}

/// Rotate by `angle` radians about the image center, keeping the original
/// dimensions. Samples bilinearly; pixels that map outside the source read
/// as zero, which for an opacity stencil means fully transparent.
pub fn rotate(im: &ImageBuf, angle: f32) -> ImageBuf {
    let (w, h, ch) = (im.width(), im.height(), im.channels());
    let mut out = ImageBuf::new(w, h, ch);
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let (sin, cos) = angle.sin_cos();

    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            // Inverse map: rotate the output coordinate back by -angle.
            let sx = cx + cos * dx + sin * dy;
            let sy = cy - sin * dx + cos * dy;
            for c in 0..ch {
                *out.at_mut(x, y, c) = sample_bilinear_zero(im, sx, sy, c);
            }
        }
    }
    out
}

fn sample_bilinear_zero(im: &ImageBuf, x: f32, y: f32, c: usize) -> f32 {
    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let tap = |xi: isize, yi: isize| -> f32 {
        if xi < 0 || yi < 0 || xi >= im.width() as isize || yi >= im.height() as isize {
            0.0
        } else {
            im.at(xi as usize, yi as usize, c)
        }
    };

    let top = tap(x0, y0) * (1.0 - fx) + tap(x0 + 1, y0) * fx;
    let bottom = tap(x0, y0 + 1) * (1.0 - fx) + tap(x0 + 1, y0 + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downscale_halves_dimensions() {
        let im = ImageBuf::new_fill(10, 6, 1, 0.8);
        let half = scale_bicubic(&im, 0.5, 1.0 / 3.0, 1.0 / 3.0);
        assert_eq!((half.width(), half.height()), (5, 3));
        for &v in half.data() {
            assert!((v - 0.8).abs() < 1e-4);
        }
    }

    #[test]
    fn scale_never_returns_empty() {
        let im = ImageBuf::new_fill(3, 3, 1, 1.0);
        let tiny = scale_bicubic(&im, 0.1, 1.0 / 3.0, 1.0 / 3.0);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }

    #[test]
    fn rotate_by_zero_is_identity() {
        let mut im = ImageBuf::new(5, 4, 1);
        *im.at_mut(1, 2, 0) = 0.9;
        *im.at_mut(4, 0, 0) = 0.3;
        assert_eq!(rotate(&im, 0.0), im);
    }

    #[test]
    fn rotate_by_pi_flips_both_axes() {
        let mut im = ImageBuf::new(5, 5, 1);
        *im.at_mut(1, 2, 0) = 1.0;
        let out = rotate(&im, std::f32::consts::PI);
        assert!((out.at(3, 2, 0) - 1.0).abs() < 1e-5);
        assert!(out.at(1, 2, 0).abs() < 1e-5);
    }

    #[test]
    fn rotated_content_falls_off_to_transparent() {
        let im = ImageBuf::new_fill(4, 4, 1, 1.0);
        let out = rotate(&im, std::f32::consts::FRAC_PI_4);
        // Corners leave the source footprint and read as zero opacity.
        assert!(out.at(0, 0, 0) < 0.5);
        assert!(out.at(2, 2, 0) > 0.5);
    }
}
