//! Image filtering primitives consumed by the renderer: luminance split,
//! separable Gaussian blur, Sobel gradients, elementwise subtraction.

use crate::buffer::ImageBuf;

const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];
const CHROMA_EPS: f32 = 1e-6;

/// Split an RGB image into a 1-channel luminance image and a 3-channel
/// chrominance image (per-channel ratio to luminance).
pub fn lumi_chromi(im: &ImageBuf) -> (ImageBuf, ImageBuf) {
    let mut lum = ImageBuf::new(im.width(), im.height(), 1);
    let mut chrom = ImageBuf::new(im.width(), im.height(), im.channels());
    for y in 0..im.height() {
        for x in 0..im.width() {
            let mut l = 0.0;
            for c in 0..im.channels().min(3) {
                l += im.at(x, y, c) * LUMA_WEIGHTS[c];
            }
            *lum.at_mut(x, y, 0) = l;
            for c in 0..im.channels() {
                *chrom.at_mut(x, y, c) = im.at(x, y, c) / (l + CHROMA_EPS);
            }
        }
    }
    (lum, chrom)
}

/// Normalized 1-D Gaussian taps, truncated at `truncate * sigma`.
fn gaussian_kernel(sigma: f32, truncate: f32) -> Vec<f32> {
    let radius = (sigma * truncate).ceil().max(1.0) as usize;
    let mut taps = Vec::with_capacity(2 * radius + 1);
    let inv = 1.0 / (2.0 * sigma * sigma);
    for i in 0..=2 * radius {
        let d = i as f32 - radius as f32;
        taps.push((-d * d * inv).exp());
    }
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Separable Gaussian blur with the default truncation domain (3σ) and
/// clamp-to-edge extension.
pub fn gaussian_blur(im: &ImageBuf, sigma: f32) -> ImageBuf {
    gaussian_blur_with(im, sigma, 3.0, true)
}

/// Separable Gaussian blur. `truncate` sets the kernel radius in units of
/// `sigma`; `clamp_edges` extends the border pixels outward, otherwise
/// out-of-bounds taps read zero.
pub fn gaussian_blur_with(im: &ImageBuf, sigma: f32, truncate: f32, clamp_edges: bool) -> ImageBuf {
    let taps = gaussian_kernel(sigma, truncate);
    let radius = taps.len() as isize / 2;
    let (w, h, ch) = (im.width(), im.height(), im.channels());

    let tap_at = |img: &ImageBuf, x: isize, y: isize, c: usize| -> f32 {
        if clamp_edges {
            img.at_clamped(x, y, c)
        } else if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            img.at(x as usize, y as usize, c)
        }
    };

    let mut horizontal = ImageBuf::new(w, h, ch);
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0;
                for (i, t) in taps.iter().enumerate() {
                    acc += t * tap_at(im, x as isize + i as isize - radius, y as isize, c);
                }
                *horizontal.at_mut(x, y, c) = acc;
            }
        }
    }

    let mut out = ImageBuf::new(w, h, ch);
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0;
                for (i, t) in taps.iter().enumerate() {
                    acc += t * tap_at(&horizontal, x as isize, y as isize + i as isize - radius, c);
                }
                *out.at_mut(x, y, c) = acc;
            }
        }
    }
    out
}

type Kernel3 = [[f32; 3]; 3];

const SOBEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

fn gradient_with_kernel(im: &ImageBuf, kernel: &Kernel3) -> ImageBuf {
    let (w, h) = (im.width(), im.height());
    let mut out = ImageBuf::new(w, h, 1);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let sx = x as isize + kx as isize - 1;
                    let sy = y as isize + ky as isize - 1;
                    acc += weight * im.at_clamped(sx, sy, 0);
                }
            }
            *out.at_mut(x, y, 0) = acc;
        }
    }
    out
}

/// Horizontal Sobel gradient of channel 0.
pub fn gradient_x(im: &ImageBuf) -> ImageBuf {
    gradient_with_kernel(im, &SOBEL_X)
}

/// Vertical Sobel gradient of channel 0.
pub fn gradient_y(im: &ImageBuf) -> ImageBuf {
    gradient_with_kernel(im, &SOBEL_Y)
}

/// Elementwise `a - b`. Panics if the shapes differ.
pub fn subtract(a: &ImageBuf, b: &ImageBuf) -> ImageBuf {
    assert!(
        a.same_size(b) && a.channels() == b.channels(),
        "subtract: shape mismatch"
    );
    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&av, &bv)| av - bv)
        .collect();
    ImageBuf::from_vec(a.width(), a.height(), a.channels(), data).expect("same shape as inputs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_of_gray_is_identity() {
        let im = ImageBuf::new_fill(4, 3, 3, 0.5);
        let (lum, chrom) = lumi_chromi(&im);
        assert_eq!(lum.channels(), 1);
        for &v in lum.data() {
            assert!((v - 0.5).abs() < 1e-5);
        }
        for &v in chrom.data() {
            assert!((v - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn kernel_is_normalized() {
        let taps = gaussian_kernel(2.0, 3.0);
        assert_eq!(taps.len(), 13);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blur_preserves_constant_image() {
        let im = ImageBuf::new_fill(9, 7, 3, 0.42);
        let blurred = gaussian_blur(&im, 1.5);
        for &v in blurred.data() {
            assert!((v - 0.42).abs() < 1e-5);
        }
    }

    #[test]
    fn gradient_of_constant_is_zero() {
        let im = ImageBuf::new_fill(6, 6, 1, 0.7);
        for &v in gradient_x(&im).data().iter().chain(gradient_y(&im).data()) {
            assert!(v.abs() < 1e-6);
        }
    }

    #[test]
    fn vertical_step_has_horizontal_gradient() {
        let mut im = ImageBuf::new(8, 8, 1);
        for y in 0..8 {
            for x in 4..8 {
                *im.at_mut(x, y, 0) = 1.0;
            }
        }
        let gx = gradient_x(&im);
        let gy = gradient_y(&im);
        assert!(gx.at(4, 4, 0) > 1.0);
        assert!(gy.at(4, 4, 0).abs() < 1e-6);
    }

    #[test]
    fn subtract_recovers_difference() {
        let a = ImageBuf::new_fill(2, 2, 1, 0.9);
        let b = ImageBuf::new_fill(2, 2, 1, 0.2);
        let d = subtract(&a, &b);
        for &v in d.data() {
            assert!((v - 0.7).abs() < 1e-6);
        }
    }
}
