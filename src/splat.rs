//! Stochastic brush placement and the stamp compositing primitive.
//!
//! Placement is rejection sampling: candidate coordinates are drawn
//! uniformly and accepted when the importance map value at the candidate
//! meets an independent uniform draw, so importance values act as
//! per-pixel acceptance probabilities (values ≥ 1 always accept). A pass
//! runs until exactly `count` candidates have been accepted; the expected
//! number of attempts per acceptance is the reciprocal of the mean
//! importance, and an all-zero importance map never terminates — that is a
//! caller contract violation, not a detected error.

use rand::Rng;

use crate::atlas::atlas_index;
use crate::buffer::ImageBuf;
use crate::resample::scale_bicubic;

/// Mitchell–Netravali parameters used for brush downscaling.
const BRUSH_FILTER_B: f32 = 1.0 / 3.0;
const BRUSH_FILTER_C: f32 = 1.0 / 3.0;

/// Composite one brush stamp centered at `(x, y)` with a flat color.
///
/// Every covered texel blends `out = color·α + out·(1 − α)` where `α` is
/// the stencil opacity. If the stamp's full bounding box would cross the
/// canvas edge the whole stamp is a no-op; stamps are never clipped.
pub fn stamp_once(canvas: &mut ImageBuf, x: usize, y: usize, color: &[f32], texture: &ImageBuf) {
    debug_assert_eq!(color.len(), canvas.channels());
    let (tw, th) = (texture.width(), texture.height());
    let (w, h) = (canvas.width(), canvas.height());

    if x >= w || y >= h {
        return;
    }
    if x <= tw / 2 || (w - x) <= tw / 2 || y <= th / 2 || (h - y) <= th / 2 {
        return;
    }

    let x0 = x - tw / 2;
    let y0 = y - th / 2;
    for ty in 0..th {
        for tx in 0..tw {
            let alpha = texture.at(tx, ty, 0);
            for (c, &col) in color.iter().enumerate() {
                let dst = canvas.at_mut(x0 + tx, y0 + ty, c);
                *dst = col * alpha + *dst * (1.0 - alpha);
            }
        }
    }
}

/// Downscale a brush stencil so its larger dimension equals `size`,
/// preserving aspect ratio. A stencil that already fits is returned
/// unchanged; brushes are never upscaled.
pub fn fit_brush(texture: &ImageBuf, size: usize) -> ImageBuf {
    let largest = texture.width().max(texture.height());
    if largest <= size {
        texture.clone()
    } else {
        scale_bicubic(
            texture,
            size as f32 / largest as f32,
            BRUSH_FILTER_B,
            BRUSH_FILTER_C,
        )
    }
}

/// Source color at `(x, y)` with symmetric multiplicative jitter: each
/// channel is scaled by `1 − noise/2 + noise·u` for an independent
/// `u ~ U[0, 1)`, so the expected multiplier is 1 for any amplitude.
fn jittered_color<R: Rng>(src: &ImageBuf, x: usize, y: usize, noise: f32, rng: &mut R) -> Vec<f32> {
    (0..src.channels())
        .map(|c| src.at(x, y, c) * (1.0 - noise / 2.0 + noise * rng.random::<f32>()))
        .collect()
}

/// One splatting pass: place exactly `count` accepted stamps of `texture`
/// (fitted to `size`) into `out`, colors sampled from `src` and gated by
/// `importance`.
///
/// An accepted candidate consumes one of the `count` iterations even when
/// the stamp itself is edge-rejected, so fewer than `count` marks may be
/// visible when many samples land near the border.
pub fn splat_pass<R: Rng>(
    src: &ImageBuf,
    out: &mut ImageBuf,
    importance: &ImageBuf,
    texture: &ImageBuf,
    size: usize,
    count: usize,
    noise: f32,
    rng: &mut R,
) {
    assert!(src.same_size(out) && src.same_size(importance), "size mismatch");
    let brush = fit_brush(texture, size);
    let mut placed = 0;
    while placed < count {
        let x = rng.random_range(0..src.width());
        let y = rng.random_range(0..src.height());
        if importance.at(x, y, 0) >= rng.random::<f32>() {
            let color = jittered_color(src, x, y, noise, rng);
            stamp_once(out, x, y, &color, &brush);
            placed += 1;
        }
    }
}

/// Orientation-aware splatting pass over a pre-built rotated atlas and a
/// matching angle field: each accepted stamp uses the atlas entry nearest
/// to the local edge-flow angle at its center.
///
/// The atlas entries are expected to be pre-fitted to the pass brush size;
/// no rescaling happens here. Angle lookup consumes no random draws, so
/// the draw order matches [`splat_pass`] exactly.
pub fn splat_pass_oriented<R: Rng>(
    src: &ImageBuf,
    out: &mut ImageBuf,
    importance: &ImageBuf,
    atlas: &[ImageBuf],
    angles: &ImageBuf,
    count: usize,
    noise: f32,
    rng: &mut R,
) {
    assert!(
        src.same_size(out) && src.same_size(importance) && src.same_size(angles),
        "size mismatch"
    );
    assert!(!atlas.is_empty(), "empty brush atlas");
    let mut placed = 0;
    while placed < count {
        let x = rng.random_range(0..src.width());
        let y = rng.random_range(0..src.height());
        if importance.at(x, y, 0) >= rng.random::<f32>() {
            let color = jittered_color(src, x, y, noise, rng);
            let index = atlas_index(angles.at(x, y, 0), atlas.len());
            stamp_once(out, x, y, &color, &atlas[index]);
            placed += 1;
        }
    }
}
