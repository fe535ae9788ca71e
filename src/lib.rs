//! Painterly rendering of photographs by stochastic brush splatting.
//!
//! The engine stamps many small, colored, textured brush marks onto a
//! canvas so the result reads as a hand-painted picture while keeping the
//! photo's large-scale structure and fine detail.
//!
//! ## Pipeline
//! A render is two ordered splatting passes into one canvas: a *base* pass
//! with a large brush and uniform placement density, then a *detail* pass
//! with a small brush whose placement density is the magnitude of the
//! high-frequency residual (source minus a heavy blur), so extra strokes
//! land where local contrast is high. The oriented variant additionally
//! estimates a per-pixel edge-flow angle from the structure tensor and
//! picks a discretely rotated copy of the brush per stamp.
//!
//! ## Values and buffers
//! All processing happens on [`ImageBuf`], a row-major interleaved `f32`
//! image. Values are unbounded during processing and only clamped when
//! converting back to 8-bit at the output boundary.
//!
//! ## Reproducibility
//! Every stochastic entry point takes a caller-supplied [`rand::Rng`];
//! draws are consumed in a fixed order (x, y, accept threshold, then one
//! jitter per channel), so a seeded `StdRng` reproduces a render exactly.

pub mod atlas;
pub mod buffer;
pub mod error;
pub mod filter;
pub mod orientation;
pub mod paint;
pub mod resample;
pub mod splat;

pub use atlas::build_rotated_atlas;
pub use buffer::ImageBuf;
pub use error::Error;
pub use orientation::estimate_orientation;
pub use paint::{PaintConfig, render_oriented_painterly, render_painterly};
pub use splat::{fit_brush, splat_pass, splat_pass_oriented, stamp_once};
