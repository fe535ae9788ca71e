use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageReader;
use minifb::{Key, Window, WindowOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;

use impasto::{ImageBuf, PaintConfig, render_oriented_painterly, render_painterly};

#[derive(Parser)]
#[command(about = "Render a photograph as a painterly image by stochastic brush splatting")]
struct Args {
    /// Source photograph.
    input: PathBuf,

    /// Brush stencil image, read as grayscale opacity. A soft elongated
    /// stroke is synthesized when omitted.
    #[clap(short, long)]
    brush: Option<PathBuf>,

    /// Output image path.
    #[clap(short, long, default_value = "painted.png")]
    output: PathBuf,

    /// Base-pass brush size in pixels; the detail pass uses a quarter of it.
    #[clap(short, long, default_value = "50")]
    size: usize,

    /// Accepted stamps per pass.
    #[clap(short = 'n', long, default_value = "10000")]
    count: usize,

    /// Per-channel color jitter amplitude.
    #[clap(long, default_value = "0.3")]
    noise: f32,

    /// Rotate stamps to follow the local edge-flow field.
    #[clap(long)]
    oriented: bool,

    /// Number of rotated atlas entries used with --oriented.
    #[clap(long, default_value = "36")]
    angles: usize,

    /// RNG seed; a fixed seed reproduces the render exactly.
    #[clap(long)]
    seed: Option<u64>,

    /// Show the result in a window until Escape is pressed.
    #[clap(long)]
    preview: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = ImageReader::open(&args.input)
        .with_context(|| format!("couldn't open {}", args.input.display()))?
        .decode()
        .with_context(|| format!("couldn't decode {}", args.input.display()))?
        .into_rgb8();
    let source = ImageBuf::from_rgb8(&source);

    let brush = match &args.brush {
        Some(path) => {
            let stencil = ImageReader::open(path)
                .with_context(|| format!("couldn't open brush {}", path.display()))?
                .decode()
                .with_context(|| format!("couldn't decode brush {}", path.display()))?
                .into_luma8();
            ImageBuf::from_luma8(&stencil)
        }
        None => default_brush(),
    };

    let cfg = PaintConfig {
        brush_size: args.size,
        stroke_count: args.count,
        noise: args.noise,
        angle_count: args.angles,
        ..PaintConfig::default()
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "painting {}x{} with {} stamps per pass (brush {}px{})",
        source.width(),
        source.height(),
        cfg.stroke_count,
        cfg.brush_size,
        if args.oriented { ", oriented" } else { "" }
    );
    let start = Instant::now();
    let painted = if args.oriented {
        render_oriented_painterly(&source, &brush, &cfg, &mut rng)
    } else {
        render_painterly(&source, &brush, &cfg, &mut rng)
    };
    println!("rendered in {:.2?}", start.elapsed());

    painted
        .to_rgb8()
        .context("render produced a non-RGB canvas")?
        .save(&args.output)
        .with_context(|| format!("couldn't save {}", args.output.display()))?;
    println!("saved {}", args.output.display());

    if args.preview {
        preview(&painted)?;
    }
    Ok(())
}

/// Soft elongated stroke stencil on a square canvas, so rotated atlas
/// entries keep their full footprint.
fn default_brush() -> ImageBuf {
    const SIDE: usize = 64;
    const RX: f32 = 29.0;
    const RY: f32 = 8.0;
    let mut brush = ImageBuf::new(SIDE, SIDE, 1);
    let center = (SIDE as f32 - 1.0) / 2.0;
    for y in 0..SIDE {
        for x in 0..SIDE {
            let dx = (x as f32 - center) / RX;
            let dy = (y as f32 - center) / RY;
            let d2 = dx * dx + dy * dy;
            if d2 < 1.0 {
                *brush.at_mut(x, y, 0) = (1.0 - d2) * (1.0 - d2);
            }
        }
    }
    brush
}

fn preview(painted: &ImageBuf) -> Result<()> {
    let (width, height) = (painted.width(), painted.height());
    let mut canvas = vec![0u32; width * height];
    for y in 0..height {
        for x in 0..width {
            let r = (painted.at(x, y, 0).clamp(0.0, 1.0) * 255.0).round() as u8;
            let g = (painted.at(x, y, 1).clamp(0.0, 1.0) * 255.0).round() as u8;
            let b = (painted.at(x, y, 2).clamp(0.0, 1.0) * 255.0).round() as u8;
            canvas[y * width + x] = u32::from_be_bytes([0, r, g, b]);
        }
    }

    let mut window = Window::new("impasto", width, height, WindowOptions::default())
        .context("couldn't open preview window")?;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&canvas, width, height)
            .context("couldn't update preview window")?;
    }
    Ok(())
}
