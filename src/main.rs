use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use cloudsky::CloudEngine;
use cloudsky::config::Settings;
use cloudsky::render;

/// Render animated cloud frames to PNG.
#[derive(Parser, Debug)]
#[command(name = "cloudsky")]
#[command(about = "Procedural cloud sky renderer", long_about = None)]
struct Args {
    #[arg(long, default_value = "1080")]
    width: usize,

    #[arg(long, default_value = "1920")]
    height: usize,

    /// Milliseconds since animation start for the first frame
    #[arg(long, value_name = "MS", default_value = "0")]
    elapsed_ms: f64,

    /// Number of frames to render
    #[arg(long, default_value = "1")]
    frames: u32,

    /// Spacing between frames (defaults to 1000 / fps)
    #[arg(long, value_name = "MS")]
    frame_interval_ms: Option<f64>,

    #[arg(long, default_value = "artifacts")]
    out_dir: PathBuf,

    /// Also write the raw straight-alpha cloud layer
    #[arg(long)]
    clouds_only: bool,

    #[arg(long)]
    pixel_size: Option<u32>,

    #[arg(long)]
    fps: Option<u32>,

    /// Hex color like #55B4E1
    #[arg(long)]
    sky_color: Option<String>,

    #[arg(long)]
    evolution_rate: Option<f64>,

    #[arg(long)]
    noise_frequency: Option<f64>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    drift_x: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    drift_y: Option<f64>,

    #[arg(long)]
    octaves: Option<u32>,
}

impl Args {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            pixel_size: self.pixel_size.unwrap_or(defaults.pixel_size),
            frames_per_second: self.fps.unwrap_or(defaults.frames_per_second),
            sky_color: self.sky_color.clone().unwrap_or(defaults.sky_color),
            evolution_rate: self.evolution_rate.unwrap_or(defaults.evolution_rate),
            noise_frequency: self.noise_frequency.unwrap_or(defaults.noise_frequency),
            cloud_density_threshold: self.threshold.unwrap_or(defaults.cloud_density_threshold),
            drift_x: self.drift_x.unwrap_or(defaults.drift_x),
            drift_y: self.drift_y.unwrap_or(defaults.drift_y),
            octaves: self.octaves.unwrap_or(defaults.octaves),
        }
    }
}

fn save(path: &Path, rgba: &[u8], w: usize, h: usize) -> Result<()> {
    image::save_buffer(path, rgba, w as u32, h as u32, image::ColorType::Rgba8)
        .with_context(|| format!("failed to save {}", path.display()))?;
    log::info!("saved {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.settings();
    let sky = settings.sky()?;
    let interval = args
        .frame_interval_ms
        .unwrap_or(settings.frame_interval_ms() as f64);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    log::info!(
        "rendering {} frame(s) at {}x{}, block={}, threshold={}",
        args.frames,
        args.width,
        args.height,
        settings.pixel_size,
        settings.cloud_density_threshold
    );

    let mut engine = CloudEngine::new(&settings);
    engine.on_resize(args.width, args.height);

    for i in 0..args.frames {
        let elapsed = args.elapsed_ms + f64::from(i) * interval;
        let timings = engine.render_timed(elapsed);

        eprintln!("\nFrame {i} (t={elapsed:.0}ms):");
        for t in &timings {
            eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
        }

        let clouds = engine.field();
        let frame = render::composite_over_sky(clouds, sky);
        save(
            &args.out_dir.join(format!("frame_{i:04}.png")),
            &frame,
            clouds.w,
            clouds.h,
        )?;
        if args.clouds_only {
            save(
                &args.out_dir.join(format!("clouds_{i:04}.png")),
                clouds.as_bytes(),
                clouds.w,
                clouds.h,
            )?;
        }
    }

    Ok(())
}
