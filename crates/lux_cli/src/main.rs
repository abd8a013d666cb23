use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use lux_renderer::{
    render, render_parallel, save_image, CameraConfig, HittableList, ImageBuffer, ParallelOptions,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod config;
mod logger;
mod scenes;

use cli::Args;
use config::resolve_camera_config;
use logger::init_logger;
use scenes::Scene;

/// Render on the calling thread with a single sampling stream.
fn render_single_threaded(config: &CameraConfig, world: &HittableList, seed: u64) -> ImageBuffer {
    info!("Rendering single-threaded");
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    render(config, world, &mut rng)
}

/// Render buckets on a dedicated rayon pool.
fn render_multi_threaded(config: &CameraConfig, world: &HittableList, args: &Args) -> Result<ImageBuffer> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build render thread pool")?;
    info!("Rendering on {} threads", pool.current_num_threads());

    let options = ParallelOptions {
        seed: args.seed,
        bucket_size: args.bucket_size,
    };
    let cancel = AtomicBool::new(false);
    let image = pool.install(|| render_parallel(config, world, &options, &cancel))?;
    Ok(image)
}

/// Write the image as a PPM preview and a JPEG next to it.
fn write_outputs(image: &ImageBuffer, dir: &Path, name: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for extension in ["ppm", "jpg"] {
        let path = dir.join(format!("{name}.{extension}"));
        save_image(image, &path).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    info!("Building {:?} scene (seed {})", args.scene, args.seed);
    let mut scene_rng = StdRng::seed_from_u64(args.seed);
    let Scene { world, camera } = Scene::build(args.scene, &mut scene_rng);
    info!("Scene has {} objects", world.len());

    let config = resolve_camera_config(&args, camera)?;
    info!(
        "Image {}x{}, {} spp, max depth {}",
        config.image_width,
        config.image_height(),
        config.sample_size,
        config.max_depth
    );

    let start = Instant::now();
    let image = if args.single_threaded {
        render_single_threaded(&config, &world, args.seed)
    } else {
        render_multi_threaded(&config, &world, &args)?
    };
    info!("Render finished in {:.2?}", start.elapsed());

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    write_outputs(&image, &args.output_dir, &name)?;

    Ok(())
}
