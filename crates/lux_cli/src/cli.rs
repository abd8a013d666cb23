use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lux_renderer::DEFAULT_BUCKET_SIZE;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Random field of small spheres around three large ones
    Cover,
    /// Small scene with triangles and a hollow glass sphere
    Showcase,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lux", version, about = "An offline Monte Carlo path tracer")]
pub struct Args {
    /// JSON file with camera settings; missing fields keep the scene's values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::Cover)]
    pub scene: SceneKind,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Number of samples per pixel
    #[arg(short = 's', long)]
    pub samples: Option<u32>,

    /// Maximum number of ray bounces
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Seed for scene generation and sampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Render scanline by scanline on the main thread
    #[arg(long)]
    pub single_threaded: bool,

    /// Bucket edge length in pixels for parallel rendering
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    pub bucket_size: u32,

    /// Directory the .ppm and .jpg files are written to
    #[arg(short, long, default_value = "images")]
    pub output_dir: PathBuf,

    /// Base file name without extension (defaults to the current date and time)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Set the logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}
