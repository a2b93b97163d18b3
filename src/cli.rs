use std::path::PathBuf;

use clap::Parser;

use crate::config::TileOrderArg;

/// rayforge — offline Monte Carlo path tracer.
///
/// Renders a JSON scene description (spec §6) to a PNG or BMP file. The
/// scene file supplies its own renderer/camera/output settings; any flag
/// given here overrides the corresponding scene-file value.
#[derive(Parser, Debug)]
#[command(
    name = "rayforge",
    version,
    about = "An offline Monte Carlo path tracer",
    after_help = "EXAMPLES:\n  \
                  rayforge scene.json\n  \
                  rayforge scene.json --threads 8 --samples 256\n  \
                  rayforge scene.json --dimensions 1920x1080 --tile-size 64\n  \
                  rayforge --test"
)]
pub struct Cli {
    /// Path to the JSON scene file.
    #[arg(required_unless_present = "test")]
    pub input: Option<PathBuf>,

    /// Print per-tile progress and timing to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the scene's worker thread count.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Override the scene's samples-per-pixel.
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Override the scene's maximum bounce depth.
    #[arg(short, long)]
    pub bounces: Option<u32>,

    /// Override output image dimensions, given as WxH (e.g. 1920x1080).
    #[arg(short, long = "dimensions", value_name = "WxH")]
    pub dimensions: Option<String>,

    /// Override the tile edge length in pixels.
    #[arg(long = "tile-size")]
    pub tile_size: Option<u32>,

    /// Override the tile visitation order.
    #[arg(long = "tile-order", value_enum)]
    pub tile_order: Option<TileOrderArg>,

    /// Run the built-in unit test suite instead of rendering.
    #[arg(long)]
    pub test: bool,
}
