use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use rayforge::cli::Cli;
use rayforge::config::apply_overrides;
use rayforge::error::RenderError;
use rayforge::image_io::write_framebuffer;
use rayforge::render::render;
use rayforge::scene_io::load_scene;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.test {
        return match self_test() {
            Ok(()) => {
                println!("self-test: ok");
                ExitCode::SUCCESS
            }
            Err(message) => {
                eprintln!("self-test: FAILED: {message}");
                ExitCode::FAILURE
            }
        };
    }

    let input = cli.input.clone().expect("clap enforces input unless --test");
    match run(&cli, &input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            exit_code_from(err.exit_code())
        }
    }
}

fn run(cli: &Cli, input: &std::path::Path) -> rayforge::error::Result<()> {
    let (world, render_config, output) = load_scene(input)?;
    let render_config = apply_overrides(render_config, cli);

    info!(
        "rendering {}x{} at {} spp, {} bounces, {} threads",
        render_config.width,
        render_config.height,
        render_config.samples_per_pixel,
        render_config.max_depth,
        render_config.thread_count
    );

    // Wired for a future Ctrl-C handler; nothing currently flips it, so
    // every render currently runs to completion or not at all.
    let abort = Arc::new(AtomicBool::new(false));

    let start = Instant::now();
    let outcome = render(&world, &render_config, &abort);
    info!("render finished in {:.2}s", start.elapsed().as_secs_f64());

    let suffix = outcome.aborted.then_some(outcome.completed_passes);
    let path = write_framebuffer(&outcome.framebuffer, &output.path, output.format, suffix)?;
    info!("wrote {}", path.display());

    if outcome.aborted {
        return Err(RenderError::RenderAborted {
            completed_passes: outcome.completed_passes,
        });
    }
    Ok(())
}

fn exit_code_from(code: i32) -> ExitCode {
    ExitCode::from((code.unsigned_abs() % 256) as u8)
}

/// Runs a handful of cross-module sanity checks as a standalone binary
/// invocation (`--test`), the idiomatic-Rust stand-in for the original's
/// runtime `--test` switch — the real regression suite lives in each
/// module's `#[cfg(test)]` block and runs under `cargo test`.
fn self_test() -> Result<(), String> {
    use rayforge::math::{Color, Point3, Ray, Sampler, Vec3};

    let v = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
    if (v.z - 1.0).abs() > 1e-9 {
        return Err("Vec3::cross produced an unexpected result".into());
    }

    let mut sampler = Sampler::new(0, 0);
    let jitter = sampler.next_dim();
    if !(0.0..1.0).contains(&jitter) {
        return Err("Sampler::next_dim left its documented [0,1) range".into());
    }

    let ray = Ray::new(Point3::zero(), Vec3::unit_z());
    if ray.direction.length() < 0.5 {
        return Err("Ray direction was unexpectedly near zero".into());
    }

    let black = Color::zero();
    if black.max_component() != 0.0 {
        return Err("Color::zero() is not actually zero".into());
    }

    Ok(())
}
