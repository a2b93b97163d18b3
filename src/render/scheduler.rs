use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::info;

use crate::integrator::Integrator;
use crate::math::Sampler;
use crate::render::framebuffer::Framebuffer;
use crate::render::tile::{build_tiles, TileOrder, TileProgress};
use crate::world::World;

pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub thread_count: usize,
    pub tile_size: u32,
    pub tile_order: TileOrder,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples_per_pixel: 64,
            max_depth: 12,
            thread_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            tile_size: 32,
            tile_order: TileOrder::FromMiddle,
        }
    }
}

pub struct RenderOutcome {
    pub framebuffer: Framebuffer,
    pub completed_passes: u32,
    pub aborted: bool,
}

/// Fixed worker-thread pool draining a shared mutex-protected tile queue,
/// plus one coordinator thread polling progress roughly every 280ms —
/// matching `renderer.c`'s `pauser == 280/active_msec` cadence (spec
/// §4.7). Each worker walks its tile sample-major (every pixel gets pass
/// `k` before any pixel gets pass `k+1`), locking the shared framebuffer
/// once per pass rather than once per sample, so the buffer's running
/// average is correct at every intermediate pass (spec §8 invariant 4)
/// while still keeping lock contention well below once-per-sample.
///
/// `abort` lets the caller (e.g. a Ctrl-C handler installed by the CLI)
/// request early termination; the partial framebuffer is still returned.
pub fn render(world: &World, config: &RenderConfig, abort: &AtomicBool) -> RenderOutcome {
    let tiles = build_tiles(config.width, config.height, config.tile_size, config.tile_order, 0x5EED);
    let progress: Vec<TileProgress> = tiles.iter().map(|_| TileProgress::default()).collect();
    let next_tile = Mutex::new(0usize);
    let framebuffer = Mutex::new(Framebuffer::new(config.width, config.height));
    let tiles_completed = AtomicUsize::new(0);
    let samples_done = AtomicU64::new(0);
    let total_tiles = tiles.len();
    let total_samples: u64 = tiles
        .iter()
        .map(|t| t.width as u64 * t.height as u64)
        .sum::<u64>()
        * config.samples_per_pixel as u64;

    let start = Instant::now();

    std::thread::scope(|scope| {
        for _ in 0..config.thread_count.max(1) {
            scope.spawn(|| loop {
                if abort.load(Ordering::Relaxed) {
                    break;
                }
                let tile_idx = {
                    let mut guard = next_tile.lock().unwrap();
                    if *guard >= tiles.len() {
                        break;
                    }
                    let i = *guard;
                    *guard += 1;
                    i
                };
                let tile = tiles[tile_idx];
                let tile_progress = &progress[tile.tile_num];
                tile_progress.is_rendering.store(true, Ordering::Relaxed);

                // Sample-major: every pixel in the tile gets pass 0 before
                // any pixel gets pass 1, so the shared buffer holds the
                // correct k-sample running average after each pass, not
                // just after the tile's last sample (spec §4.7 step 2,
                // §8 invariant 4). Samples within a tile stay sequential
                // and ordered (spec §5's ordering note); only the lock
                // granularity (once per pass rather than once per sample)
                // is a concession to throughput.
                'passes: for pass in 0..config.samples_per_pixel {
                    if abort.load(Ordering::Relaxed) {
                        break 'passes;
                    }
                    let mut fb = framebuffer.lock().unwrap();
                    for (x, y) in tile.pixels() {
                        let pixel_index = y * config.width + x;
                        let mut sampler = Sampler::new(pass, pixel_index);
                        let ray = world.camera.get_ray(
                            x as f64,
                            y as f64,
                            config.width as f64,
                            config.height as f64,
                            &mut sampler,
                        );
                        let integrator = Integrator::new(world, config.max_depth);
                        let sample = integrator.trace(ray, &mut sampler);
                        fb.accumulate(x, y, sample);
                    }
                    drop(fb);
                    samples_done.fetch_add((tile.width * tile.height) as u64, Ordering::Relaxed);
                    // Monotonic: only ever increases, one full pass at a time.
                    tile_progress.completed_samples.fetch_add(1, Ordering::Relaxed);
                }
                tile_progress.is_rendering.store(false, Ordering::Relaxed);
                if tile_progress.completed_samples.load(Ordering::Relaxed) >= config.samples_per_pixel {
                    tile_progress.render_complete.store(true, Ordering::Relaxed);
                }
                tiles_completed.fetch_add(1, Ordering::Relaxed);
            });
        }

        scope.spawn(|| loop {
            let done = tiles_completed.load(Ordering::Relaxed);
            if done >= total_tiles || abort.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(Duration::from_millis(280));
            let done = tiles_completed.load(Ordering::Relaxed);
            let pct = if total_tiles == 0 { 100 } else { done * 100 / total_tiles };
            let elapsed = start.elapsed().as_secs_f64().max(1e-9);
            let samples = samples_done.load(Ordering::Relaxed);
            let rate = samples as f64 / elapsed;
            let remaining_samples = total_samples.saturating_sub(samples) as f64;
            let eta = if rate > 0.0 { remaining_samples / rate } else { 0.0 };
            info!(
                "[{pct:3}%] {:.3} Msamples/s  ETA {:.0}s",
                rate / 1e6,
                eta
            );
        });
    });

    RenderOutcome {
        framebuffer: framebuffer.into_inner().unwrap(),
        completed_passes: config.samples_per_pixel,
        aborted: abort.load(Ordering::Relaxed),
    }
}
