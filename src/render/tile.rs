/// Order tiles are handed out to workers in, matching the five orderings
/// `renderer.c`'s `tileOrder` enum supports (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrder {
    Normal,
    TopToBottom,
    Random,
    FromMiddle,
    ToMiddle,
}

/// A rectangular pixel range handed to one worker at a time. Tiles are
/// produced once at scheduler setup and never subdivided further.
/// `tile_num` is the tile's identity (spec §3's Render tile data model) —
/// stable across reordering, used to index the parallel progress table the
/// scheduler keeps alongside the tile list.
#[derive(Debug, Clone, Copy)]
pub struct RenderTile {
    pub tile_num: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RenderTile {
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |dy| (0..self.width).map(move |dx| (self.x + dx, self.y + dy)))
    }
}

/// Per-tile progress state (spec §3's `completed_samples`/`is_rendering`/
/// `render_complete`), tracked separately from the tile's own layout since
/// it mutates while workers share the tile list. `completed_samples` only
/// ever increases, one full pass over the tile at a time.
#[derive(Debug, Default)]
pub struct TileProgress {
    pub completed_samples: std::sync::atomic::AtomicU32,
    pub is_rendering: std::sync::atomic::AtomicBool,
    pub render_complete: std::sync::atomic::AtomicBool,
}

/// Partitions an image into `tile_size`×`tile_size` tiles (the last row/
/// column may be smaller), then reorders the list per `order`. `tile_num`
/// is assigned after reordering, so it's a stable per-tile identity rather
/// than a position in the (reordered) hand-out sequence.
pub fn build_tiles(width: u32, height: u32, tile_size: u32, order: TileOrder, seed: u64) -> Vec<RenderTile> {
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let mut x = 0;
        let h = tile_size.min(height - y);
        while x < width {
            let w = tile_size.min(width - x);
            tiles.push(RenderTile { tile_num: 0, x, y, width: w, height: h });
            x += tile_size;
        }
        y += tile_size;
    }

    match order {
        TileOrder::Normal => {}
        TileOrder::TopToBottom => {
            tiles.sort_by_key(|t| t.y);
        }
        TileOrder::Random => shuffle(&mut tiles, seed),
        TileOrder::FromMiddle => sort_by_distance_to_center(&mut tiles, width, height, false),
        TileOrder::ToMiddle => sort_by_distance_to_center(&mut tiles, width, height, true),
    }
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.tile_num = i;
    }
    tiles
}

fn sort_by_distance_to_center(tiles: &mut [RenderTile], width: u32, height: u32, ascending: bool) {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    tiles.sort_by(|a, b| {
        let da = dist_to_center(a, cx, cy);
        let db = dist_to_center(b, cx, cy);
        if ascending {
            da.partial_cmp(&db).unwrap()
        } else {
            db.partial_cmp(&da).unwrap()
        }
    });
}

fn dist_to_center(t: &RenderTile, cx: f64, cy: f64) -> f64 {
    let tx = t.x as f64 + t.width as f64 / 2.0;
    let ty = t.y as f64 + t.height as f64 / 2.0;
    (tx - cx).powi(2) + (ty - cy).powi(2)
}

/// Deterministic Fisher-Yates shuffle using a tiny xorshift PRNG seeded
/// explicitly, so tile order — unlike sample values — doesn't need to come
/// from the path-tracing `Sampler`.
fn shuffle(tiles: &mut [RenderTile], seed: u64) {
    let mut state = seed.max(1);
    let mut next_u64 = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    for i in (1..tiles.len()).rev() {
        let j = (next_u64() as usize) % (i + 1);
        tiles.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiling_covers_every_pixel_exactly_once() {
        let tiles = build_tiles(10, 7, 4, TileOrder::Normal, 1);
        let mut seen = vec![false; 70];
        for t in &tiles {
            for (x, y) in t.pixels() {
                let idx = (y * 10 + x) as usize;
                assert!(!seen[idx], "pixel ({x},{y}) covered twice");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&b| b));
    }

    #[test]
    fn tile_nums_are_assigned_once_per_tile_and_unique() {
        let tiles = build_tiles(20, 13, 5, TileOrder::FromMiddle, 7);
        let mut nums: Vec<usize> = tiles.iter().map(|t| t.tile_num).collect();
        nums.sort();
        assert_eq!(nums, (0..tiles.len()).collect::<Vec<_>>());
    }

    #[test]
    fn tile_progress_completed_samples_is_monotonic() {
        use std::sync::atomic::Ordering;
        let progress = TileProgress::default();
        for k in 1..=5u32 {
            progress.completed_samples.fetch_add(1, Ordering::Relaxed);
            assert_eq!(progress.completed_samples.load(Ordering::Relaxed), k);
        }
        assert!(!progress.render_complete.load(Ordering::Relaxed));
        progress.render_complete.store(true, Ordering::Relaxed);
        assert!(progress.render_complete.load(Ordering::Relaxed));
    }

    #[test]
    fn top_to_bottom_is_sorted_by_y() {
        let tiles = build_tiles(20, 20, 5, TileOrder::TopToBottom, 1);
        let ys: Vec<u32> = tiles.iter().map(|t| t.y).collect();
        let mut sorted = ys.clone();
        sorted.sort();
        assert_eq!(ys, sorted);
    }

    #[test]
    fn random_order_is_a_permutation() {
        let normal = build_tiles(20, 20, 5, TileOrder::Normal, 1);
        let random = build_tiles(20, 20, 5, TileOrder::Random, 42);
        assert_eq!(normal.len(), random.len());
        let mut a: Vec<(u32, u32)> = normal.iter().map(|t| (t.x, t.y)).collect();
        let mut b: Vec<(u32, u32)> = random.iter().map(|t| (t.x, t.y)).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn from_middle_starts_near_center() {
        let tiles = build_tiles(40, 40, 10, TileOrder::FromMiddle, 1);
        let first = &tiles[0];
        assert!((first.x as i32 - 20).abs() <= 10);
        assert!((first.y as i32 - 20).abs() <= 10);
    }
}
