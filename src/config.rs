use crate::cli::Cli;
use crate::render::{RenderConfig, TileOrder};

/// Parses a `WxH` dimension override (spec §6's "optional override for
/// image dimensions").
pub fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width: u32 = w.parse().map_err(|_| format!("bad width in {s:?}"))?;
    let height: u32 = h.parse().map_err(|_| format!("bad height in {s:?}"))?;
    Ok((width, height))
}

/// Applies CLI overrides on top of a scene-file-derived [`RenderConfig`].
/// Precedence is CLI > scene file > built-in defaults, matching the
/// teacher's `preset then override` pattern in its own entry point.
pub fn apply_overrides(mut config: RenderConfig, cli: &Cli) -> RenderConfig {
    if let Some(threads) = cli.threads {
        config.thread_count = threads;
    }
    if let Some(spp) = cli.samples {
        config.samples_per_pixel = spp;
    }
    if let Some(bounces) = cli.bounces {
        config.max_depth = bounces;
    }
    if let Some(dims) = &cli.dimensions {
        if let Ok((w, h)) = parse_dimensions(dims) {
            config.width = w;
            config.height = h;
        }
    }
    if let Some(tile) = cli.tile_size {
        config.tile_size = tile;
    }
    if let Some(order) = cli.tile_order {
        config.tile_order = order.into();
    }
    config
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TileOrderArg {
    Normal,
    TopToBottom,
    Random,
    FromMiddle,
    ToMiddle,
}

impl From<TileOrderArg> for TileOrder {
    fn from(t: TileOrderArg) -> Self {
        match t {
            TileOrderArg::Normal => TileOrder::Normal,
            TileOrderArg::TopToBottom => TileOrder::TopToBottom,
            TileOrderArg::Random => TileOrder::Random,
            TileOrderArg::FromMiddle => TileOrder::FromMiddle,
            TileOrderArg::ToMiddle => TileOrder::ToMiddle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_override_parses_wxh() {
        assert_eq!(parse_dimensions("640x480").unwrap(), (640, 480));
    }

    #[test]
    fn dimension_override_rejects_missing_separator() {
        assert!(parse_dimensions("640480").is_err());
    }
}
