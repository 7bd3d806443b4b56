//! Renderer configuration.

use serde::{Deserialize, Serialize};

/// How the frame learns the total number of splat-tile pairs before the fill
/// pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadbackMode {
    /// Read the scanned total back to the host (4 bytes per frame) and size
    /// the tile list exactly, growing geometrically when it overflows.
    Exact,

    /// Never read back mid-frame; preallocate `pairs_per_splat` entries per
    /// splat. The fill pass still respects the scanned offsets, and writes
    /// beyond the preallocated capacity are dropped.
    Conservative { pairs_per_splat: u32 },
}

/// Tunables of the rasterisation pipeline.
///
/// The defaults match the values the test expectations were computed for;
/// changing `sigma` or `aabb_padding` changes rendered output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Square tile edge in pixels.
    pub tile_size: u32,

    /// Multiplier applied to the projected screen radius when forming the
    /// screen AABB. 1.5 captures >= 99% of the Gaussian energy at the
    /// default sigma.
    pub aabb_padding: f32,

    /// Gaussian falloff of the splat footprint, in units of the screen
    /// radius.
    pub sigma: f32,

    /// Accumulated alpha at which a pixel stops walking its tile list.
    pub early_alpha_cutoff: f32,

    /// Background colour composited behind the splats (linear RGB).
    pub background: [f32; 3],

    /// A frame whose splat-tile pair total exceeds `splats * overlap_limit`
    /// is considered pathological (mis-projected bounds upstream) and is
    /// skipped with a warning.
    pub overlap_limit: u32,

    /// Mid-frame readback policy for the pair total.
    pub readback: ReadbackMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            aabb_padding: 1.5,
            sigma: 0.5,
            early_alpha_cutoff: 0.99,
            background: [0.0, 0.0, 0.0],
            overlap_limit: 50,
            readback: ReadbackMode::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.aabb_padding, 1.5);
        assert_eq!(config.sigma, 0.5);
        assert_eq!(config.early_alpha_cutoff, 0.99);
        assert_eq!(config.readback, ReadbackMode::Exact);
    }
}
