//! The per-frame GPU rasterisation pipeline.
//!
//! Every stage is a compute pass recorded into one or two command buffers
//! per frame, in dataflow order:
//!
//! - [`project`]: splat centre/radius to screen AABB, depth, screen radius
//! - [`sort`]: depth-key encoding + stable 4-pass LSD radix sort
//! - [`scan`]: exclusive prefix sum of per-tile counts
//! - [`binning`]: tile counting, tile filling, per-tile depth ordering
//! - [`raster`]: per-pixel Gaussian compositing into a storage texture
//! - [`present`]: blit of the storage texture to a swap-chain view
//!
//! [`renderer::SplatRenderer`] owns every GPU resource and orchestrates the
//! passes; the individual pass types are public so tests (and adventurous
//! hosts) can drive them against their own buffers.

pub mod binning;
pub mod buffers;
pub mod context;
pub mod present;
pub mod project;
pub mod raster;
pub mod renderer;
pub mod scan;
pub mod sort;
pub mod types;

pub use context::{GpuContext, GpuError};
pub use renderer::{FrameReport, SkipReason, SplatRenderer, TileLists};
