//! # isosplat: GPU point-splat rendering for implicit surfaces
//!
//! This crate renders solids defined by a signed-distance function as an
//! oriented point-splat cloud, entirely on the GPU. Splat *placement* (SDF
//! evaluation, gradient descent onto the zero set, curvature-derived radii)
//! happens upstream; this crate takes the resulting oriented splats and
//! rasterises them every frame as Gaussian footprints with depth-ordered
//! alpha compositing.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - `core`: Fundamental data structures (splats, cameras, configuration)
//! - `io`: File I/O (PLY splat clouds)
//! - `render`: CPU reference renderer (test oracle, not a product path)
//! - `gpu`: The per-frame GPU pipeline
//!
//! ## Pipeline
//!
//! Each frame runs a fixed sequence of compute passes:
//!
//! 1. Projection — splat centre and radius to screen-space bounds and depth
//! 2. Depth keys + radix sort — a stable global depth ordering
//! 3. Tile binning — count, exclusive scan, fill, per-tile depth sort
//! 4. Tile rasterisation — one thread per pixel, Gaussian alpha compositing
//! 5. Presentation — blit of the storage texture to a swap-chain view
//!
//! The only CPU↔GPU synchronisation per frame is a single 4-byte readback of
//! the splat-tile pair total, used to size the tile list exactly (and even
//! that can be disabled, see [`core::ReadbackMode`]).

// Core data structures (splats, cameras, configuration)
pub mod core;

// I/O operations (PLY splat clouds)
pub mod io;

// CPU reference renderer (test oracle)
pub mod render;

// GPU pipeline
pub mod gpu;

// Re-export commonly used types at crate root for convenience
pub use crate::core::{Camera, ReadbackMode, RendererConfig, Splat, SplatCloud};
pub use gpu::{FrameReport, GpuContext, GpuError, SplatRenderer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
