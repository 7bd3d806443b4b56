//! Core data structures.
//!
//! This module contains the fundamental types used throughout the system:
//! - `Splat`: an oriented surface point with radius, colour and opacity
//! - `Camera`: perspective camera producing the view-projection matrix
//! - `RendererConfig`: tunables of the rasterisation pipeline
//!
//! All types here are "pure data" - no I/O, no rendering logic.

mod camera;
mod config;
mod splat;

// Re-export public types
pub use camera::Camera;
pub use config::{ReadbackMode, RendererConfig};
pub use splat::{Splat, SplatCloud};
