//! Oriented surface splats.
//!
//! A splat is a point that converged onto the SDF zero set: a world-space
//! centre, an isotropic radius derived from local curvature, the surface
//! normal at that point, and a base colour/opacity. The renderer treats the
//! splat buffer as read-only input; the placement subsystem may rewrite it
//! between frames.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// An oriented point splat on an implicit surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Splat {
    /// World-space centre
    pub centre: Vector3<f32>,

    /// Isotropic world-space radius (positive)
    pub radius: f32,

    /// Unit surface normal
    pub normal: Vector3<f32>,

    /// Base RGB albedo in [0, 1]
    pub colour: Vector3<f32>,

    /// Base alpha multiplier in [0, 1]
    pub opacity: f32,
}

impl Splat {
    pub fn new(
        centre: Vector3<f32>,
        radius: f32,
        normal: Vector3<f32>,
        colour: Vector3<f32>,
        opacity: f32,
    ) -> Self {
        Self {
            centre,
            radius,
            normal,
            colour,
            opacity,
        }
    }
}

/// A collection of splats, convertible to the packed GPU buffer layout.
///
/// The GPU consumes two parallel buffers:
/// - attributes: two 16-byte records per splat,
///   `[(cx, cy, cz, radius), (r, g, b, opacity)]`
/// - normals: one 16-byte record per splat, `(nx, ny, nz, scale)`
///
/// The `scale` slot is reserved for anisotropic footprints; it is written as
/// 1.0 and currently ignored by the rasteriser.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SplatCloud {
    pub splats: Vec<Splat>,
}

impl SplatCloud {
    pub fn new() -> Self {
        Self { splats: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    pub fn push(&mut self, splat: Splat) {
        self.splats.push(splat);
    }

    /// Pack splat attributes into the fixed GPU layout.
    pub fn packed_attributes(&self) -> Vec<[f32; 4]> {
        let mut data = Vec::with_capacity(self.splats.len() * 2);
        for s in &self.splats {
            data.push([s.centre.x, s.centre.y, s.centre.z, s.radius]);
            data.push([s.colour.x, s.colour.y, s.colour.z, s.opacity]);
        }
        data
    }

    /// Pack normals into the parallel GPU buffer layout.
    pub fn packed_normals(&self) -> Vec<[f32; 4]> {
        self.splats
            .iter()
            .map(|s| [s.normal.x, s.normal.y, s.normal.z, 1.0])
            .collect()
    }
}

impl FromIterator<Splat> for SplatCloud {
    fn from_iter<I: IntoIterator<Item = Splat>>(iter: I) -> Self {
        Self {
            splats: iter.into_iter().collect(),
        }
    }
}
