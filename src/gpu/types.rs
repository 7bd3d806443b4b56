//! GPU-friendly data types.
//!
//! Every struct here is a `#[repr(C)]` mirror of a WGSL struct:
//! - Flat memory layout, explicit padding, 16-byte friendly field order
//! - bytemuck Pod + Zeroable so buffers upload with `cast_slice`
//!
//! Changing a field here without changing the matching WGSL struct (or vice
//! versa) silently corrupts the frame; the layout tests at the bottom pin
//! the sizes.

use crate::core::Camera;

/// Sentinel for padded sort slots and unused indices.
pub const SENTINEL: u32 = 0xFFFF_FFFF;

/// Depth written for splats behind the camera; larger than any real scene
/// depth so they sort to the tail.
pub const FAR_DEPTH: f32 = 1.0e30;

/// Packed splat attributes, two 16-byte records per splat:
/// `(cx, cy, cz, radius)` and `(r, g, b, opacity)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatGpu {
    pub centre_radius: [f32; 4],
    pub colour_opacity: [f32; 4],
}

/// Parallel per-splat normal record `(nx, ny, nz, scale)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatNormalGpu {
    pub normal_scale: [f32; 4],
}

/// Output of the projection stage, one entry per splat.
///
/// An "empty" AABB (`bounds_min > bounds_max`) marks a splat that is behind
/// the camera; `depth` is then [`FAR_DEPTH`] so the sort sends it to the
/// tail.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ProjectedSplatGpu {
    /// Screen-space AABB minimum corner, pixels (may lie off-screen)
    pub bounds_min: [f32; 2],

    /// Screen-space AABB maximum corner, pixels
    pub bounds_max: [f32; 2],

    /// Euclidean distance from the eye
    pub depth: f32,

    /// Maximum projected extent of the six world-axis probes, pixels
    pub screen_radius: f32,

    /// Back-link to the splat record (equals the producing thread index)
    pub original_index: u32,

    pub _pad: u32,
}

/// Uniforms of the projection pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Column-major world-to-clip matrix
    pub view_proj: [[f32; 4]; 4],

    /// Eye position (xyz, pad)
    pub camera_pos: [f32; 4],

    /// Viewport size in pixels
    pub viewport: [f32; 2],

    pub splat_count: u32,

    /// AABB padding factor applied to the screen radius
    pub aabb_padding: f32,
}

impl FrameUniforms {
    pub fn new(camera: &Camera, splat_count: u32, aabb_padding: f32) -> Self {
        let vp = camera.view_projection();
        let mut view_proj = [[0.0f32; 4]; 4];
        for (c, col) in view_proj.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = vp[(r, c)];
            }
        }
        Self {
            view_proj,
            camera_pos: [camera.eye.x, camera.eye.y, camera.eye.z, 0.0],
            viewport: [camera.width as f32, camera.height as f32],
            splat_count,
            aabb_padding,
        }
    }
}

/// Uniforms of one radix-sort dispatch (one per 8-bit digit position, plus
/// one for the key-encoding kernel, which reads only `splat_count` and
/// `padded_len`).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SortParams {
    /// Bit position of this pass's digit (0, 8, 16, 24)
    pub shift: u32,
    pub num_blocks: u32,
    pub padded_len: u32,
    pub splat_count: u32,
}

/// Uniforms shared by the tile counting, filling, and segment-sort passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileParams {
    pub viewport: [f32; 2],
    pub tile_size: u32,
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub splat_count: u32,
    pub num_tiles: u32,
    /// Capacity of the tile index list; appends beyond it are dropped
    pub pair_capacity: u32,
}

/// Uniforms of the exclusive-scan passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScanParams {
    /// Padded element count (multiple of the scan block size)
    pub count: u32,
    pub num_blocks: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Uniforms of the rasterisation pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RasterParams {
    /// Background colour (rgb, pad), linear
    pub background: [f32; 4],
    pub viewport: [f32; 2],
    pub tile_size: u32,
    pub tiles_x: u32,
    pub sigma: f32,
    pub early_alpha_cutoff: f32,
    pub pair_capacity: u32,
    pub _pad: u32,
}

/// Map depth to a key whose unsigned order matches IEEE float order.
///
/// Non-negative floats get the sign bit set; negative floats are fully
/// inverted. Negative zero is canonicalised so `encode(-0.0) ==
/// encode(+0.0)`, matching IEEE equality. NaNs produced by a non-negative
/// bit pattern land above +inf, i.e. at the tail of an ascending sort.
///
/// Mirrors `encode_depth` in `radix_sort.wgsl`.
pub fn encode_depth_key(depth: f32) -> u32 {
    let canonical = if depth == 0.0 { 0.0 } else { depth };
    let bits = canonical.to_bits();
    if bits & 0x8000_0000 == 0 {
        bits | 0x8000_0000
    } else {
        !bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_struct_sizes_match_wgsl() {
        assert_eq!(size_of::<SplatGpu>(), 32);
        assert_eq!(size_of::<SplatNormalGpu>(), 16);
        assert_eq!(size_of::<ProjectedSplatGpu>(), 32);
        assert_eq!(size_of::<FrameUniforms>(), 96);
        assert_eq!(size_of::<SortParams>(), 16);
        assert_eq!(size_of::<TileParams>(), 32);
        assert_eq!(size_of::<ScanParams>(), 16);
        assert_eq!(size_of::<RasterParams>(), 48);
    }

    #[test]
    fn test_depth_key_monotone() {
        let samples = [
            f32::NEG_INFINITY,
            -1.0e30,
            -2.5,
            -1.0,
            -f32::MIN_POSITIVE,
            -1.0e-40, // denormal
            0.0,
            1.0e-40,
            f32::MIN_POSITIVE,
            0.5,
            1.0,
            2.5,
            1.0e30,
            f32::INFINITY,
        ];
        for pair in samples.windows(2) {
            assert!(
                encode_depth_key(pair[0]) < encode_depth_key(pair[1]),
                "encode({}) should be < encode({})",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_depth_key_zero_canonical() {
        assert_eq!(encode_depth_key(-0.0), encode_depth_key(0.0));
    }

    #[test]
    fn test_depth_key_nan_sorts_to_tail() {
        // Positive-pattern NaN (the only kind a distance computation yields)
        // must land above every finite value and +inf.
        let nan = f32::from_bits(0x7FC0_0000);
        assert!(encode_depth_key(nan) > encode_depth_key(f32::INFINITY));
        assert!(encode_depth_key(nan) > encode_depth_key(FAR_DEPTH));
    }

    #[test]
    fn test_frame_uniforms_column_major() {
        use nalgebra::Point3;

        let camera = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 128, 64);
        let uniforms = FrameUniforms::new(&camera, 7, 1.5);
        let vp = camera.view_projection();

        // Column c of the matrix becomes row c of the uniform array.
        for c in 0..4 {
            for r in 0..4 {
                assert_eq!(uniforms.view_proj[c][r], vp[(r, c)]);
            }
        }
        assert_eq!(uniforms.viewport, [128.0, 64.0]);
        assert_eq!(uniforms.splat_count, 7);
    }
}
