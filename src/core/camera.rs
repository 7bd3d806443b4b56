//! Perspective camera.
//!
//! The pipeline consumes a camera as three values: the view-projection
//! matrix, the eye position (for Euclidean depth), and the viewport size in
//! pixels. This type owns the usual look-at parametrisation and derives
//! those values; hosts with their own camera maths can bypass it and fill
//! the frame uniforms directly.

use nalgebra::{Matrix4, Perspective3, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A perspective camera with a look-at pose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    /// Eye position in world space
    pub eye: Point3<f32>,

    /// Look-at target in world space
    pub target: Point3<f32>,

    /// Up direction
    pub up: Vector3<f32>,

    /// Vertical field of view (radians)
    pub fov_y: f32,

    /// Near clip distance
    pub near: f32,

    /// Far clip distance
    pub far: f32,

    /// Viewport width (pixels)
    pub width: u32,

    /// Viewport height (pixels)
    pub height: u32,
}

impl Camera {
    /// Create a camera at `eye` looking at `target` with default lens
    /// parameters (45° vertical FoV, near 0.1, far 100).
    pub fn look_at(eye: Point3<f32>, target: Point3<f32>, width: u32, height: u32) -> Self {
        Self {
            eye,
            target,
            up: Vector3::y(),
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }

    /// Camera-to-clip transform.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect(), self.fov_y, self.near, self.far).into_inner()
    }

    /// Combined world-to-clip transform (column-major, as uploaded).
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to pixel coordinates, y-down.
    ///
    /// Returns None if the point is behind the camera (clip w <= 0). This is
    /// the exact transform the projection kernel applies; the CPU oracle
    /// relies on the two staying in lockstep.
    pub fn world_to_pixel(&self, point: &Point3<f32>) -> Option<Vector2<f32>> {
        let clip = self.view_projection() * point.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(Vector2::new(
            (ndc_x * 0.5 + 0.5) * self.width as f32,
            (1.0 - (ndc_y * 0.5 + 0.5)) * self.height as f32,
        ))
    }

    /// Euclidean distance from the eye; the depth the sort keys encode.
    pub fn depth_of(&self, point: &Point3<f32>) -> f32 {
        (point - self.eye).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centre_projects_to_viewport_centre() {
        let cam = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 256, 256);
        let pixel = cam.world_to_pixel(&Point3::origin()).unwrap();
        assert_relative_eq!(pixel.x, 128.0, epsilon = 1e-3);
        assert_relative_eq!(pixel.y, 128.0, epsilon = 1e-3);
    }

    #[test]
    fn test_point_behind_camera() {
        let cam = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 256, 256);
        // The camera looks down -z from z=3, so z=10 is behind it.
        assert!(cam.world_to_pixel(&Point3::new(0.0, 0.0, 10.0)).is_none());
    }

    #[test]
    fn test_y_axis_points_up_in_pixels() {
        let cam = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 256, 256);
        let above = cam.world_to_pixel(&Point3::new(0.0, 0.5, 0.0)).unwrap();
        // World +y maps to smaller pixel y (y-down image convention).
        assert!(above.y < 128.0);
    }

    #[test]
    fn test_depth_is_euclidean() {
        let cam = Camera::look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin(), 256, 256);
        assert_relative_eq!(cam.depth_of(&Point3::origin()), 3.0, epsilon = 1e-6);
        assert_relative_eq!(
            cam.depth_of(&Point3::new(0.0, 4.0, 3.0)),
            4.0,
            epsilon = 1e-6
        );
    }
}
