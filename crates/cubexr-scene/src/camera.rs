//! Perspective camera and screen-space helpers

use glam::{Mat4, Vec2, Vec3};

use crate::options::CameraOptions;
use crate::raycast::Ray;

/// Perspective camera looking down -Z from its position
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_options(&CameraOptions::default(), 1.0)
    }
}

impl PerspectiveCamera {
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        Self {
            fov_y_degrees: options.fov_y_degrees,
            aspect,
            near: options.near,
            far: options.far,
            position: Vec3::new(0.0, 0.0, options.distance),
        }
    }

    /// Update the aspect ratio from viewport dimensions.
    ///
    /// Returns false (and leaves the camera untouched) for degenerate sizes.
    pub fn set_aspect(&mut self, width: f32, height: f32) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.aspect = width / height;
        true
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(self.position).inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Project a world-space point into normalized device coordinates
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.view_projection().project_point3(point)
    }

    /// Project a world-space point into pixel coordinates of a viewport
    /// (origin top-left). `None` when the point is outside the clip volume depth.
    pub fn project_to_viewport(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let ndc = self.project(point);
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }

    /// Ray from the camera through a point given in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let unprojected = self
            .view_projection()
            .inverse()
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, unprojected - self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.fov_y_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_set_aspect() {
        let mut camera = PerspectiveCamera::default();
        assert!(camera.set_aspect(1600.0, 800.0));
        assert_eq!(camera.aspect, 2.0);

        // Degenerate sizes are ignored
        assert!(!camera.set_aspect(0.0, 800.0));
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = PerspectiveCamera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, camera.position);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_project_origin_to_center() {
        let camera = PerspectiveCamera::default();
        let ndc = camera.project(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_project_to_viewport() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(800.0, 600.0);

        let center = camera.project_to_viewport(Vec3::ZERO, 800.0, 600.0).unwrap();
        assert!((center - Vec2::new(400.0, 300.0)).length() < 1e-3);

        // Up in the world is up on screen
        let above = camera.project_to_viewport(Vec3::Y, 800.0, 600.0).unwrap();
        assert!(above.y < 300.0);

        // Behind the camera
        assert!(camera
            .project_to_viewport(Vec3::new(0.0, 0.0, 10.0), 800.0, 600.0)
            .is_none());
    }

    #[test]
    fn test_project_and_ray_agree() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(1280.0, 720.0);

        let point = Vec3::new(0.4, -0.3, 0.5);
        let ndc = camera.project(point);
        let ray = camera.ray_from_ndc(Vec2::new(ndc.x, ndc.y));

        // The point must lie on the ray through its own projection
        let to_point = (point - ray.origin).normalize();
        assert!((to_point - ray.direction).length() < 1e-3);
    }
}
