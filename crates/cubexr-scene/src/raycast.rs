//! Ray casting against scene meshes

use glam::Vec3;

use crate::scene::Scene;
use crate::types::ObjectId;

/// A half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Returns the ray parameter of the first hit in front of the origin, or the
    /// exit point when the origin is inside the box. The direction is not
    /// required to be normalized here.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (min - self.origin) * inv;
        let t2 = (max - self.origin) * inv;

        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_far < 0.0 || t_near > t_far {
            return None;
        }
        Some(if t_near >= 0.0 { t_near } else { t_far })
    }
}

/// A single ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object: ObjectId,
    /// World-space distance from the ray origin
    pub distance: f32,
    pub point: Vec3,
}

/// Hit-tests rays against the meshes currently attached to a scene
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl Raycaster {
    /// All hits on attached meshes, nearest first
    pub fn intersect(&self, ray: &Ray, scene: &Scene) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = scene
            .children()
            .iter()
            .filter_map(|&id| {
                let mesh = scene.mesh(id)?;
                let model = mesh.transform.matrix();
                let inverse = model.inverse();

                // Test in the mesh's local space so rotation and scale are honoured
                let local = Ray {
                    origin: inverse.transform_point3(ray.origin),
                    direction: inverse.transform_vector3(ray.direction),
                };
                let half = mesh.geometry.half_extents();
                let t = local.intersect_aabb(-half, half)?;

                let point = model.transform_point3(local.at(t));
                let distance = (point - ray.origin).length();
                (distance >= self.near && distance <= self.far).then_some(Intersection {
                    object: id,
                    distance,
                    point,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Whether the ray hits the given object
    pub fn hits(&self, ray: &Ray, scene: &Scene, object: ObjectId) -> bool {
        self.intersect(ray, scene).iter().any(|hit| hit.object == object)
    }
}
