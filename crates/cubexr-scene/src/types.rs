//! Shared types for meshes, materials and transforms

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Identifier of an object stored in a [`Scene`](crate::scene::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object-{}", self.0)
    }
}

/// Position, Euler rotation (radians, XYZ order) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

/// Axis-aligned box centred on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }
}

impl BoxGeometry {
    /// Corner index pairs forming the twelve box edges
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 3), (3, 2), (2, 0), // back face
        (4, 5), (5, 7), (7, 6), (6, 4), // front face
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }

    /// Local-space corners; bit 0 selects +x, bit 1 +y, bit 2 +z
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents();
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            )
        })
    }
}

/// Texture sampled from a playing video element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoTexture {
    /// Bumped every time the texture is marked dirty
    pub version: u64,
}

impl VideoTexture {
    /// Request a re-upload of the current video frame
    pub fn mark_needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Unlit surface material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    /// Solid colour as 0xRRGGBB
    Solid { color: u32 },
    Video(VideoTexture),
}

impl Material {
    pub fn solid(color: u32) -> Self {
        Self::Solid { color }
    }

    pub fn video() -> Self {
        Self::Video(VideoTexture::default())
    }

    pub fn video_texture(&self) -> Option<&VideoTexture> {
        match self {
            Self::Video(texture) => Some(texture),
            Self::Solid { .. } => None,
        }
    }

    pub fn video_texture_mut(&mut self) -> Option<&mut VideoTexture> {
        match self {
            Self::Video(texture) => Some(texture),
            Self::Solid { .. } => None,
        }
    }

    /// CSS colour string used by 2D hosts
    pub fn css_color(&self) -> String {
        match self {
            Self::Solid { color } => format!("#{:06x}", color & 0x00ff_ffff),
            Self::Video(_) => "#ffffff".to_string(),
        }
    }
}

/// A box mesh with material and transform
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: BoxGeometry,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(geometry: BoxGeometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::default(),
        }
    }

    /// World-space corners after applying the transform
    pub fn world_corners(&self) -> [Vec3; 8] {
        let model = self.transform.matrix();
        self.geometry.corners().map(|c| model.transform_point3(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_span_extents() {
        let geometry = BoxGeometry {
            width: 2.0,
            height: 4.0,
            depth: 6.0,
        };
        let corners = geometry.corners();
        assert_eq!(corners[0], Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(corners[7], Vec3::new(1.0, 2.0, 3.0));

        // Every edge joins corners that differ on exactly one axis
        for (a, b) in BoxGeometry::EDGES {
            assert_eq!((a ^ b).count_ones(), 1, "edge {a}-{b}");
        }
    }

    #[test]
    fn test_transform_matrix_applies_scale_then_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(2.0),
        };
        let p = transform.matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_video_texture_version() {
        let mut material = Material::video();
        material.video_texture_mut().unwrap().mark_needs_update();
        material.video_texture_mut().unwrap().mark_needs_update();
        assert_eq!(material.video_texture().unwrap().version, 2);

        assert!(Material::solid(0x00ff00).video_texture().is_none());
    }

    #[test]
    fn test_css_color() {
        assert_eq!(Material::solid(0x00ff00).css_color(), "#00ff00");
    }
}
