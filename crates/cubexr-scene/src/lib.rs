//! cubexr Scene - interactive cube scene component
//!
//! This crate holds everything the browser scene does that is not owned by the
//! browser itself:
//! - Scene graph, perspective camera and ray casting for pointer hit-tests
//! - Drag-to-rotate, click/tap-to-scale and mute toggling
//! - Immersive session lifecycle and the video texture
//! - Render loop and listener lifetimes, released deterministically on unmount
//!
//! Hosts plug in through the traits in [`backend`].

pub mod backend;
pub mod camera;
pub mod component;
pub mod error;
pub mod input;
pub mod options;
pub mod raycast;
pub mod scene;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::{
    Backends, EventSource, FrameHandle, FrameScheduler, ListenerId, MediaElement, RenderBackend,
    XrRuntime,
};
pub use camera::PerspectiveCamera;
pub use component::{SceneComponent, SessionState};
pub use error::SceneError;
pub use input::{EventKind, InputEvent, ListenTarget, PointerInput, PointerKind, Viewport};
pub use options::{LoopPolicy, SceneOptions, Variant, VideoOptions};
pub use raycast::{Intersection, Ray, Raycaster};
pub use scene::Scene;
pub use types::{BoxGeometry, Material, Mesh, ObjectId, Transform, VideoTexture};

// Math types used across the public API
pub use glam::{Vec2, Vec3};
