//! Host seams - everything the scene component needs from its environment
//!
//! The browser host implements these over the DOM; tests implement them with
//! recording fakes.

use crate::camera::PerspectiveCamera;
use crate::error::SceneError;
use crate::input::{EventKind, ListenTarget};
use crate::scene::Scene;

/// Registered listener, as issued by an [`EventSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Scheduled frame callback, as issued by a [`FrameScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Draws the scene
pub trait RenderBackend {
    /// Acquire the drawing surface and insert it into the page
    fn attach(&mut self) -> Result<(), SceneError>;
    fn set_size(&mut self, width: f32, height: f32);
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);
    /// Release the drawing surface
    fn dispose(&mut self);
}

/// Display-refresh callback scheduling
pub trait FrameScheduler {
    /// Schedule one frame callback. `None` if the host cannot schedule frames.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Attaches and detaches input listeners.
///
/// The host turns delivered DOM events into
/// [`InputEvent`](crate::input::InputEvent)s and feeds them back through
/// [`SceneComponent::handle`](crate::component::SceneComponent::handle).
pub trait EventSource {
    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> Result<ListenerId, SceneError>;
    fn unlisten(&mut self, id: ListenerId);
}

/// The video element backing a video texture
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
}

/// Immersive (AR) session runtime.
///
/// Requests complete asynchronously: the host reports the outcome as
/// `SessionStarted`, `SessionFailed` or `SessionEnded` events. A request that
/// cannot even be issued fails synchronously instead.
pub trait XrRuntime {
    fn is_supported(&self) -> bool;
    fn request_session(&mut self) -> Result<(), String>;
    fn end_session(&mut self);
}

/// Host resources handed to the component on mount
pub struct Backends {
    pub renderer: Box<dyn RenderBackend>,
    pub frames: Box<dyn FrameScheduler>,
    pub events: Box<dyn EventSource>,
    pub media: Option<Box<dyn MediaElement>>,
    pub xr: Option<Box<dyn XrRuntime>>,
}
