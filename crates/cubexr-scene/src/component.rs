//! Scene component - owns the scene, interprets input and drives the render loop

use glam::Vec2;
use tracing::{debug, info, trace, warn};

use crate::backend::{Backends, FrameHandle, ListenerId};
use crate::camera::PerspectiveCamera;
use crate::error::SceneError;
use crate::input::{EventKind, InputEvent, ListenTarget, PointerInput, PointerKind, Viewport};
use crate::options::{LoopPolicy, SceneOptions};
use crate::raycast::Raycaster;
use crate::scene::Scene;
use crate::types::{BoxGeometry, Material, Mesh, ObjectId};

const POINTER_EVENTS: [EventKind; 6] = [
    EventKind::MouseDown,
    EventKind::MouseMove,
    EventKind::MouseUp,
    EventKind::TouchStart,
    EventKind::TouchMove,
    EventKind::TouchEnd,
];

/// Immersive session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Waiting for the runtime to grant the session
    Requesting,
    Active,
}

/// Press that started on the cube
#[derive(Debug, Clone, Copy, Default)]
struct DragState {
    active: bool,
    last: Vec2,
    /// The pointer moved since the press
    moved: bool,
}

/// The mounted scene.
///
/// Owns every engine handle and host resource it acquired. Unmounting consumes
/// the component; dropping it performs the same teardown, so resources are
/// released on every exit path including a failed mount.
pub struct SceneComponent {
    options: SceneOptions,
    scene: Scene,
    camera: PerspectiveCamera,
    raycaster: Raycaster,
    cube: ObjectId,
    viewport: Viewport,
    drag: DragState,
    suppress_click: bool,
    session: SessionState,
    muted: bool,
    pending_frame: Option<FrameHandle>,
    frames_rendered: u64,
    listeners: Vec<ListenerId>,
    renderer_attached: bool,
    mounted: bool,
    backends: Backends,
}

impl SceneComponent {
    /// Build the scene, attach the renderer and listeners, and start the loop
    pub fn mount(
        options: SceneOptions,
        viewport: Viewport,
        backends: Backends,
    ) -> Result<Self, SceneError> {
        options.validate()?;

        let aspect = if viewport.is_empty() {
            1.0
        } else {
            viewport.width / viewport.height
        };
        let camera = PerspectiveCamera::from_options(&options.camera, aspect);

        let material = if options.video.is_some() {
            Material::video()
        } else {
            Material::solid(options.color)
        };
        let mut scene = Scene::new();
        let cube = scene.insert(Mesh::new(BoxGeometry::default(), material));
        if options.mesh_always_visible() {
            scene.add(cube);
        }

        let muted = options.video.as_ref().map_or(true, |v| v.start_muted);

        let mut component = Self {
            options,
            scene,
            camera,
            raycaster: Raycaster::default(),
            cube,
            viewport,
            drag: DragState::default(),
            suppress_click: false,
            session: SessionState::Idle,
            muted,
            pending_frame: None,
            frames_rendered: 0,
            listeners: Vec::new(),
            renderer_attached: false,
            mounted: true,
            backends,
        };

        // Any early return below drops `component`, which releases what was acquired
        component.backends.renderer.attach()?;
        component.renderer_attached = true;
        component
            .backends
            .renderer
            .set_size(viewport.width, viewport.height);

        if let Some(media) = component.backends.media.as_mut() {
            media.set_muted(muted);
        }

        for (target, kind) in Self::required_listeners(&component.options) {
            let id = component.backends.events.listen(target, kind)?;
            component.listeners.push(id);
        }

        if component.loop_running() {
            component.schedule_frame();
        }

        info!(
            listeners = component.listeners.len(),
            immersive = component.options.immersive,
            video = component.options.video.is_some(),
            width = viewport.width,
            height = viewport.height,
            "Scene mounted"
        );
        Ok(component)
    }

    /// Listeners a configuration needs, each exactly once
    pub fn required_listeners(options: &SceneOptions) -> Vec<(ListenTarget, EventKind)> {
        let mut listeners = Vec::new();
        if options.drag_rotate || options.click_to_scale {
            listeners.extend(POINTER_EVENTS.iter().map(|&kind| (ListenTarget::Container, kind)));
        }
        if options.click_to_scale {
            listeners.push((ListenTarget::Container, EventKind::Click));
        }
        listeners.push((ListenTarget::Window, EventKind::Resize));
        if options.immersive {
            listeners.push((ListenTarget::SessionButton, EventKind::Click));
        }
        listeners
    }

    /// Dispatch one input event
    pub fn handle(&mut self, event: InputEvent) {
        if !self.mounted {
            return;
        }
        trace!(?event, "Scene event");

        match event {
            InputEvent::PointerDown { kind, pointer } => self.pointer_down(kind, pointer),
            InputEvent::PointerMove {
                kind,
                pointer,
                touches,
            } => self.pointer_move(kind, pointer, touches),
            InputEvent::PointerUp { kind } => self.pointer_up(kind),
            InputEvent::Click { pointer } => self.click(pointer),
            InputEvent::Resize { width, height } => self.resize(width, height),
            InputEvent::SessionToggle => self.toggle_session(),
            InputEvent::SessionStarted => self.session_started(),
            InputEvent::SessionEnded => self.session_ended(),
            InputEvent::SessionFailed { reason } => self.session_failed(&reason),
        }
    }

    /// Frame callback: render once and schedule the next frame
    pub fn on_frame(&mut self) {
        self.pending_frame = None;
        if !self.loop_running() {
            return;
        }

        if let Some(texture) = self
            .scene
            .mesh_mut(self.cube)
            .and_then(|mesh| mesh.material.video_texture_mut())
        {
            texture.mark_needs_update();
        }

        self.backends.renderer.render(&self.scene, &self.camera);
        self.frames_rendered += 1;
        self.schedule_frame();
    }

    /// Detach listeners and release every host resource
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn hits_cube(&self, pointer: &PointerInput) -> bool {
        let Some(ndc) = pointer.ndc() else {
            return false;
        };
        let ray = self.camera.ray_from_ndc(ndc);
        self.raycaster.hits(&ray, &self.scene, self.cube)
    }

    fn pointer_down(&mut self, kind: PointerKind, pointer: PointerInput) {
        if self.hits_cube(&pointer) {
            debug!(?kind, x = pointer.client.x, y = pointer.client.y, "Press on cube");
            self.drag = DragState {
                active: true,
                last: pointer.client,
                moved: false,
            };
        }
    }

    fn pointer_move(&mut self, kind: PointerKind, pointer: PointerInput, touches: usize) {
        if !self.drag.active {
            return;
        }
        if kind == PointerKind::Touch && touches != 1 {
            // A multi-finger gesture is never a tap
            self.drag.moved = true;
            return;
        }

        let delta = pointer.client - self.drag.last;
        if delta != Vec2::ZERO {
            self.drag.moved = true;
        }

        if self.options.drag_rotate && self.hits_cube(&pointer) {
            let speed = self.options.rotate_speed;
            if let Some(mesh) = self.scene.mesh_mut(self.cube) {
                mesh.transform.rotation.x += delta.y * speed;
                mesh.transform.rotation.y += delta.x * speed;
            }
        }

        self.drag.last = pointer.client;
    }

    fn pointer_up(&mut self, kind: PointerKind) {
        let drag = std::mem::take(&mut self.drag);
        if !drag.active {
            return;
        }

        match kind {
            // Touch presses are default-prevented, so no click follows; a tap is
            // recognised here instead
            PointerKind::Touch => {
                if !drag.moved && self.options.click_to_scale {
                    self.activate_cube();
                }
            }
            PointerKind::Mouse => self.suppress_click = drag.moved,
        }
    }

    fn click(&mut self, pointer: PointerInput) {
        let suppressed = std::mem::take(&mut self.suppress_click);
        if !self.options.click_to_scale || suppressed {
            return;
        }
        if self.hits_cube(&pointer) {
            self.activate_cube();
        }
    }

    /// Scale the cube up and toggle mute
    fn activate_cube(&mut self) {
        let step = self.options.scale_step;
        if let Some(mesh) = self.scene.mesh_mut(self.cube) {
            mesh.transform.scale *= step;
        }

        self.muted = !self.muted;
        if let Some(media) = self.backends.media.as_mut() {
            media.set_muted(self.muted);
        }
        debug!(muted = self.muted, "Cube activated");
    }

    fn resize(&mut self, width: f32, height: f32) {
        if !self.camera.set_aspect(width, height) {
            trace!(width, height, "Ignoring degenerate resize");
            return;
        }
        self.viewport.width = width;
        self.viewport.height = height;
        self.backends.renderer.set_size(width, height);
        debug!(width, height, "Viewport resized");
    }

    fn toggle_session(&mut self) {
        if !self.options.immersive {
            return;
        }

        match self.session {
            SessionState::Idle => match self.backends.xr.as_mut() {
                Some(xr) if xr.is_supported() => match xr.request_session() {
                    Ok(()) => {
                        self.session = SessionState::Requesting;
                        debug!("Immersive session requested");
                    }
                    Err(reason) => warn!(%reason, "Immersive session request failed"),
                },
                _ => debug!("Immersive sessions are not supported here"),
            },
            SessionState::Requesting => trace!("Session request already pending"),
            SessionState::Active => {
                if let Some(xr) = self.backends.xr.as_mut() {
                    xr.end_session();
                }
            }
        }
    }

    fn session_started(&mut self) {
        if self.session == SessionState::Active {
            return;
        }
        self.session = SessionState::Active;

        if !self.options.mesh_always_visible() {
            self.scene.add(self.cube);
        }
        if let Some(media) = self.backends.media.as_mut() {
            media.play();
        }
        if self.loop_running() {
            self.schedule_frame();
        }
        info!("Immersive session started");
    }

    fn session_ended(&mut self) {
        if self.session == SessionState::Idle {
            return;
        }
        self.session = SessionState::Idle;
        self.drag = DragState::default();

        if !self.options.mesh_always_visible() {
            self.scene.remove(self.cube);
        }
        if let Some(media) = self.backends.media.as_mut() {
            media.pause();
        }
        if !self.loop_running() {
            self.cancel_frame();
        }
        info!("Immersive session ended");
    }

    fn session_failed(&mut self, reason: &str) {
        if self.session == SessionState::Requesting {
            self.session = SessionState::Idle;
        }
        warn!(reason, "Immersive session request failed");
    }

    fn loop_running(&self) -> bool {
        self.mounted
            && match self.options.loop_policy {
                LoopPolicy::Continuous => true,
                LoopPolicy::WhileSessionActive => self.session == SessionState::Active,
            }
    }

    fn schedule_frame(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = self.backends.frames.request_frame();
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.backends.frames.cancel_frame(handle);
        }
    }

    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        self.cancel_frame();

        if self.session != SessionState::Idle {
            if let Some(xr) = self.backends.xr.as_mut() {
                xr.end_session();
            }
            self.session = SessionState::Idle;
        }

        let listeners = self.listeners.len();
        for id in self.listeners.drain(..) {
            self.backends.events.unlisten(id);
        }

        if let Some(media) = self.backends.media.as_mut() {
            media.pause();
        }

        if self.renderer_attached {
            self.backends.renderer.dispose();
            self.renderer_attached = false;
        }

        self.scene.clear();
        info!(listeners, frames = self.frames_rendered, "Scene unmounted");
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cube(&self) -> ObjectId {
        self.cube
    }

    pub fn cube_mesh(&self) -> Option<&Mesh> {
        self.scene.mesh(self.cube)
    }

    pub fn session_state(&self) -> SessionState {
        self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Caption for the session toggle button
    pub fn session_button_label(&self) -> &'static str {
        match self.session {
            SessionState::Idle => "Start AR",
            SessionState::Requesting => "Starting AR",
            SessionState::Active => "Stop AR",
        }
    }
}

impl Drop for SceneComponent {
    fn drop(&mut self) {
        self.teardown();
    }
}
