//! Recording fakes for the host seams

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::{
    Backends, EventSource, FrameHandle, FrameScheduler, ListenerId, MediaElement, RenderBackend,
    XrRuntime,
};
use crate::camera::PerspectiveCamera;
use crate::component::SceneComponent;
use crate::error::SceneError;
use crate::input::{EventKind, ListenTarget};
use crate::scene::Scene;

pub type Shared = Rc<RefCell<Recorder>>;

/// Everything the fakes observed, plus knobs to make them fail
#[derive(Debug)]
pub struct Recorder {
    // Events
    pub listeners: HashMap<ListenerId, (ListenTarget, EventKind)>,
    pub listen_calls: usize,
    pub unlistened: usize,
    pub fail_listen_after: Option<usize>,
    next_listener: u64,

    // Frames
    pub pending: Option<FrameHandle>,
    pub frames_requested: usize,
    pub frames_cancelled: usize,

    // Renderer
    pub attached: bool,
    pub fail_attach: bool,
    pub sizes: Vec<(f32, f32)>,
    pub renders: usize,
    pub last_render_children: usize,
    pub last_texture_version: Option<u64>,
    pub disposed: usize,

    // Media
    pub plays: usize,
    pub pauses: usize,
    pub muted: Option<bool>,

    // XR
    pub xr_supported: bool,
    pub fail_session_request: Option<String>,
    pub session_requests: usize,
    pub session_ends: usize,
}

impl Recorder {
    pub fn shared() -> Shared {
        Rc::new(RefCell::new(Self {
            listeners: HashMap::new(),
            listen_calls: 0,
            unlistened: 0,
            fail_listen_after: None,
            next_listener: 0,
            pending: None,
            frames_requested: 0,
            frames_cancelled: 0,
            attached: false,
            fail_attach: false,
            sizes: Vec::new(),
            renders: 0,
            last_render_children: 0,
            last_texture_version: None,
            disposed: 0,
            plays: 0,
            pauses: 0,
            muted: None,
            xr_supported: true,
            fail_session_request: None,
            session_requests: 0,
            session_ends: 0,
        }))
    }
}

struct FakeRenderer(Shared);

impl RenderBackend for FakeRenderer {
    fn attach(&mut self) -> Result<(), SceneError> {
        let mut rec = self.0.borrow_mut();
        if rec.fail_attach {
            return Err(SceneError::Backend("no drawing context".to_string()));
        }
        rec.attached = true;
        Ok(())
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.0.borrow_mut().sizes.push((width, height));
    }

    fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) {
        let mut rec = self.0.borrow_mut();
        rec.renders += 1;
        rec.last_render_children = scene.children().len();
        rec.last_texture_version = scene
            .visible_meshes()
            .find_map(|(_, mesh)| mesh.material.video_texture().map(|t| t.version));
    }

    fn dispose(&mut self) {
        let mut rec = self.0.borrow_mut();
        rec.attached = false;
        rec.disposed += 1;
    }
}

struct FakeFrames(Shared);

impl FrameScheduler for FakeFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let mut rec = self.0.borrow_mut();
        rec.frames_requested += 1;
        let handle = FrameHandle(rec.frames_requested as i32);
        rec.pending = Some(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut rec = self.0.borrow_mut();
        if rec.pending == Some(handle) {
            rec.pending = None;
        }
        rec.frames_cancelled += 1;
    }
}

struct FakeEvents(Shared);

impl EventSource for FakeEvents {
    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> Result<ListenerId, SceneError> {
        let mut rec = self.0.borrow_mut();
        rec.listen_calls += 1;
        if rec.fail_listen_after == Some(rec.listeners.len()) {
            return Err(SceneError::Listener {
                target,
                kind,
                reason: "target missing".to_string(),
            });
        }
        let id = ListenerId(rec.next_listener);
        rec.next_listener += 1;
        rec.listeners.insert(id, (target, kind));
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        let mut rec = self.0.borrow_mut();
        if rec.listeners.remove(&id).is_some() {
            rec.unlistened += 1;
        }
    }
}

struct FakeMedia(Shared);

impl MediaElement for FakeMedia {
    fn play(&mut self) {
        self.0.borrow_mut().plays += 1;
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.borrow_mut().muted = Some(muted);
    }
}

struct FakeXr(Shared);

impl XrRuntime for FakeXr {
    fn is_supported(&self) -> bool {
        self.0.borrow().xr_supported
    }

    fn request_session(&mut self) -> Result<(), String> {
        let mut rec = self.0.borrow_mut();
        rec.session_requests += 1;
        match rec.fail_session_request.clone() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn end_session(&mut self) {
        self.0.borrow_mut().session_ends += 1;
    }
}

/// Full set of fakes sharing one recorder
pub fn backends(rec: &Shared) -> Backends {
    Backends {
        renderer: Box::new(FakeRenderer(rec.clone())),
        frames: Box::new(FakeFrames(rec.clone())),
        events: Box::new(FakeEvents(rec.clone())),
        media: Some(Box::new(FakeMedia(rec.clone()))),
        xr: Some(Box::new(FakeXr(rec.clone()))),
    }
}

/// Fire the pending frame callback, if any
pub fn run_frame(component: &mut SceneComponent, rec: &Shared) -> bool {
    let pending = rec.borrow_mut().pending.take();
    if pending.is_some() {
        component.on_frame();
        true
    } else {
        false
    }
}
