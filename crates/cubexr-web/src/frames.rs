//! requestAnimationFrame scheduling

use cubexr_scene::{FrameHandle, FrameScheduler};
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::app::Dispatcher;

pub struct AnimationFrames {
    window: Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl AnimationFrames {
    pub fn new(window: Window, dispatcher: Dispatcher) -> Self {
        let callback = Closure::wrap(Box::new(move |_timestamp: f64| {
            dispatcher.frame();
        }) as Box<dyn FnMut(f64)>);
        Self { window, callback }
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        match self
            .window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                warn!(error = ?e, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}
