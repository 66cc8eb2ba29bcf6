//! Video element backing the cube's video texture

use cubexr_scene::{MediaElement, VideoOptions};
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlVideoElement};

pub struct VideoElement {
    element: HtmlVideoElement,
}

impl VideoElement {
    /// Create a detached, inline-playing video element
    pub fn new(document: &Document, options: &VideoOptions) -> Result<Self, JsValue> {
        let element: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        element.set_cross_origin(Some("anonymous"));
        element.set_src(&options.src);
        element.set_loop(options.looping);
        element.set_attribute("playsinline", "")?;

        let mut video = Self { element };
        video.set_muted(options.start_muted);
        Ok(video)
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

impl MediaElement for VideoElement {
    fn play(&mut self) {
        match self.element.play() {
            Ok(promise) => spawn_local(async move {
                // Autoplay policies may reject; the texture just stays on its first frame
                if let Err(e) = JsFuture::from(promise).await {
                    debug!(error = ?e, "Video playback rejected");
                }
            }),
            Err(e) => debug!(error = ?e, "Video playback failed"),
        }
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
        let _ = if muted {
            self.element.set_attribute("muted", "")
        } else {
            self.element.remove_attribute("muted")
        };
    }
}

impl Drop for VideoElement {
    fn drop(&mut self) {
        let _ = self.element.pause();
        let _ = self.element.remove_attribute("src");
        self.element.load();
    }
}
