//! Mounting, unmounting and callback dispatch

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cubexr_scene::{
    Backends, InputEvent, MediaElement, SceneComponent, SceneOptions, Variant, Viewport, XrRuntime,
};
use tracing::{info, trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, Window};

use crate::canvas::CanvasRenderer;
use crate::events::DomEventSource;
use crate::frames::AnimationFrames;
use crate::media::VideoElement;
use crate::xr::WebXr;

/// Element the scene renders into
const CONTAINER_ID: &str = "scene-container";
const SESSION_BUTTON_ID: &str = "scene-session-button";

/// A mounted scene and the DOM it added outside the renderer
struct Mounted {
    component: SceneComponent,
    session_button: Option<HtmlElement>,
}

impl Mounted {
    fn sync_session_button(&self) {
        if let Some(button) = &self.session_button {
            button.set_text_content(Some(self.component.session_button_label()));
        }
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(button) = &self.session_button {
            button.remove();
        }
    }
}

type SceneSlot = Rc<RefCell<Option<Mounted>>>;

thread_local! {
    static SCENE: SceneSlot = Rc::new(RefCell::new(None));
}

/// Routes browser callbacks back into the mounted component.
///
/// Holds only a weak reference so callbacks never keep a scene alive.
#[derive(Clone)]
pub struct Dispatcher {
    slot: Weak<RefCell<Option<Mounted>>>,
}

impl Dispatcher {
    pub fn dispatch(&self, event: InputEvent) {
        self.with_mounted(|mounted| {
            mounted.component.handle(event);
            mounted.sync_session_button();
        });
    }

    pub fn frame(&self) {
        self.with_mounted(|mounted| mounted.component.on_frame());
    }

    fn with_mounted(&self, f: impl FnOnce(&mut Mounted)) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        let Ok(mut guard) = slot.try_borrow_mut() else {
            trace!("Scene busy, dropping callback");
            return;
        };
        if let Some(mounted) = guard.as_mut() {
            f(mounted);
        }
    }
}

/// Mount the scene into `#scene-container`; a missing container is a no-op
pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let Some(container) = document.get_element_by_id(CONTAINER_ID) else {
        warn!(id = CONTAINER_ID, "Scene container not found");
        return Ok(());
    };
    let container: HtmlElement = container.dyn_into()?;
    let options = read_options(&container);

    SCENE.with(|slot| {
        // Remounting replaces the previous scene
        let previous = slot.borrow_mut().take();
        drop(previous);

        let mounted = mount(slot, &window, &document, container, options)?;
        *slot.borrow_mut() = Some(mounted);
        Ok(())
    })
}

/// Drop the mounted scene, releasing everything it holds
pub fn unmount() {
    SCENE.with(|slot| {
        let mounted = slot.borrow_mut().take();
        if mounted.is_some() {
            info!("Unmounting scene");
        }
        drop(mounted);
    });
}

/// Unmount when the page is hidden or navigated away from
pub fn unmount_on_pagehide() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback =
        Closure::wrap(Box::new(|_event: web_sys::Event| unmount()) as Box<dyn FnMut(web_sys::Event)>);
    window.add_event_listener_with_callback("pagehide", callback.as_ref().unchecked_ref())?;
    // Lives for the rest of the page
    callback.forget();
    Ok(())
}

/// Options from `data-options` (JSON) or `data-variant`, else the full feature set
fn read_options(container: &HtmlElement) -> SceneOptions {
    if let Some(json) = container.get_attribute("data-options") {
        match SceneOptions::from_json(&json) {
            Ok(options) => return options,
            Err(e) => warn!(error = %e, "Ignoring invalid data-options"),
        }
    }

    let variant = container
        .get_attribute("data-variant")
        .and_then(|name| match name.parse::<Variant>() {
            Ok(variant) => Some(variant),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid data-variant");
                None
            }
        })
        .unwrap_or_default();
    SceneOptions::preset(variant)
}

fn mount(
    slot: &SceneSlot,
    window: &Window,
    document: &Document,
    container: HtmlElement,
    options: SceneOptions,
) -> Result<Mounted, JsValue> {
    let dispatcher = Dispatcher {
        slot: Rc::downgrade(slot),
    };

    // Sibling of the container so presses on the button never reach the
    // container's pointer listeners
    let session_button = if options.immersive {
        let button: HtmlElement = document.create_element("button")?.dyn_into()?;
        button.set_id(SESSION_BUTTON_ID);
        container.after_with_node_1(&button)?;
        Some(button)
    } else {
        None
    };

    let video = options
        .video
        .as_ref()
        .map(|video| VideoElement::new(document, video))
        .transpose()?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let renderer = CanvasRenderer::new(
        container.clone(),
        canvas,
        video.as_ref().map(|v| v.element().clone()),
    );

    let events = DomEventSource::new(
        window.clone(),
        container.clone(),
        session_button.clone(),
        dispatcher.clone(),
    );
    let frames = AnimationFrames::new(window.clone(), dispatcher.clone());
    let xr = options
        .immersive
        .then(|| Box::new(WebXr::new(window, dispatcher)) as Box<dyn XrRuntime>);

    let rect = container.get_bounding_client_rect();
    let viewport = Viewport::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    );

    let backends = Backends {
        renderer: Box::new(renderer),
        frames: Box::new(frames),
        events: Box::new(events),
        media: video.map(|v| Box::new(v) as Box<dyn MediaElement>),
        xr,
    };

    let component = match SceneComponent::mount(options, viewport, backends) {
        Ok(component) => component,
        Err(e) => {
            if let Some(button) = &session_button {
                button.remove();
            }
            return Err(JsValue::from_str(&e.to_string()));
        }
    };

    let mounted = Mounted {
        component,
        session_button,
    };
    mounted.sync_session_button();
    Ok(mounted)
}
