//! WebXR immersive-ar sessions via `navigator.xr`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cubexr_scene::{InputEvent, XrRuntime};
use js_sys::{Function, Promise, Reflect};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, EventTarget, Navigator, Window};

use crate::app::Dispatcher;

const SESSION_MODE: &str = "immersive-ar";

type SessionSlot = Rc<RefCell<Option<JsValue>>>;

/// Outcome of `navigator.xr.isSessionSupported`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Support {
    /// Query still pending
    Unknown,
    Supported,
    Unsupported,
}

impl Support {
    fn from_answer(answer: Option<bool>) -> Self {
        match answer {
            Some(true) => Self::Supported,
            _ => Self::Unsupported,
        }
    }

    /// Requests are only issued once the browser confirmed the mode
    fn allows_request(self) -> bool {
        self == Self::Supported
    }
}

pub struct WebXr {
    navigator: Navigator,
    dispatcher: Dispatcher,
    session: SessionSlot,
    support: Rc<Cell<Support>>,
    on_end: Rc<Closure<dyn FnMut(Event)>>,
    /// Set once the runtime is dropped; late sessions are ended immediately
    closed: Rc<Cell<bool>>,
}

impl WebXr {
    pub fn new(window: &Window, dispatcher: Dispatcher) -> Self {
        let session: SessionSlot = Rc::new(RefCell::new(None));

        let slot = session.clone();
        let end_dispatcher = dispatcher.clone();
        let on_end = Closure::wrap(Box::new(move |_event: Event| {
            slot.borrow_mut().take();
            info!("AR session ended");
            end_dispatcher.dispatch(InputEvent::SessionEnded);
        }) as Box<dyn FnMut(Event)>);

        let xr = Self {
            navigator: window.navigator(),
            dispatcher,
            session,
            support: Rc::new(Cell::new(Support::Unknown)),
            on_end: Rc::new(on_end),
            closed: Rc::new(Cell::new(false)),
        };
        xr.query_support();
        xr
    }

    /// Ask the browser whether immersive-ar sessions are available
    fn query_support(&self) {
        let promise = match self.call_xr("isSessionSupported") {
            Ok(promise) => promise,
            Err(e) => {
                debug!(error = ?e, "WebXR unavailable");
                self.support.set(Support::Unsupported);
                return;
            }
        };

        let support = self.support.clone();
        spawn_local(async move {
            let answer = JsFuture::from(promise).await.ok().and_then(|v| v.as_bool());
            support.set(Support::from_answer(answer));
            debug!(supported = ?support.get(), mode = SESSION_MODE, "WebXR support resolved");
        });
    }

    fn xr(&self) -> Option<JsValue> {
        Reflect::get(&self.navigator, &JsValue::from_str("xr"))
            .ok()
            .filter(|xr| !xr.is_undefined() && !xr.is_null())
    }

    /// Call `navigator.xr.<method>(SESSION_MODE)`, which returns a promise
    fn call_xr(&self, method: &str) -> Result<Promise, JsValue> {
        let xr = self
            .xr()
            .ok_or_else(|| JsValue::from_str("navigator.xr unavailable"))?;
        let function: Function = Reflect::get(&xr, &JsValue::from_str(method))?.dyn_into()?;
        function
            .call1(&xr, &JsValue::from_str(SESSION_MODE))?
            .dyn_into::<Promise>()
    }
}

fn call_end(session: &JsValue) {
    let end = Reflect::get(session, &JsValue::from_str("end"))
        .ok()
        .and_then(|end| end.dyn_into::<Function>().ok());
    if let Some(end) = end {
        if let Err(e) = end.call0(session) {
            debug!(error = ?e, "XRSession.end failed");
        }
    }
}

fn remove_end_listener(session: &JsValue, on_end: &Closure<dyn FnMut(Event)>) {
    let target: &EventTarget = session.unchecked_ref();
    let _ = target.remove_event_listener_with_callback("end", on_end.as_ref().unchecked_ref());
}

impl XrRuntime for WebXr {
    fn is_supported(&self) -> bool {
        self.support.get().allows_request()
    }

    fn request_session(&mut self) -> Result<(), String> {
        // Called while the scene is borrowed: failures go back by return value
        let promise = self
            .call_xr("requestSession")
            .map_err(|e| format!("{e:?}"))?;

        let dispatcher = self.dispatcher.clone();
        let slot = self.session.clone();
        let on_end = self.on_end.clone();
        let closed = self.closed.clone();
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(session) => {
                    if closed.get() {
                        call_end(&session);
                        return;
                    }
                    let target: &EventTarget = session.unchecked_ref();
                    if let Err(e) = target
                        .add_event_listener_with_callback("end", (*on_end).as_ref().unchecked_ref())
                    {
                        warn!(error = ?e, "Failed to watch AR session end");
                    }
                    *slot.borrow_mut() = Some(session);
                    info!("AR session started");
                    dispatcher.dispatch(InputEvent::SessionStarted);
                }
                Err(e) => {
                    warn!(error = ?e, "AR session rejected");
                    dispatcher.dispatch(InputEvent::SessionFailed {
                        reason: format!("{e:?}"),
                    });
                }
            }
        });
        Ok(())
    }

    fn end_session(&mut self) {
        let session = self.session.borrow().clone();
        if let Some(session) = session {
            call_end(&session);
        }
    }
}

impl Drop for WebXr {
    fn drop(&mut self) {
        self.closed.set(true);
        if let Some(session) = self.session.borrow_mut().take() {
            remove_end_listener(&session, &self.on_end);
            call_end(&session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_gates_requests() {
        assert!(!Support::Unknown.allows_request());
        assert!(Support::from_answer(Some(true)).allows_request());
        // Browsers with navigator.xr but no AR answer false
        assert!(!Support::from_answer(Some(false)).allows_request());
        assert!(!Support::from_answer(None).allows_request());
    }
}
