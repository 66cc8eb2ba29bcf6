//! DOM listeners feeding the scene component

use std::collections::HashMap;

use cubexr_scene::{
    EventKind, EventSource, InputEvent, ListenTarget, ListenerId, PointerInput, PointerKind,
    SceneError, Vec2, Viewport,
};
use tracing::trace;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement, MouseEvent, TouchEvent, Window};

use crate::app::Dispatcher;

/// A listener attached to a DOM target
struct Registration {
    target: EventTarget,
    name: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Attaches one closure per requested listener and removes it again on `unlisten`
pub struct DomEventSource {
    window: Window,
    container: HtmlElement,
    session_button: Option<HtmlElement>,
    dispatcher: Dispatcher,
    registrations: HashMap<ListenerId, Registration>,
    next_id: u64,
}

impl DomEventSource {
    pub fn new(
        window: Window,
        container: HtmlElement,
        session_button: Option<HtmlElement>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            window,
            container,
            session_button,
            dispatcher,
            registrations: HashMap::new(),
            next_id: 0,
        }
    }

    fn resolve(&self, target: ListenTarget) -> Option<EventTarget> {
        match target {
            ListenTarget::Container => Some(self.container.clone().into()),
            ListenTarget::Window => Some(self.window.clone().into()),
            ListenTarget::SessionButton => self.session_button.clone().map(Into::into),
        }
    }
}

impl EventSource for DomEventSource {
    fn listen(&mut self, target: ListenTarget, kind: EventKind) -> Result<ListenerId, SceneError> {
        let element = self.resolve(target).ok_or_else(|| SceneError::Listener {
            target,
            kind,
            reason: "target element missing".to_string(),
        })?;

        let container = self.container.clone();
        let window = self.window.clone();
        let dispatcher = self.dispatcher.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(input) = translate(target, kind, &event, &container, &window) {
                dispatcher.dispatch(input);
            }
        }) as Box<dyn FnMut(Event)>);

        element
            .add_event_listener_with_callback(kind.dom_name(), callback.as_ref().unchecked_ref())
            .map_err(|e| SceneError::Listener {
                target,
                kind,
                reason: format!("{e:?}"),
            })?;

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.insert(
            id,
            Registration {
                target: element,
                name: kind.dom_name(),
                callback,
            },
        );
        trace!(?target, ?kind, "Listener attached");
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        if let Some(registration) = self.registrations.remove(&id) {
            let _ = registration.target.remove_event_listener_with_callback(
                registration.name,
                registration.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Drop for DomEventSource {
    fn drop(&mut self) {
        let ids: Vec<ListenerId> = self.registrations.keys().copied().collect();
        for id in ids {
            self.unlisten(id);
        }
    }
}

fn bounds(container: &HtmlElement) -> Viewport {
    let rect = container.get_bounding_client_rect();
    Viewport::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

/// Convert a DOM event into a component event
fn translate(
    target: ListenTarget,
    kind: EventKind,
    event: &Event,
    container: &HtmlElement,
    window: &Window,
) -> Option<InputEvent> {
    if target == ListenTarget::SessionButton {
        return Some(InputEvent::SessionToggle);
    }

    match kind {
        EventKind::MouseDown | EventKind::MouseMove | EventKind::Click => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            if kind != EventKind::Click {
                event.prevent_default();
            }
            let pointer = PointerInput::new(
                Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32),
                bounds(container),
            );
            Some(match kind {
                EventKind::MouseDown => InputEvent::PointerDown {
                    kind: PointerKind::Mouse,
                    pointer,
                },
                EventKind::MouseMove => InputEvent::PointerMove {
                    kind: PointerKind::Mouse,
                    pointer,
                    touches: 1,
                },
                _ => InputEvent::Click { pointer },
            })
        }
        EventKind::MouseUp => Some(InputEvent::PointerUp {
            kind: PointerKind::Mouse,
        }),
        EventKind::TouchStart | EventKind::TouchMove => {
            let touch_event = event.dyn_ref::<TouchEvent>()?;
            event.prevent_default();
            let touches = touch_event.touches();
            let touch = touches.get(0)?;
            let pointer = PointerInput::new(
                Vec2::new(touch.client_x() as f32, touch.client_y() as f32),
                bounds(container),
            );
            Some(if kind == EventKind::TouchStart {
                InputEvent::PointerDown {
                    kind: PointerKind::Touch,
                    pointer,
                }
            } else {
                InputEvent::PointerMove {
                    kind: PointerKind::Touch,
                    pointer,
                    touches: touches.length() as usize,
                }
            })
        }
        EventKind::TouchEnd => Some(InputEvent::PointerUp {
            kind: PointerKind::Touch,
        }),
        EventKind::Resize => {
            let width = window.inner_width().ok()?.as_f64()?;
            let height = window.inner_height().ok()?.as_f64()?;
            Some(InputEvent::Resize {
                width: width as f32,
                height: height as f32,
            })
        }
    }
}
