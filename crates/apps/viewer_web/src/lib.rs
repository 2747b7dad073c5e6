use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::time::Time;
use streaming::{NamedProperties, Transport};
use viewer::{
    Component, DataRequest, HtmlRequest, InfoRequest, PendingRequest, TrackState, ViewerConfig,
    ViewerEvent, ViewerWidget,
};
use web_sys::{CustomEvent, CustomEventInit, HtmlElement};

mod dom;
mod engine;
mod transport;

use dom::{DomStyle, DomSurface, DomSvg};
use engine::WebScene;
use transport::FetchTransport;

type WebWidget = ViewerWidget<DomSurface, DomSvg, WebScene>;

struct Viewer {
    widget: WebWidget,
    container: HtmlElement,
}

/// Live viewers by handle.
struct Registry<T> {
    next_id: u32,
    viewers: BTreeMap<u32, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            viewers: BTreeMap::new(),
        }
    }
}

impl<T> Registry<T> {
    fn insert(&mut self, viewer: T) -> u32 {
        self.next_id += 1;
        self.viewers.insert(self.next_id, viewer);
        self.next_id
    }

    fn remove(&mut self, id: u32) -> Option<T> {
        self.viewers.remove(&id)
    }
}

thread_local! {
    static STATE: RefCell<Registry<Viewer>> = RefCell::new(Registry::default());
}

/// Runs `op` on viewer `id` and releases the registry before returning, so
/// whatever the caller does with the result may re-enter the registry.
fn borrow_viewer<T, R>(state: &RefCell<Registry<T>>, id: u32, op: impl FnOnce(&mut T) -> R) -> Option<R> {
    let mut state = state.borrow_mut();
    state.viewers.get_mut(&id).map(op)
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn now() -> Time {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now);
    Time(ms / 1000.0)
}

/// Runs `op` against a live viewer, then delivers its events and sends the
/// request it produced, if any. Page listeners run after the registry is
/// released and may call back into any export.
fn with_viewer(id: u32, op: impl FnOnce(&mut WebWidget) -> Option<PendingRequest>) {
    let outcome = STATE.with(|state| {
        borrow_viewer(state, id, |viewer| {
            let pending = op(&mut viewer.widget);
            (viewer.widget.drain_events(), viewer.container.clone(), pending)
        })
    });
    let Some((events, container, pending)) = outcome else {
        return;
    };
    for event in &events {
        if let Err(err) = dispatch_event(&container, event) {
            log(&format!("event dispatch failed: {err:?}"));
        }
    }
    if let Some(pending) = pending {
        send(id, pending);
    }
}

fn send(id: u32, pending: PendingRequest) {
    spawn_local(async move {
        let result = FetchTransport.send(&pending.request).await;
        with_viewer(id, |w| w.handle_response(pending.token, result));
    });
}

fn dispatch_event(target: &HtmlElement, event: &ViewerEvent) -> Result<(), JsValue> {
    let init = CustomEventInit::new();
    let value = serde_json::to_value(event).map_err(|e| JsValue::from_str(&e.to_string()))?;
    if let Some(detail) = value.get("detail") {
        init.set_detail(&js_sys::JSON::parse(&detail.to_string())?);
    }
    init.set_bubbles(true);
    let dom_event = CustomEvent::new_with_event_init_dict(event.name(), &init)?;
    target.dispatch_event(&dom_event)?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Registers the page's 3D factories. `create_scene(container, renderer)`
/// builds one engine per viewer; `create_renderer(id)` builds the WebGL
/// renderer those engines share.
#[wasm_bindgen]
pub fn register_renderer(create_scene: js_sys::Function, create_renderer: js_sys::Function) {
    engine::register_factories(create_scene, create_renderer);
}

/// Creates a viewer inside the element with id `container_id`. Returns the
/// viewer handle used by every other call.
#[wasm_bindgen]
pub fn create_viewer(container_id: &str, config_json: &str) -> Result<u32, JsValue> {
    let config = ViewerConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container: HtmlElement = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{container_id}'")))?
        .dyn_into()?;

    let surface = DomSurface::new(&document, container.clone())?;
    let svg = DomSvg::new(document, surface.svg_host().clone(), surface.svg_nodes());
    let style = DomStyle::new(container.clone().into());
    let host = container.clone();
    let widget = ViewerWidget::new(
        config,
        surface,
        svg,
        Box::new(style),
        Box::new(move || WebScene::new(&host)),
    );

    Ok(STATE.with(|state| state.borrow_mut().insert(Viewer { widget, container })))
}

#[wasm_bindgen]
pub fn destroy_viewer(id: u32) {
    let removed = STATE.with(|state| state.borrow_mut().remove(id));
    if let Some(mut viewer) = removed {
        viewer.widget.clear();
    }
}

#[wasm_bindgen]
pub fn attach(id: u32) {
    with_viewer(id, |w| w.attach(now()));
}

#[wasm_bindgen]
pub fn update(id: u32) {
    with_viewer(id, |w| w.update());
}

#[wasm_bindgen]
pub fn set_config(id: u32, config_json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    with_viewer(id, |w| w.set_config(config, now()));
    Ok(())
}

#[wasm_bindgen]
pub fn clear(id: u32) {
    with_viewer(id, |w| {
        w.clear();
        None
    });
}

#[wasm_bindgen]
pub fn on_resize(id: u32) {
    with_viewer(id, |w| w.on_resize());
}

#[wasm_bindgen]
pub fn tap(id: u32, client_x: f64, client_y: f64) {
    with_viewer(id, |w| w.tap(client_x, client_y));
}

/// `state` is `start`, `track` or `end`.
#[wasm_bindgen]
pub fn track(id: u32, state: &str, client_x: f64, client_y: f64, dx: f64, dy: f64) {
    let state = match state {
        "start" => TrackState::Start,
        "track" => TrackState::Track,
        "end" => TrackState::End,
        other => {
            log(&format!("unknown track state '{other}'"));
            return;
        }
    };
    with_viewer(id, |w| w.track(state, client_x, client_y, dx, dy));
}

#[wasm_bindgen]
pub fn pointer_moved(id: u32, client_x: f64, client_y: f64) {
    with_viewer(id, |w| w.pointer_moved(client_x, client_y, now()));
}

/// Drives the pointer idle timer; call from a page interval.
#[wasm_bindgen]
pub fn tick(id: u32) {
    with_viewer(id, |w| {
        w.tick(now());
        None
    });
}

#[wasm_bindgen]
pub fn pan(id: u32, dx: f64, dy: f64) {
    with_viewer(id, |w| {
        w.pan(dx, dy);
        None
    });
}

#[wasm_bindgen]
pub fn pan_to(id: u32, x: f64, y: f64) {
    with_viewer(id, |w| {
        w.pan_to(x, y);
        None
    });
}

#[wasm_bindgen]
pub fn zoom_in(id: u32) {
    with_viewer(id, |w| {
        w.zoom_in();
        None
    });
}

#[wasm_bindgen]
pub fn zoom_out(id: u32) {
    with_viewer(id, |w| {
        w.zoom_out();
        None
    });
}

#[wasm_bindgen]
pub fn reset(id: u32) {
    with_viewer(id, |w| {
        w.reset();
        None
    });
}

/// Sends an auxiliary request and dispatches its single event on the
/// element with id `target_id`. `kind` is `info`, `data` or `html`.
#[wasm_bindgen]
pub fn request(target_id: &str, kind: &str, url: &str, name: &str) -> Result<(), JsValue> {
    let target: HtmlElement = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(target_id))
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{target_id}'")))?
        .dyn_into()?;
    let url = Some(url.to_string());
    let properties = NamedProperties::new(name);
    let component: Box<dyn Component> = match kind {
        "info" => Box::new(InfoRequest {
            url,
            info: properties,
            data_source: None,
        }),
        "data" => Box::new(DataRequest {
            url,
            request: properties,
            data: None,
        }),
        "html" => Box::new(HtmlRequest {
            url,
            request: properties,
            data: None,
        }),
        other => return Err(JsValue::from_str(&format!("unknown request kind '{other}'"))),
    };

    spawn_local(async move {
        let event = match component.request() {
            Ok(req) => component.handle_response(FetchTransport.send(&req).await),
            Err(err) => Some(ViewerEvent::Error {
                message: err.to_string(),
            }),
        };
        if let Some(event) = event {
            if let Err(err) = dispatch_event(&target, &event) {
                log(&format!("event dispatch failed: {err:?}"));
            }
        }
    });
    Ok(())
}
