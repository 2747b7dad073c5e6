//! Bridge to the page's 3D engine.
//!
//! The engine lives in JavaScript (a three.js wrapper). Every viewer gets
//! its own engine and scene graph, created by the page's scene factory
//! inside the viewer's container. Only the WebGL renderer is shared: it is
//! created once per page by the renderer factory and looked up lazily under
//! [`SHARED_RENDERER_ID`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::bounds::{PixelPoint, PixelRect, PixelSize};
use foundation::math::Mat4;
use scene::{
    HighlightStyle, InteractorOptions, MemoryInteractor, PickDepth, PickLevel, SceneError,
    SceneGraph, SelectionSet, TransformInteractor,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub const SHARED_RENDERER_ID: &str = "avs-shared-renderer";

#[wasm_bindgen]
extern "C" {
    /// Per-viewer engine returned by the page's scene factory.
    pub type JsSceneGraph;

    #[wasm_bindgen(method, js_name = setPickDepth)]
    fn set_pick_depth(this: &JsSceneGraph, depth: &str);

    #[wasm_bindgen(method, js_name = setPickRay)]
    fn set_pick_ray(this: &JsSceneGraph, x: i32, y: i32);

    #[wasm_bindgen(method, js_name = setPickRect)]
    fn set_pick_rect(this: &JsSceneGraph, left: i32, top: i32, right: i32, bottom: i32);

    /// JSON array of selected objects.
    #[wasm_bindgen(method)]
    fn pick(this: &JsSceneGraph, level: &str) -> String;

    #[wasm_bindgen(method)]
    fn highlight(this: &JsSceneGraph, selection: &str, color: &str, front_layer: bool);

    #[wasm_bindgen(method, catch, js_name = loadScene)]
    fn load_scene(this: &JsSceneGraph, payload: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = mergeChunk)]
    fn merge_chunk(this: &JsSceneGraph, payload: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn clear(this: &JsSceneGraph);

    #[wasm_bindgen(method)]
    fn resize(this: &JsSceneGraph, width: u32, height: u32);

    #[wasm_bindgen(method, js_name = setMatrix)]
    fn set_matrix(this: &JsSceneGraph, matrix: &[f64]);

    #[wasm_bindgen(method)]
    fn render(this: &JsSceneGraph);

    /// Detaches the engine's canvas from its container.
    #[wasm_bindgen(method)]
    fn dispose(this: &JsSceneGraph);
}

/// Lazily created values keyed by id. A failed creation is retried on the
/// next lookup.
#[derive(Debug)]
pub struct SharedCache<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for SharedCache<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Clone> SharedCache<T> {
    pub fn get_or_create(&mut self, id: &str, create: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        if let Some(value) = self.entries.get(id) {
            return Some(value.clone());
        }
        let value = create(id)?;
        self.entries.insert(id.to_string(), value.clone());
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Default)]
struct Factories {
    scene: Option<js_sys::Function>,
    renderer: Option<js_sys::Function>,
}

thread_local! {
    static FACTORIES: RefCell<Factories> = RefCell::new(Factories::default());
    static RENDERERS: RefCell<SharedCache<JsValue>> = RefCell::new(SharedCache::default());
}

/// Registers the page's factories.
///
/// `create_scene(container, renderer)` builds one engine per viewer inside
/// `container`. `create_renderer(id)` builds the WebGL renderer shared by
/// every engine; it runs once, with [`SHARED_RENDERER_ID`].
pub fn register_factories(create_scene: js_sys::Function, create_renderer: js_sys::Function) {
    FACTORIES.with(|f| {
        *f.borrow_mut() = Factories {
            scene: Some(create_scene),
            renderer: Some(create_renderer),
        }
    });
    RENDERERS.with(|r| r.borrow_mut().clear());
}

fn present(value: JsValue) -> Option<JsValue> {
    (!value.is_undefined() && !value.is_null()).then_some(value)
}

fn shared_renderer() -> Option<JsValue> {
    let factory = FACTORIES.with(|f| f.borrow().renderer.clone())?;
    RENDERERS.with(|r| {
        r.borrow_mut().get_or_create(SHARED_RENDERER_ID, |id| {
            factory
                .call1(&JsValue::NULL, &JsValue::from_str(id))
                .ok()
                .and_then(present)
        })
    })
}

fn create_engine(container: &HtmlElement) -> Option<JsSceneGraph> {
    let factory = FACTORIES.with(|f| f.borrow().scene.clone())?;
    let renderer = shared_renderer()?;
    factory
        .call2(&JsValue::NULL, container, &renderer)
        .ok()
        .and_then(present)
        .map(|engine| engine.unchecked_into::<JsSceneGraph>())
}

#[derive(Clone)]
struct SharedInteractor(Rc<RefCell<MemoryInteractor>>);

impl TransformInteractor for SharedInteractor {
    fn matrix(&self) -> Mat4 {
        self.0.borrow().matrix()
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        self.0.borrow_mut().pan(dx, dy);
    }

    fn pan_to(&mut self, x: f64, y: f64) {
        self.0.borrow_mut().pan_to(x, y);
    }

    fn zoom(&self) -> f64 {
        self.0.borrow().zoom()
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.0.borrow_mut().set_zoom(zoom);
    }

    fn reset(&mut self) {
        self.0.borrow_mut().reset();
    }
}

/// One viewer's engine.
///
/// Without registered factories every call is a no-op and picks come back
/// empty, so image and SVG viewers work on pages without a 3D engine.
pub struct WebScene {
    engine: Option<JsSceneGraph>,
    interactor: Option<SharedInteractor>,
}

impl WebScene {
    pub fn new(container: &HtmlElement) -> Self {
        Self {
            engine: create_engine(container),
            interactor: None,
        }
    }
}

impl Drop for WebScene {
    fn drop(&mut self) {
        if let Some(e) = &self.engine {
            e.dispose();
        }
    }
}

fn engine_error(err: JsValue) -> SceneError {
    SceneError::Engine(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl SceneGraph for WebScene {
    fn set_pick_depth(&mut self, depth: PickDepth) {
        if let Some(e) = &self.engine {
            e.set_pick_depth(depth.as_str());
        }
    }

    fn set_pick_ray(&mut self, point: PixelPoint) {
        if let Some(e) = &self.engine {
            e.set_pick_ray(point.x, point.y);
        }
    }

    fn set_pick_rect(&mut self, rect: PixelRect) {
        if let Some(e) = &self.engine {
            e.set_pick_rect(rect.left, rect.top, rect.right, rect.bottom);
        }
    }

    fn pick(&mut self, level: PickLevel) -> SelectionSet {
        let Some(e) = &self.engine else {
            return SelectionSet::new();
        };
        serde_json::from_str(&e.pick(level.as_str())).unwrap_or_default()
    }

    fn highlight(&mut self, selection: &SelectionSet, style: &HighlightStyle) {
        let Some(e) = &self.engine else {
            return;
        };
        if let Ok(json) = serde_json::to_string(selection) {
            e.highlight(&json, &style.color, style.front_layer);
        }
    }

    fn load_scene(&mut self, payload: &serde_json::Value) -> Result<(), SceneError> {
        let Some(e) = &self.engine else {
            return Err(SceneError::Engine("no 3D renderer registered".to_string()));
        };
        e.load_scene(&payload.to_string()).map_err(engine_error)
    }

    fn merge_chunk(&mut self, payload: &serde_json::Value) -> Result<(), SceneError> {
        let Some(e) = &self.engine else {
            return Err(SceneError::Engine("no 3D renderer registered".to_string()));
        };
        e.merge_chunk(&payload.to_string()).map_err(engine_error)
    }

    fn clear(&mut self) {
        if let Some(e) = &self.engine {
            e.clear();
        }
    }

    fn resize(&mut self, size: PixelSize) {
        if let Some(e) = &self.engine {
            e.resize(size.width, size.height);
        }
    }

    fn render(&mut self) {
        let Some(e) = &self.engine else {
            return;
        };
        if let Some(interactor) = &self.interactor {
            e.set_matrix(&interactor.matrix().to_array());
        }
        e.render();
    }

    fn create_transform_interactor(
        &mut self,
        options: &InteractorOptions,
    ) -> Box<dyn TransformInteractor> {
        let interactor = SharedInteractor(Rc::new(RefCell::new(MemoryInteractor::new(
            options.clone(),
        ))));
        self.interactor = Some(interactor.clone());
        Box::new(interactor)
    }
}
