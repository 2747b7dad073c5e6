//! The viewer widget.
//!
//! Lifecycle: `new` → `attach` (first request) → gestures / resizes /
//! responses → dropped on detach. Every operation that needs the server
//! returns a [`PendingRequest`]; the host sends it and feeds the outcome to
//! [`ViewerWidget::handle_response`] together with the request's token.

use foundation::bounds::{PixelPoint, PixelSize};
use foundation::math::TransformAngles;
use foundation::time::Time;
use runtime::{EventBus, IdleTimer, RequestToken, RequestTracker};
use scene::picking::PickTarget;
use scene::{
    HighlightStyle, InteractorOptions, SceneGraph, SelectionSet, TransformInteractor,
};
use streaming::{
    ChunkCursor, HttpRequest, PickProperties, PickRegion, PickType, RendererType, RequestModel,
    SOURCE_DATAVIZ, WireRequest,
};
use tracing::{debug, info, warn};

use crate::config::{GestureConfig, ViewerConfig};
use crate::error::ViewerError;
use crate::events::{
    LocalSelection, PointerDetail, SelectionDetail, TrackDetail, TrackState, ViewerEvent,
};
use crate::imagemap::ImageMap;
use crate::model::{ModelInputs, build_model, pick_properties, resolve_size};
use crate::pick::{PickRoute, local_point, point_region, rect_region, route_pick, track_rect};
use crate::resize::{ResizeAction, ResizeController};
use crate::surface::Surface;
use crate::svg::{SvgDom, SvgHighlighter, collect_selection};
use crate::theme::{StyleLookup, resolve_theme};

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#ffff00";

/// A request the host must send on the widget's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub request: HttpRequest,
    /// The scene model, for POST requests.
    pub model: Option<RequestModel>,
}

pub(crate) enum RequestKind {
    Full,
    Pick(PickProperties),
    Continue(serde_json::Value),
    File(String),
}

pub struct ViewerWidget<S, D, G>
where
    S: Surface,
    D: SvgDom,
    G: SceneGraph,
{
    pub(crate) config: ViewerConfig,
    pub(crate) surface: S,
    pub(crate) svg: D,
    pub(crate) style: Box<dyn StyleLookup>,
    pub(crate) scene_factory: Box<dyn FnMut() -> G>,
    pub(crate) scene: Option<G>,
    pub(crate) interactor: Option<Box<dyn TransformInteractor>>,
    pub(crate) size: PixelSize,
    pub(crate) resize: ResizeController,
    pub(crate) image_map: ImageMap,
    pub(crate) svg_highlight: SvgHighlighter,
    pub(crate) chunks: ChunkCursor,
    pub(crate) tracker: RequestTracker,
    pub(crate) idle: IdleTimer,
    pub(crate) events: EventBus<ViewerEvent>,
    attached: bool,
    zoom_index: usize,
}

impl<S, D, G> ViewerWidget<S, D, G>
where
    S: Surface,
    D: SvgDom,
    G: SceneGraph,
{
    pub fn new(
        config: ViewerConfig,
        surface: S,
        svg: D,
        style: Box<dyn StyleLookup>,
        scene_factory: Box<dyn FnMut() -> G>,
    ) -> Self {
        let idle = IdleTimer::new(config.pointer_timeout_s, Time(0.0));
        let zoom_index = unit_zoom_index(&config.pan_zoom_levels);
        Self {
            config,
            surface,
            svg,
            style,
            scene_factory,
            scene: None,
            interactor: None,
            size: PixelSize::default(),
            resize: ResizeController::new(),
            image_map: ImageMap::default(),
            svg_highlight: SvgHighlighter::new(),
            chunks: ChunkCursor::new(),
            tracker: RequestTracker::new(),
            idle,
            events: EventBus::new(),
            attached: false,
            zoom_index,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn svg_dom(&self) -> &D {
        &self.svg
    }

    pub fn svg_dom_mut(&mut self) -> &mut D {
        &mut self.svg
    }

    pub fn scene(&self) -> Option<&G> {
        self.scene.as_ref()
    }

    pub fn interactor(&self) -> Option<&dyn TransformInteractor> {
        self.interactor.as_deref()
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn image_map(&self) -> &ImageMap {
        &self.image_map
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.tracker.in_flight()
    }

    /// Pending events without consuming them.
    pub fn events(&self) -> impl Iterator<Item = &ViewerEvent> + '_ {
        self.events.payloads()
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.events.drain().into_iter().map(|e| e.payload).collect()
    }

    /// First layout: sets up the renderer, sends the initial request, then
    /// creates the transform interactor so the first request carries the
    /// configured starting matrix.
    pub fn attach(&mut self, now: Time) -> Option<PendingRequest> {
        self.attached = true;
        self.idle.set_timeout(self.config.pointer_timeout_s, now);
        self.init_renderer();
        let pending = self.update();
        self.init_interactor();
        pending
    }

    /// Full refresh at the current size.
    pub fn update(&mut self) -> Option<PendingRequest> {
        self.issue(RequestKind::Full)
    }

    pub fn set_config(&mut self, config: ViewerConfig, now: Time) -> Option<PendingRequest> {
        let renderer_changed = config.renderer != self.config.renderer;
        self.zoom_index = unit_zoom_index(&config.pan_zoom_levels);
        self.config = config;
        self.idle.set_timeout(self.config.pointer_timeout_s, now);
        if renderer_changed {
            return self.set_renderer(self.config.renderer);
        }
        if self.attached && !self.config.manual_update {
            return self.update();
        }
        None
    }

    /// Switches renderer kind. The scene graph is replaced wholesale and all
    /// renderer-specific pick state is dropped.
    pub fn set_renderer(&mut self, renderer: RendererType) -> Option<PendingRequest> {
        self.config.renderer = renderer;
        self.reset_display_state();
        self.scene = None;
        self.interactor = None;
        if !self.attached {
            return None;
        }
        self.init_renderer();
        let pending = self.update();
        self.init_interactor();
        pending
    }

    /// Drops displayed content and cancels any in-flight request.
    pub fn clear(&mut self) {
        if let Some(token) = self.tracker.cancel() {
            debug!(token = token.0, "request cancelled by clear");
        }
        self.reset_display_state();
        if let Some(scene) = self.scene.as_mut() {
            scene.clear();
            scene.render();
        }
        self.surface.set_loading(false);
    }

    /// Host resize notification.
    pub fn on_resize(&mut self) -> Option<PendingRequest> {
        let size = resolve_size(self.surface.measure(), self.config.aspect_ratio);
        match self
            .resize
            .decide(size, self.config.resize_threshold, self.config.manual_update)
        {
            ResizeAction::Request => self.update(),
            ResizeAction::Local => {
                self.size = size;
                self.surface.resize_layers(size);
                if let Some(scene) = self.scene.as_mut() {
                    scene.resize(size);
                    scene.render();
                }
                None
            }
        }
    }

    pub fn tap(&mut self, client_x: f64, client_y: f64) -> Option<PendingRequest> {
        let gesture = self.config.tap.clone()?;
        let p = local_point(self.surface.measure(), self.size, client_x, client_y);
        self.events.emit(ViewerEvent::Tap(PointerDetail { x: p.x, y: p.y }));
        self.resolve_pick(&gesture, PickType::Tap, PickTarget::Ray(p))
    }

    /// Drag gesture. `dx`/`dy` are the accumulated movement since `Start`.
    pub fn track(
        &mut self,
        state: TrackState,
        client_x: f64,
        client_y: f64,
        dx: f64,
        dy: f64,
    ) -> Option<PendingRequest> {
        let gesture = self.config.track.clone()?;
        let rect = track_rect(
            self.surface.measure(),
            self.size,
            client_x,
            client_y,
            dx,
            dy,
        );
        self.events.emit(ViewerEvent::Track(TrackDetail {
            state,
            left: rect.left,
            right: rect.right,
            top: rect.top,
            bottom: rect.bottom,
        }));

        match state {
            TrackState::Start => None,
            TrackState::Track => {
                self.surface.draw_selection_rect(Some(rect));
                None
            }
            TrackState::End => {
                self.surface.draw_selection_rect(None);
                self.resolve_pick(&gesture, PickType::Track, PickTarget::Rect(rect))
            }
        }
    }

    /// Pointer movement: re-arms the idle timer and performs a hover pick
    /// when hover is configured.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, now: Time) -> Option<PendingRequest> {
        self.idle.touch(now);
        let gesture = self.config.hover.clone()?;
        let p = local_point(self.surface.measure(), self.size, client_x, client_y);
        self.events.emit(ViewerEvent::Hover(PointerDetail { x: p.x, y: p.y }));
        self.resolve_pick(&gesture, PickType::Hover, PickTarget::Ray(p))
    }

    /// Host clock tick; emits `pointer-timeout` once per idle period.
    pub fn tick(&mut self, now: Time) {
        if self.idle.poll(now) {
            self.events.emit(ViewerEvent::PointerTimeout);
        }
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform_locally(|i| i.pan(dx, dy));
    }

    pub fn pan_to(&mut self, x: f64, y: f64) {
        self.transform_locally(|i| i.pan_to(x, y));
    }

    pub fn zoom_in(&mut self) {
        let levels = self.config.pan_zoom_levels.clone();
        if levels.is_empty() {
            return;
        }
        self.zoom_index = (self.zoom_index + 1).min(levels.len() - 1);
        let level = levels[self.zoom_index];
        self.transform_locally(|i| i.set_zoom(level));
    }

    pub fn zoom_out(&mut self) {
        let levels = self.config.pan_zoom_levels.clone();
        if levels.is_empty() {
            return;
        }
        self.zoom_index = self.zoom_index.saturating_sub(1).min(levels.len() - 1);
        let level = levels[self.zoom_index];
        self.transform_locally(|i| i.set_zoom(level));
    }

    pub fn reset(&mut self) {
        self.zoom_index = unit_zoom_index(&self.config.pan_zoom_levels);
        self.transform_locally(|i| i.reset());
    }

    fn transform_locally(&mut self, op: impl FnOnce(&mut Box<dyn TransformInteractor>)) {
        let Some(interactor) = self.interactor.as_mut() else {
            debug!("no transform interactor; ignoring transform operation");
            return;
        };
        op(interactor);
        if let Some(scene) = self.scene.as_mut() {
            scene.render();
        }
    }

    fn init_renderer(&mut self) {
        if self.config.renderer == RendererType::ThreeJs && self.scene.is_none() {
            self.scene = Some((self.scene_factory)());
        }
    }

    fn init_interactor(&mut self) {
        if self.interactor.is_some()
            || (self.config.transform.is_none() && self.config.domain_transform.is_none())
        {
            return;
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let transform = self.config.transform.clone().unwrap_or_default();
        let options = InteractorOptions {
            enable_rotate: transform.enable_rotate,
            enable_zoom: transform.enable_zoom,
            enable_pan: transform.enable_pan,
            initial: TransformAngles {
                twist_deg: transform.twist_angle,
                tilt_deg: transform.tilt_angle,
                scale: transform.scale,
            },
            domain_scale: self.config.domain_transform.map(|d| {
                (d.width_scale.unwrap_or(1.0), d.height_scale.unwrap_or(1.0))
            }),
        };
        self.interactor = Some(scene.create_transform_interactor(&options));
    }

    fn reset_display_state(&mut self) {
        self.svg_highlight.restore(&mut self.svg);
        self.surface.clear();
        self.image_map = ImageMap::default();
        self.chunks.reset();
    }

    pub(crate) fn issue(&mut self, kind: RequestKind) -> Option<PendingRequest> {
        match self.build_request(kind) {
            Ok((request, model)) => {
                let (token, previous) = self.tracker.begin();
                if let Some(previous) = previous {
                    debug!(superseded = previous.0, token = token.0, "superseding in-flight request");
                }
                self.surface.set_loading(true);
                Some(PendingRequest {
                    token,
                    request,
                    model,
                })
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn build_request(
        &mut self,
        kind: RequestKind,
    ) -> Result<(HttpRequest, Option<RequestModel>), ViewerError> {
        let full = matches!(kind, RequestKind::Full);
        let inputs = match kind {
            RequestKind::Full => {
                let size = resolve_size(self.surface.measure(), self.config.aspect_ratio);
                if let Some(url) = self.config.scene_url.clone() {
                    info!(url = %url, "loading scene file");
                    self.begin_full(size, Some(url.clone()));
                    return Ok((HttpRequest::Get { url }, None));
                }
                ModelInputs {
                    size,
                    ..ModelInputs::default()
                }
            }
            RequestKind::File(url) => return Ok((HttpRequest::Get { url }, None)),
            RequestKind::Pick(pick) => ModelInputs {
                size: self.size,
                pick: Some(pick),
                ..ModelInputs::default()
            },
            RequestKind::Continue(chunk_id) => ModelInputs {
                size: self.size,
                chunk_id: Some(chunk_id),
                ..ModelInputs::default()
            },
        };

        let url = self.config.url.clone().ok_or_else(|| {
            ViewerError::Configuration(
                "'url' must point to an instance of the visualization server".to_string(),
            )
        })?;
        let size = inputs.size;
        let inputs = ModelInputs {
            interactor_matrix: self.interactor.as_ref().map(|i| i.matrix()),
            ..inputs
        };
        let model = build_model(&self.config, &*self.style, inputs)?;
        let body = WireRequest::new(SOURCE_DATAVIZ, &model)
            .to_value()
            .map_err(|e| ViewerError::Parse(e.to_string()))?;
        if full {
            self.begin_full(size, None);
        }
        Ok((HttpRequest::Post { url, body }, Some(model)))
    }

    /// Commits the size of a full request that is about to be sent and
    /// restarts stream bookkeeping.
    fn begin_full(&mut self, size: PixelSize, file_url: Option<String>) {
        self.size = size;
        self.surface.resize_layers(size);
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(size);
        }
        self.chunks.reset();
        self.chunks.set_file_url(file_url);
        self.resize.record_request(size, self.config.resize_threshold);
    }

    fn resolve_pick(
        &mut self,
        gesture: &GestureConfig,
        pick_type: PickType,
        target: PickTarget,
    ) -> Option<PendingRequest> {
        let region = match target {
            PickTarget::Ray(p) => point_region(p),
            PickTarget::Rect(r) => rect_region(r),
        };

        match route_pick(&self.config, gesture, pick_type) {
            PickRoute::Server => {
                self.issue(RequestKind::Pick(pick_properties(gesture, pick_type, region)))
            }
            PickRoute::Scene => {
                self.pick_scene(gesture, pick_type, target, region);
                None
            }
            PickRoute::Svg => {
                if let PickTarget::Ray(p) = target {
                    self.pick_svg(gesture, pick_type, p, region);
                }
                None
            }
            PickRoute::ImageMap => {
                let selected = match target {
                    PickTarget::Ray(p) => self.image_map.hit_test(p),
                    PickTarget::Rect(_) => SelectionSet::new(),
                };
                self.emit_local_selection(gesture, pick_type, region, selected);
                None
            }
            PickRoute::EmptyLocal => {
                self.emit_local_selection(gesture, pick_type, region, SelectionSet::new());
                None
            }
        }
    }

    fn highlight_color(&self, gesture: &GestureConfig) -> String {
        gesture
            .highlight_color
            .clone()
            .or_else(|| resolve_theme(&*self.style).remove("highlightColor"))
            .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string())
    }

    fn pick_scene(
        &mut self,
        gesture: &GestureConfig,
        pick_type: PickType,
        target: PickTarget,
        region: PickRegion,
    ) {
        let color = self.highlight_color(gesture);
        let Some(scene) = self.scene.as_mut() else {
            warn!("3D pick requested before a scene graph exists");
            return;
        };
        scene.set_pick_depth(gesture.depth);
        match target {
            PickTarget::Ray(p) => scene.set_pick_ray(p),
            PickTarget::Rect(r) => scene.set_pick_rect(r),
        }
        let selected = scene.pick(gesture.level);

        if gesture.update_scene && gesture.highlight {
            scene.highlight(
                &selected,
                &HighlightStyle {
                    color,
                    front_layer: gesture.highlight_layer,
                },
            );
            scene.render();
        }
        self.emit_local_selection(gesture, pick_type, region, selected);
    }

    fn pick_svg(
        &mut self,
        gesture: &GestureConfig,
        pick_type: PickType,
        p: PixelPoint,
        region: PickRegion,
    ) {
        let highlight = gesture.update_scene && gesture.highlight;
        let mut selected = SelectionSet::new();
        let hit = self
            .svg
            .element_at(p.x as f64, p.y as f64)
            .and_then(|node| collect_selection(&self.svg, node).map(|obj| (node, obj)));

        match hit {
            Some((node, obj)) => {
                selected.push(obj);
                if highlight {
                    let color = self.highlight_color(gesture);
                    self.svg_highlight.highlight(&mut self.svg, node, &color);
                }
            }
            None => {
                if highlight {
                    self.svg_highlight.restore(&mut self.svg);
                }
            }
        }
        self.emit_local_selection(gesture, pick_type, region, selected);
    }

    fn emit_local_selection(
        &mut self,
        gesture: &GestureConfig,
        pick_type: PickType,
        region: PickRegion,
        selected: SelectionSet,
    ) {
        if !gesture.selection_info {
            return;
        }
        self.events
            .emit(ViewerEvent::SelectionInfo(SelectionDetail::Local(LocalSelection {
                mode: pick_type,
                region,
                selected,
            })));
    }

    /// Terminal failure of the current request.
    pub(crate) fn fail(&mut self, err: ViewerError) {
        if !matches!(err, ViewerError::Server(_)) {
            warn!(error = %err, "viewer request failed");
        }
        self.chunks.reset();
        self.surface.set_loading(false);
        self.events.emit(ViewerEvent::Error {
            message: err.to_string(),
        });
    }

    /// Non-fatal failure while dispatching one part of a response.
    pub(crate) fn report(&mut self, err: ViewerError) {
        warn!(error = %err, "response part could not be applied");
        self.events.emit(ViewerEvent::Error {
            message: err.to_string(),
        });
    }
}

fn unit_zoom_index(levels: &[f64]) -> usize {
    levels.iter().position(|l| *l == 1.0).unwrap_or(0)
}
