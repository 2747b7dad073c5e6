//! Capability interface of the retained-mode 3D engine.
//!
//! The widget core never touches engine internals; it drives picking,
//! highlighting and scene loading through [`SceneGraph`], and object
//! manipulation through [`TransformInteractor`].

use foundation::bounds::{PixelPoint, PixelRect, PixelSize};
use foundation::math::{Mat4, TransformAngles};

use crate::pick::{PickDepth, PickLevel};
use crate::selection::SelectionSet;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The payload does not have the shape the engine expects.
    InvalidPayload(String),
    /// The engine rejected the operation.
    Engine(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::InvalidPayload(msg) => write!(f, "invalid scene payload: {msg}"),
            SceneError::Engine(msg) => write!(f, "scene engine error: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub color: String,
    /// Draw highlighted objects in a separate front layer.
    pub front_layer: bool,
}

/// Options for a client-side object transform handle.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractorOptions {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub initial: TransformAngles,
    /// Horizontal/vertical domain zoom factors, when a domain transform is configured.
    pub domain_scale: Option<(f64, f64)>,
}

impl Default for InteractorOptions {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            initial: TransformAngles::default(),
            domain_scale: None,
        }
    }
}

pub trait SceneGraph {
    fn set_pick_depth(&mut self, depth: PickDepth);

    /// Sets a pick ray through the given viewer pixel.
    fn set_pick_ray(&mut self, point: PixelPoint);

    fn set_pick_rect(&mut self, rect: PixelRect);

    /// Runs the configured pick and gathers the result at `level`.
    fn pick(&mut self, level: PickLevel) -> SelectionSet;

    fn highlight(&mut self, selection: &SelectionSet, style: &HighlightStyle);

    /// Replaces the whole scene.
    fn load_scene(&mut self, payload: &serde_json::Value) -> Result<(), SceneError>;

    /// Merges one streamed chunk into the current scene.
    fn merge_chunk(&mut self, payload: &serde_json::Value) -> Result<(), SceneError>;

    fn clear(&mut self);

    fn resize(&mut self, size: PixelSize);

    fn render(&mut self);

    fn create_transform_interactor(
        &mut self,
        options: &InteractorOptions,
    ) -> Box<dyn TransformInteractor>;
}

pub trait TransformInteractor {
    /// Current object matrix (column-major).
    fn matrix(&self) -> Mat4;

    fn pan(&mut self, dx: f64, dy: f64);

    fn pan_to(&mut self, x: f64, y: f64);

    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, zoom: f64);

    /// Returns to the initial orientation, zoom and pan.
    fn reset(&mut self);
}
