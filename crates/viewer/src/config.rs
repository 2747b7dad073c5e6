//! Widget configuration.
//!
//! Deserialized from camelCase JSON so hosts can pass widget attributes
//! through unchanged. Every field has a default; an empty object is a valid
//! (if unusable, since it has no scene name) configuration.

use scene::{PickDepth, PickLevel};
use serde::{Deserialize, Serialize};
use streaming::RendererType;

fn default_true() -> bool {
    true
}

fn default_resize_threshold() -> f64 {
    10.0
}

fn default_pan_zoom_levels() -> Vec<f64> {
    vec![1.0, 2.0, 4.0, 8.0]
}

fn default_scale() -> f64 {
    1.0
}

/// Per-gesture pick configuration (tap, track or hover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureConfig {
    #[serde(default)]
    pub level: PickLevel,
    #[serde(default)]
    pub depth: PickDepth,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(default)]
    pub highlight_layer: bool,
    /// `None` picks locally only for the 3D renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_on_client: Option<bool>,
    #[serde(default = "default_true")]
    pub selection_info: bool,
    #[serde(default = "default_true")]
    pub update_scene: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            level: PickLevel::default(),
            depth: PickDepth::default(),
            highlight: false,
            highlight_color: None,
            highlight_layer: false,
            process_on_client: None,
            selection_info: true,
            update_scene: true,
        }
    }
}

impl GestureConfig {
    pub fn picks_on_client(&self, renderer: RendererType) -> bool {
        self.process_on_client
            .unwrap_or(renderer == RendererType::ThreeJs)
    }
}

/// Starting transform of the interactively transformed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformConfig {
    #[serde(default = "default_true")]
    pub enable_rotate: bool,
    #[serde(default = "default_true")]
    pub enable_zoom: bool,
    #[serde(default = "default_true")]
    pub enable_pan: bool,
    #[serde(default)]
    pub twist_angle: f64,
    #[serde(default)]
    pub tilt_angle: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            twist_angle: 0.0,
            tilt_angle: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size_first: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
}

/// What a TRACK gesture does when the renderer has no rectangle pick of its
/// own (SVG and image map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackFallback {
    /// Emit an empty local selection.
    EmptyLocal,
    /// Send the rectangle to the server instead.
    ForceServer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPolicy {
    #[serde(default = "TrackPolicy::default_svg")]
    pub svg: TrackFallback,
    #[serde(default = "TrackPolicy::default_image_map")]
    pub image_map: TrackFallback,
}

impl TrackPolicy {
    fn default_svg() -> TrackFallback {
        TrackFallback::EmptyLocal
    }

    fn default_image_map() -> TrackFallback {
        TrackFallback::ForceServer
    }
}

impl Default for TrackPolicy {
    fn default() -> Self {
        Self {
            svg: Self::default_svg(),
            image_map: Self::default_image_map(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub scene_name: Option<String>,
    #[serde(default)]
    pub scene_user_properties: Option<serde_json::Value>,
    #[serde(default)]
    pub renderer: RendererType,
    #[serde(default)]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub tap: Option<GestureConfig>,
    #[serde(default)]
    pub track: Option<GestureConfig>,
    #[serde(default)]
    pub hover: Option<GestureConfig>,
    #[serde(default)]
    pub transform: Option<TransformConfig>,
    #[serde(default)]
    pub domain_transform: Option<DomainTransform>,
    #[serde(default = "default_pan_zoom_levels")]
    pub pan_zoom_levels: Vec<f64>,
    /// Percent band around the last requested size inside which a resize is
    /// handled locally. Zero disables server re-requests on resize.
    #[serde(default = "default_resize_threshold")]
    pub resize_threshold: f64,
    /// Width / height, used when the host cannot measure a height.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub manual_update: bool,
    #[serde(default)]
    pub pointer_timeout_s: Option<f64>,
    #[serde(default)]
    pub stream: StreamConfig,
    /// File-load mode: GET this URL instead of posting a model.
    #[serde(default)]
    pub scene_url: Option<String>,
    #[serde(default)]
    pub track_policy: TrackPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            url: None,
            scene_name: None,
            scene_user_properties: None,
            renderer: RendererType::default(),
            theme_name: None,
            tap: None,
            track: None,
            hover: None,
            transform: None,
            domain_transform: None,
            pan_zoom_levels: default_pan_zoom_levels(),
            resize_threshold: default_resize_threshold(),
            aspect_ratio: None,
            manual_update: false,
            pointer_timeout_s: None,
            stream: StreamConfig::default(),
            scene_url: None,
            track_policy: TrackPolicy::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, crate::error::ViewerError> {
        serde_json::from_str(text)
            .map_err(|e| crate::error::ViewerError::Configuration(e.to_string()))
    }

    pub fn is_file_mode(&self) -> bool {
        self.scene_url.is_some()
    }

    /// Streaming only applies to the 3D renderer.
    pub fn streams(&self) -> bool {
        self.stream.enable && self.renderer == RendererType::ThreeJs
    }
}
