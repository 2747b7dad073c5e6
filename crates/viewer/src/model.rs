//! Scene request model assembly.

use foundation::bounds::PixelSize;
use foundation::math::{Mat4, TransformAngles};
use streaming::{
    PickProperties, PickRegion, PickType, RendererProperties, RequestModel, SceneProperties,
    StreamProperties,
};

use crate::config::{DomainTransform, GestureConfig, TransformConfig, ViewerConfig};
use crate::error::ViewerError;
use crate::surface::SurfaceRect;
use crate::theme::{StyleLookup, resolve_theme};

pub const DEFAULT_EXTENT: u32 = 200;

/// Display size from a measured rectangle. Non-positive extents fall back
/// to [`DEFAULT_EXTENT`]; an unmeasurable height is derived from the aspect
/// ratio when one is configured.
pub fn resolve_size(rect: SurfaceRect, aspect_ratio: Option<f64>) -> PixelSize {
    let width = if rect.width > 0.0 {
        rect.width.round() as u32
    } else {
        DEFAULT_EXTENT
    };
    let height = if rect.height > 0.0 {
        rect.height.round() as u32
    } else {
        match aspect_ratio.filter(|r| r.is_finite() && *r > 0.0) {
            Some(ratio) => ((width as f64 / ratio).round() as u32).max(1),
            None => DEFAULT_EXTENT,
        }
    };
    PixelSize::new(width.max(1), height.max(1))
}

/// Size sent to the server once the domain transform is applied.
pub fn request_size(size: PixelSize, domain: Option<&DomainTransform>) -> PixelSize {
    let Some(domain) = domain else {
        return size;
    };
    let scale = |extent: u32, factor: Option<f64>| match factor.filter(|f| f.is_finite()) {
        Some(f) => extent.max((extent as f64 * f).round().max(0.0) as u32),
        None => extent,
    };
    PixelSize::new(
        scale(size.width, domain.width_scale),
        scale(size.height, domain.height_scale),
    )
}

pub fn initial_transform(transform: &TransformConfig) -> Mat4 {
    Mat4::from_angles(TransformAngles {
        twist_deg: transform.twist_angle,
        tilt_deg: transform.tilt_angle,
        scale: transform.scale,
    })
}

pub fn pick_properties(
    gesture: &GestureConfig,
    pick_type: PickType,
    region: PickRegion,
) -> PickProperties {
    PickProperties {
        pick_type,
        region,
        level: gesture.level,
        depth: gesture.depth,
        highlight: gesture.highlight,
        highlight_color: gesture.highlight_color.clone(),
        highlight_layer: gesture.highlight_layer,
        selection_info: gesture.selection_info,
        update_scene: gesture.update_scene,
    }
}

/// Per-request inputs that do not live in the configuration.
#[derive(Debug, Clone, Default)]
pub struct ModelInputs {
    pub size: PixelSize,
    /// Matrix read back from a live transform interactor.
    pub interactor_matrix: Option<Mat4>,
    pub chunk_id: Option<serde_json::Value>,
    pub pick: Option<PickProperties>,
}

pub fn build_model(
    config: &ViewerConfig,
    style: &dyn StyleLookup,
    inputs: ModelInputs,
) -> Result<RequestModel, ViewerError> {
    let name = config
        .scene_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ViewerError::Configuration("'sceneName' must be set".to_string()))?;

    let size = request_size(inputs.size, config.domain_transform.as_ref());

    let transform_matrix = config.transform.as_ref().map(|t| {
        inputs
            .interactor_matrix
            .unwrap_or_else(|| initial_transform(t))
            .to_array()
    });

    let stream_properties = config.streams().then(|| StreamProperties {
        stream_chunk_size_first: config.stream.chunk_size_first,
        stream_chunk_size: config.stream.chunk_size,
        chunk_id: inputs.chunk_id,
    });

    Ok(RequestModel {
        scene_properties: SceneProperties {
            name: name.to_string(),
            user_properties: config.scene_user_properties.clone(),
        },
        renderer_properties: RendererProperties {
            width: size.width,
            height: size.height,
            renderer: config.renderer,
            transform_matrix,
            theme_name: config.theme_name.clone(),
            css_properties: resolve_theme(style),
            stream_properties,
            pick_properties: inputs.pick,
        },
    })
}
