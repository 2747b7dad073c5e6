//! Gesture coordinate handling and pick routing.

use foundation::bounds::{PixelPoint, PixelRect, PixelSize};
use streaming::{PickRegion, PickType, RendererType};

use crate::config::{GestureConfig, TrackFallback, ViewerConfig};
use crate::surface::SurfaceRect;

/// Where a gesture's pick is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickRoute {
    /// Send a request carrying `pickProperties`.
    Server,
    /// Query the retained 3D scene graph.
    Scene,
    /// Hit-test the SVG document.
    Svg,
    /// Point-in-polygon against the image map.
    ImageMap,
    /// Report an empty local selection.
    EmptyLocal,
}

pub fn route_pick(config: &ViewerConfig, gesture: &GestureConfig, pick_type: PickType) -> PickRoute {
    if !gesture.picks_on_client(config.renderer) {
        return PickRoute::Server;
    }
    let fallback = |policy: TrackFallback| match policy {
        TrackFallback::EmptyLocal => PickRoute::EmptyLocal,
        TrackFallback::ForceServer => PickRoute::Server,
    };
    match (config.renderer, pick_type) {
        (RendererType::ThreeJs, _) => PickRoute::Scene,
        (RendererType::Svg, PickType::Track) => fallback(config.track_policy.svg),
        (RendererType::Svg, _) => PickRoute::Svg,
        (_, PickType::Track) => fallback(config.track_policy.image_map),
        (_, _) => PickRoute::ImageMap,
    }
}

/// Client coordinates to a clamped widget-relative point.
pub fn local_point(origin: SurfaceRect, size: PixelSize, client_x: f64, client_y: f64) -> PixelPoint {
    size.clamp(PixelPoint::from_client(
        client_x, client_y, origin.left, origin.top,
    ))
}

/// Drag rectangle from the current pointer position and the accumulated
/// drag delta. Both corners are clamped; the result is normalized.
pub fn track_rect(
    origin: SurfaceRect,
    size: PixelSize,
    client_x: f64,
    client_y: f64,
    dx: f64,
    dy: f64,
) -> PixelRect {
    let current = local_point(origin, size, client_x, client_y);
    let start = local_point(origin, size, client_x - dx, client_y - dy);
    PixelRect::from_corners(start, current)
}

pub fn point_region(p: PixelPoint) -> PickRegion {
    PickRegion::Point { x: p.x, y: p.y }
}

pub fn rect_region(r: PixelRect) -> PickRegion {
    PickRegion::Rect {
        left: r.left,
        right: r.right,
        top: r.top,
        bottom: r.bottom,
    }
}
