/// Pixel-space geometry for pointer handling.
///
/// Coordinates are integer pixels relative to the viewer's top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamps a point into `[0, width] x [0, height]`.
    pub fn clamp(&self, p: PixelPoint) -> PixelPoint {
        PixelPoint {
            x: p.x.clamp(0, self.width as i32),
            y: p.y.clamp(0, self.height as i32),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds client-space coordinates relative to `origin` (the viewer's bounding box corner).
    pub fn from_client(client_x: f64, client_y: f64, origin_x: f64, origin_y: f64) -> Self {
        Self {
            x: (client_x - origin_x).round() as i32,
            y: (client_y - origin_y).round() as i32,
        }
    }
}

/// Axis-aligned pixel rectangle. Invariant: `left <= right` and `top <= bottom`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    /// Builds a normalized rectangle from two opposite corners in any order.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self {
            left: a.x.min(b.x),
            right: a.x.max(b.x),
            top: a.y.min(b.y),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Axis-aligned box in floating-point screen space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }

    pub fn intersects_rect(&self, rect: &PixelRect) -> bool {
        self.min[0] <= rect.right as f64
            && rect.left as f64 <= self.max[0]
            && self.min[1] <= rect.bottom as f64
            && rect.top as f64 <= self.max[1]
    }
}
