use foundation::bounds::{PixelRect, PixelSize};

/// Bounding box of the widget's display area in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Display side of the widget: the image element, SVG container, loading
/// indicator and rubber-band overlay.
pub trait Surface {
    fn measure(&self) -> SurfaceRect;
    fn set_image(&mut self, src: &str);
    fn set_svg(&mut self, markup: &str);
    /// Removes image, SVG and overlay content.
    fn clear(&mut self);
    fn set_loading(&mut self, loading: bool);
    /// Resizes overlay layers to match the display area.
    fn resize_layers(&mut self, size: PixelSize);
    fn draw_selection_rect(&mut self, rect: Option<PixelRect>);
}

/// Recording surface for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub rect: SurfaceRect,
    pub image: Option<String>,
    pub svg: Option<String>,
    pub loading: bool,
    pub layer_size: Option<PixelSize>,
    pub selection_rect: Option<PixelRect>,
    pub clears: u32,
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            rect: SurfaceRect {
                left: 0.0,
                top: 0.0,
                width,
                height,
            },
            ..Self::default()
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.rect.width = width;
        self.rect.height = height;
    }
}

impl Surface for HeadlessSurface {
    fn measure(&self) -> SurfaceRect {
        self.rect
    }

    fn set_image(&mut self, src: &str) {
        self.svg = None;
        self.image = Some(src.to_string());
    }

    fn set_svg(&mut self, markup: &str) {
        self.image = None;
        self.svg = Some(markup.to_string());
    }

    fn clear(&mut self) {
        self.image = None;
        self.svg = None;
        self.selection_rect = None;
        self.clears += 1;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn resize_layers(&mut self, size: PixelSize) {
        self.layer_size = Some(size);
    }

    fn draw_selection_rect(&mut self, rect: Option<PixelRect>) {
        self.selection_rect = rect;
    }
}
