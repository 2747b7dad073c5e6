use foundation::bounds::PixelSize;

/// Inclusive size band around the last server-requested size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeBand {
    pub low_width: f64,
    pub high_width: f64,
    pub low_height: f64,
    pub high_height: f64,
}

impl ResizeBand {
    pub fn around(size: PixelSize, threshold_pct: f64) -> Self {
        let lo = (100.0 - threshold_pct) / 100.0;
        let hi = (100.0 + threshold_pct) / 100.0;
        Self {
            low_width: lo * size.width as f64,
            high_width: hi * size.width as f64,
            low_height: lo * size.height as f64,
            high_height: hi * size.height as f64,
        }
    }

    pub fn contains(&self, size: PixelSize) -> bool {
        let (w, h) = (size.width as f64, size.height as f64);
        w >= self.low_width && w <= self.high_width && h >= self.low_height && h <= self.high_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    /// Re-request the scene at the new size.
    Request,
    /// Re-layout locally (overlay layers, 3D re-render).
    Local,
}

#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    band: Option<ResizeBand>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn band(&self) -> Option<ResizeBand> {
        self.band
    }

    /// Called whenever a full scene request goes out.
    pub fn record_request(&mut self, size: PixelSize, threshold_pct: f64) {
        self.band = Some(ResizeBand::around(size, threshold_pct));
    }

    pub fn decide(&self, size: PixelSize, threshold_pct: f64, manual_update: bool) -> ResizeAction {
        if threshold_pct <= 0.0 || manual_update {
            return ResizeAction::Local;
        }
        match self.band {
            Some(band) if band.contains(size) => ResizeAction::Local,
            _ => ResizeAction::Request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_changes_stay_local() {
        let mut c = ResizeController::new();
        c.record_request(PixelSize::new(400, 300), 10.0);
        assert_eq!(c.decide(PixelSize::new(405, 300), 10.0, false), ResizeAction::Local);
        assert_eq!(c.decide(PixelSize::new(440, 330), 10.0, false), ResizeAction::Local);
        assert_eq!(c.decide(PixelSize::new(300, 300), 10.0, false), ResizeAction::Request);
        assert_eq!(c.decide(PixelSize::new(400, 331), 10.0, false), ResizeAction::Request);
    }

    #[test]
    fn disabled_threshold_or_manual_never_requests() {
        let c = ResizeController::new();
        assert_eq!(c.decide(PixelSize::new(10, 10), 0.0, false), ResizeAction::Local);
        assert_eq!(c.decide(PixelSize::new(10, 10), 10.0, true), ResizeAction::Local);
        assert_eq!(c.decide(PixelSize::new(10, 10), 10.0, false), ResizeAction::Request);
    }
}
