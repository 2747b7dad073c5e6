//! Client-side image map for the image renderers.
//!
//! The server describes clickable regions in an `imagemap` field next to the
//! image: a (usually URL-encoded) JSON array of areas. Taps and hovers are
//! resolved against every area; all matching areas are reported in document
//! order.

use foundation::bounds::PixelPoint;
use foundation::math::Vec2;
use foundation::polygon::{Containment, point_in_polygon, polygon_from_flat};
use scene::{SelectedObject, SelectionSet};
use serde::{Deserialize, Serialize};
use streaming::{DecodeError, decode_json_payload};

fn default_shape() -> String {
    "poly".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMapEntry {
    #[serde(default = "default_shape")]
    pub shape: String,
    pub coords: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_info: Option<String>,
}

impl ImageMapEntry {
    /// Classifies `p` against this area. Unknown shapes never match.
    pub fn classify(&self, p: Vec2) -> Containment {
        match self.shape.to_ascii_lowercase().as_str() {
            "poly" | "polygon" => point_in_polygon(p, &polygon_from_flat(&self.coords)),
            "rect" | "rectangle" => match self.coords.as_slice() {
                &[x0, y0, x1, y1, ..] => {
                    let rect = [
                        Vec2::new(x0, y0),
                        Vec2::new(x1, y0),
                        Vec2::new(x1, y1),
                        Vec2::new(x0, y1),
                    ];
                    point_in_polygon(p, &rect)
                }
                _ => Containment::Outside,
            },
            "circle" => match self.coords.as_slice() {
                &[cx, cy, r, ..] => {
                    let d = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
                    if d < r {
                        Containment::Inside
                    } else if d == r {
                        Containment::Boundary
                    } else {
                        Containment::Outside
                    }
                }
                _ => Containment::Outside,
            },
            _ => Containment::Outside,
        }
    }

    fn to_selected(&self) -> SelectedObject {
        SelectedObject {
            series_index: self.series_index,
            item_index: self.item_index,
            component_info: self.component_info.clone(),
            ..SelectedObject::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMap {
    entries: Vec<ImageMapEntry>,
}

impl ImageMap {
    /// Accepts a URL-encoded JSON string or an already structured array.
    pub fn parse(value: &serde_json::Value) -> Result<Self, DecodeError> {
        let decoded = decode_json_payload(value)?;
        let entries: Vec<ImageMapEntry> =
            serde_json::from_value(decoded).map_err(|e| DecodeError::Json(e.to_string()))?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ImageMapEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_test(&self, point: PixelPoint) -> SelectionSet {
        let p = Vec2::new(point.x as f64, point.y as f64);
        self.entries
            .iter()
            .filter(|e| e.classify(p).is_hit())
            .map(ImageMapEntry::to_selected)
            .collect()
    }
}
