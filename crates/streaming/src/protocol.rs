//! Wire types exchanged with the visualization server.
//!
//! Every request is a POST of `{source, model, version}` where `model` is a
//! component-specific object. The scene viewer's model is [`RequestModel`];
//! the info/data/html components carry their own small models. All field
//! names are camelCase on the wire.

use std::collections::BTreeMap;

use scene::{PickDepth, PickLevel};
use serde::{Deserialize, Serialize};

/// Protocol triple sent with every request.
pub const WIRE_VERSION: [u32; 3] = [1, 0, 0];

pub const SOURCE_DATAVIZ: &str = "avs-go-dataviz";
pub const SOURCE_INFO: &str = "avs-go-info";
pub const SOURCE_DATA_REQUEST: &str = "avs-data-request";
pub const SOURCE_HTML_REQUEST: &str = "avs-html-request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RendererType {
    #[default]
    Image,
    #[serde(rename = "IMAGEURL")]
    ImageUrl,
    Svg,
    #[serde(rename = "THREEJS")]
    ThreeJs,
}

impl RendererType {
    pub fn as_str(self) -> &'static str {
        match self {
            RendererType::Image => "IMAGE",
            RendererType::ImageUrl => "IMAGEURL",
            RendererType::Svg => "SVG",
            RendererType::ThreeJs => "THREEJS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PickType {
    Tap,
    Track,
    Hover,
}

impl PickType {
    pub fn as_str(self) -> &'static str {
        match self {
            PickType::Tap => "TAP",
            PickType::Track => "TRACK",
            PickType::Hover => "HOVER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_properties: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_chunk_size_first: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_chunk_size: Option<u32>,
    /// Present only on continuation requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<serde_json::Value>,
}

/// Pick location: a point for TAP/HOVER, a rectangle for TRACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PickRegion {
    Point {
        x: i32,
        y: i32,
    },
    Rect {
        left: i32,
        right: i32,
        top: i32,
        bottom: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickProperties {
    #[serde(rename = "type")]
    pub pick_type: PickType,
    #[serde(flatten)]
    pub region: PickRegion,
    pub level: PickLevel,
    pub depth: PickDepth,
    pub highlight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    pub highlight_layer: bool,
    pub selection_info: bool,
    pub update_scene: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererProperties {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type")]
    pub renderer: RendererType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_matrix: Option<[f64; 16]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub css_properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_properties: Option<StreamProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick_properties: Option<PickProperties>,
}

/// Scene viewer request model. Built fresh for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestModel {
    pub scene_properties: SceneProperties,
    pub renderer_properties: RendererProperties,
}

/// `{name, userProperties}` pair shared by the auxiliary components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_properties: Option<serde_json::Value>,
}

impl NamedProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_properties: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoModel {
    pub info_properties: NamedProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_properties: Option<NamedProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequestModel {
    pub data_request_request: NamedProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_request: Option<NamedProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlRequestModel {
    pub html_request: NamedProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_request: Option<NamedProperties>,
}

/// Envelope posted to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest<M> {
    pub source: String,
    pub model: M,
    pub version: [u32; 3],
}

impl<M: Serialize> WireRequest<M> {
    pub fn new(source: impl Into<String>, model: M) -> Self {
        Self {
            source: source.into(),
            model,
            version: WIRE_VERSION,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tap_model() -> RequestModel {
        RequestModel {
            scene_properties: SceneProperties {
                name: "demo".into(),
                user_properties: None,
            },
            renderer_properties: RendererProperties {
                width: 400,
                height: 300,
                renderer: RendererType::Image,
                transform_matrix: None,
                theme_name: Some("default".into()),
                css_properties: BTreeMap::new(),
                stream_properties: None,
                pick_properties: Some(PickProperties {
                    pick_type: PickType::Tap,
                    region: PickRegion::Point { x: 50, y: 60 },
                    level: PickLevel::Cell,
                    depth: PickDepth::Closest,
                    highlight: false,
                    highlight_color: None,
                    highlight_layer: false,
                    selection_info: true,
                    update_scene: true,
                }),
            },
        }
    }

    #[test]
    fn tap_request_flattens_point_into_pick_properties() {
        let wire = WireRequest::new(SOURCE_DATAVIZ, tap_model())
            .to_value()
            .expect("serialize");
        assert_eq!(wire["source"], json!("avs-go-dataviz"));
        assert_eq!(wire["version"], json!([1, 0, 0]));
        let pick = &wire["model"]["rendererProperties"]["pickProperties"];
        assert_eq!(pick["type"], json!("TAP"));
        assert_eq!(pick["x"], json!(50));
        assert_eq!(pick["y"], json!(60));
        assert_eq!(pick["level"], json!("CELL"));
        assert!(pick.get("left").is_none());
        assert!(
            wire["model"]["rendererProperties"]
                .get("streamProperties")
                .is_none()
        );
    }

    #[test]
    fn track_region_reads_back_as_rect() {
        let pick: PickProperties = serde_json::from_value(json!({
            "type": "TRACK",
            "left": 1, "right": 9, "top": 2, "bottom": 8,
            "level": "CELL_SET", "depth": "ALL",
            "highlight": true, "highlightLayer": false,
            "selectionInfo": true, "updateScene": false
        }))
        .expect("parse");
        assert_eq!(
            pick.region,
            PickRegion::Rect {
                left: 1,
                right: 9,
                top: 2,
                bottom: 8
            }
        );
        assert_eq!(pick.pick_type, PickType::Track);
    }

    #[test]
    fn renderer_names_match_wire() {
        for r in [
            RendererType::Image,
            RendererType::ImageUrl,
            RendererType::Svg,
            RendererType::ThreeJs,
        ] {
            assert_eq!(serde_json::to_value(r).expect("ser"), json!(r.as_str()));
        }
    }
}
