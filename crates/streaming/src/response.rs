//! Scene response classification.

use serde::Deserialize;

use crate::encoding::DecodeError;

/// Known keys of a server response. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneResponse {
    #[serde(default)]
    pub selection_info: Option<serde_json::Value>,
    #[serde(default)]
    pub scene_info: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub imagemap: Option<serde_json::Value>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub threejs: Option<serde_json::Value>,
    #[serde(default)]
    pub chunk_id: Option<serde_json::Value>,
    #[serde(default)]
    pub more_chunks: Option<bool>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub info: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub html: Option<serde_json::Value>,
    #[serde(skip)]
    raw: serde_json::Value,
}

/// The display payload of a response; exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseKind<'a> {
    Image {
        src: &'a str,
        imagemap: Option<&'a serde_json::Value>,
    },
    Svg(&'a str),
    Scene(&'a serde_json::Value),
    Chunk {
        chunk_id: &'a serde_json::Value,
        more: bool,
    },
    Unclassified,
}

impl SceneResponse {
    /// Non-object bodies decode to an empty response that still carries the
    /// raw payload, which file-load mode treats as a scene.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let mut response = if value.is_object() {
            Self::deserialize(&value).map_err(|e| DecodeError::Json(e.to_string()))?
        } else {
            Self::default()
        };
        response.raw = value;
        Ok(response)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// `error` key present (even when null).
    pub fn has_error(&self) -> bool {
        self.raw
            .as_object()
            .is_some_and(|fields| fields.contains_key("error"))
    }

    pub fn kind(&self) -> ResponseKind<'_> {
        if let Some(src) = self.image.as_deref() {
            ResponseKind::Image {
                src,
                imagemap: self.imagemap.as_ref(),
            }
        } else if let Some(svg) = self.svg.as_deref() {
            ResponseKind::Svg(svg)
        } else if let Some(scene) = self.threejs.as_ref() {
            ResponseKind::Scene(scene)
        } else if let Some(chunk_id) = self.chunk_id.as_ref() {
            ResponseKind::Chunk {
                chunk_id,
                more: self.more_chunks == Some(true),
            }
        } else {
            ResponseKind::Unclassified
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn image_wins_over_later_keys() {
        let r = SceneResponse::from_value(json!({
            "image": "data:image/png;base64,AAAA",
            "svg": "%3Csvg%3E",
            "unknownKey": 1
        }))
        .expect("decode");
        assert_eq!(
            r.kind(),
            ResponseKind::Image {
                src: "data:image/png;base64,AAAA",
                imagemap: None
            }
        );
    }

    #[test]
    fn chunk_more_flag_requires_true() {
        let r = SceneResponse::from_value(json!({"chunkId": "c7", "moreChunks": "yes"}));
        assert!(r.is_err());

        let r = SceneResponse::from_value(json!({"chunkId": "c7"})).expect("decode");
        assert_eq!(
            r.kind(),
            ResponseKind::Chunk {
                chunk_id: &json!("c7"),
                more: false
            }
        );
    }

    #[test]
    fn arrays_are_unclassified_but_kept() {
        let r = SceneResponse::from_value(json!([1, 2])).expect("decode");
        assert_eq!(r.kind(), ResponseKind::Unclassified);
        assert_eq!(r.raw(), &json!([1, 2]));
        assert!(!r.has_error());
    }

    #[test]
    fn null_error_still_counts_as_error() {
        let r = SceneResponse::from_value(json!({"error": null})).expect("decode");
        assert!(r.has_error());
    }
}
