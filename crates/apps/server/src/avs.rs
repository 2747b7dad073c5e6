//! Wire-protocol handling: one JSON envelope in, one JSON response out.
//!
//! Failures never become HTTP errors. They are reported in the body as a
//! form-encoded `error` object with a `GoType` severity, which is what the
//! viewer expects.

use std::collections::BTreeMap;

use base64::Engine as _;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use streaming::{
    url_encode, DataRequestModel, HtmlRequestModel, InfoModel, RendererType, RequestModel,
    WireRequest, SOURCE_DATAVIZ, SOURCE_DATA_REQUEST, SOURCE_HTML_REQUEST, SOURCE_INFO,
    WIRE_VERSION,
};
use tracing::{debug, warn};

use crate::scenes::{Bar, DemoScene, SceneCatalog};

const DEFAULT_CHUNK_SIZE: usize = 16;
const DEFAULT_HIGHLIGHT: &str = "#ffff00";
const MAX_STORED_IMAGES: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum AvsError {
    Malformed(String),
    UnknownSource(String),
    UnknownScene(String),
    UnknownInfo(String),
}

impl std::fmt::Display for AvsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvsError::Malformed(msg) => write!(f, "malformed request: {msg}"),
            AvsError::UnknownSource(source) => write!(f, "unsupported request source '{source}'"),
            AvsError::UnknownScene(name) => write!(f, "no scene named '{name}'"),
            AvsError::UnknownInfo(name) => write!(f, "no info named '{name}'"),
        }
    }
}

impl std::error::Error for AvsError {}

impl AvsError {
    /// 1 is a warning, 2 an error.
    fn go_type(&self) -> i64 {
        match self {
            AvsError::UnknownInfo(_) => 1,
            _ => 2,
        }
    }

    pub fn to_payload(&self) -> Value {
        let detail = json!({
            "GoType": self.go_type(),
            "Message": self.to_string(),
        });
        json!({ "error": url_encode(&detail.to_string()) })
    }
}

/// Rendered images served back under `/images/{name}` for `IMAGEURL`.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: RwLock<BTreeMap<String, String>>,
}

impl ImageStore {
    pub fn put(&self, name: String, svg: String) {
        let mut images = self.images.write();
        if images.len() >= MAX_STORED_IMAGES && !images.contains_key(&name) {
            images.clear();
        }
        images.insert(name, svg);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.images.read().get(name).cloned()
    }
}

pub fn respond(catalog: &SceneCatalog, images: &ImageStore, body: Value) -> Value {
    match dispatch(catalog, images, body) {
        Ok(v) => v,
        Err(err) => {
            warn!("request failed: {err}");
            err.to_payload()
        }
    }
}

fn parse<M: DeserializeOwned>(value: Value) -> Result<M, AvsError> {
    serde_json::from_value(value).map_err(|e| AvsError::Malformed(e.to_string()))
}

fn dispatch(catalog: &SceneCatalog, images: &ImageStore, body: Value) -> Result<Value, AvsError> {
    let envelope: WireRequest<Value> = parse(body)?;
    if envelope.version[0] != WIRE_VERSION[0] {
        warn!(
            "client wire version {:?} differs from {:?}",
            envelope.version, WIRE_VERSION
        );
    }
    match envelope.source.as_str() {
        SOURCE_DATAVIZ => scene_response(catalog, images, parse(envelope.model)?),
        SOURCE_INFO => info_response(catalog, parse(envelope.model)?),
        SOURCE_DATA_REQUEST => {
            let model: DataRequestModel = parse(envelope.model)?;
            let scene = lookup(catalog, &model.data_request_request.name)?;
            Ok(json!({ "data": scene.data() }))
        }
        SOURCE_HTML_REQUEST => {
            let model: HtmlRequestModel = parse(envelope.model)?;
            let scene = lookup(catalog, &model.html_request.name)?;
            Ok(json!({ "html": url_encode(&scene.legend_html()) }))
        }
        other => Err(AvsError::UnknownSource(other.to_string())),
    }
}

fn lookup<'a>(catalog: &'a SceneCatalog, name: &str) -> Result<&'a DemoScene, AvsError> {
    catalog
        .get(name)
        .ok_or_else(|| AvsError::UnknownScene(name.to_string()))
}

fn info_response(catalog: &SceneCatalog, model: InfoModel) -> Result<Value, AvsError> {
    let name = model.info_properties.name.as_str();
    let info = match name {
        "version" => json!({
            "server": "avs-demo",
            "version": env!("CARGO_PKG_VERSION"),
            "wireVersion": WIRE_VERSION,
        }),
        "scenes" => json!({ "scenes": catalog.names() }),
        other => catalog
            .get(other)
            .map(DemoScene::scene_info)
            .ok_or_else(|| AvsError::UnknownInfo(other.to_string()))?,
    };
    Ok(json!({ "info": url_encode(&info.to_string()) }))
}

fn scene_response(
    catalog: &SceneCatalog,
    images: &ImageStore,
    model: RequestModel,
) -> Result<Value, AvsError> {
    let scene = lookup(catalog, &model.scene_properties.name)?;
    let props = &model.renderer_properties;
    let bars = scene.layout(props.width, props.height);
    let mut out = Map::new();

    let pick = props.pick_properties.as_ref();
    let hits: Vec<&Bar> = pick
        .map(|p| bars.iter().filter(|b| b.is_hit(&p.region)).collect())
        .unwrap_or_default();
    if let Some(p) = pick {
        debug!(
            "{} pick on '{}' hit {} bars",
            p.pick_type.as_str(),
            scene.name,
            hits.len()
        );
        if p.selection_info {
            out.insert("selectionInfo".into(), scene.selection_info(&hits));
        }
        let redraw = p.highlight && p.update_scene && props.renderer != RendererType::ThreeJs;
        if !redraw {
            return Ok(Value::Object(out));
        }
    } else {
        out.insert(
            "sceneInfo".into(),
            Value::String(url_encode(&scene.scene_info().to_string())),
        );
    }

    let highlight = pick.map(|p| {
        (
            &hits[..],
            p.highlight_color.as_deref().unwrap_or(DEFAULT_HIGHLIGHT),
        )
    });
    let render = || {
        scene.render_svg(
            &bars,
            props.width,
            props.height,
            &props.css_properties,
            highlight,
        )
    };

    match props.renderer {
        RendererType::Image => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(render());
            out.insert(
                "image".into(),
                Value::String(format!("data:image/svg+xml;base64,{encoded}")),
            );
            out.insert(
                "imagemap".into(),
                Value::String(url_encode(&scene.image_map(&bars).to_string())),
            );
        }
        RendererType::ImageUrl => {
            let name = format!(
                "{}-{}x{}{}.svg",
                scene.name,
                props.width,
                props.height,
                if highlight.is_some() { "-picked" } else { "" }
            );
            images.put(name.clone(), render());
            out.insert("image".into(), Value::String(format!("images/{name}")));
            out.insert(
                "imagemap".into(),
                Value::String(url_encode(&scene.image_map(&bars).to_string())),
            );
        }
        RendererType::Svg => {
            out.insert("svg".into(), Value::String(url_encode(&render())));
        }
        RendererType::ThreeJs => match &props.stream_properties {
            Some(stream) => {
                let start = stream
                    .chunk_id
                    .as_ref()
                    .and_then(Value::as_u64)
                    .map(|c| c as usize)
                    .unwrap_or(0)
                    .min(bars.len());
                let size = if stream.chunk_id.is_some() {
                    stream.stream_chunk_size.or(stream.stream_chunk_size_first)
                } else {
                    stream.stream_chunk_size_first.or(stream.stream_chunk_size)
                }
                .map(|s| s.max(1) as usize)
                .unwrap_or(DEFAULT_CHUNK_SIZE);
                let end = (start + size).min(bars.len());
                let payload = scene.scene_payload(&bars[start..end]);
                out.insert("nodes".into(), json!(payload.nodes));
                out.insert("chunkId".into(), json!(end));
                out.insert("moreChunks".into(), json!(end < bars.len()));
                debug!(
                    "streaming '{}' cells {start}..{end} of {}",
                    scene.name,
                    bars.len()
                );
            }
            None => {
                out.insert("threejs".into(), json!(scene.scene_payload(&bars)));
            }
        },
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use streaming::{decode_json_payload, ServerError, Severity};

    fn request(renderer: &str, extra: Value) -> Value {
        let mut props = json!({ "width": 400, "height": 300, "type": renderer });
        if let (Some(target), Value::Object(fields)) = (props.as_object_mut(), extra) {
            target.extend(fields);
        }
        json!({
            "source": SOURCE_DATAVIZ,
            "version": [1, 0, 0],
            "model": {
                "sceneProperties": { "name": "bars" },
                "rendererProperties": props,
            },
        })
    }

    fn run(body: Value) -> Value {
        respond(&SceneCatalog::builtin(), &ImageStore::default(), body)
    }

    #[test]
    fn image_response_inlines_svg_and_map() {
        let out = run(request("IMAGE", json!({})));
        let image = out["image"].as_str().expect("image");
        assert!(image.starts_with("data:image/svg+xml;base64,"));
        let map = decode_json_payload(&out["imagemap"]).expect("imagemap");
        assert_eq!(map.as_array().map(Vec::len), Some(8));
        assert_eq!(map[0]["shape"], json!("rect"));
        let info = decode_json_payload(&out["sceneInfo"]).expect("scene info");
        assert_eq!(info["seriesCount"], json!(2));
    }

    #[test]
    fn image_url_is_stored_for_later_fetch() {
        let store = ImageStore::default();
        let out = respond(&SceneCatalog::builtin(), &store, request("IMAGEURL", json!({})));
        assert_eq!(out["image"], json!("images/bars-400x300.svg"));
        assert!(store
            .get("bars-400x300.svg")
            .is_some_and(|svg| svg.starts_with("<svg")));
    }

    #[test]
    fn unknown_scene_is_an_error_payload() {
        let mut body = request("SVG", json!({}));
        body["model"]["sceneProperties"]["name"] = json!("missing");
        let out = run(body);
        let err = ServerError::decode(&out["error"]);
        assert_eq!(err.severity, Severity::Error);
        assert!(err.message.contains("no scene named 'missing'"));
    }

    #[test]
    fn stream_walks_chunks_by_offset() {
        let first = run(request(
            "THREEJS",
            json!({ "streamProperties": { "streamChunkSizeFirst": 5, "streamChunkSize": 2 } }),
        ));
        assert_eq!(first["chunkId"], json!(5));
        assert_eq!(first["moreChunks"], json!(true));

        let next = run(request(
            "THREEJS",
            json!({ "streamProperties": { "streamChunkSizeFirst": 5, "streamChunkSize": 2, "chunkId": 5 } }),
        ));
        assert_eq!(next["chunkId"], json!(7));
        let last = run(request(
            "THREEJS",
            json!({ "streamProperties": { "streamChunkSize": 2, "chunkId": 7 } }),
        ));
        assert_eq!(last["chunkId"], json!(8));
        assert_eq!(last["moreChunks"], json!(false));
    }

    #[test]
    fn pick_returns_selection_and_highlighted_svg() {
        let pick = json!({
            "pickProperties": {
                "type": "TRACK",
                "left": 0, "right": 400, "top": 0, "bottom": 300,
                "level": "CELL", "depth": "ALL",
                "highlight": true, "highlightColor": "red", "highlightLayer": false,
                "selectionInfo": true, "updateScene": true,
            }
        });
        let out = run(request("SVG", pick));
        assert_eq!(
            out["selectionInfo"]["selected"].as_array().map(Vec::len),
            Some(8)
        );
        let svg = streaming::url_decode(out["svg"].as_str().expect("svg")).expect("decode");
        assert_eq!(svg.matches("fill=\"red\"").count(), 8);
        assert!(out.get("sceneInfo").is_none());
    }

    #[test]
    fn auxiliary_sources() {
        let info = run(json!({
            "source": SOURCE_INFO,
            "version": [1, 0, 0],
            "model": { "infoProperties": { "name": "scenes" } },
        }));
        assert_eq!(
            decode_json_payload(&info["info"]).expect("info"),
            json!({ "scenes": ["bars", "dense"] })
        );

        let data = run(json!({
            "source": SOURCE_DATA_REQUEST,
            "version": [1, 0, 0],
            "model": { "dataRequestRequest": { "name": "bars" } },
        }));
        assert_eq!(data["data"]["series"]["north"], json!([12.0, 19.0, 7.0, 15.0]));

        let unknown = run(json!({ "source": "nope", "version": [1, 0, 0], "model": {} }));
        assert!(ServerError::decode(&unknown["error"])
            .message
            .contains("unsupported request source"));
    }
}
