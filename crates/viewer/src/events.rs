use scene::SelectionSet;
use serde::{Deserialize, Serialize};
use streaming::{PickRegion, PickType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Start,
    Track,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerDetail {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetail {
    pub state: TrackState,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Selection resolved on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSelection {
    pub mode: PickType,
    #[serde(flatten)]
    pub region: PickRegion,
    pub selected: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionDetail {
    Local(LocalSelection),
    /// Passed through verbatim from the server's `selectionInfo`.
    Server(serde_json::Value),
}

/// Events delivered to the host page, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum ViewerEvent {
    SelectionInfo(SelectionDetail),
    SceneInfo(serde_json::Value),
    Tap(PointerDetail),
    Track(TrackDetail),
    Hover(PointerDetail),
    PointerTimeout,
    LoadComplete,
    Error { message: String },
    InfoResponse(serde_json::Value),
    DataResponse(serde_json::Value),
    HtmlResponse { html: String },
}

impl ViewerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::SelectionInfo(_) => "selection-info",
            ViewerEvent::SceneInfo(_) => "scene-info",
            ViewerEvent::Tap(_) => "tap",
            ViewerEvent::Track(_) => "track",
            ViewerEvent::Hover(_) => "hover",
            ViewerEvent::PointerTimeout => "pointer-timeout",
            ViewerEvent::LoadComplete => "load-complete",
            ViewerEvent::Error { .. } => "error",
            ViewerEvent::InfoResponse(_) => "info-response",
            ViewerEvent::DataResponse(_) => "data-response",
            ViewerEvent::HtmlResponse { .. } => "html-response",
        }
    }
}
