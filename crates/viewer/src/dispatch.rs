//! Response dispatch for [`ViewerWidget`].

use runtime::{Completion, RequestToken};
use scene::SceneGraph;
use streaming::{
    Continuation, ResponseKind, SceneResponse, ServerError, TransportError, decode_json_payload,
    url_decode,
};
use tracing::debug;

use crate::error::ViewerError;
use crate::events::{SelectionDetail, ViewerEvent};
use crate::imagemap::ImageMap;
use crate::surface::Surface;
use crate::svg::SvgDom;
use crate::widget::{PendingRequest, RequestKind, ViewerWidget};

impl<S, D, G> ViewerWidget<S, D, G>
where
    S: Surface,
    D: SvgDom,
    G: SceneGraph,
{
    /// Applies the outcome of a request previously returned by the widget.
    ///
    /// Responses to superseded tokens are dropped without touching any
    /// state. A follow-up request is returned only when a stream has more
    /// chunks.
    pub fn handle_response(
        &mut self,
        token: RequestToken,
        result: Result<serde_json::Value, TransportError>,
    ) -> Option<PendingRequest> {
        if self.tracker.complete(token) == Completion::Superseded {
            debug!(token = token.0, "discarding superseded response");
            return None;
        }

        let value = match result {
            Ok(v) => v,
            Err(err) => {
                self.fail(err.into());
                return None;
            }
        };
        let response = match SceneResponse::from_value(value) {
            Ok(r) => r,
            Err(err) => {
                self.fail(err.into());
                return None;
            }
        };

        if response.has_error() {
            let err = ServerError::decode(&response.error.clone().unwrap_or_default());
            err.log();
            self.fail(err.into());
            return None;
        }

        if let Some(info) = response.selection_info.clone() {
            self.events
                .emit(ViewerEvent::SelectionInfo(SelectionDetail::Server(info)));
        }

        if let Some(info) = response.scene_info.as_ref() {
            match decode_json_payload(info) {
                Ok(v) => self.events.emit(ViewerEvent::SceneInfo(v)),
                Err(err) => self.report(err.into()),
            }
        }

        let next = match response.kind() {
            ResponseKind::Image { src, imagemap } => {
                let src = self.resolve_image_url(src);
                self.svg_highlight.forget();
                self.surface.set_image(&src);
                self.image_map = match imagemap.map(ImageMap::parse) {
                    Some(Ok(map)) => map,
                    Some(Err(err)) => {
                        self.report(err.into());
                        ImageMap::default()
                    }
                    None => ImageMap::default(),
                };
                None
            }
            ResponseKind::Svg(markup) => {
                match url_decode(markup) {
                    Ok(text) => {
                        self.svg_highlight.forget();
                        self.surface.set_svg(&text);
                    }
                    Err(err) => self.report(err.into()),
                }
                None
            }
            ResponseKind::Scene(payload) => {
                self.chunks.reset();
                self.replace_scene(payload);
                None
            }
            ResponseKind::Chunk { chunk_id, more } => self.merge_chunk(response.raw(), chunk_id, more),
            ResponseKind::Unclassified => {
                if self.config.is_file_mode() {
                    self.replace_scene(response.raw());
                }
                None
            }
        };

        let next = match next {
            Some(pending) => Some(pending),
            None if self.chunks.is_pending() => {
                debug!("resuming interrupted stream");
                self.continue_stream(self.chunks.resume())
            }
            None => None,
        };

        match next {
            Some(pending) => Some(pending),
            None => {
                self.surface.set_loading(false);
                self.events.emit(ViewerEvent::LoadComplete);
                None
            }
        }
    }

    fn scene_graph(&mut self) -> &mut G {
        self.scene.get_or_insert_with(|| (self.scene_factory)())
    }

    fn replace_scene(&mut self, payload: &serde_json::Value) {
        let size = self.size;
        let scene = self.scene_graph();
        let loaded = scene.load_scene(payload);
        scene.resize(size);
        scene.render();
        if let Err(err) = loaded {
            self.report(ViewerError::from(err));
        }
    }

    fn merge_chunk(
        &mut self,
        payload: &serde_json::Value,
        chunk_id: &serde_json::Value,
        more: bool,
    ) -> Option<PendingRequest> {
        let scene = self.scene_graph();
        let merged = scene.merge_chunk(payload);
        scene.render();
        if let Err(err) = merged {
            self.report(ViewerError::from(err));
        }

        let continuation = self.chunks.advance(chunk_id, more);
        self.continue_stream(continuation)
    }

    fn continue_stream(&mut self, continuation: Continuation) -> Option<PendingRequest> {
        match continuation {
            Continuation::Model { chunk_id } => {
                debug!(chunk = %chunk_id, "requesting next chunk");
                self.issue(RequestKind::Continue(chunk_id))
            }
            Continuation::File { url } => {
                debug!(url = %url, "requesting next scene file");
                self.issue(RequestKind::File(url))
            }
            Continuation::Done => None,
        }
    }

    /// Relative image URLs are resolved against the request URL.
    fn resolve_image_url(&self, src: &str) -> String {
        if src.starts_with("data:") || url::Url::parse(src).is_ok() {
            return src.to_string();
        }
        let base = self
            .config
            .scene_url
            .as_deref()
            .or(self.config.url.as_deref());
        base.and_then(|b| url::Url::parse(b).ok())
            .and_then(|b| b.join(src).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| src.to_string())
    }
}
