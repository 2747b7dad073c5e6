//! Async driver connecting widgets and components to a transport.

use scene::SceneGraph;
use streaming::Transport;
use tracing::debug;

use crate::components::Component;
use crate::events::ViewerEvent;
use crate::surface::Surface;
use crate::svg::SvgDom;
use crate::widget::{PendingRequest, ViewerWidget};

pub struct Session<T: Transport> {
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `first` and every follow-up request the widget asks for
    /// (stream continuations) until the exchange settles.
    ///
    /// Returns the number of round trips made.
    pub async fn drive<S, D, G>(
        &self,
        widget: &mut ViewerWidget<S, D, G>,
        first: Option<PendingRequest>,
    ) -> usize
    where
        S: Surface,
        D: SvgDom,
        G: SceneGraph,
    {
        let mut next = first;
        let mut trips = 0;
        while let Some(pending) = next {
            let result = self.transport.send(&pending.request).await;
            trips += 1;
            debug!(token = pending.token.0, ok = result.is_ok(), "round trip finished");
            next = widget.handle_response(pending.token, result);
        }
        trips
    }

    pub async fn run_component<C: Component>(&self, component: &C) -> Option<ViewerEvent> {
        let request = match component.request() {
            Ok(r) => r,
            Err(err) => {
                return Some(ViewerEvent::Error {
                    message: err.to_string(),
                });
            }
        };
        let result = self.transport.send(&request).await;
        component.handle_response(result)
    }
}
