#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;

use scene::MemoryScene;
use serde_json::json;
use streaming::{HttpRequest, Transport, TransportError};
use viewer::{HeadlessSurface, MemorySvg, StaticStyle, ViewerConfig, ViewerWidget};

pub type TestWidget = ViewerWidget<HeadlessSurface, MemorySvg, MemoryScene>;

pub const URL: &str = "http://localhost:8080/avs";

pub fn widget(config: ViewerConfig, width: f64, height: f64) -> TestWidget {
    ViewerWidget::new(
        config,
        HeadlessSurface::new(width, height),
        MemorySvg::new(),
        Box::new(StaticStyle::new().with_computed("color", "rgb(10, 20, 30)")),
        Box::new(MemoryScene::new),
    )
}

pub fn config(renderer: &str) -> ViewerConfig {
    serde_json::from_value(json!({
        "url": URL,
        "sceneName": "demo",
        "renderer": renderer,
    }))
    .expect("config")
}

/// Two bars of one series, in viewer pixels.
pub fn bar_scene() -> serde_json::Value {
    json!({
        "nodes": [{
            "name": "bars",
            "cellSets": [{
                "name": "series-0",
                "seriesIndex": 0,
                "cells": [
                    { "itemIndex": 0, "bounds": [10, 10, 40, 100], "depth": 1.0 },
                    { "itemIndex": 1, "bounds": [50, 10, 80, 100], "depth": 1.0 }
                ]
            }]
        }]
    })
}

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<serde_json::Value, TransportError>>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<serde_json::Value, TransportError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TransportError>> {
        self.sent.borrow_mut().push(request.clone());
        let next = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(TransportError::EmptyBody));
        std::future::ready(next)
    }
}
