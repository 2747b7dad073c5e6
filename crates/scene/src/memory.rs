//! Deterministic in-memory scene graph.
//!
//! `MemoryScene` implements [`SceneGraph`] without a GPU: cells carry
//! screen-space bounds and a depth, which is enough to exercise picking,
//! highlighting and chunked loading in headless hosts and tests. The payload
//! types double as the wire format the demo server emits for `THREEJS`
//! renderers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use foundation::bounds::{Aabb2, PixelPoint, PixelRect, PixelSize};
use foundation::math::{Mat4, TransformAngles};

use crate::graph::{HighlightStyle, InteractorOptions, SceneError, SceneGraph, TransformInteractor};
use crate::pick::{PickDepth, PickLevel};
use crate::picking::{PickCandidate, PickTarget, pick_candidates};
use crate::selection::{SelectedObject, SelectionSet};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePayload {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
    #[serde(default)]
    pub cell_sets: Vec<CellSetSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSetSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_index: Option<i64>,
    #[serde(default)]
    pub cells: Vec<CellSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<i64>,
    /// `[left, top, right, bottom]` in viewer pixels.
    pub bounds: [f64; 4],
    #[serde(default)]
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
}

impl ScenePayload {
    /// Accepts either a payload object or a JSON string containing one.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SceneError> {
        let parsed = match value {
            serde_json::Value::String(text) => serde_json::from_str(text),
            other => Self::deserialize(other),
        };
        parsed.map_err(|e| SceneError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone)]
struct NodeRecord {
    name: String,
    info: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct SetRecord {
    node: usize,
    name: String,
    series_index: Option<i64>,
}

#[derive(Debug, Clone)]
struct CellRecord {
    set: usize,
    item_index: Option<i64>,
    bounds: Aabb2,
    depth: f64,
    info: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<NodeRecord>,
    sets: Vec<SetRecord>,
    cells: Vec<CellRecord>,
    pick_depth: PickDepth,
    pick_target: Option<PickTarget>,
    highlighted: SelectionSet,
    highlight_style: Option<HighlightStyle>,
    size: PixelSize,
    render_count: u64,
    chunks_merged: u64,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn chunks_merged(&self) -> u64 {
        self.chunks_merged
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn pick_depth(&self) -> PickDepth {
        self.pick_depth
    }

    pub fn highlighted(&self) -> &SelectionSet {
        &self.highlighted
    }

    pub fn highlight_style(&self) -> Option<&HighlightStyle> {
        self.highlight_style.as_ref()
    }

    fn ingest(&mut self, payload: ScenePayload) {
        for node in payload.nodes {
            let node_idx = match self.nodes.iter().position(|n| n.name == node.name) {
                Some(idx) => {
                    if node.info.is_some() {
                        self.nodes[idx].info = node.info;
                    }
                    idx
                }
                None => {
                    self.nodes.push(NodeRecord {
                        name: node.name,
                        info: node.info,
                    });
                    self.nodes.len() - 1
                }
            };

            for set in node.cell_sets {
                let set_idx = match self
                    .sets
                    .iter()
                    .position(|s| s.node == node_idx && s.name == set.name)
                {
                    Some(idx) => idx,
                    None => {
                        self.sets.push(SetRecord {
                            node: node_idx,
                            name: set.name,
                            series_index: set.series_index,
                        });
                        self.sets.len() - 1
                    }
                };

                for cell in set.cells {
                    let [left, top, right, bottom] = cell.bounds;
                    self.cells.push(CellRecord {
                        set: set_idx,
                        item_index: cell.item_index,
                        bounds: Aabb2::new(
                            [left.min(right), top.min(bottom)],
                            [left.max(right), top.max(bottom)],
                        ),
                        depth: cell.depth,
                        info: cell.info,
                    });
                }
            }
        }
    }

    fn describe_cell(&self, idx: usize) -> SelectedObject {
        let cell = &self.cells[idx];
        let set = &self.sets[cell.set];
        SelectedObject {
            name: Some(self.nodes[set.node].name.clone()),
            series_index: set.series_index,
            item_index: cell.item_index,
            component_info: Some(set.name.clone()),
            info: cell.info.clone(),
        }
    }

    fn describe_set(&self, idx: usize) -> SelectedObject {
        let set = &self.sets[idx];
        SelectedObject {
            name: Some(self.nodes[set.node].name.clone()),
            series_index: set.series_index,
            component_info: Some(set.name.clone()),
            ..SelectedObject::default()
        }
    }

    fn describe_node(&self, idx: usize) -> SelectedObject {
        let node = &self.nodes[idx];
        SelectedObject {
            name: Some(node.name.clone()),
            info: node.info.clone(),
            ..SelectedObject::default()
        }
    }
}

impl SceneGraph for MemoryScene {
    fn set_pick_depth(&mut self, depth: PickDepth) {
        self.pick_depth = depth;
    }

    fn set_pick_ray(&mut self, point: PixelPoint) {
        self.pick_target = Some(PickTarget::Ray(point));
    }

    fn set_pick_rect(&mut self, rect: PixelRect) {
        self.pick_target = Some(PickTarget::Rect(rect));
    }

    fn pick(&mut self, level: PickLevel) -> SelectionSet {
        let Some(target) = self.pick_target else {
            return SelectionSet::new();
        };

        let candidates = self.cells.iter().enumerate().map(|(index, c)| PickCandidate {
            index,
            bounds: c.bounds,
            depth: c.depth,
        });
        let hits = pick_candidates(candidates, target, self.pick_depth);

        let mut out = SelectionSet::new();
        match level {
            PickLevel::Cell => {
                for idx in hits {
                    out.push(self.describe_cell(idx));
                }
            }
            PickLevel::CellSet => {
                let mut seen = Vec::new();
                for idx in hits {
                    let set = self.cells[idx].set;
                    if !seen.contains(&set) {
                        seen.push(set);
                        out.push(self.describe_set(set));
                    }
                }
            }
            PickLevel::SceneNode => {
                let mut seen = Vec::new();
                for idx in hits {
                    let node = self.sets[self.cells[idx].set].node;
                    if !seen.contains(&node) {
                        seen.push(node);
                        out.push(self.describe_node(node));
                    }
                }
            }
        }
        out
    }

    fn highlight(&mut self, selection: &SelectionSet, style: &HighlightStyle) {
        self.highlighted = selection.clone();
        self.highlight_style = Some(style.clone());
    }

    fn load_scene(&mut self, payload: &serde_json::Value) -> Result<(), SceneError> {
        let parsed = ScenePayload::from_value(payload)?;
        self.nodes.clear();
        self.sets.clear();
        self.cells.clear();
        self.highlighted.clear();
        self.chunks_merged = 0;
        self.ingest(parsed);
        debug!(
            nodes = self.nodes.len(),
            cells = self.cells.len(),
            "memory scene loaded"
        );
        Ok(())
    }

    fn merge_chunk(&mut self, payload: &serde_json::Value) -> Result<(), SceneError> {
        let parsed = ScenePayload::from_value(payload)?;
        self.ingest(parsed);
        self.chunks_merged += 1;
        debug!(
            chunk = self.chunks_merged,
            cells = self.cells.len(),
            "memory scene merged chunk"
        );
        Ok(())
    }

    fn clear(&mut self) {
        let size = self.size;
        *self = Self::default();
        self.size = size;
    }

    fn resize(&mut self, size: PixelSize) {
        self.size = size;
    }

    fn render(&mut self) {
        self.render_count += 1;
    }

    fn create_transform_interactor(
        &mut self,
        options: &InteractorOptions,
    ) -> Box<dyn TransformInteractor> {
        Box::new(MemoryInteractor::new(options.clone()))
    }
}

/// Transform handle that keeps its own matrix state.
#[derive(Debug, Clone)]
pub struct MemoryInteractor {
    options: InteractorOptions,
    zoom: f64,
    pan: [f64; 2],
}

impl MemoryInteractor {
    const MIN_ZOOM: f64 = 1.0e-6;

    pub fn new(options: InteractorOptions) -> Self {
        Self {
            options,
            zoom: 1.0,
            pan: [0.0, 0.0],
        }
    }

    pub fn pan_offset(&self) -> [f64; 2] {
        self.pan
    }
}

impl TransformInteractor for MemoryInteractor {
    fn matrix(&self) -> Mat4 {
        let angles = TransformAngles {
            scale: self.options.initial.scale * self.zoom,
            ..self.options.initial
        };
        Mat4::from_angles(angles).with_translation(self.pan[0], self.pan[1], 0.0)
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        if self.options.enable_pan {
            self.pan[0] += dx;
            self.pan[1] += dy;
        }
    }

    fn pan_to(&mut self, x: f64, y: f64) {
        if self.options.enable_pan {
            self.pan = [x, y];
        }
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        if self.options.enable_zoom && zoom.is_finite() {
            self.zoom = zoom.max(Self::MIN_ZOOM);
        }
    }

    fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = [0.0, 0.0];
    }
}
