//! SVG hit-testing and fill-swap highlighting.
//!
//! Selection attributes (`series-index`, `item-index`, `component-info`) may
//! sit on the hit element or any ancestor; the nearest occurrence of each
//! wins.

use std::collections::BTreeMap;

use foundation::bounds::Aabb2;
use scene::SelectedObject;

pub type SvgNodeId = usize;

/// Narrow view of the SVG document rendered into the widget.
pub trait SvgDom {
    /// Topmost element under a widget-relative point.
    fn element_at(&self, x: f64, y: f64) -> Option<SvgNodeId>;
    fn parent(&self, node: SvgNodeId) -> Option<SvgNodeId>;
    fn attribute(&self, node: SvgNodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: SvgNodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: SvgNodeId, name: &str);
}

pub const ATTR_SERIES_INDEX: &str = "series-index";
pub const ATTR_ITEM_INDEX: &str = "item-index";
pub const ATTR_COMPONENT_INFO: &str = "component-info";

/// Walks from `node` to the root collecting selection attributes.
///
/// Returns `None` when no attribute was found anywhere on the path.
pub fn collect_selection(dom: &dyn SvgDom, node: SvgNodeId) -> Option<SelectedObject> {
    let mut out = SelectedObject::default();
    let mut found = false;
    let mut cursor = Some(node);

    while let Some(n) = cursor {
        if out.series_index.is_none() {
            out.series_index = dom
                .attribute(n, ATTR_SERIES_INDEX)
                .and_then(|v| v.trim().parse().ok());
            found |= out.series_index.is_some();
        }
        if out.item_index.is_none() {
            out.item_index = dom
                .attribute(n, ATTR_ITEM_INDEX)
                .and_then(|v| v.trim().parse().ok());
            found |= out.item_index.is_some();
        }
        if out.component_info.is_none() {
            out.component_info = dom.attribute(n, ATTR_COMPONENT_INFO);
            found |= out.component_info.is_some();
        }
        cursor = dom.parent(n);
    }

    found.then_some(out)
}

/// Remembers original fills so a new highlight can restore the last one.
#[derive(Debug, Clone, Default)]
pub struct SvgHighlighter {
    saved: Vec<(SvgNodeId, Option<String>)>,
}

impl SvgHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> Vec<SvgNodeId> {
        self.saved.iter().map(|(n, _)| *n).collect()
    }

    pub fn restore(&mut self, dom: &mut dyn SvgDom) {
        for (node, fill) in self.saved.drain(..).rev() {
            match fill {
                Some(f) => dom.set_attribute(node, "fill", &f),
                None => dom.remove_attribute(node, "fill"),
            }
        }
    }

    pub fn highlight(&mut self, dom: &mut dyn SvgDom, node: SvgNodeId, color: &str) {
        self.restore(dom);
        self.saved.push((node, dom.attribute(node, "fill")));
        dom.set_attribute(node, "fill", color);
    }

    /// Forgets saved fills without touching the document (the document was
    /// replaced).
    pub fn forget(&mut self) {
        self.saved.clear();
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    parent: Option<SvgNodeId>,
    bounds: Option<Aabb2>,
    attributes: BTreeMap<String, String>,
}

/// Minimal in-memory SVG tree with axis-aligned hit boxes.
#[derive(Debug, Clone, Default)]
pub struct MemorySvg {
    nodes: Vec<MemoryNode>,
}

impl MemorySvg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node. `bounds` is `[left, top, right, bottom]`; nodes
    /// without bounds are groups and never hit directly.
    pub fn add(
        &mut self,
        parent: Option<SvgNodeId>,
        bounds: Option<[f64; 4]>,
        attributes: &[(&str, &str)],
    ) -> SvgNodeId {
        self.nodes.push(MemoryNode {
            parent,
            bounds: bounds.map(|[l, t, r, b]| Aabb2::new([l, t], [r, b])),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.nodes.len() - 1
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl SvgDom for MemorySvg {
    fn element_at(&self, x: f64, y: f64) -> Option<SvgNodeId> {
        // Later nodes paint over earlier ones.
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, n)| n.bounds.is_some_and(|b| b.contains_point(x, y)))
            .map(|(i, _)| i)
    }

    fn parent(&self, node: SvgNodeId) -> Option<SvgNodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn attribute(&self, node: SvgNodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: SvgNodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: SvgNodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attributes.remove(name);
        }
    }
}
