//! DOM-backed surface, SVG tree and style lookup.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::bounds::{PixelRect, PixelSize};
use viewer::{StyleLookup, Surface, SurfaceRect, SvgDom, SvgNodeId};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

const LOADING_CLASS: &str = "avs-loading";

fn create<T: JsCast>(document: &Document, tag: &str, class: &str) -> Result<T, wasm_bindgen::JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class);
    el.dyn_into::<T>()
        .map_err(|_| wasm_bindgen::JsValue::from_str("unexpected element type"))
}

fn set_style(el: &HtmlElement, name: &str, value: &str) {
    let _ = el.style().set_property(name, value);
}

/// Hands out stable ids for nodes of the current SVG markup.
///
/// Ids stay valid until [`NodeRegistry::reset`], which is called whenever
/// the markup they point into is replaced or removed.
#[derive(Debug)]
pub struct NodeRegistry<T> {
    nodes: Vec<T>,
}

impl<T> Default for NodeRegistry<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T: PartialEq + Clone> NodeRegistry<T> {
    pub fn id_of(&mut self, node: T) -> SvgNodeId {
        if let Some(id) = self.nodes.iter().position(|n| *n == node) {
            return id;
        }
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, id: SvgNodeId) -> Option<T> {
        self.nodes.get(id).cloned()
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }
}

pub type SharedNodes = Rc<RefCell<NodeRegistry<Element>>>;

/// Image, SVG container and rubber-band overlay stacked inside the host
/// element.
pub struct DomSurface {
    container: HtmlElement,
    image: HtmlImageElement,
    svg_host: HtmlElement,
    overlay: HtmlElement,
    svg_nodes: SharedNodes,
}

impl DomSurface {
    pub fn new(document: &Document, container: HtmlElement) -> Result<Self, wasm_bindgen::JsValue> {
        let image: HtmlImageElement = create(document, "img", "avs-image")?;
        let svg_host: HtmlElement = create(document, "div", "avs-svg")?;
        let overlay: HtmlElement = create(document, "div", "avs-rubber-band")?;
        set_style(&container, "position", "relative");
        set_style(&overlay, "position", "absolute");
        set_style(&overlay, "display", "none");
        set_style(&overlay, "pointer-events", "none");
        container.append_child(&image)?;
        container.append_child(&svg_host)?;
        container.append_child(&overlay)?;
        Ok(Self {
            container,
            image,
            svg_host,
            overlay,
            svg_nodes: SharedNodes::default(),
        })
    }

    /// Registry shared with the [`DomSvg`] reading this surface's markup.
    pub fn svg_nodes(&self) -> SharedNodes {
        self.svg_nodes.clone()
    }

    fn replace_svg(&mut self, markup: &str) {
        self.svg_nodes.borrow_mut().reset();
        self.svg_host.set_inner_html(markup);
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    pub fn svg_host(&self) -> &HtmlElement {
        &self.svg_host
    }
}

impl Surface for DomSurface {
    fn measure(&self) -> SurfaceRect {
        let rect = self.container.get_bounding_client_rect();
        SurfaceRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn set_image(&mut self, src: &str) {
        self.replace_svg("");
        self.image.set_src(src);
        set_style(&self.image, "display", "block");
    }

    fn set_svg(&mut self, markup: &str) {
        self.image.set_src("");
        set_style(&self.image, "display", "none");
        self.replace_svg(markup);
    }

    fn clear(&mut self) {
        self.image.set_src("");
        set_style(&self.image, "display", "none");
        self.replace_svg("");
        self.draw_selection_rect(None);
    }

    fn set_loading(&mut self, loading: bool) {
        let _ = self
            .container
            .class_list()
            .toggle_with_force(LOADING_CLASS, loading);
    }

    fn resize_layers(&mut self, size: PixelSize) {
        for el in [&self.svg_host, &self.overlay] {
            set_style(el, "width", &format!("{}px", size.width));
            set_style(el, "height", &format!("{}px", size.height));
        }
    }

    fn draw_selection_rect(&mut self, rect: Option<PixelRect>) {
        match rect {
            Some(r) => {
                set_style(&self.overlay, "display", "block");
                set_style(&self.overlay, "left", &format!("{}px", r.left));
                set_style(&self.overlay, "top", &format!("{}px", r.top));
                set_style(&self.overlay, "width", &format!("{}px", r.width()));
                set_style(&self.overlay, "height", &format!("{}px", r.height()));
            }
            None => set_style(&self.overlay, "display", "none"),
        }
    }
}

/// Live SVG markup inside the surface's SVG container. Elements are given
/// ids the first time they are seen; the surface drops them when the markup
/// changes.
pub struct DomSvg {
    document: Document,
    host: HtmlElement,
    nodes: SharedNodes,
}

impl DomSvg {
    pub fn new(document: Document, host: HtmlElement, nodes: SharedNodes) -> Self {
        Self {
            document,
            host,
            nodes,
        }
    }

    fn id_of(&self, el: Element) -> SvgNodeId {
        self.nodes.borrow_mut().id_of(el)
    }

    fn node(&self, id: SvgNodeId) -> Option<Element> {
        self.nodes.borrow().get(id)
    }

    fn is_host(&self, el: &Element) -> bool {
        let host: &Element = self.host.as_ref();
        el == host
    }
}

impl SvgDom for DomSvg {
    /// `x`/`y` are viewer-local; the lookup uses client coordinates.
    fn element_at(&self, x: f64, y: f64) -> Option<SvgNodeId> {
        let origin = self.host.get_bounding_client_rect();
        let el = self
            .document
            .element_from_point((origin.left() + x) as f32, (origin.top() + y) as f32)?;
        if self.is_host(&el) || !self.host.contains(Some(el.as_ref())) {
            return None;
        }
        Some(self.id_of(el))
    }

    fn parent(&self, node: SvgNodeId) -> Option<SvgNodeId> {
        let parent = self.node(node)?.parent_element()?;
        if self.is_host(&parent) {
            return None;
        }
        Some(self.id_of(parent))
    }

    fn attribute(&self, node: SvgNodeId, name: &str) -> Option<String> {
        self.node(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: SvgNodeId, name: &str, value: &str) {
        if let Some(el) = self.node(node) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, node: SvgNodeId, name: &str) {
        if let Some(el) = self.node(node) {
            let _ = el.remove_attribute(name);
        }
    }
}

/// Computed style of the host element.
pub struct DomStyle {
    element: Element,
}

impl DomStyle {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    fn value(&self, property: &str) -> Option<String> {
        let window = web_sys::window()?;
        let style = window.get_computed_style(&self.element).ok()??;
        style
            .get_property_value(property)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl StyleLookup for DomStyle {
    fn computed(&self, property: &str) -> Option<String> {
        self.value(property)
    }

    fn custom_property(&self, name: &str) -> Option<String> {
        self.value(name)
    }
}

#[cfg(test)]
mod tests {
    use super::NodeRegistry;

    #[test]
    fn ids_stay_stable_until_reset() {
        let mut nodes = NodeRegistry::default();
        let rect = nodes.id_of("rect".to_string());
        let group = nodes.id_of("g".to_string());
        assert_eq!(nodes.id_of("rect".to_string()), rect);
        assert_ne!(rect, group);

        for i in 0..10_000 {
            nodes.id_of(format!("n{i}"));
        }
        assert_eq!(nodes.get(rect).as_deref(), Some("rect"));
        assert_eq!(nodes.get(group).as_deref(), Some("g"));

        nodes.reset();
        assert_eq!(nodes.get(rect), None);
        assert_eq!(nodes.get(group), None);
        assert_eq!(nodes.id_of("g".to_string()), 0);
    }
}
