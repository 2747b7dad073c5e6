//! Demo scenes served by the visualization server.
//!
//! Every scene is a grouped bar chart. Layout happens per request so the
//! image, SVG, image map and 3D payload all agree with the requested size.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use foundation::bounds::{Aabb2, PixelRect};
use scene::{CellSetSpec, CellSpec, NodeSpec, ScenePayload};
use serde::{Deserialize, Serialize};
use serde_json::json;
use streaming::PickRegion;
use tracing::{info, warn};

const MARGIN: f64 = 10.0;
const PALETTE: [&str; 6] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoScene {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub series: Vec<Series>,
}

/// One laid-out bar; `rect` is `[left, top, right, bottom]` in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub series: usize,
    pub item: usize,
    pub value: f64,
    pub rect: [f64; 4],
}

impl Bar {
    fn bounds(&self) -> Aabb2 {
        let [l, t, r, b] = self.rect;
        Aabb2::new([l, t], [r, b])
    }

    pub fn is_hit(&self, region: &PickRegion) -> bool {
        match *region {
            PickRegion::Point { x, y } => self.bounds().contains_point(x as f64, y as f64),
            PickRegion::Rect {
                left,
                right,
                top,
                bottom,
            } => self.bounds().intersects_rect(&PixelRect {
                left,
                top,
                right,
                bottom,
            }),
        }
    }
}

impl DemoScene {
    pub fn color(&self, series: usize) -> &str {
        self.series
            .get(series)
            .and_then(|s| s.color.as_deref())
            .unwrap_or(PALETTE[series % PALETTE.len()])
    }

    pub fn item_count(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }

    pub fn layout(&self, width: u32, height: u32) -> Vec<Bar> {
        let items = self.item_count();
        let groups = self.series.len();
        if items == 0 || groups == 0 {
            return Vec::new();
        }
        let max = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0_f64, f64::max);

        let plot_w = (width as f64 - 2.0 * MARGIN).max(1.0);
        let plot_h = (height as f64 - 2.0 * MARGIN).max(1.0);
        let group_w = plot_w / items as f64;
        let bar_w = group_w * 0.8 / groups as f64;
        let bottom = MARGIN + plot_h;

        let mut bars = Vec::new();
        for (series, s) in self.series.iter().enumerate() {
            for (item, &value) in s.values.iter().enumerate() {
                let h = if max > 0.0 {
                    value.max(0.0) / max * plot_h
                } else {
                    0.0
                };
                let left = MARGIN + item as f64 * group_w + group_w * 0.1 + series as f64 * bar_w;
                bars.push(Bar {
                    series,
                    item,
                    value,
                    rect: [left, bottom - h, left + bar_w, bottom],
                });
            }
        }
        bars
    }

    pub fn scene_info(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "title": self.title,
            "seriesCount": self.series.len(),
            "itemCount": self.item_count(),
        })
    }

    /// Per-series values, keyed by series name.
    pub fn data(&self) -> serde_json::Value {
        let series: serde_json::Map<String, serde_json::Value> = self
            .series
            .iter()
            .map(|s| (s.name.clone(), json!(s.values)))
            .collect();
        json!({ "name": self.name, "series": series })
    }

    pub fn legend_html(&self) -> String {
        let mut html = String::from("<ul class=\"avs-legend\">");
        for (i, s) in self.series.iter().enumerate() {
            let _ = write!(
                html,
                "<li><span style=\"background:{}\"></span>{}</li>",
                self.color(i),
                escape(&s.name)
            );
        }
        html.push_str("</ul>");
        html
    }

    pub fn selection_info(&self, hits: &[&Bar]) -> serde_json::Value {
        let selected: Vec<_> = hits
            .iter()
            .map(|bar| {
                json!({
                    "seriesIndex": bar.series,
                    "itemIndex": bar.item,
                    "seriesName": self.series.get(bar.series).map(|s| s.name.as_str()),
                    "value": bar.value,
                })
            })
            .collect();
        json!({ "scene": self.name, "selected": selected })
    }

    /// SVG markup with `series-index` / `item-index` attributes on the
    /// elements the client walks during local picks.
    pub fn render_svg(
        &self,
        bars: &[Bar],
        width: u32,
        height: u32,
        css: &BTreeMap<String, String>,
        highlight: Option<(&[&Bar], &str)>,
    ) -> String {
        let background = css
            .get("backgroundColor")
            .map(String::as_str)
            .unwrap_or("white");
        let text = css
            .get("textColor")
            .or_else(|| css.get("color"))
            .map(String::as_str)
            .unwrap_or("black");
        let font = css
            .get("fontFamily")
            .map(String::as_str)
            .unwrap_or("sans-serif");

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape(background)
        );
        if let Some(title) = &self.title {
            let _ = write!(
                svg,
                "<text x=\"{MARGIN}\" y=\"{}\" fill=\"{}\" font-family=\"{}\">{}</text>",
                MARGIN * 1.5,
                escape(text),
                escape(font),
                escape(title)
            );
        }
        for series in 0..self.series.len() {
            let _ = write!(svg, "<g series-index=\"{series}\">");
            for bar in bars.iter().filter(|b| b.series == series) {
                let lit = highlight.and_then(|(hits, color)| {
                    hits.iter()
                        .any(|h| h.series == bar.series && h.item == bar.item)
                        .then_some(color)
                });
                let [l, t, r, b] = bar.rect;
                let _ = write!(
                    svg,
                    "<rect item-index=\"{}\" x=\"{l:.1}\" y=\"{t:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
                    bar.item,
                    r - l,
                    b - t,
                    escape(lit.unwrap_or(self.color(series)))
                );
            }
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");
        svg
    }

    pub fn image_map(&self, bars: &[Bar]) -> serde_json::Value {
        bars.iter()
            .map(|bar| {
                json!({
                    "shape": "rect",
                    "coords": bar.rect,
                    "seriesIndex": bar.series,
                    "itemIndex": bar.item,
                })
            })
            .collect()
    }

    /// 3D payload for `bars[range]`, grouped by series. Earlier series sit
    /// closer to the camera.
    pub fn scene_payload(&self, bars: &[Bar]) -> ScenePayload {
        let mut sets: Vec<CellSetSpec> = Vec::new();
        for bar in bars {
            let name = self
                .series
                .get(bar.series)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("series-{}", bar.series));
            let cell = CellSpec {
                item_index: Some(bar.item as i64),
                bounds: bar.rect,
                depth: 1.0 + bar.series as f64,
                info: Some(json!({ "value": bar.value })),
            };
            match sets.iter_mut().find(|s| s.name == name) {
                Some(set) => set.cells.push(cell),
                None => sets.push(CellSetSpec {
                    name,
                    series_index: Some(bar.series as i64),
                    cells: vec![cell],
                }),
            }
        }
        ScenePayload {
            nodes: vec![NodeSpec {
                name: self.name.clone(),
                info: Some(self.scene_info()),
                cell_sets: sets,
            }],
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Named scenes known to the server.
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    scenes: BTreeMap<String, DemoScene>,
}

impl SceneCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.insert(DemoScene {
            name: "bars".to_string(),
            title: Some("Quarterly sales".to_string()),
            series: vec![
                Series {
                    name: "north".to_string(),
                    values: vec![12.0, 19.0, 7.0, 15.0],
                    color: None,
                },
                Series {
                    name: "south".to_string(),
                    values: vec![9.0, 14.0, 11.0, 20.0],
                    color: None,
                },
            ],
        });
        catalog.insert(DemoScene {
            name: "dense".to_string(),
            title: None,
            series: (0..3)
                .map(|s| Series {
                    name: format!("s{s}"),
                    values: (0..24).map(|i| ((i * 7 + s * 5) % 17) as f64 + 1.0).collect(),
                    color: None,
                })
                .collect(),
        });
        catalog
    }

    pub fn insert(&mut self, scene: DemoScene) {
        self.scenes.insert(scene.name.clone(), scene);
    }

    pub fn get(&self, name: &str) -> Option<&DemoScene> {
        self.scenes.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenes.keys().map(String::as_str).collect()
    }

    /// Adds every `*.json` scene under `dir/scenes`. Unreadable files are
    /// skipped with a warning.
    pub async fn load_dir(&mut self, dir: &Path) {
        let scenes_dir = dir.join("scenes");
        let mut entries = match tokio::fs::read_dir(&scenes_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                info!("no scene directory at {scenes_dir:?}: {err}");
                return;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    serde_json::from_str::<DemoScene>(&text).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(scene) => {
                    info!("loaded scene '{}' from {path:?}", scene.name);
                    self.insert(scene);
                }
                Err(err) => warn!("skipping scene file {path:?}: {err}"),
            }
        }
    }
}
