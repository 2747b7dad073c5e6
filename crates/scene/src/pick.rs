use serde::{Deserialize, Serialize};

/// Granularity at which picked geometry is reported.
///
/// Wire names are `CELL`, `CELL_SET` and `SCENE_NODE`; anything unrecognized
/// falls back to `CELL`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PickLevel {
    #[default]
    Cell,
    CellSet,
    SceneNode,
}

impl PickLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PickLevel::Cell => "CELL",
            PickLevel::CellSet => "CELL_SET",
            PickLevel::SceneNode => "SCENE_NODE",
        }
    }
}

impl From<String> for PickLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CELL_SET" => PickLevel::CellSet,
            "SCENE_NODE" => PickLevel::SceneNode,
            _ => PickLevel::Cell,
        }
    }
}

impl From<PickLevel> for String {
    fn from(level: PickLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Whether a pick reports every intersection or only the nearest one.
///
/// Only the wire name `ALL` selects [`PickDepth::All`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PickDepth {
    All,
    #[default]
    Closest,
}

impl PickDepth {
    pub fn as_str(self) -> &'static str {
        match self {
            PickDepth::All => "ALL",
            PickDepth::Closest => "CLOSEST",
        }
    }
}

impl From<String> for PickDepth {
    fn from(s: String) -> Self {
        if s == "ALL" {
            PickDepth::All
        } else {
            PickDepth::Closest
        }
    }
}

impl From<PickDepth> for String {
    fn from(depth: PickDepth) -> Self {
        depth.as_str().to_string()
    }
}
