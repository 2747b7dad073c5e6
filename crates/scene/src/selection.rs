use serde::{Deserialize, Serialize};

/// One picked object, as reported to the host page.
///
/// The same shape is used for every renderer: 3D picks fill `name`/`info`,
/// SVG and image-map picks fill the series/item indices and component info
/// carried by the markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
}

impl SelectedObject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Ordered list of picked objects.
///
/// Ordering contract: objects appear in the order the resolver found them
/// (nearest first for 3D ray picks, document order for image maps).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    objects: Vec<SelectedObject>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: SelectedObject) {
        self.objects.push(object);
    }

    /// Appends `object` unless an equal object is already present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, object: SelectedObject) -> bool {
        if self.objects.contains(&object) {
            return false;
        }
        self.objects.push(object);
        true
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedObject> + '_ {
        self.objects.iter()
    }

    pub fn as_slice(&self) -> &[SelectedObject] {
        &self.objects
    }
}

impl FromIterator<SelectedObject> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = SelectedObject>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}
