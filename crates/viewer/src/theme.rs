//! Theme resolution from host styles.
//!
//! Each theme key is read from the element's computed style first; a
//! non-empty `--avs-*` custom property then overrides it. The result is sent
//! as `rendererProperties.cssProperties`.

use std::collections::BTreeMap;
use std::collections::HashMap;

/// Read access to the host element's styles.
pub trait StyleLookup {
    /// Computed value of a standard CSS property (kebab-case name).
    fn computed(&self, property: &str) -> Option<String>;
    /// Value of a custom property such as `--avs-text-color`.
    fn custom_property(&self, name: &str) -> Option<String>;
}

/// `(theme key, computed CSS property, custom property)`.
const THEME_KEYS: &[(&str, Option<&str>, &str)] = &[
    ("backgroundColor", Some("background-color"), "--avs-background-color"),
    ("color", Some("color"), "--avs-color"),
    ("textColor", Some("color"), "--avs-text-color"),
    ("fontFamily", Some("font-family"), "--avs-font-family"),
    ("fontSize", Some("font-size"), "--avs-font-size"),
    ("lineColor", None, "--avs-line-color"),
    ("highlightColor", None, "--avs-highlight-color"),
];

pub fn resolve_theme(style: &dyn StyleLookup) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for &(key, computed, custom) in THEME_KEYS {
        let mut value = computed
            .and_then(|prop| style.computed(prop))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if let Some(over) = style
            .custom_property(custom)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            value = Some(over);
        }

        if let Some(mut v) = value {
            if key == "fontFamily" {
                v.retain(|c| c != '"' && c != '\'');
            }
            out.insert(key.to_string(), v);
        }
    }
    out
}

/// Fixed style table, used by headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticStyle {
    computed: HashMap<String, String>,
    custom: HashMap<String, String>,
}

impl StaticStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_computed(mut self, property: &str, value: &str) -> Self {
        self.computed.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_custom(mut self, name: &str, value: &str) -> Self {
        self.custom.insert(name.to_string(), value.to_string());
        self
    }
}

impl StyleLookup for StaticStyle {
    fn computed(&self, property: &str) -> Option<String> {
        self.computed.get(property).cloned()
    }

    fn custom_property(&self, name: &str) -> Option<String> {
        self.custom.get(name).cloned()
    }
}
