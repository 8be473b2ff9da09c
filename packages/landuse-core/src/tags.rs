// Ordered-preference lookup over feature tags, plus the per-category
// rule tables that drive naming and labeling in the aggregator.
use crate::models::TagMap;

/// Rule table for one land-use category.
///
/// Both key lists are ordered preference lists: the first key with a
/// non-empty value wins. The tie-break is deliberate and matches the
/// source data conventions; do not reorder.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRules {
    /// Singular label used in the synthetic fallback name, e.g. "Green space 3".
    pub singular: &'static str,
    /// Label used when none of the category keys is present.
    pub fallback_category: &'static str,
    /// Tag keys tried in order to resolve a display name.
    pub name_keys: &'static [&'static str],
    /// Tag keys tried in order to resolve the category label.
    pub category_keys: &'static [&'static str],
}

impl CategoryRules {
    /// Parks, gardens, forests and other vegetated areas.
    pub fn green_spaces() -> Self {
        CategoryRules {
            singular: "Green space",
            fallback_category: "unspecified",
            name_keys: &["name", "name:fr", "name:en", "name:ar", "designation"],
            category_keys: &["leisure", "landuse", "natural"],
        }
    }

    /// Residential, commercial and industrial land plus buildings.
    pub fn urban_areas() -> Self {
        CategoryRules {
            singular: "Urban zone",
            fallback_category: "unspecified",
            name_keys: &["name", "name:fr", "name:en", "name:ar"],
            category_keys: &["landuse", "building"],
        }
    }
}

/// First non-empty value among `keys`, rendered as a plain string.
///
/// Tag values come from untyped source data, so booleans and numbers
/// (e.g. `building=true`) are rendered through their JSON scalar form.
/// Empty strings and nulls count as absent.
pub fn first_tag_value(tags: &TagMap, keys: &[&str]) -> Option<String> {
    for key in keys {
        match tags.get(*key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(serde_json::Value::Bool(b)) => return Some(b.to_string()),
            Some(serde_json::Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}
