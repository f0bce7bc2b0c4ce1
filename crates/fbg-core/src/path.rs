//! Slash-delimited path lookup over JSON trees.

use serde_json::Value;

/// Separator between segments of a source path.
pub const PATH_SEPARATOR: char = '/';

/// Resolve `path` (e.g. `venue/latitude`) against `root`.
///
/// Each segment is looked up as an object key. A missing key, a non-object
/// intermediate node or an explicit JSON `null` anywhere along the way yields
/// `None`; absence is the normal case for optional API fields.
#[must_use]
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split(PATH_SEPARATOR) {
        current = current.as_object()?.get(segment)?;
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Check that a declared path has no empty segments.
pub(crate) fn validate_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty source path".to_string());
    }
    if path.split(PATH_SEPARATOR).any(str::is_empty) {
        return Err(format!("source path `{path}` has an empty segment"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_top_level_and_nested_keys() {
        let doc = json!({"id": "1", "venue": {"city": "Palo Alto", "geo": {"lat": 37.4}}});
        assert_eq!(resolve_path(&doc, "id"), Some(&json!("1")));
        assert_eq!(resolve_path(&doc, "venue/city"), Some(&json!("Palo Alto")));
        assert_eq!(resolve_path(&doc, "venue/geo/lat"), Some(&json!(37.4)));
    }

    #[test]
    fn missing_intermediate_segment_is_absent() {
        let doc = json!({"name": "Launch party"});
        assert_eq!(resolve_path(&doc, "venue/latitude"), None);
    }

    #[test]
    fn null_anywhere_is_absent() {
        let doc = json!({"venue": null, "about": null});
        assert_eq!(resolve_path(&doc, "venue/latitude"), None);
        assert_eq!(resolve_path(&doc, "about"), None);
    }

    #[test]
    fn scalar_intermediate_is_absent() {
        let doc = json!({"venue": "TBD", "tags": [1, 2]});
        assert_eq!(resolve_path(&doc, "venue/city"), None);
        assert_eq!(resolve_path(&doc, "tags/data"), None);
        assert_eq!(resolve_path(&json!(null), "id"), None);
    }

    #[test]
    fn validate_rejects_empty_segments() {
        assert!(validate_path("tags/data").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("venue//city").is_err());
        assert!(validate_path("/venue").is_err());
        assert!(validate_path("venue/").is_err());
    }
}
