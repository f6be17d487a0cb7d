//! JSON deep merge
//!
//! Arrays concatenate, objects merge key by key recursively, scalars take
//! the source value. Two values where either side is a container and the
//! shapes differ cannot be merged.

use crate::error::{MergeError, MergeResult};
use fm_model::json_kind;
use serde_json::Value as JsonValue;

/// Deep-merge `source` into a copy of `target`
///
/// `extension` names the extension being merged, for error reporting.
///
/// # Errors
/// Returns [`MergeError::JsonTypeMismatch`] with a JSON pointer to the
/// first position where an array or object meets a different shape.
pub fn merge_json(extension: &str, target: &JsonValue, source: &JsonValue) -> MergeResult<JsonValue> {
    let mut path = String::new();
    merge_at(extension, &mut path, target, source)
}

fn merge_at(
    extension: &str,
    path: &mut String,
    target: &JsonValue,
    source: &JsonValue,
) -> MergeResult<JsonValue> {
    match (target, source) {
        (JsonValue::Object(t_map), JsonValue::Object(s_map)) => {
            let mut result = t_map.clone();
            for (key, s_val) in s_map {
                let merged = match t_map.get(key) {
                    Some(t_val) => {
                        let len = path.len();
                        path.push('/');
                        path.push_str(&escape_pointer(key));
                        let merged = merge_at(extension, path, t_val, s_val)?;
                        path.truncate(len);
                        merged
                    }
                    None => s_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Ok(JsonValue::Object(result))
        }
        (JsonValue::Array(t_arr), JsonValue::Array(s_arr)) => {
            let mut result = t_arr.clone();
            result.extend(s_arr.iter().cloned());
            Ok(JsonValue::Array(result))
        }
        (t, s) if is_container(t) || is_container(s) => Err(MergeError::JsonTypeMismatch {
            extension: extension.to_string(),
            path: if path.is_empty() { "/".to_string() } else { path.clone() },
            existing: json_kind(t),
            incoming: json_kind(s),
        }),
        // Scalars: source wins
        (_, s) => Ok(s.clone()),
    }
}

fn is_container(value: &JsonValue) -> bool {
    value.is_array() || value.is_object()
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn arrays_concatenate_in_order() {
        let merged = merge_json("ext", &json!([1, 2]), &json!([3, 4])).unwrap();
        assert_eq!(merged, json!([1, 2, 3, 4]));
    }

    #[test]
    fn objects_merge_recursively() {
        let merged = merge_json(
            "ext",
            &json!({"a": 1, "b": {"x": 1}}),
            &json!({"b": {"y": 2}, "c": 3}),
        )
        .unwrap();
        assert_eq!(merged, json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3}));
    }

    #[test]
    fn object_key_order_is_preserved() {
        let merged = merge_json("ext", &json!({"z": 1, "a": 2}), &json!({"m": 3})).unwrap();
        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn scalars_source_wins() {
        let merged = merge_json("ext", &json!({"a": 1, "b": "x"}), &json!({"a": "one", "b": null}))
            .unwrap();
        assert_eq!(merged, json!({"a": "one", "b": null}));
    }

    #[test]
    fn top_level_mismatch_is_fatal() {
        let err = merge_json("ext", &json!([1]), &json!({"a": 1})).unwrap_err();
        assert!(matches!(
            err,
            MergeError::JsonTypeMismatch { ref path, existing: "array", incoming: "object", .. }
                if path == "/"
        ));
    }

    #[test]
    fn nested_mismatch_reports_pointer() {
        let err = merge_json("ext", &json!({"a": {"b/c": [1]}}), &json!({"a": {"b/c": 2}}))
            .unwrap_err();
        assert!(matches!(err, MergeError::JsonTypeMismatch { ref path, .. } if path == "/a/b~1c"));
    }
}
