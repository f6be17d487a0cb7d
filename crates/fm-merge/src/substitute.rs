//! Variable substitution
//!
//! Replaces `${name}` placeholders in a single left-to-right pass.
//! Substituted text is not scanned again, and an unterminated `${` is
//! copied through unchanged.

use crate::error::{MergeError, MergeResult};
use fm_model::{ConfigValue, Feature, PropertyMap};
use indexmap::IndexMap;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Substitute placeholders in `value`
///
/// Each name resolves from `overrides` first, then from `variables`.
///
/// # Errors
/// Returns [`MergeError::UndefinedVariable`] for a name found in neither.
pub fn substitute(
    value: &str,
    overrides: &IndexMap<String, String>,
    variables: &PropertyMap,
) -> MergeResult<String> {
    let mut result = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        let name = &after[..end];
        let replacement = overrides
            .get(name)
            .map(String::as_str)
            .or_else(|| variables.get(name))
            .ok_or_else(|| MergeError::UndefinedVariable {
                name: name.to_string(),
                value: value.to_string(),
            })?;

        result.push_str(&rest[..start]);
        result.push_str(replacement);
        rest = &after[end + CLOSE.len_utf8()..];
    }
    result.push_str(rest);
    Ok(result)
}

/// Substitute placeholders throughout a feature
///
/// Covers framework property values and every string configuration value,
/// string array elements included. Variables themselves are left as they
/// are.
///
/// # Errors
/// Returns the first undefined variable.
pub fn substitute_feature(
    feature: &mut Feature,
    overrides: &IndexMap<String, String>,
) -> MergeResult<()> {
    let variables = feature.variables().clone();

    let mut resolved = Vec::new();
    for (key, value) in feature.framework_properties().iter() {
        let substituted = substitute(value, overrides, &variables)?;
        if substituted != value {
            resolved.push((key.to_string(), substituted));
        }
    }
    for (key, value) in resolved {
        feature.framework_properties_mut().insert(key, value);
    }

    for configuration in feature.configurations_mut().iter_mut() {
        for value in configuration.properties_mut().values_mut() {
            match value {
                ConfigValue::String(s) => *s = substitute(s, overrides, &variables)?,
                ConfigValue::Strings(items) => {
                    for item in items.iter_mut() {
                        *item = substitute(item, overrides, &variables)?;
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}
