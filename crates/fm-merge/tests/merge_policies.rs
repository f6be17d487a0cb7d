use fm_artifact::{compare_versions, ArtifactCollection};
use fm_merge::{
    merge_artifacts, merge_configurations, merge_feature, merge_json, ConfigurationOverrides,
    ConfigurationPolicy, MergeContext, MergeError, MergeMode, OverridePolicy, OverrideRule,
};
use fm_model::{ConfigValue, ConfigurationCollection, ExtensionContent};
use fm_test_utils::{
    artifact, configuration, feature_with_bundles, id, init_tracing, json_extension, string_value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn configuration_merge_latest_unions_properties() {
    init_tracing();
    let mut target: ConfigurationCollection =
        [configuration("org.x", &[("a", "1"), ("b", "2")])].into_iter().collect();
    let source: ConfigurationCollection =
        [configuration("org.x", &[("b", "3"), ("c", "4")])].into_iter().collect();

    let overrides = ConfigurationOverrides::uniform(ConfigurationPolicy::MergeLatest).unwrap();
    merge_configurations(&mut target, &source, &id("g:f:1"), &overrides).unwrap();

    let merged = target.get("org.x").unwrap();
    let keys: Vec<&str> = merged.properties().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(merged.property("b"), Some(&string_value("3")));
    assert_eq!(merged.property("c"), Some(&ConfigValue::from("4")));
}

#[test]
fn configuration_clash_without_policy_names_origins() {
    let mut target: ConfigurationCollection = ConfigurationCollection::new();
    let first: ConfigurationCollection = [configuration("org.x", &[])].into_iter().collect();
    let second: ConfigurationCollection = [configuration("org.x", &[])].into_iter().collect();

    let overrides = ConfigurationOverrides::new();
    merge_configurations(&mut target, &first, &id("g:one:1"), &overrides).unwrap();
    let err = merge_configurations(&mut target, &second, &id("g:two:1"), &overrides).unwrap_err();

    let MergeError::ConfigurationClash { pid, existing, feature } = err else {
        panic!("expected configuration clash, got {err}");
    };
    assert_eq!(pid, "org.x");
    assert_eq!(existing.0, vec![id("g:one:1")]);
    assert_eq!(feature, id("g:two:1"));
}

#[test]
fn glob_policy_only_applies_to_matching_pids() {
    let mut overrides = ConfigurationOverrides::new();
    overrides.add("org.apache.*", ConfigurationPolicy::UseFirst).unwrap();

    let mut target: ConfigurationCollection = [
        configuration("org.apache.x", &[("k", "first")]),
        configuration("com.other", &[]),
    ]
    .into_iter()
    .collect();
    let source: ConfigurationCollection = [configuration("org.apache.x", &[("k", "second")])]
        .into_iter()
        .collect();
    merge_configurations(&mut target, &source, &id("g:f:1"), &overrides).unwrap();
    assert_eq!(
        target.get("org.apache.x").unwrap().property("k"),
        Some(&string_value("first"))
    );

    let clash: ConfigurationCollection = [configuration("com.other", &[])].into_iter().collect();
    assert!(merge_configurations(&mut target, &clash, &id("g:f:1"), &overrides).is_err());
}

#[test]
fn aggregate_of_three_features_with_latest_rule() {
    let ctx = MergeContext::new().with_artifact_override(OverrideRule::parse("g:b:LATEST").unwrap());
    let mut target = fm_test_utils::feature("g:agg:1");
    for (f, b) in [("g:f1:1", "g:b:1"), ("g:f2:1", "g:b:3"), ("g:f3:1", "g:b:2")] {
        merge_feature(&mut target, &feature_with_bundles(f, &[b]), &ctx, MergeMode::Aggregate).unwrap();
    }
    assert_eq!(target.bundles().ids(), vec![id("g:b:2")]);
}

#[test]
fn aggregate_merges_json_extensions() {
    let ctx = MergeContext::new();
    let mut target = fm_test_utils::feature("g:agg:1");
    let mut first = fm_test_utils::feature("g:f1:1");
    first
        .extensions_mut()
        .add(json_extension("api", json!({"a": [1], "b": "x"})))
        .unwrap();
    let mut second = fm_test_utils::feature("g:f2:1");
    second
        .extensions_mut()
        .add(json_extension("api", json!({"a": [2], "c": true})))
        .unwrap();

    merge_feature(&mut target, &first, &ctx, MergeMode::Aggregate).unwrap();
    merge_feature(&mut target, &second, &ctx, MergeMode::Aggregate).unwrap();

    let ExtensionContent::Json(content) = target.extensions().get("api").unwrap().content() else {
        panic!("expected JSON content");
    };
    assert_eq!(content.value(), &json!({"a": [1, 2], "b": "x", "c": true}));
}

fn versions() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec((0..20u32, 0..20u32).prop_map(|(a, b)| format!("{a}.{b}")), 1..6)
}

fn collection(version: &str) -> ArtifactCollection {
    [artifact(&format!("g:b:{version}"))].into_iter().collect()
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn json_object() -> impl Strategy<Value = Value> {
    proptest::collection::vec(("[a-c]", json_leaf()), 0..5).prop_map(|pairs| {
        Value::Object(pairs.into_iter().collect())
    })
}

proptest! {
    #[test]
    fn prop_highest_keeps_maximum_version(vs in versions()) {
        let rules = [OverrideRule::parse("g:b:HIGHEST").unwrap()];
        let mut target = ArtifactCollection::new();
        for (i, v) in vs.iter().enumerate() {
            merge_artifacts(&mut target, &collection(v), &id(&format!("g:f{i}:1")), &rules).unwrap();
        }
        let max = vs
            .iter()
            .max_by(|a, b| compare_versions(a, b))
            .unwrap();
        let ids = target.ids();
        prop_assert_eq!(ids.len(), 1);
        prop_assert_eq!(ids[0].version(), max.as_str());
    }

    #[test]
    fn prop_all_keeps_every_distinct_version(vs in versions()) {
        let rules = [OverrideRule::catch_all(OverridePolicy::All)];
        let mut target = ArtifactCollection::new();
        for (i, v) in vs.iter().enumerate() {
            merge_artifacts(&mut target, &collection(v), &id(&format!("g:f{i}:1")), &rules).unwrap();
        }
        let mut distinct: Vec<&String> = Vec::new();
        for v in &vs {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
        }
        prop_assert_eq!(target.len(), distinct.len());
    }

    #[test]
    fn prop_json_merge_with_empty_is_identity(value in json_object()) {
        prop_assert_eq!(&merge_json("x", &value, &json!({})).unwrap(), &value);
        prop_assert_eq!(&merge_json("x", &json!({}), &value).unwrap(), &value);
    }

    #[test]
    fn prop_json_arrays_concatenate(a in proptest::collection::vec(json_leaf(), 0..4),
                                    b in proptest::collection::vec(json_leaf(), 0..4)) {
        let merged = merge_json("x", &Value::Array(a.clone()), &Value::Array(b.clone())).unwrap();
        let expected: Vec<Value> = a.into_iter().chain(b).collect();
        prop_assert_eq!(merged, Value::Array(expected));
    }
}
