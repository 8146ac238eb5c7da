use super::*;
use serde_json::json;

#[test]
fn expand_env_string_substitutes_known_vars() {
    std::env::set_var("JM_TEST_VAR", "hello");
    assert_eq!(expand_env_string("prefix-$JM_TEST_VAR-suffix"), "prefix-hello-suffix");
    std::env::remove_var("JM_TEST_VAR");
}

#[test]
fn expand_env_string_leaves_unknown_vars_literal() {
    std::env::remove_var("JM_NOT_SET_XYZ");
    assert_eq!(expand_env_string("$JM_NOT_SET_XYZ"), "$JM_NOT_SET_XYZ");
}

#[test]
fn expand_env_in_value_recurses_into_nested_structures() {
    std::env::set_var("JM_NESTED", "expanded");
    let mut value = json!({
        "flat": "$JM_NESTED",
        "nested": { "inner": ["$JM_NESTED", "literal"] }
    });
    expand_env_in_value(&mut value);
    assert_eq!(value["flat"], "expanded");
    assert_eq!(value["nested"]["inner"][0], "expanded");
    assert_eq!(value["nested"]["inner"][1], "literal");
    std::env::remove_var("JM_NESTED");
}

#[test]
fn bootstrap_creates_directories_and_default_config() {
    let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let config_path = ConfigStore::bootstrap(tmp.path(), "s3cr3t").unwrap_or_else(|e| panic!("bootstrap: {e}"));
    assert!(tmp.path().join("agent").is_dir());
    assert!(tmp.path().join("pipeline").is_dir());
    assert!(config_path.exists());

    let store = ConfigStore::load(&config_path).unwrap_or_else(|e| panic!("load: {e}"));
    assert_eq!(store.snapshot().secret, "s3cr3t");
}

#[test]
fn snapshot_is_independent_of_later_reloads() {
    let store = ConfigStore::from_config(Config {
        secret: "first".into(),
        ..Default::default()
    });
    let snap = store.snapshot();
    store.reload(Config {
        secret: "second".into(),
        ..Default::default()
    });
    assert_eq!(snap.secret, "first");
    assert_eq!(store.snapshot().secret, "second");
}
