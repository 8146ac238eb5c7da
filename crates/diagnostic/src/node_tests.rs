use super::*;

#[test]
fn add_child_links_parent_and_records_child_in_events() {
    let root = Diagnostic::root("pipeline", "2026-01-01T00:00:00Z");
    let child = root.add_child("stage-1", "2026-01-01T00:00:01Z");
    assert_eq!(child.parent().map(|p| p.label().to_string()), Some("pipeline".to_string()));
}

#[test]
fn filter_based_on_importance_drops_low_severity_events() {
    let root = Diagnostic::root("pipeline", "t0");
    root.log(Importance::Debug, "step", "debug noise", "t1");
    root.log(Importance::Error, "step", "real problem", "t2");
    let child = root.add_child("stage-1", "t1");
    child.log(Importance::Info, "step", "info from child", "t2");

    let filtered = root.filter_based_on_importance(Importance::Warn);
    let value = serde_json::to_value(&filtered).unwrap_or_else(|e| panic!("{e}"));
    let events = value["events"].as_array().unwrap_or_else(|| panic!("events not array"));
    // debug event dropped, error event kept, child node kept structurally
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "diagnostic_event");
    assert_eq!(events[0]["data"]["importance"], "ERROR");
    assert_eq!(events[1]["type"], "diagnostic");
    assert_eq!(events[1]["data"]["events"].as_array().unwrap_or_else(|| panic!("")).len(), 0);
}

#[test]
fn round_trip_preserves_label_importance_and_nesting_shape() {
    let root = Diagnostic::root("pipeline", "t0");
    root.log(Importance::Info, "step-a", "started", "t1");
    let child = root.add_child("stage-1", "t2");
    child.log(Importance::Warn, "step-b", "slow", "t3");
    root.set_in_error(true);

    let encoded = serde_json::to_value(&root).unwrap_or_else(|e| panic!("{e}"));
    let decoded = from_value(&encoded).unwrap_or_else(|e| panic!("decode: {e}"));
    let reencoded = serde_json::to_value(&decoded).unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(encoded, reencoded);
    assert_eq!(decoded.label(), "pipeline");
    assert!(decoded.in_error());
}
