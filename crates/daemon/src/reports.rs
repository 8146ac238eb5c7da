//! Reads saved JSON reports back off disk for the `get-reports` RPC,
//! applying the same field-selective projection the upstream server used:
//! `fields` takes priority over `omitted_fields`, and an empty `fields` with
//! an empty `omitted_fields` returns the whole object.
//!
//! The upstream decoder streams the JSON token-by-token so it never
//! allocates the unwanted fields at all. Report files here are small
//! per-pipeline-run documents, not the multi-gigabyte logs that motivated
//! that optimization, so this parses the whole file and then drops keys —
//! simpler, and the cost difference is negligible at this scale.

use jm_core::JerminalError;
use jm_wire::GetReportsParams;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub async fn collect(report_dir: &Path, params: &GetReportsParams) -> Result<Vec<Value>, JerminalError> {
    let paths = candidate_paths(report_dir, params).await?;
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let text = tokio::fs::read_to_string(&path).await?;
        let mut value: Value = serde_json::from_str(&text)?;
        if let Some(min) = params.min_importance {
            value = refilter(value, min)?;
        }
        reports.push(project(value, &params.fields, &params.omitted_fields));
    }
    Ok(reports)
}

async fn candidate_paths(report_dir: &Path, params: &GetReportsParams) -> Result<Vec<PathBuf>, JerminalError> {
    if let Some(id) = &params.pipeline_id {
        let mut found = Vec::new();
        if tokio::fs::metadata(report_dir).await.is_err() {
            return Ok(found);
        }
        let mut dirs = tokio::fs::read_dir(report_dir).await?;
        while let Some(entry) = dirs.next_entry().await? {
            if let Some(name) = &params.pipeline_name {
                if entry.file_name().to_string_lossy() != *name {
                    continue;
                }
            }
            let candidate = entry.path().join(format!("{id}.json"));
            if tokio::fs::metadata(&candidate).await.is_ok() {
                found.push(candidate);
            }
        }
        return Ok(found);
    }

    let dirs_to_scan: Vec<PathBuf> = if let Some(name) = &params.pipeline_name {
        vec![report_dir.join(name)]
    } else {
        let mut all = Vec::new();
        if tokio::fs::metadata(report_dir).await.is_ok() {
            let mut dirs = tokio::fs::read_dir(report_dir).await?;
            while let Some(entry) = dirs.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    all.push(entry.path());
                }
            }
        }
        all
    };

    let mut found = Vec::new();
    for dir in dirs_to_scan {
        if tokio::fs::metadata(&dir).await.is_err() {
            continue;
        }
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                found.push(entry.path());
            }
        }
    }
    Ok(found)
}

fn refilter(mut value: Value, min: jm_diagnostic::Importance) -> Result<Value, JerminalError> {
    let Some(diagnostics) = value.get("diagnostics") else {
        return Ok(value);
    };
    let diagnostic =
        jm_diagnostic::from_value(diagnostics).map_err(|e| JerminalError::Decode(format!("rereading report: {e}")))?;
    let filtered = diagnostic.filter_based_on_importance(min);
    value["diagnostics"] = serde_json::to_value(filtered)?;
    Ok(value)
}

/// Drops object keys not in `fields` (when non-empty) or present in
/// `omitted_fields` (when `fields` is empty). Non-object values pass through
/// unchanged — there's nothing to project.
fn project(value: Value, fields: &[String], omitted_fields: &[String]) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    if fields.is_empty() && omitted_fields.is_empty() {
        return Value::Object(map);
    }
    let kept: serde_json::Map<String, Value> = if !fields.is_empty() {
        map.into_iter().filter(|(k, _)| fields.iter().any(|f| f == k)).collect()
    } else {
        map.into_iter().filter(|(k, _)| !omitted_fields.iter().any(|f| f == k)).collect()
    };
    Value::Object(kept)
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
