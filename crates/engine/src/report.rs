//! Report sink (C12): writes a finished pipeline's diagnostic tree to disk,
//! filtered to the template's configured log level.

use crate::pipeline::RunningPipeline;
use jm_core::{Importance, JerminalError};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Json,
    Html,
    Sqlite,
}

/// Bundles the report directory with the set of report types and the log
/// level a template declared, so `execute_pipeline` can call `write` without
/// needing to thread the template through separately.
pub struct ReportSink {
    report_dir: PathBuf,
    types: Vec<ReportType>,
    log_level: Importance,
}

impl ReportSink {
    pub fn new(report_dir: PathBuf, types: Vec<ReportType>, log_level: Importance) -> Self {
        Self {
            report_dir,
            types,
            log_level,
        }
    }

    pub async fn write(&self, pipeline: &RunningPipeline) -> Result<(), JerminalError> {
        for ty in &self.types {
            match ty {
                ReportType::Json => self.write_json(pipeline).await?,
                ReportType::Html => {
                    return Err(JerminalError::Internal("html reports are not yet supported".into()))
                }
                ReportType::Sqlite => {
                    return Err(JerminalError::Internal("sqlite reports are not yet supported".into()))
                }
            }
        }
        Ok(())
    }

    async fn write_json(&self, pipeline: &RunningPipeline) -> Result<(), JerminalError> {
        let dir = self.report_dir.join(&pipeline.name);
        tokio::fs::create_dir_all(&dir).await?;

        let filtered = pipeline.diagnostic_root().filter_based_on_importance(self.log_level);
        let elapsed = (chrono::Utc::now() - pipeline.start_time).num_milliseconds() as f64 / 1000.0;

        let report = serde_json::json!({
            "name": pipeline.name,
            "agent": pipeline.agent.id().as_str(),
            "id": pipeline.id.to_string(),
            "parent": pipeline.clone_from,
            "time-ran": pipeline.time_ran(),
            "in-error": pipeline.in_error(),
            "start-time": pipeline.start_time.to_rfc3339(),
            "diagnostics": filtered,
            "elapsed-time": elapsed,
        });
        let text = serde_json::to_string_pretty(&report)?;

        let path = dir.join(format!("{}.json", pipeline.id));
        tokio::fs::write(path, text).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
