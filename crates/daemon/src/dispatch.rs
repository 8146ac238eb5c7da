//! Maps a decoded [`jm_wire::Request`] onto a [`PipelineStore`] operation and
//! builds the matching [`jm_wire::Response`].

use crate::reports;
use jm_core::JerminalError;
use jm_engine::PipelineStore;
use jm_wire::{
    ActivePipeline, CancelPipelineParams, ErrorData, GetReportsParams, GetReportsResult, LaunchPipelineParams,
    LaunchPipelineResult, ListPipelinesParams, ListPipelinesResult, Request, Response, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND,
};

pub async fn dispatch(request: Request, store: &PipelineStore) -> Response {
    let id = request.id;
    let result = match request.method.as_str() {
        "launch-pipeline" => launch_pipeline(request.params, store),
        "cancel-pipeline" => cancel_pipeline(request.params, store),
        "list-pipelines" => list_pipelines(request.params, store),
        "get-reports" => return get_reports(id, request.params, store).await,
        other => Err(ErrorData::new(METHOD_NOT_FOUND, format!("unknown method `{other}`"))),
    };
    match result {
        Ok(value) => Response::success(id, value),
        Err(e) => Response::error(Some(id), e),
    }
}

fn invalid_params(e: serde_json::Error) -> ErrorData {
    ErrorData::new(INVALID_PARAMS, format!("invalid params: {e}"))
}

fn to_error_data(e: JerminalError) -> ErrorData {
    match e {
        JerminalError::NotFound(msg) => ErrorData::new(jm_wire::INVALID_PARAMS, msg),
        JerminalError::Unauthorized(msg) => ErrorData::new(INTERNAL_ERROR, msg),
        other => ErrorData::new(INTERNAL_ERROR, other.to_string()),
    }
}

fn launch_pipeline(params: serde_json::Value, store: &PipelineStore) -> Result<serde_json::Value, ErrorData> {
    let params: LaunchPipelineParams = serde_json::from_value(params).map_err(invalid_params)?;
    let (pipeline_id, _handle) = store.begin_pipeline(&params.name).map_err(to_error_data)?;
    serde_json::to_value(LaunchPipelineResult {
        pipeline_id: pipeline_id.to_string(),
    })
    .map_err(|e| ErrorData::new(INTERNAL_ERROR, e.to_string()))
}

fn cancel_pipeline(params: serde_json::Value, store: &PipelineStore) -> Result<serde_json::Value, ErrorData> {
    let params: CancelPipelineParams = serde_json::from_value(params).map_err(invalid_params)?;
    let pipeline_id = jm_engine::PipelineId::new(params.pipeline_id);
    store.cancel_pipeline(&pipeline_id, &params.secret).map_err(to_error_data)?;
    Ok(serde_json::json!({}))
}

fn list_pipelines(params: serde_json::Value, store: &PipelineStore) -> Result<serde_json::Value, ErrorData> {
    let params: ListPipelinesParams = serde_json::from_value(params).map_err(invalid_params)?;
    let active = store
        .active()
        .into_iter()
        .map(|(id, name)| ActivePipeline { id: id.to_string(), name })
        .collect();
    let templates = if params.active_only { Vec::new() } else { store.template_names() };
    serde_json::to_value(ListPipelinesResult { templates, active })
        .map_err(|e| ErrorData::new(INTERNAL_ERROR, e.to_string()))
}

async fn get_reports(id: u64, params: serde_json::Value, store: &PipelineStore) -> Response {
    let params: GetReportsParams = match serde_json::from_value(params) {
        Ok(p) => p,
        Err(e) => return Response::error(Some(id), invalid_params(e)),
    };
    match reports::collect(store.report_dir(), &params).await {
        Ok(reports) => match serde_json::to_value(GetReportsResult { reports }) {
            Ok(v) => Response::success(id, v),
            Err(e) => Response::error(Some(id), ErrorData::new(INTERNAL_ERROR, e.to_string())),
        },
        Err(e) => Response::error(Some(id), to_error_data(e)),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
