//! Invocation wrapper around a [`RunController`] run.
//!
//! Scheduled invocations expect a status code and a JSON body rather than a
//! process exit code. A successful run answers `200` with
//! `{"message": "Success"}`; a failed run is logged with its cause chain and
//! answers `500` with `{"error": ..., "traceback": ...}`.

use serde::Serialize;
use serde_json::json;

use crate::{Res, controller::RunController, failure, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    /// JSON-encoded body, as expected by function-style invocations.
    pub body: String,
}

impl InvocationResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.body.clone())
    }
}

/// Runs the controller once and maps the outcome to a response.
pub async fn invoke(controller: &RunController) -> InvocationResponse {
    respond(controller.run().await.map(|report| {
        info!(
            "Run finished: {} processed, {} skipped.",
            report.processed.len(),
            report.skipped.len()
        );
    }))
}

pub fn respond(result: Res<()>) -> InvocationResponse {
    match result {
        Ok(()) => InvocationResponse {
            status_code: 200,
            body: json!({ "message": "Success" }).to_string(),
        },
        Err(e) => {
            let trace = e.trace();
            failure!("{}", trace);
            InvocationResponse {
                status_code: 500,
                body: json!({ "error": e.to_string(), "traceback": trace }).to_string(),
            }
        }
    }
}
