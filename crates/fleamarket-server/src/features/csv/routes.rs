//! CSV import routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::json;

use super::commands::process::{handle as handle_process, ProcessCsvCommand};
use crate::error::AppResult;
use crate::features::FeatureState;

/// Create csv routes
pub fn csv_routes() -> Router<FeatureState> {
    Router::new().route("/process", post(process_csv))
}

/// Import the configured customer file
///
/// POST /csv/process
async fn process_csv(State(state): State<FeatureState>) -> AppResult<impl IntoResponse> {
    let command = ProcessCsvCommand {
        file_path: state.import_file.clone(),
    };

    let response = handle_process(&state.pipeline, state.shutdown.clone(), command).await?;

    Ok((StatusCode::OK, Json(json!({ "message": response.message }))))
}
