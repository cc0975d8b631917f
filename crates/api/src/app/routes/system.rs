use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::SharedRecorder;

pub async fn health(Extension(recorder): Extension<SharedRecorder>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "scope": recorder.scope().to_string(),
    }))
}
