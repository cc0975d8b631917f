use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taxbridge_infra::RecordError;

use crate::app::dto::{Envelope, PartialSuccess, ShortageView, SyncFailureView};

pub fn record_error_to_response(err: RecordError) -> axum::response::Response {
    match err {
        RecordError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        RecordError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        RecordError::InsufficientStock(short) => {
            let body = Envelope {
                result_cd: "insufficient_stock".to_string(),
                result_msg: short.to_string(),
                data: Some(ShortageView::from(short)),
            };
            (StatusCode::CONFLICT, axum::Json(body)).into_response()
        }
        RecordError::SequenceConflict(c) => json_error(StatusCode::CONFLICT, "sequence_conflict", c.to_string()),
        RecordError::Storage(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string()),
        RecordError::Sync { ref record, ref failures } => {
            let body = Envelope {
                result_cd: "sync_failed".to_string(),
                result_msg: err.to_string(),
                data: Some(PartialSuccess {
                    movement: record,
                    sync_failures: failures.iter().map(SyncFailureView::from).collect(),
                }),
            };
            (StatusCode::MULTI_STATUS, axum::Json(body)).into_response()
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "resultCd": code,
            "resultMsg": message.into(),
            "data": null,
        })),
    )
        .into_response()
}
