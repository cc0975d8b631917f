use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use taxbridge_infra::RecordError;
use taxbridge_stock::{MovementRecord, PurchaseTransaction, SaleTransaction};

use crate::app::dto::{BalanceView, Envelope};
use crate::app::errors;
use crate::app::services::{Recorder, SharedRecorder};

pub fn router() -> Router {
    Router::new()
        .route("/movements", get(list_movements))
        .route("/movements/sales", post(record_sale))
        .route("/movements/purchases", post(record_purchase))
        .route("/movements/:sar_no", get(get_movement))
        .route("/movements/:sar_no/reversal", post(reverse_movement))
        .route("/movements/:sar_no/sync", post(resync_movement))
        .route("/balances", get(list_balances))
        .route("/balances/:item_cd", get(get_balance))
}

/// Run a recorder call on the blocking pool; ledger IO and sync are synchronous.
async fn blocking<T, F>(recorder: SharedRecorder, f: F) -> Result<T, axum::response::Response>
where
    T: Send + 'static,
    F: FnOnce(&Recorder) -> Result<T, RecordError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&recorder))
        .await
        .map_err(|e| errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string()))?
        .map_err(errors::record_error_to_response)
}

fn created(record: MovementRecord) -> axum::response::Response {
    (StatusCode::CREATED, Json(Envelope::ok(record))).into_response()
}

pub async fn record_sale(
    Extension(recorder): Extension<SharedRecorder>,
    Json(body): Json<SaleTransaction>,
) -> axum::response::Response {
    match blocking(recorder, move |r| r.record_sale(&body)).await {
        Ok(record) => created(record),
        Err(resp) => resp,
    }
}

pub async fn record_purchase(
    Extension(recorder): Extension<SharedRecorder>,
    Json(body): Json<PurchaseTransaction>,
) -> axum::response::Response {
    match blocking(recorder, move |r| r.record_purchase(&body)).await {
        Ok(record) => created(record),
        Err(resp) => resp,
    }
}

pub async fn list_movements(Extension(recorder): Extension<SharedRecorder>) -> axum::response::Response {
    match blocking(recorder, |r| r.movements()).await {
        Ok(records) => Json(Envelope::ok(records)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_movement(
    Extension(recorder): Extension<SharedRecorder>,
    Path(sar_no): Path<u64>,
) -> axum::response::Response {
    match blocking(recorder, move |r| r.movement(sar_no)).await {
        Ok(record) => Json(Envelope::ok(record)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn reverse_movement(
    Extension(recorder): Extension<SharedRecorder>,
    Path(sar_no): Path<u64>,
) -> axum::response::Response {
    match blocking(recorder, move |r| r.reverse_movement(sar_no)).await {
        Ok(record) => created(record),
        Err(resp) => resp,
    }
}

pub async fn resync_movement(
    Extension(recorder): Extension<SharedRecorder>,
    Path(sar_no): Path<u64>,
) -> axum::response::Response {
    match blocking(recorder, move |r| r.resync_movement(sar_no)).await {
        Ok(record) => Json(Envelope::ok(record)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn list_balances(Extension(recorder): Extension<SharedRecorder>) -> axum::response::Response {
    let result = blocking(recorder, |r| Ok(r.balances().balances()?)).await;
    match result {
        Ok(balances) => {
            let views: Vec<BalanceView> = balances
                .into_iter()
                .map(|(item_cd, quantity)| BalanceView { item_cd, quantity })
                .collect();
            Json(Envelope::ok(views)).into_response()
        }
        Err(resp) => resp,
    }
}

pub async fn get_balance(
    Extension(recorder): Extension<SharedRecorder>,
    Path(item_cd): Path<String>,
) -> axum::response::Response {
    let lookup = item_cd.clone();
    match blocking(recorder, move |r| Ok(r.balances().current_stock(&lookup)?)).await {
        Ok(quantity) => Json(Envelope::ok(BalanceView { item_cd, quantity })).into_response(),
        Err(resp) => resp,
    }
}
