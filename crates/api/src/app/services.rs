//! Service wiring: turn an `AppConfig` into a ready recorder.

use std::sync::Arc;

use anyhow::Context;

use taxbridge_infra::{
    AppConfig, HttpStockMasterClient, JsonFileLedgerStore, LedgerStore, StockMovementRecorder,
};

/// Recorder as shared by handlers and the CLI.
pub type Recorder = StockMovementRecorder<Arc<dyn LedgerStore>>;
pub type SharedRecorder = Arc<Recorder>;

/// Build the recorder for the configured scope.
///
/// Must run outside an async context: the stock master client is blocking.
pub fn build_recorder(config: &AppConfig) -> anyhow::Result<SharedRecorder> {
    let scope = config.scope().context("invalid ledger scope")?;
    let store: Arc<dyn LedgerStore> = Arc::new(JsonFileLedgerStore::new(scope.clone(), &config.ledger.path));
    let mut recorder = StockMovementRecorder::new(store);

    if config.sync.enabled {
        let client = HttpStockMasterClient::new(&config.api.base_url, &config.api.cmc_key, config.sync.timeout())
            .context("failed to build stock master client")?;
        tracing::info!(endpoint = %client.endpoint(), "stock master sync enabled");
        recorder = recorder.with_sync(Arc::new(client));
    } else {
        tracing::info!("stock master sync disabled");
    }

    tracing::info!(
        scope = %scope,
        ledger = %config.ledger.path.display(),
        "stock ledger ready"
    );
    Ok(Arc::new(recorder))
}
