//! Handler for the `serve` command.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::websocket;
use crate::error::Result;
use crate::infrastructure::bootstrap::App;

/// Run the relay server until Ctrl+C.
pub async fn execute(app: &App, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Listening", output::highlight(format!("ws://{addr}/ws/<store_id>")));
    output::hint("press Ctrl+C to stop");

    websocket::serve(listener, Arc::clone(&app.relay), async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await
}
