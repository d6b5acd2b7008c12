use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::core::telemetry::TelemetryStore;
use crate::{FleetError, Result};

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Long-running websocket ingest task with a fixed reconnect backoff.
pub(super) async fn feed_task(
    store: Arc<TelemetryStore>,
    url: Url,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            result = pump_connection(&store, &url) => {
                match result {
                    Ok(()) => log::info!("Telemetry feed closed, reconnecting"),
                    Err(e) => log::warn!("Telemetry feed error: {}, reconnecting", e),
                }
                tokio::select! {
                    _ = shutdown.recv() => break,
                    _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                }
            }
        }
    }
    log::debug!("Feed task shutting down");
}

/// One connection lifetime: connect, then forward every text frame.
///
/// Frames the store cannot parse are its problem to log and drop; nothing
/// here tears the connection down over a bad payload.
async fn pump_connection(store: &TelemetryStore, url: &Url) -> Result<()> {
    let (mut stream, _) = connect_async(url.as_str())
        .await
        .map_err(|e| FleetError::transport(e.to_string()))?;
    log::info!("Connected to telemetry feed at {}", url);

    while let Some(message) = stream.next().await {
        let message = message.map_err(|e| FleetError::transport(e.to_string()))?;
        match message {
            Message::Text(text) => store.ingest_json(text.as_str()),
            Message::Close(_) => break,
            // Pings are answered by the protocol layer; binary frames are
            // not part of the snapshot feed.
            _ => {}
        }
    }
    Ok(())
}
