//! WebSocket front end for the log relay.
//!
//! Clients connect to `/ws/<store_id>` and receive one text frame per log
//! line. A successful run ends with `PROVISIONING_COMPLETE` followed by a
//! JSON frame holding the connection details; a failed one with
//! `PROVISIONING_FAILED`. Unknown stores are closed with code 4004.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};
use tracing::{debug, error, info, warn, Instrument};

use crate::application::relay::LogRelay;
use crate::domain::StoreId;
use crate::error::Result;
use crate::port::inbound::relay::{
    RelayMessage, RelaySink, PROVISIONING_COMPLETE, PROVISIONING_FAILED,
};

/// Close code sent when the requested store does not exist.
pub const STORE_NOT_FOUND: u16 = 4004;

const STORE_NOT_FOUND_REASON: &str = "Store not found";

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Each connection runs on its own task; sessions in flight are not
/// interrupted by shutdown.
pub async fn serve<F>(listener: TcpListener, relay: Arc<LogRelay>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let local = listener.local_addr()?;
    info!(addr = %local, "relay server listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("relay server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let relay = Arc::clone(&relay);
                let span = tracing::info_span!("session", %peer);
                tokio::spawn(
                    async move {
                        if let Err(e) = handle_connection(stream, peer, &relay).await {
                            error!(error = %e, "relay session failed");
                        }
                    }
                    .instrument(span),
                );
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, relay: &LogRelay) -> Result<()> {
    let mut path = String::new();
    let ws = accept_hdr_async(
        stream,
        |req: &Request, resp: Response| -> std::result::Result<Response, ErrorResponse> {
            path = req.uri().path().to_string();
            Ok(resp)
        },
    )
    .await?;
    debug!(%peer, path = %path, "websocket connected");

    let mut sink = WebSocketSink { ws };
    match store_id_from_path(&path) {
        Some(id) => relay.relay(&id, &mut sink).await?,
        None => {
            debug!(path = %path, "no store id in request path");
            sink.send(RelayMessage::NotFound).await?;
        }
    }

    // The peer may already be gone; closing is best-effort.
    let _ = sink.ws.close(None).await;
    Ok(())
}

/// Extract the store id from a path ending in `/ws/<store_id>`.
fn store_id_from_path(path: &str) -> Option<StoreId> {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let id = segments.next()?;
    if segments.next()? != "ws" {
        return None;
    }
    StoreId::parse(id).ok()
}

struct WebSocketSink {
    ws: WebSocketStream<TcpStream>,
}

#[async_trait]
impl RelaySink for WebSocketSink {
    async fn send(&mut self, message: RelayMessage) -> Result<()> {
        match message {
            RelayMessage::Line(text) => self.ws.send(Message::Text(text)).await?,
            RelayMessage::Complete(details) => {
                let json = serde_json::to_string(&details)?;
                self.ws
                    .send(Message::Text(PROVISIONING_COMPLETE.to_string()))
                    .await?;
                self.ws.send(Message::Text(json)).await?;
            }
            RelayMessage::Failed => {
                self.ws
                    .send(Message::Text(PROVISIONING_FAILED.to_string()))
                    .await?;
            }
            RelayMessage::NotFound => {
                let frame = CloseFrame {
                    code: CloseCode::from(STORE_NOT_FOUND),
                    reason: STORE_NOT_FOUND_REASON.into(),
                };
                self.ws.close(Some(frame)).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_id_is_last_segment_after_ws() {
        let id = StoreId::new();
        assert_eq!(store_id_from_path(&format!("/ws/{id}")), Some(id.clone()));
        assert_eq!(
            store_id_from_path(&format!("/api/stores/ws/{id}/")),
            Some(id)
        );
    }

    #[test]
    fn malformed_paths_have_no_store_id() {
        assert_eq!(store_id_from_path("/"), None);
        assert_eq!(store_id_from_path("/ws/"), None);
        assert_eq!(store_id_from_path("/ws/not-a-uuid"), None);
        assert_eq!(
            store_id_from_path(&format!("/logs/{}", StoreId::new())),
            None
        );
    }
}
