use std::fmt::Display;
use std::future::Future;

use axum::extract::ws::{CloseFrame, Message, close_code};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, info, warn};

use super::actor::HubHandle;
use super::messages::Envelope;
use super::types::{ConnectionId, OutboundMessage};

/// Attach a freshly upgraded duplex channel to the hub and run it to completion.
///
/// The calling task becomes the inbound pump; the outbound pump is spawned.
/// Returns once both have exited and the connection is out of the registry.
pub async fn serve_connection<S, E>(socket: S, hub: HubHandle, queue_capacity: usize)
where
    S: Stream<Item = Result<Message, E>> + Sink<Message> + Send + 'static,
    <S as Sink<Message>>::Error: Display + Send,
    E: Display,
{
    let id = ConnectionId::generate();
    let (ws_tx, ws_rx) = socket.split();
    let (tx, rx) = async_channel::bounded::<OutboundMessage>(queue_capacity);

    if let Err(e) = hub.register(id, tx).await {
        warn!("Could not register {}: {}", id, e);
        return;
    }

    let mut send_task = tokio::spawn(outbound_pump(id, ws_tx, rx));

    let send_finished = {
        let outbound_done = async {
            let _ = (&mut send_task).await;
        };
        inbound_pump(id, ws_rx, &hub, outbound_done).await
    };

    hub.unregister(id).await;

    if !send_finished {
        let _ = send_task.await;
    }
    debug!("Connection {} released", id);
}

/// Read frames from the peer and submit every valid envelope for broadcast.
///
/// Stops on read failure, close frame, end of stream, or when `outbound_done`
/// resolves. Returns true if it stopped because `outbound_done` resolved.
pub(crate) async fn inbound_pump<R, E, F>(
    id: ConnectionId,
    mut ws_rx: R,
    hub: &HubHandle,
    outbound_done: F,
) -> bool
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    F: Future<Output = ()>,
{
    tokio::pin!(outbound_done);

    loop {
        let msg = tokio::select! {
            msg = ws_rx.next() => msg,
            _ = &mut outbound_done => {
                debug!("Outbound side of {} finished, stopping reads", id);
                return true;
            }
        };

        let msg = match msg {
            Some(Ok(m)) => m,
            Some(Err(e)) => {
                warn!("WebSocket error from {}: {}", id, e);
                return false;
            }
            None => {
                debug!("Stream from {} ended", id);
                return false;
            }
        };

        let decoded = match msg {
            Message::Text(text) => Envelope::decode(text.as_str()),
            Message::Binary(data) => Envelope::decode_slice(&data),
            Message::Close(frame) => {
                log_close(id, frame.as_ref());
                return false;
            }
            _ => continue,
        };

        let envelope = match decoded {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping message from {}: {}", id, e);
                continue;
            }
        };

        debug!("Received message from {}: type={:?}", id, envelope.kind);

        let encoded = match envelope.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Dropping message from {}: {}", id, e);
                continue;
            }
        };

        if let Err(e) = hub.broadcast(encoded, id).await {
            warn!("Broadcast from {} failed: {}", id, e);
            return false;
        }
    }
}

/// Write queued frames to the peer in order.
///
/// When the queue is closed and drained a close frame is sent; a failed write
/// ends the pump immediately.
pub(crate) async fn outbound_pump<W>(
    id: ConnectionId,
    mut ws_tx: W,
    rx: async_channel::Receiver<OutboundMessage>,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    while let Ok(msg) = rx.recv().await {
        if let Err(e) = ws_tx.send(Message::Text(msg.into_inner())).await {
            warn!("Write error to {}: {}", id, e);
            return;
        }
    }

    if let Err(e) = ws_tx.send(Message::Close(None)).await {
        debug!("Could not send close frame to {}: {}", id, e);
    }
    let _ = ws_tx.close().await;
}

fn log_close(id: ConnectionId, frame: Option<&CloseFrame>) {
    match frame {
        Some(frame) if !matches!(frame.code, close_code::NORMAL | close_code::AWAY) => {
            info!(
                "Close from {} with code {}: {}",
                id,
                frame.code,
                frame.reason.as_str()
            );
        }
        _ => debug!("Close received from {}", id),
    }
}
