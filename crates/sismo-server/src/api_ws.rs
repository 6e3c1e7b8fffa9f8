//! WebSocket subscriber sessions.
//!
//! Each upgraded connection becomes a hub session served by two tasks:
//!
//! - a writer that drains the session's private queue onto the socket and
//!   sends a ping whenever the keepalive period elapses with nothing queued;
//! - a reader whose only job is liveness: any inbound frame (pongs included)
//!   extends the read deadline, and a close, error or missed deadline ends
//!   the session.
//!
//! Whichever task stops first unregisters the session. Once the hub closes
//! the queue, the writer flushes what is already queued, sends a close frame
//! and exits.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};

use crate::hub::{Hub, Payload, SessionId};
use crate::AppState;

/// Time allowed to write a single frame to the peer.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

/// Time allowed between inbound frames before the peer is considered gone.
pub const PONG_WAIT: Duration = Duration::from_secs(60);

/// Keepalive period. Must be shorter than [`PONG_WAIT`].
pub const PING_PERIOD: Duration = Duration::from_secs(54);

/// Maximum inbound message size. Subscribers only ever send control frames.
pub const MAX_MESSAGE_SIZE: usize = 512;

/// Handler for `GET /ws`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| serve_session(socket, hub))
}

/// Runs one subscriber session to completion.
pub async fn serve_session(socket: WebSocket, hub: Hub) {
    let subscription = hub.subscribe();
    let id = subscription.id;
    let (sink, stream) = socket.split();

    let mut writer = tokio::spawn(write_pump(id, sink, subscription.queue));
    let mut reader = tokio::spawn(read_pump(id, stream));

    let writer_finished = tokio::select! {
        _ = &mut writer => {
            reader.abort();
            true
        }
        _ = &mut reader => false,
    };

    hub.unregister(id);

    if !writer_finished {
        let abort = writer.abort_handle();
        if time::timeout(WRITE_WAIT, writer).await.is_err() {
            tracing::debug!(session_id = %id, "writer did not drain in time");
            abort.abort();
        }
    }
}

async fn write_pump(
    id: SessionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: mpsc::Receiver<Payload>,
) {
    let mut keepalive = time::interval_at(Instant::now() + PING_PERIOD, PING_PERIOD);

    loop {
        tokio::select! {
            biased;

            next = queue.recv() => {
                let Some(payload) = next else {
                    // Queue closed by the hub: say goodbye and stop.
                    let _ = send_frame(&mut sink, Message::Close(None)).await;
                    tracing::debug!(session_id = %id, "session queue closed");
                    return;
                };
                if !send_frame(&mut sink, Message::Text(payload.as_ref().into())).await {
                    tracing::debug!(session_id = %id, "write failed; ending session");
                    return;
                }
            }
            _ = keepalive.tick() => {
                if !send_frame(&mut sink, Message::Ping(Bytes::new())).await {
                    tracing::debug!(session_id = %id, "ping failed; ending session");
                    return;
                }
            }
        }
    }
}

/// Sends one frame within [`WRITE_WAIT`]. Returns `false` on error or timeout.
async fn send_frame(sink: &mut SplitSink<WebSocket, Message>, frame: Message) -> bool {
    matches!(time::timeout(WRITE_WAIT, sink.send(frame)).await, Ok(Ok(())))
}

async fn read_pump(id: SessionId, mut stream: SplitStream<WebSocket>) {
    loop {
        match time::timeout(PONG_WAIT, stream.next()).await {
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                tracing::debug!(session_id = %id, "peer closed the connection");
                return;
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => {
                tracing::debug!(session_id = %id, error = %e, "websocket read error");
                return;
            }
            Err(_) => {
                tracing::info!(session_id = %id, "no frame within read deadline; dropping peer");
                return;
            }
        }
    }
}
