//! WebSocket connection handling
//!
//! Each upgraded socket is split in two. The read half feeds text frames to
//! the core lifecycle manager; the write half is owned by a writer task that
//! drains the connection's outbound queue with a per-frame deadline.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt, future};
use meetcode_core::ConnectionHandle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::AppState;

/// WebSocket upgrade handler for `/session/:session_id`
pub async fn session_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, session_hint: String, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    let cancel = state.shutdown.child_token();
    // Cancelled by shutdown, a failed write, or an overflowing queue
    let (handle, outbound) =
        ConnectionHandle::with_token(state.config.send_queue, cancel.child_token());
    let connection_id = handle.id();

    let mut writer = tokio::spawn(write_loop(
        sender,
        outbound,
        state.config.write_timeout,
        handle.cancel_token(),
    ));

    let reason = state
        .lifecycle
        .run(&session_hint, handle, text_frames(receiver), cancel)
        .await;
    debug!(%connection_id, ?reason, "Read loop finished");

    // The writer stops once every clone of the handle is gone; give it one
    // write deadline to flush what is queued.
    if tokio::time::timeout(state.config.write_timeout, &mut writer)
        .await
        .is_err()
    {
        writer.abort();
    }
}

/// Text frames of a socket; ends at the first close frame
fn text_frames(
    receiver: SplitStream<WebSocket>,
) -> impl Stream<Item = Result<String, axum::Error>> + Unpin {
    receiver
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                Ok(Message::Binary(_)) => {
                    debug!("Ignoring binary frame");
                    None
                }
                // Pings are answered by the socket itself
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
        })
}

/// Drain the outbound queue into the socket
///
/// A failed or timed-out write cancels the connection, which ends its read
/// loop and detaches it from its room.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    write_timeout: Duration,
    cancel: CancellationToken,
) {
    loop {
        let text = tokio::select! {
            _ = cancel.cancelled() => break,
            next = outbound.recv() => match next {
                Some(text) => text,
                None => break,
            },
        };

        match tokio::time::timeout(write_timeout, sender.send(Message::Text(text.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("WebSocket write failed: {}", e);
                cancel.cancel();
                break;
            }
            Err(_) => {
                warn!("WebSocket write timed out after {:?}", write_timeout);
                cancel.cancel();
                break;
            }
        }
    }

    let _ = sender.close().await;
}
