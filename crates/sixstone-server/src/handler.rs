//! Per-connection handler: decode requests, dispatch to the hub,
//! forward broadcast pushes back out.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler, plus a writer task draining that connection's push
//! channel. The handler never holds the hub lock across network I/O.

use std::sync::Arc;

use sixstone_protocol::{ClientRequest, Codec, ConnectionId};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::{ServerError, WsConnection};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WsConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let (mut writer, mut reader) = conn.split();

    // Register the push channel before any request can be issued, so
    // no reply is ever dropped on the floor.
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.hub.attach(conn_id, tx).await;

    // Writer task: drains the push channel onto the socket. Ends when
    // the hub drops the sender (on disconnect) and the channel is
    // exhausted.
    let codec = state.codec;
    tokio::spawn(async move {
        while let Some(push) = rx.recv().await {
            let bytes = match codec.encode(&push) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "failed to encode push");
                    continue;
                }
            };
            if writer.send(&bytes).await.is_err() {
                break;
            }
        }
        writer.close().await;
    });

    loop {
        match reader.recv().await {
            Ok(Some(data)) => {
                let request: ClientRequest = match state.codec.decode(&data) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "undecodable request skipped");
                        continue;
                    }
                };
                dispatch(&state, conn_id, request).await;
            }
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        }
    }

    // Dropping the connection's sender here lets the writer task run
    // to completion on its own.
    state.hub.disconnect(conn_id).await;
    Ok(())
}

/// Routes one decoded request to the hub. Rejections are logged, never
/// fatal to the connection — the requester already got its push (e.g.
/// `GameNotFound`) where the protocol calls for one.
async fn dispatch(state: &Arc<ServerState>, conn: ConnectionId, request: ClientRequest) {
    let result = match request {
        ClientRequest::CreateGame => {
            state.hub.create_game(conn).await;
            Ok(())
        }
        ClientRequest::JoinGame { game_id } => state.hub.join_game(conn, &game_id).await,
        ClientRequest::PlaceStone { game_id, x, y } => {
            state.hub.place_stone(conn, &game_id, x, y).await
        }
        ClientRequest::UndoStone { game_id } => state.hub.undo_stone(conn, &game_id).await,
        ClientRequest::ResetGame { game_id } => state.hub.reset_game(conn, &game_id).await,
        ClientRequest::RegisterAdmin => {
            state.hub.register_admin(conn).await;
            Ok(())
        }
        ClientRequest::Shutdown { admin_key } => {
            match state.hub.shutdown(&admin_key).await {
                Ok(()) => {
                    tracing::warn!(%conn, "shutdown accepted, state saved, exiting");
                    std::process::exit(0);
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        tracing::debug!(%conn, error = %e, "request rejected");
    }
}
