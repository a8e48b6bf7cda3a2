//! End-to-end tests driving a real server over WebSocket clients.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use sixstone_protocol::{ClientRequest, GameId, Point, ServerPush, Stone};
use sixstone_server::{SixstoneServer, SixstoneServerBuilder};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = SixstoneServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode(request: &ClientRequest) -> Message {
    let bytes = serde_json::to_vec(request).expect("encode");
    Message::Binary(bytes.into())
}

/// Receives the next data frame and decodes it as a push.
async fn recv_push(ws: &mut ClientWs) -> ServerPush {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for push")
            .expect("stream ended")
            .expect("recv failed");
        match msg {
            Message::Binary(data) => return serde_json::from_slice(&data).expect("decode"),
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("decode")
            }
            _ => continue,
        }
    }
}

/// Receives pushes until one matches the predicate.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&ServerPush) -> bool) -> ServerPush {
    for _ in 0..20 {
        let push = recv_push(ws).await;
        if pred(&push) {
            return push;
        }
    }
    panic!("no matching push within 20 frames");
}

/// Creates a game and joins it, returning the game id.
async fn create_and_join(ws: &mut ClientWs) -> GameId {
    ws.send(encode(&ClientRequest::CreateGame)).await.unwrap();
    let ServerPush::GameCreated { game_id } = recv_push(ws).await else {
        panic!("expected GameCreated");
    };
    ws.send(encode(&ClientRequest::JoinGame {
        game_id: game_id.clone(),
    }))
    .await
    .unwrap();
    recv_until(ws, |p| matches!(p, ServerPush::ConnectionCount { .. })).await;
    game_id
}

#[tokio::test]
async fn test_create_game_replies_with_id() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientRequest::CreateGame)).await.unwrap();

    match recv_push(&mut ws).await {
        ServerPush::GameCreated { game_id } => {
            assert_eq!(game_id.as_str().len(), 8);
        }
        other => panic!("expected GameCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_unknown_game_pushes_not_found() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientRequest::JoinGame {
        game_id: GameId::new("deadbeef"),
    }))
    .await
    .unwrap();

    assert_eq!(recv_push(&mut ws).await, ServerPush::GameNotFound);
}

#[tokio::test]
async fn test_join_pushes_board_state_then_count() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientRequest::CreateGame)).await.unwrap();
    let ServerPush::GameCreated { game_id } = recv_push(&mut ws).await else {
        panic!("expected GameCreated");
    };

    ws.send(encode(&ClientRequest::JoinGame { game_id })).await.unwrap();

    match recv_push(&mut ws).await {
        ServerPush::BoardState {
            current_turn,
            current_turn_remaining,
            board,
            sound_cue,
            last_play,
            ..
        } => {
            assert_eq!(current_turn, Stone::Black);
            assert_eq!(current_turn_remaining, 1);
            assert_eq!(sound_cue, None);
            assert_eq!(last_play, Point::NONE);
            assert_eq!(board.lines().count(), 19);
        }
        other => panic!("expected BoardState, got {other:?}"),
    }
    assert_eq!(
        recv_push(&mut ws).await,
        ServerPush::ConnectionCount { count: 1 }
    );
}

#[tokio::test]
async fn test_second_join_broadcasts_to_both_members() {
    let addr = start_server().await;
    let mut ws1 = connect(&addr).await;
    let game_id = create_and_join(&mut ws1).await;

    let mut ws2 = connect(&addr).await;
    ws2.send(encode(&ClientRequest::JoinGame {
        game_id: game_id.clone(),
    }))
    .await
    .unwrap();

    for ws in [&mut ws1, &mut ws2] {
        let push = recv_until(ws, |p| matches!(p, ServerPush::ConnectionCount { .. })).await;
        assert_eq!(push, ServerPush::ConnectionCount { count: 2 });
    }
}

#[tokio::test]
async fn test_place_stone_broadcasts_updated_state() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let game_id = create_and_join(&mut ws).await;

    ws.send(encode(&ClientRequest::PlaceStone {
        game_id,
        x: 9,
        y: 9,
    }))
    .await
    .unwrap();

    match recv_push(&mut ws).await {
        ServerPush::BoardState {
            current_turn,
            current_turn_remaining,
            sound_cue,
            last_play,
            last_last_play,
            ..
        } => {
            assert_eq!(current_turn, Stone::White);
            assert_eq!(current_turn_remaining, 2);
            assert_eq!(sound_cue.as_deref(), Some("place_stone"));
            assert_eq!(last_play, Point { x: 9, y: 9 });
            assert_eq!(last_last_play, Point::NONE);
        }
        other => panic!("expected BoardState, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undo_then_reset_round_trip() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let game_id = create_and_join(&mut ws).await;

    ws.send(encode(&ClientRequest::PlaceStone {
        game_id: game_id.clone(),
        x: 3,
        y: 3,
    }))
    .await
    .unwrap();
    recv_push(&mut ws).await;

    ws.send(encode(&ClientRequest::UndoStone {
        game_id: game_id.clone(),
    }))
    .await
    .unwrap();
    match recv_push(&mut ws).await {
        ServerPush::BoardState {
            current_turn,
            last_play,
            ..
        } => {
            assert_eq!(current_turn, Stone::Black);
            assert_eq!(last_play, Point::NONE);
        }
        other => panic!("expected BoardState, got {other:?}"),
    }

    ws.send(encode(&ClientRequest::ResetGame { game_id })).await.unwrap();
    assert!(matches!(
        recv_push(&mut ws).await,
        ServerPush::BoardState {
            current_turn: Stone::Black,
            current_turn_remaining: 1,
            ..
        }
    ));
}

#[tokio::test]
async fn test_text_frames_are_accepted() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text(r#"{"type":"CreateGame"}"#.into()))
        .await
        .unwrap();

    assert!(matches!(
        recv_push(&mut ws).await,
        ServerPush::GameCreated { .. }
    ));
}

#[tokio::test]
async fn test_garbage_frames_are_skipped() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(b"not json".to_vec().into()))
        .await
        .unwrap();

    // The connection survives; the next valid request still works.
    ws.send(encode(&ClientRequest::CreateGame)).await.unwrap();
    assert!(matches!(
        recv_push(&mut ws).await,
        ServerPush::GameCreated { .. }
    ));
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_member() {
    let addr = start_server().await;
    let mut ws1 = connect(&addr).await;
    let game_id = create_and_join(&mut ws1).await;

    let mut ws2 = connect(&addr).await;
    ws2.send(encode(&ClientRequest::JoinGame { game_id })).await.unwrap();
    recv_until(&mut ws1, |p| *p == ServerPush::ConnectionCount { count: 2 }).await;

    ws2.close(None).await.unwrap();

    let push = recv_until(&mut ws1, |p| {
        matches!(p, ServerPush::ConnectionCount { count: 1 })
    })
    .await;
    assert_eq!(push, ServerPush::ConnectionCount { count: 1 });
}

#[tokio::test]
async fn test_register_admin_receives_event_log() {
    let addr = start_server().await;

    let mut player = connect(&addr).await;
    let game_id = create_and_join(&mut player).await;

    let mut admin = connect(&addr).await;
    admin
        .send(encode(&ClientRequest::RegisterAdmin))
        .await
        .unwrap();

    match recv_push(&mut admin).await {
        ServerPush::ServerLog { lines } => {
            assert_eq!(lines.len(), 2);
            assert!(lines[0].contains("New game made"));
            assert!(lines[1].contains("New user connected to game"));
            assert!(lines.iter().all(|l| l.contains(game_id.as_str())));
        }
        other => panic!("expected ServerLog, got {other:?}"),
    }

    // Subsequent events stream to the admin as fresh log snapshots.
    player
        .send(encode(&ClientRequest::PlaceStone {
            game_id,
            x: 4,
            y: 12,
        }))
        .await
        .unwrap();
    match recv_push(&mut admin).await {
        ServerPush::ServerLog { lines } => {
            assert!(lines.last().unwrap().contains("User placed stone (04, 12)"));
        }
        other => panic!("expected ServerLog, got {other:?}"),
    }
}

#[tokio::test]
async fn test_shutdown_with_wrong_key_is_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    // No admin key is configured, so any key is rejected and the
    // server keeps serving.
    ws.send(encode(&ClientRequest::Shutdown {
        admin_key: "guess".into(),
    }))
    .await
    .unwrap();

    ws.send(encode(&ClientRequest::CreateGame)).await.unwrap();
    assert!(matches!(
        recv_push(&mut ws).await,
        ServerPush::GameCreated { .. }
    ));
}

#[tokio::test]
async fn test_builder_default_is_usable() {
    let server = SixstoneServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");
    assert!(server.local_addr().is_ok());
}
