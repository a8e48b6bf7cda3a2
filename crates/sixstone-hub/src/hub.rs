//! The hub itself: registry state plus the client-facing operations.
//!
//! Every public operation locks the registry once, mutates, queues its
//! broadcasts, and releases. Outbound pushes go through per-connection
//! unbounded senders; a send to a gone receiver is silently dropped
//! (the disconnect cleanup will catch up with it).

use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use sixstone_game::GameSession;
use sixstone_protocol::{ConnectionId, GameId, PLACE_STONE_CUE, ServerPush};
use tokio::sync::{Mutex, mpsc};

use crate::{HubConfig, HubError, Store};

/// Channel sender for delivering pushes to one connection.
pub type ClientSender = mpsc::UnboundedSender<ServerPush>;

/// Process-lifetime totals. Never reset except by reloading a
/// persisted snapshot at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Games ever created.
    pub total_games: u64,
    /// Join operations ever handled.
    pub total_connections: u64,
    /// Games that ever reached two concurrent members.
    pub total_multiplayer: u64,
}

/// The shared registry state. Only ever touched under the hub's lock.
#[derive(Default)]
struct Registry {
    /// Active games, keyed by game id.
    games: HashMap<GameId, GameSession>,

    /// Connections currently joined to each game.
    members: HashMap<GameId, HashSet<ConnectionId>>,

    /// Maps each connection to the game it is in. A connection is in
    /// at most ONE game at a time (key invariant) — this is the O(1)
    /// index for disconnect cleanup.
    owner_of: HashMap<ConnectionId, GameId>,

    /// Outbound channel for every attached connection.
    senders: HashMap<ConnectionId, ClientSender>,

    /// Connections observing the admin log.
    admins: HashSet<ConnectionId>,

    /// Bounded FIFO of recent event lines, oldest first.
    admin_log: VecDeque<String>,

    /// Games whose multiplayer milestone has already been counted, so
    /// a group that drops to one member and refills doesn't count twice.
    multiplayer_seen: HashSet<GameId>,

    counters: Counters,
}

impl Registry {
    /// Sends a push to a single connection. Silently drops if the
    /// receiver is gone.
    fn send_to(&self, conn: ConnectionId, push: ServerPush) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(push);
        }
    }

    /// Sends a push to every member of a game's group.
    fn broadcast(&self, game: &GameId, push: ServerPush) {
        if let Some(members) = self.members.get(game) {
            for conn in members {
                self.send_to(*conn, push.clone());
            }
        }
    }

    /// Sends the current admin log to every admin observer.
    fn broadcast_log(&self) {
        let push = ServerPush::ServerLog {
            lines: self.admin_log.iter().cloned().collect(),
        };
        for conn in &self.admins {
            self.send_to(*conn, push.clone());
        }
    }

    /// Appends an event line to the bounded admin log, then broadcasts
    /// the whole log to the admin group. Append-then-broadcast, always
    /// in that order.
    fn report(
        &mut self,
        game: &GameId,
        conn: ConnectionId,
        message: &str,
        capacity: usize,
    ) {
        let member_count = self.members.get(game).map_or(0, |m| m.len());
        let line = format!(
            "{} [{} TS, {} TU, {} MUS, {} CS, {} CU] {} ({}) : {:<30}{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.counters.total_games,
            self.counters.total_connections,
            self.counters.total_multiplayer,
            self.games.len(),
            self.owner_of.len(),
            game,
            member_count,
            message,
            conn,
        );
        self.admin_log.push_back(line);
        while self.admin_log.len() > capacity {
            self.admin_log.pop_front();
        }
        self.broadcast_log();
    }
}

/// Builds the full display-state push for a game.
///
/// Rendering touches the session's activity clock — every state push
/// keeps the game alive.
fn board_state(session: &mut GameSession, sound_cue: Option<String>) -> ServerPush {
    ServerPush::BoardState {
        current_turn: session.current_turn(),
        current_turn_remaining: session.current_turn_remaining(),
        board: session.render(),
        sound_cue,
        last_play: session.last_play(),
        last_last_play: session.last_last_play(),
    }
}

/// Generates a candidate game id: 8 lowercase hex characters.
/// Collisions are possible and handled by the caller's retry loop.
fn generate_game_id() -> GameId {
    let mut rng = rand::rng();
    let bytes: [u8; 4] = rng.random();
    GameId::new(
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>(),
    )
}

/// The session registry and real-time broadcast coordinator.
///
/// One hub serves the whole process. Cheap to share behind an `Arc`;
/// all mutation happens through `&self` under the internal lock.
pub struct SessionHub {
    inner: Mutex<Registry>,
    config: HubConfig,
    store: Option<Store>,
}

impl SessionHub {
    /// Creates a hub with no persistence.
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Mutex::new(Registry::default()),
            config,
            store: None,
        }
    }

    /// Creates a hub that loads and saves snapshots through `store`.
    pub fn with_store(config: HubConfig, store: Store) -> Self {
        Self {
            inner: Mutex::new(Registry::default()),
            config,
            store: Some(store),
        }
    }

    /// Registers a connection's outbound channel. Must happen before
    /// the connection issues any operation, or its replies are dropped.
    pub async fn attach(&self, conn: ConnectionId, sender: ClientSender) {
        let mut reg = self.inner.lock().await;
        reg.senders.insert(conn, sender);
        tracing::debug!(%conn, "connection attached");
    }

    /// Creates a fresh game and replies to the requester with its id.
    ///
    /// Every create call first sweeps stale games — this lazy,
    /// call-triggered eviction is the only thing that bounds memory
    /// growth, deliberately; there is no background timer.
    pub async fn create_game(&self, conn: ConnectionId) -> GameId {
        let mut reg = self.inner.lock().await;
        self.sweep_stale(&mut reg);

        let id = loop {
            let candidate = generate_game_id();
            if !reg.games.contains_key(&candidate) {
                break candidate;
            }
        };
        reg.games.insert(id.clone(), GameSession::new());
        reg.members.insert(id.clone(), HashSet::new());
        reg.counters.total_games += 1;

        reg.send_to(conn, ServerPush::GameCreated { game_id: id.clone() });
        reg.report(&id, conn, "New game made", self.config.admin_log_capacity);
        tracing::info!(game_id = %id, %conn, "game created");
        id
    }

    /// Joins a connection to a game's broadcast group, pushing the full
    /// state and the new member count to the whole group.
    ///
    /// A connection already in a *different* game is moved: it leaves
    /// the old group first, keeping the one-game-per-connection
    /// invariant. Re-joining the same game is harmless (the state push
    /// still goes out, and the join counter still ticks).
    pub async fn join_game(
        &self,
        conn: ConnectionId,
        id: &GameId,
    ) -> Result<(), HubError> {
        let mut reg = self.inner.lock().await;
        if !reg.games.contains_key(id) {
            reg.send_to(conn, ServerPush::GameNotFound);
            return Err(HubError::GameNotFound(id.clone()));
        }

        if let Some(previous) = reg.owner_of.get(&conn).cloned() {
            if previous != *id {
                if let Some(set) = reg.members.get_mut(&previous) {
                    set.remove(&conn);
                }
                reg.owner_of.remove(&conn);
                tracing::debug!(%conn, from = %previous, to = %id, "connection moved between games");
            }
        }

        let newly_joined = reg
            .members
            .get_mut(id)
            .map(|set| set.insert(conn))
            .unwrap_or(false);
        if newly_joined {
            reg.owner_of.insert(conn, id.clone());
        }

        let count = reg.members[id].len();
        let state = {
            let session = reg.games.get_mut(id).expect("checked above");
            board_state(session, None)
        };
        reg.broadcast(id, state);
        reg.broadcast(id, ServerPush::ConnectionCount { count });

        reg.counters.total_connections += 1;
        if count == 2 && reg.multiplayer_seen.insert(id.clone()) {
            reg.counters.total_multiplayer += 1;
        }

        reg.report(
            id,
            conn,
            "New user connected to game",
            self.config.admin_log_capacity,
        );
        tracing::info!(game_id = %id, %conn, members = count, "connection joined game");
        Ok(())
    }

    /// Places a stone for whoever's turn it is and broadcasts the
    /// resulting state to the group.
    ///
    /// An occupied cell is a silent no-op: the state still goes out,
    /// just without the sound cue, since nothing changed. Out-of-range
    /// coordinates are rejected before any mutation and produce no
    /// push at all.
    pub async fn place_stone(
        &self,
        conn: ConnectionId,
        id: &GameId,
        x: i32,
        y: i32,
    ) -> Result<(), HubError> {
        let mut reg = self.inner.lock().await;
        let state = match reg.games.get_mut(id) {
            Some(session) => {
                let placed = session.place(x, y)?;
                let cue = placed.then(|| PLACE_STONE_CUE.to_string());
                board_state(session, cue)
            }
            None => {
                reg.send_to(conn, ServerPush::GameNotFound);
                return Err(HubError::GameNotFound(id.clone()));
            }
        };
        reg.broadcast(id, state);
        reg.report(
            id,
            conn,
            &format!("User placed stone ({x:02}, {y:02})"),
            self.config.admin_log_capacity,
        );
        Ok(())
    }

    /// Reverses the most recent placement and broadcasts the state.
    pub async fn undo_stone(
        &self,
        conn: ConnectionId,
        id: &GameId,
    ) -> Result<(), HubError> {
        let mut reg = self.inner.lock().await;
        let state = match reg.games.get_mut(id) {
            Some(session) => {
                session.undo();
                board_state(session, None)
            }
            None => {
                reg.send_to(conn, ServerPush::GameNotFound);
                return Err(HubError::GameNotFound(id.clone()));
            }
        };
        reg.broadcast(id, state);
        reg.report(id, conn, "User undid", self.config.admin_log_capacity);
        Ok(())
    }

    /// Replaces the game with a fresh board of the same size and
    /// broadcasts the state. Internal reset failures are logged and
    /// discarded — the group simply doesn't get a push.
    pub async fn reset_game(
        &self,
        conn: ConnectionId,
        id: &GameId,
    ) -> Result<(), HubError> {
        let mut reg = self.inner.lock().await;
        let state = match reg.games.get_mut(id) {
            Some(session) => {
                if let Err(e) = session.reset() {
                    tracing::warn!(game_id = %id, error = %e, "reset failed, skipping broadcast");
                    return Ok(());
                }
                board_state(session, None)
            }
            None => {
                reg.send_to(conn, ServerPush::GameNotFound);
                return Err(HubError::GameNotFound(id.clone()));
            }
        };
        reg.broadcast(id, state);
        reg.report(id, conn, "Board reset", self.config.admin_log_capacity);
        Ok(())
    }

    /// Cleans up after a dropped connection. Infallible by design:
    /// disconnect bookkeeping must never throw back into the transport
    /// layer, whatever state it finds.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let mut reg = self.inner.lock().await;
        reg.senders.remove(&conn);
        reg.admins.remove(&conn);

        if let Some(id) = reg.owner_of.remove(&conn) {
            if let Some(set) = reg.members.get_mut(&id) {
                set.remove(&conn);
            }
            let count = reg.members.get(&id).map_or(0, |m| m.len());
            reg.broadcast(&id, ServerPush::ConnectionCount { count });
            reg.report(
                &id,
                conn,
                "User disconnected",
                self.config.admin_log_capacity,
            );
            tracing::info!(game_id = %id, %conn, members = count, "connection left game");
        }
    }

    /// Joins a connection to the admin observer group and primes it
    /// with the current log (possibly empty).
    pub async fn register_admin(&self, conn: ConnectionId) {
        let mut reg = self.inner.lock().await;
        reg.admins.insert(conn);
        reg.send_to(
            conn,
            ServerPush::ServerLog {
                lines: reg.admin_log.iter().cloned().collect(),
            },
        );
        tracing::info!(%conn, "admin observer registered");
    }

    /// Verifies the admin key and persists all state. On success the
    /// caller is expected to terminate the process.
    ///
    /// # Errors
    /// [`HubError::Unauthorized`] when the key doesn't match or no key
    /// is configured; store errors if persisting fails.
    pub async fn shutdown(&self, admin_key: &str) -> Result<(), HubError> {
        match &self.config.admin_key {
            Some(expected) if expected == admin_key => {}
            _ => return Err(HubError::Unauthorized),
        }
        self.save().await
    }

    /// Restores counters and games from the store, if one is
    /// configured. Missing snapshot files are not an error — the hub
    /// just starts empty. Restored games come back with empty groups.
    pub async fn load(&self) -> Result<(), HubError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let mut reg = self.inner.lock().await;
        if let Some(counters) = store.load_counters()? {
            reg.counters = counters;
        }
        let snapshots = store.load_games()?;
        for (id, snapshot) in snapshots {
            let session = GameSession::from_snapshot(&snapshot)?;
            reg.members.insert(id.clone(), HashSet::new());
            reg.games.insert(id, session);
        }
        tracing::info!(games = reg.games.len(), "state restored from store");
        Ok(())
    }

    /// Persists counters and all active games through the store.
    pub async fn save(&self) -> Result<(), HubError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let reg = self.inner.lock().await;
        let snapshots: HashMap<GameId, _> = reg
            .games
            .iter()
            .map(|(id, session)| (id.clone(), session.snapshot()))
            .collect();
        store.save_counters(&reg.counters)?;
        store.save_games(&snapshots)?;
        tracing::info!(games = snapshots.len(), "state persisted to store");
        Ok(())
    }

    /// Evicts every game that has been idle past the staleness TTL,
    /// scrubbing it from all three maps. Called under the lock from
    /// `create_game` only.
    fn sweep_stale(&self, reg: &mut Registry) {
        let stale: Vec<GameId> = reg
            .games
            .iter()
            .filter(|(_, session)| session.is_stale(self.config.stale_after))
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            reg.games.remove(&id);
            reg.members.remove(&id);
            reg.owner_of.retain(|_, game| *game != id);
            reg.multiplayer_seen.remove(&id);
            reg.report(
                &id,
                ConnectionId(0),
                "Session destroyed",
                self.config.admin_log_capacity,
            );
            tracing::info!(game_id = %id, "stale game evicted");
        }
    }

    // -- Introspection (used by tests and the admin surface) ----------

    /// Current process-lifetime counters.
    pub async fn counters(&self) -> Counters {
        self.inner.lock().await.counters
    }

    /// Number of active games.
    pub async fn game_count(&self) -> usize {
        self.inner.lock().await.games.len()
    }

    /// Whether a game id is currently active.
    pub async fn contains_game(&self, id: &GameId) -> bool {
        self.inner.lock().await.games.contains_key(id)
    }

    /// Current member count of a game (0 if unknown).
    pub async fn member_count(&self, id: &GameId) -> usize {
        self.inner
            .lock()
            .await
            .members
            .get(id)
            .map_or(0, |m| m.len())
    }

    /// A copy of the admin log, oldest line first.
    pub async fn admin_log(&self) -> Vec<String> {
        self.inner.lock().await.admin_log.iter().cloned().collect()
    }
}
