//! Flat-file persistence for counters and game snapshots.
//!
//! Two files live under the data directory:
//!
//! - `counters.dat` — three plain integer lines (games, joins,
//!   multiplayer milestones), in that order.
//! - `games.json` — a JSON map from game id to board snapshot.
//!
//! Both are optional on load; a hub with no prior state starts empty.

use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use sixstone_game::SessionSnapshot;
use sixstone_protocol::GameId;

use crate::{Counters, HubError};

const COUNTERS_FILE: &str = "counters.dat";
const GAMES_FILE: &str = "games.json";

/// Handle on the data directory holding the persisted hub state.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads the persisted counters, or `None` when no file exists yet.
    pub fn load_counters(&self) -> Result<Option<Counters>, HubError> {
        let path = self.dir.join(COUNTERS_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HubError::Store(e)),
        };

        let mut lines = text.lines();
        let mut next = || -> Result<u64, HubError> {
            lines
                .next()
                .ok_or_else(|| invalid_data("counters file is truncated"))?
                .trim()
                .parse()
                .map_err(|e| invalid_data(format!("bad counter value: {e}")))
        };
        Ok(Some(Counters {
            total_games: next()?,
            total_connections: next()?,
            total_multiplayer: next()?,
        }))
    }

    /// Writes the counters as three plain lines.
    pub fn save_counters(&self, counters: &Counters) -> Result<(), HubError> {
        std::fs::create_dir_all(&self.dir).map_err(HubError::Store)?;
        let text = format!(
            "{}\n{}\n{}\n",
            counters.total_games, counters.total_connections, counters.total_multiplayer,
        );
        std::fs::write(self.dir.join(COUNTERS_FILE), text).map_err(HubError::Store)
    }

    /// Reads the persisted game snapshots. A missing file yields an
    /// empty map.
    pub fn load_games(&self) -> Result<HashMap<GameId, SessionSnapshot>, HubError> {
        let path = self.dir.join(GAMES_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(HubError::Store(e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes all game snapshots as one JSON document.
    pub fn save_games(
        &self,
        games: &HashMap<GameId, SessionSnapshot>,
    ) -> Result<(), HubError> {
        std::fs::create_dir_all(&self.dir).map_err(HubError::Store)?;
        let text = serde_json::to_string(games)?;
        std::fs::write(self.dir.join(GAMES_FILE), text).map_err(HubError::Store)
    }
}

fn invalid_data(message: impl Into<String>) -> HubError {
    HubError::Store(io::Error::new(ErrorKind::InvalidData, message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixstone_game::GameSession;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sixstone-store-{tag}-{}-{:?}",
            std::process::id(),
            std::thread::current().id(),
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_load_counters_missing_file_returns_none() {
        let store = Store::new(scratch_dir("missing"));
        assert!(store.load_counters().unwrap().is_none());
    }

    #[test]
    fn test_counters_round_trip() {
        let dir = scratch_dir("counters");
        let store = Store::new(&dir);
        let counters = Counters {
            total_games: 7,
            total_connections: 42,
            total_multiplayer: 3,
        };
        store.save_counters(&counters).unwrap();
        assert_eq!(store.load_counters().unwrap(), Some(counters));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_counters_file_is_three_plain_lines() {
        let dir = scratch_dir("format");
        let store = Store::new(&dir);
        store
            .save_counters(&Counters {
                total_games: 1,
                total_connections: 2,
                total_multiplayer: 3,
            })
            .unwrap();
        let text = std::fs::read_to_string(dir.join(COUNTERS_FILE)).unwrap();
        assert_eq!(text, "1\n2\n3\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_counters_garbage_is_an_error() {
        let dir = scratch_dir("garbage");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(COUNTERS_FILE), "one\ntwo\nthree\n").unwrap();
        let store = Store::new(&dir);
        assert!(matches!(
            store.load_counters(),
            Err(HubError::Store(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_counters_truncated_is_an_error() {
        let dir = scratch_dir("truncated");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(COUNTERS_FILE), "5\n").unwrap();
        let store = Store::new(&dir);
        assert!(matches!(store.load_counters(), Err(HubError::Store(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_games_missing_file_is_empty() {
        let store = Store::new(scratch_dir("no-games"));
        assert!(store.load_games().unwrap().is_empty());
    }

    #[test]
    fn test_games_round_trip() {
        let dir = scratch_dir("games");
        let store = Store::new(&dir);

        let mut session = GameSession::new();
        session.place(9, 9).unwrap();
        session.place(10, 10).unwrap();

        let mut games = HashMap::new();
        games.insert(GameId::new("abcd1234"), session.snapshot());
        store.save_games(&games).unwrap();

        let loaded = store.load_games().unwrap();
        assert_eq!(loaded.len(), 1);
        let snap = &loaded[&GameId::new("abcd1234")];
        let restored = GameSession::from_snapshot(snap).unwrap();
        assert_eq!(restored.moves_played(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
