//! Hub configuration.

use std::time::Duration;

/// Tunables for the session hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// How long a game may sit with no reads or writes before it is
    /// eligible for eviction. Eviction is lazy: stale games are swept
    /// at the start of the next create-game call, never by a timer.
    ///
    /// Default: 30 minutes. Tests use `Duration::ZERO` (evict
    /// immediately) or an hour (never evict) to stay deterministic.
    pub stale_after: Duration,

    /// Maximum number of admin log lines retained; the oldest line is
    /// evicted first. Default: 30.
    pub admin_log_capacity: usize,

    /// Secret required by the shutdown operation. `None` disables
    /// shutdown entirely — there is no key that matches.
    pub admin_key: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30 * 60),
            admin_log_capacity: 30,
            admin_key: None,
        }
    }
}
