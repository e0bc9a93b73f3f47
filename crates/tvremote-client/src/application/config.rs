//! Runtime timing configuration for a remote session.
//!
//! [`SessionConfig`] is a plain struct: no file or environment reads happen
//! here.  The infrastructure layer builds it from the TOML config file (see
//! `infrastructure::storage::config`); tests build it directly, usually with
//! [`Default`].

use std::time::Duration;

/// All timing knobs of the session core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Status poll interval while nothing is happening.
    pub base_poll_interval: Duration,
    /// Status poll interval while a connect or pairing submission is outstanding.
    pub fast_poll_interval: Duration,
    /// Upper bound on one fast polling phase.
    ///
    /// The gateway abandons a pairing window after 120 s; the default leaves a
    /// little slack on top of that.
    pub fast_phase_limit: Duration,
    /// Delay before retrying a failed event long-poll.
    pub event_error_backoff: Duration,
    /// Delay between event long-polls while the client is in the background.
    pub event_background_backoff: Duration,
    /// How often the event loop re-checks connectivity while disconnected.
    pub event_park_interval: Duration,
    /// Delay between a home command and the compensating re-mute.
    pub mute_compensation_delay: Duration,
    /// Minimum accepted pairing code length, in characters.
    pub min_pairing_code_len: usize,
    /// How long a user-facing notice stays visible.
    pub notice_lifetime: Duration,
}

impl Default for SessionConfig {
    /// | Field                    | Default |
    /// |--------------------------|---------|
    /// | base_poll_interval       | 2 s     |
    /// | fast_poll_interval       | 500 ms  |
    /// | fast_phase_limit         | 130 s   |
    /// | event_error_backoff      | 2 s     |
    /// | event_background_backoff | 10 s    |
    /// | event_park_interval      | 1 s     |
    /// | mute_compensation_delay  | 500 ms  |
    /// | min_pairing_code_len     | 4       |
    /// | notice_lifetime          | 3 s     |
    fn default() -> Self {
        Self {
            base_poll_interval: Duration::from_secs(2),
            fast_poll_interval: Duration::from_millis(500),
            fast_phase_limit: Duration::from_secs(130),
            event_error_backoff: Duration::from_secs(2),
            event_background_backoff: Duration::from_secs(10),
            event_park_interval: Duration::from_secs(1),
            mute_compensation_delay: Duration::from_millis(500),
            min_pairing_code_len: 4,
            notice_lifetime: Duration::from_secs(3),
        }
    }
}
