// ── Link state machine ──
//
// Tracks where the client is in its login → connect → stream cycle and
// decides what a disconnect signal means. Only one reconnect cycle is
// ever in flight: signals that arrive while one is pending are ignored,
// and a failure during a reconnect attempt schedules the next attempt
// without announcing the outage a second time.

use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Connection state observable by consumers.
///
/// `attempt` is 0 for the initial connect and counts up through
/// consecutive reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    LoggingIn { attempt: u32 },
    Connecting { attempt: u32 },
    Connected,
    Reconnecting { attempt: u32 },
    Stopped,
}

impl ConnectionState {
    /// A reconnect is scheduled or its login is still running.
    pub fn is_reconnect_pending(self) -> bool {
        match self {
            Self::Reconnecting { .. } => true,
            Self::LoggingIn { attempt } => attempt > 0,
            _ => false,
        }
    }

    pub fn attempt(self) -> u32 {
        match self {
            Self::LoggingIn { attempt }
            | Self::Connecting { attempt }
            | Self::Reconnecting { attempt } => attempt,
            _ => 0,
        }
    }
}

/// What a disconnect signal turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Connectivity was lost; announce it and schedule a reconnect.
    Lost,
    /// A reconnect attempt failed; schedule the next one quietly.
    Retry,
    /// A reconnect is already pending, or no connect cycle is running.
    Ignored,
}

/// Owner of the [`ConnectionState`] watch channel.
#[derive(Debug)]
pub struct LinkState {
    state: watch::Sender<ConnectionState>,
    delay: Duration,
}

impl LinkState {
    pub fn new(delay: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { state, delay }
    }

    pub fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Fixed wait before each reconnect attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Enter the login phase. Returns the attempt number.
    pub fn begin_login(&self) -> u32 {
        let mut attempt = 0;
        self.state.send_if_modified(|state| {
            attempt = match *state {
                ConnectionState::Reconnecting { attempt } => attempt,
                ConnectionState::Stopped => return false,
                _ => 0,
            };
            *state = ConnectionState::LoggingIn { attempt };
            true
        });
        attempt
    }

    /// Login finished (either way); move on to opening the socket.
    ///
    /// Returns `false` if a disconnect was signalled in the meantime and
    /// the socket should not be opened.
    pub fn begin_connect(&self) -> bool {
        self.state.send_if_modified(|state| match *state {
            ConnectionState::LoggingIn { attempt } => {
                *state = ConnectionState::Connecting { attempt };
                true
            }
            _ => false,
        })
    }

    /// Handshake done. Returns `false` if a disconnect was signalled
    /// during the handshake.
    pub fn on_connected(&self) -> bool {
        self.state.send_if_modified(|state| match *state {
            ConnectionState::Connecting { .. } => {
                *state = ConnectionState::Connected;
                true
            }
            _ => false,
        })
    }

    /// Apply a disconnect signal.
    pub fn on_disconnect(&self) -> DisconnectOutcome {
        let mut outcome = DisconnectOutcome::Ignored;
        self.state.send_if_modified(|state| {
            let next = match *state {
                ConnectionState::Disconnected | ConnectionState::Stopped => return false,
                s if s.is_reconnect_pending() => return false,
                ConnectionState::Connecting { attempt } if attempt > 0 => {
                    outcome = DisconnectOutcome::Retry;
                    ConnectionState::Reconnecting {
                        attempt: attempt.saturating_add(1),
                    }
                }
                _ => {
                    outcome = DisconnectOutcome::Lost;
                    ConnectionState::Reconnecting { attempt: 1 }
                }
            };
            *state = next;
            true
        });
        debug!(?outcome, state = ?self.current(), "disconnect signal");
        outcome
    }

    pub fn stop(&self) {
        self.state.send_replace(ConnectionState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn link() -> LinkState {
        LinkState::new(Duration::from_secs(5))
    }

    fn connect(link: &LinkState) {
        link.begin_login();
        assert!(link.begin_connect());
        assert!(link.on_connected());
    }

    #[test]
    fn first_disconnect_is_lost_then_ignored() {
        let link = link();
        connect(&link);

        assert_eq!(link.on_disconnect(), DisconnectOutcome::Lost);
        assert_eq!(link.current(), ConnectionState::Reconnecting { attempt: 1 });

        assert_eq!(link.on_disconnect(), DisconnectOutcome::Ignored);
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Ignored);
        assert_eq!(link.current(), ConnectionState::Reconnecting { attempt: 1 });
    }

    #[test]
    fn disconnect_during_reconnect_login_is_ignored() {
        let link = link();
        connect(&link);
        link.on_disconnect();

        assert_eq!(link.begin_login(), 1);
        assert!(link.current().is_reconnect_pending());
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Ignored);
    }

    #[test]
    fn failed_reconnect_retries_without_new_loss() {
        let link = link();
        connect(&link);
        link.on_disconnect();

        link.begin_login();
        assert!(link.begin_connect());
        assert!(!link.current().is_reconnect_pending());
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Retry);
        assert_eq!(link.current(), ConnectionState::Reconnecting { attempt: 2 });
    }

    #[test]
    fn successful_reconnect_resets_attempts() {
        let link = link();
        connect(&link);
        link.on_disconnect();
        connect(&link);

        assert_eq!(link.current(), ConnectionState::Connected);
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Lost);
        assert_eq!(link.current().attempt(), 1);
    }

    #[test]
    fn initial_login_failure_is_a_loss() {
        let link = link();
        assert_eq!(link.begin_login(), 0);
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Lost);
        assert!(!link.begin_connect());
    }

    #[test]
    fn disconnect_before_first_login_is_ignored() {
        let link = link();
        assert_eq!(link.on_disconnect(), DisconnectOutcome::Ignored);
        assert_eq!(link.current(), ConnectionState::Disconnected);
        assert_eq!(link.begin_login(), 0);
    }

    #[test]
    fn disconnect_during_handshake_blocks_connected() {
        let link = link();
        link.begin_login();
        link.begin_connect();
        link.on_disconnect();
        assert!(!link.on_connected());
    }

    #[test]
    fn stopped_ignores_everything() {
        let link = link();
        connect(&link);
        link.stop();

        assert_eq!(link.on_disconnect(), DisconnectOutcome::Ignored);
        link.begin_login();
        assert_eq!(link.current(), ConnectionState::Stopped);
    }

    #[tokio::test]
    async fn watchers_see_transitions() {
        let link = link();
        let mut rx = link.subscribe();

        link.begin_login();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::LoggingIn { attempt: 0 });

        link.begin_connect();
        link.on_connected();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connected);
    }
}
