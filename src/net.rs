//! Transport seam between the HTTP server and the network stack
//!
//! The board implementation lives in `tcp_listener`; tests use scripted
//! in-memory connections.

use crate::timer::ticks_diff;

/// Why a connection was dropped. Never reaches the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// The listener could not check for or accept a connection
    Accept,
    /// Reading the request failed
    Read,
    /// No data arrived within the read timeout
    Timeout,
    /// The peer went away
    Closed,
    /// The request bytes were not valid UTF-8
    Decode,
    /// Sending the response failed
    Write,
}

/// Source of incoming connections
pub trait Listener {
    type Connection<'a>: Connection
    where
        Self: 'a;

    /// Return a pending connection, if any. Must never wait for one.
    fn accept(&mut self) -> Result<Option<Self::Connection<'_>>, NetError>;
}

/// One accepted client connection
pub trait Connection {
    /// Bound the next [`Connection::read`] to `timeout_ms`
    fn set_read_timeout(&mut self, timeout_ms: u32);

    /// Read whatever has arrived, waiting at most the read timeout
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError>;

    fn write_all(&mut self, data: &[u8]) -> Result<(), NetError>;

    /// Close the connection. Called exactly once per accepted connection.
    fn close(self);
}

/// What a single-socket listener should do on this poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketAction {
    /// The socket is closed; put it back into listen state
    Listen,
    /// A client is connected and can be served
    Accept,
    /// Listening, or a handshake or close is in progress
    Wait,
    /// Open without a usable connection for too long; close it
    Reset,
}

/// Watches a listening socket that is open but has no connection.
///
/// A peer that connects and hangs up before sending anything leaves the
/// socket half-closed: still open, never connected. Nothing else would
/// close it, so once it has sat like that for `stale_ms` it is reset. A
/// plain listening socket looks the same from outside and is reset on the
/// same schedule, which costs nothing when it is re-armed straight away.
#[derive(Debug, Clone, Copy)]
pub struct SocketWatch {
    idle_since: Option<u32>,
    stale_ms: i32,
}

impl SocketWatch {
    pub const fn new(stale_ms: i32) -> Self {
        Self {
            idle_since: None,
            stale_ms,
        }
    }

    pub fn next_action(&mut self, open: bool, connected: bool, now: u32) -> SocketAction {
        if connected {
            self.idle_since = None;
            return SocketAction::Accept;
        }
        if !open {
            self.idle_since = None;
            return SocketAction::Listen;
        }

        let since = *self.idle_since.get_or_insert(now);
        if ticks_diff(now, since) >= self.stale_ms {
            self.idle_since = None;
            SocketAction::Reset
        } else {
            SocketAction::Wait
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_socket_is_put_back_into_listen() {
        let mut watch = SocketWatch::new(2_000);
        assert_eq!(watch.next_action(false, false, 0), SocketAction::Listen);
    }

    #[test]
    fn connected_socket_is_accepted() {
        let mut watch = SocketWatch::new(2_000);
        assert_eq!(watch.next_action(true, true, 0), SocketAction::Accept);
    }

    #[test]
    fn peer_that_hung_up_without_sending_is_reset() {
        let mut watch = SocketWatch::new(2_000);
        // open but not connected: half-closed after a silent client
        for now in (0..2_000).step_by(20) {
            assert_eq!(watch.next_action(true, false, now), SocketAction::Wait);
        }
        assert_eq!(watch.next_action(true, false, 2_000), SocketAction::Reset);

        // close() moved it on; once fully closed it listens again
        assert_eq!(watch.next_action(false, false, 2_020), SocketAction::Listen);
        assert_eq!(watch.next_action(true, false, 2_040), SocketAction::Wait);
    }

    #[test]
    fn accepted_connection_restarts_the_idle_window() {
        let mut watch = SocketWatch::new(100);
        assert_eq!(watch.next_action(true, false, 0), SocketAction::Wait);
        assert_eq!(watch.next_action(true, true, 90), SocketAction::Accept);
        assert_eq!(watch.next_action(true, false, 120), SocketAction::Wait);
        assert_eq!(watch.next_action(true, false, 219), SocketAction::Wait);
        assert_eq!(watch.next_action(true, false, 220), SocketAction::Reset);
    }

    #[test]
    fn idle_window_survives_clock_wraparound() {
        let mut watch = SocketWatch::new(100);
        let start = u32::MAX - 40;
        assert_eq!(watch.next_action(true, false, start), SocketAction::Wait);
        assert_eq!(
            watch.next_action(true, false, start.wrapping_add(99)),
            SocketAction::Wait
        );
        assert_eq!(
            watch.next_action(true, false, start.wrapping_add(100)),
            SocketAction::Reset
        );
    }
}
