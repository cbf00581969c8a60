//! Control page HTTP server
//!
//! One read per connection. Only the request line is looked at, and any
//! client that sends readable text gets the status page back with `200 OK`.
//! Nothing that goes wrong with a connection leaves
//! [`HttpServer::poll_once`]; the connection is simply closed.

use crate::lightbar::{Command, Lightbar};
use crate::net::{Connection, Listener, NetError};
use crate::timer::Clock;
use crate::{BoardError, config, page};
use smart_leds::{RGB8, SmartLedsWrite};

const RESPONSE_HEAD: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n";

/// The parts of a request the server cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    line: &'a str,
}

impl<'a> Request<'a> {
    /// Take the request line (everything before the first CRLF)
    pub fn parse(text: &'a str) -> Self {
        let line = text.split("\r\n").next().unwrap_or("");
        Self { line }
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    /// Whether the request may change the session
    pub fn is_get(&self) -> bool {
        self.line.contains("GET /")
    }

    /// Second space-separated token of the request line, `/` when missing
    pub fn path(&self) -> &'a str {
        self.line.split(' ').nth(1).unwrap_or("/")
    }

    /// Everything after the first `?` of the path
    pub fn query(&self) -> Option<&'a str> {
        self.path().split_once('?').map(|(_, query)| query)
    }

    /// Recognised commands in the order they appear in the query
    pub fn commands(&self) -> impl Iterator<Item = Command> + 'a {
        self.query()
            .into_iter()
            .flat_map(|query| query.split('&'))
            .filter_map(parse_param)
    }
}

/// Turn one `key=value` token into a command. Values are taken literally, no
/// percent decoding. Unknown keys and unparseable values give `None`.
pub fn parse_param(token: &str) -> Option<Command> {
    if let Some(value) = token.strip_prefix("mode=") {
        return match value {
            "on" => Some(Command::Start),
            "off" => Some(Command::Stop),
            _ => None,
        };
    }
    if let Some(value) = token.strip_prefix("speed=") {
        return value.parse().ok().map(Command::SetSpeed);
    }
    if let Some(value) = token.strip_prefix("limit=") {
        return value.parse().ok().map(Command::SetCycleLimit);
    }
    None
}

/// Result of one poll, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No client was waiting
    Idle,
    /// A status page was sent
    Served,
    /// The connection was closed without a complete response
    Dropped(NetError),
}

/// Connection counters since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub served: u32,
    pub dropped: u32,
}

/// HTTP server polled from the main loop
pub struct HttpServer<L> {
    listener: L,
    stats: ServerStats,
}

impl<L: Listener> HttpServer<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            stats: ServerStats::default(),
        }
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Serve at most one pending client.
    ///
    /// Network trouble only ever drops the connection. The one error that
    /// does come back is a failed strip write while handling `mode=off`,
    /// which is fatal for the board.
    pub fn poll_once<W, const N: usize, C>(
        &mut self,
        lightbar: &mut Lightbar<W, N>,
        clock: &C,
    ) -> Result<PollOutcome, BoardError>
    where
        W: SmartLedsWrite<Color = RGB8>,
        C: Clock,
    {
        let mut connection = match self.listener.accept() {
            Ok(Some(connection)) => connection,
            Ok(None) => return Ok(PollOutcome::Idle),
            Err(e) => {
                log::warn!("[HTTP] Accept failed: {:?}", e);
                return Ok(PollOutcome::Idle);
            }
        };

        connection.set_read_timeout(config::READ_TIMEOUT_MS);
        let outcome = serve(&mut connection, lightbar, clock);
        connection.close();

        match outcome {
            Ok(PollOutcome::Served) => self.stats.served = self.stats.served.wrapping_add(1),
            Ok(PollOutcome::Dropped(e)) => {
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                log::warn!(
                    "[HTTP] Connection dropped: {:?} ({} served, {} dropped)",
                    e,
                    self.stats.served,
                    self.stats.dropped
                );
            }
            _ => {}
        }
        outcome
    }
}

fn serve<Conn, W, const N: usize, C>(
    connection: &mut Conn,
    lightbar: &mut Lightbar<W, N>,
    clock: &C,
) -> Result<PollOutcome, BoardError>
where
    Conn: Connection,
    W: SmartLedsWrite<Color = RGB8>,
    C: Clock,
{
    let mut buffer = [0u8; config::REQUEST_BUFFER_SIZE];
    let len = match connection.read(&mut buffer) {
        Ok(len) => len,
        Err(e) => return Ok(PollOutcome::Dropped(e)),
    };
    let Ok(text) = core::str::from_utf8(&buffer[..len]) else {
        return Ok(PollOutcome::Dropped(NetError::Decode));
    };

    let request = Request::parse(text);
    log::info!("[HTTP] {}", request.line());

    if request.is_get() {
        let now = clock.now_ms();
        for command in request.commands() {
            lightbar.apply(command, now)?;
        }
    }

    let body = page::render(lightbar.state());
    let sent = connection
        .write_all(RESPONSE_HEAD)
        .and_then(|()| connection.write_all(body.as_bytes()));

    Ok(match sent {
        Ok(()) => PollOutcome::Served,
        Err(e) => PollOutcome::Dropped(e),
    })
}
