//! [`Listener`] over a single smoltcp TCP socket
//!
//! The socket is put into listen state without waiting and re-armed once the
//! previous connection has fully closed, so at most one client is handled at a
//! time. A socket left half-open by a client that hung up early is reset by
//! [`SocketWatch`]. Reads poll the interface until data arrives or the timeout
//! passes.

use crate::config;
use crate::net::{Connection, Listener, NetError, SocketAction, SocketWatch};
use blocking_network_stack::Socket;
use embedded_io::{Read, ReadReady, Write};
use esp_hal::time::{Duration, Instant};
use smoltcp::phy::Device;

pub struct TcpListener<'s, 'n: 's, D: Device> {
    socket: Socket<'s, 'n, D>,
    port: u16,
    watch: SocketWatch,
}

impl<'s, 'n: 's, D: Device> TcpListener<'s, 'n, D> {
    /// Start listening on `port`. Returns immediately.
    pub fn bind(mut socket: Socket<'s, 'n, D>, port: u16) -> Result<Self, NetError> {
        socket.listen_unblocking(port).map_err(|e| {
            log::error!("[HTTP] Failed to listen on port {}: {:?}", port, e);
            NetError::Accept
        })?;
        log::info!("[HTTP] Listening on port {}", port);
        Ok(Self {
            socket,
            port,
            watch: SocketWatch::new(config::STALE_SOCKET_MS),
        })
    }

    fn listen(&mut self) -> Result<(), NetError> {
        self.socket
            .listen_unblocking(self.port)
            .map_err(|_| NetError::Accept)
    }
}

fn now_ms() -> u32 {
    Instant::now().duration_since_epoch().as_millis() as u32
}

impl<'s, 'n: 's, D: Device> Listener for TcpListener<'s, 'n, D> {
    type Connection<'a>
        = TcpConnection<'a, 's, 'n, D>
    where
        Self: 'a;

    fn accept(&mut self) -> Result<Option<Self::Connection<'_>>, NetError> {
        self.socket.work();

        let open = self.socket.is_open();
        let connected = self.socket.is_connected();
        match self.watch.next_action(open, connected, now_ms()) {
            SocketAction::Accept => Ok(Some(TcpConnection {
                socket: &mut self.socket,
                timeout: Duration::from_millis(0),
            })),
            SocketAction::Listen => {
                self.listen()?;
                Ok(None)
            }
            SocketAction::Wait => Ok(None),
            SocketAction::Reset => {
                log::debug!("[HTTP] Resetting idle socket");
                self.socket.close();
                self.socket.work();
                // A bare listener closes at once; a half-closed one finishes
                // its close first and is re-armed on a later poll.
                if !self.socket.is_open() {
                    self.listen()?;
                }
                Ok(None)
            }
        }
    }
}

pub struct TcpConnection<'a, 's, 'n: 's, D: Device> {
    socket: &'a mut Socket<'s, 'n, D>,
    timeout: Duration,
}

impl<D: Device> Connection for TcpConnection<'_, '_, '_, D> {
    fn set_read_timeout(&mut self, timeout_ms: u32) {
        self.timeout = Duration::from_millis(u64::from(timeout_ms));
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.socket.read_ready() {
                Ok(true) => return self.socket.read(buf).map_err(|_| NetError::Read),
                Ok(false) => {}
                Err(_) => return Err(NetError::Read),
            }
            if !self.socket.is_connected() {
                return Err(NetError::Closed);
            }
            if Instant::now() > deadline {
                return Err(NetError::Timeout);
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), NetError> {
        self.socket.write_all(data).map_err(|_| NetError::Write)?;
        self.socket.flush().map_err(|_| NetError::Write)
    }

    fn close(self) {
        self.socket.close();
        self.socket.work();
    }
}
