//! Host doubles for driving the main loop without a board.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use lightbar::BoardError;
use lightbar::net::{Connection, Listener, NetError};
use lightbar::timer::Clock;
use smart_leds::{RGB8, SmartLedsWrite};

/// Shared millisecond counter; clones see the same time.
#[derive(Clone, Default)]
pub struct TestClock(Rc<Cell<u32>>);

impl TestClock {
    pub fn at(ms: u32) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

/// Strip writer that records every flushed frame.
#[derive(Default)]
pub struct FrameLog {
    pub frames: Vec<Vec<RGB8>>,
}

impl SmartLedsWrite for FrameLog {
    type Error = BoardError;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frames.push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}

/// A client as the listener will see it
pub struct Client {
    /// Bytes the client sends; `None` means it connects and never sends
    pub request: Option<Vec<u8>>,
    /// How long the bytes take to arrive
    pub delay_ms: u32,
}

impl Client {
    pub fn get(request_line: &str) -> Self {
        Self {
            request: Some(format!("{request_line}\r\nHost: lightbar\r\n\r\n").into_bytes()),
            delay_ms: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            request: None,
            delay_ms: 0,
        }
    }

    pub fn slow(request_line: &str, delay_ms: u32) -> Self {
        Self {
            delay_ms,
            ..Self::get(request_line)
        }
    }
}

#[derive(Default)]
pub struct Exchange {
    pub responses: Vec<String>,
    pub accepted: usize,
    pub closed: usize,
}

/// In-memory listener. Reading advances the shared clock the way a blocking
/// read with a timeout would.
pub struct ScriptedListener {
    queue: VecDeque<Client>,
    clock: TestClock,
    pub exchange: Rc<RefCell<Exchange>>,
}

impl ScriptedListener {
    pub fn new(clock: TestClock) -> Self {
        Self {
            queue: VecDeque::new(),
            clock,
            exchange: Rc::default(),
        }
    }

    pub fn push(&mut self, client: Client) {
        self.queue.push_back(client);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

pub struct ScriptedConnection {
    client: Client,
    timeout_ms: u32,
    clock: TestClock,
    written: Vec<u8>,
    exchange: Rc<RefCell<Exchange>>,
}

impl Listener for ScriptedListener {
    type Connection<'a> = ScriptedConnection;

    fn accept(&mut self) -> Result<Option<ScriptedConnection>, NetError> {
        let Some(client) = self.queue.pop_front() else {
            return Ok(None);
        };
        self.exchange.borrow_mut().accepted += 1;
        Ok(Some(ScriptedConnection {
            client,
            timeout_ms: 0,
            clock: self.clock.clone(),
            written: Vec::new(),
            exchange: Rc::clone(&self.exchange),
        }))
    }
}

impl Connection for ScriptedConnection {
    fn set_read_timeout(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        match &self.client.request {
            Some(bytes) if self.client.delay_ms <= self.timeout_ms => {
                self.clock.advance(self.client.delay_ms);
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(len)
            }
            _ => {
                self.clock.advance(self.timeout_ms);
                Err(NetError::Timeout)
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), NetError> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn close(self) {
        let mut exchange = self.exchange.borrow_mut();
        exchange.closed += 1;
        if !self.written.is_empty() {
            exchange
                .responses
                .push(String::from_utf8_lossy(&self.written).into_owned());
        }
    }
}
