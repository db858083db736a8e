//! Mock transport, link and clock shared by the integration tests

#![allow(dead_code)]

use roomlink::network::error::Error;
use roomlink::network::link::Link;
use roomlink::network::{Close, Connect, Connection, Endpoint, Read, Write};
use roomlink::system::{Clock, Liveness};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Something observable that happened during a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Ensure,
    Signal,
    Connect,
    Close,
}

/// Everything the mocks saw, shared between them and the test body.
#[derive(Debug, Default)]
pub struct Record {
    pub events: Vec<Event>,
    pub endpoints: Vec<Endpoint>,
    pub requests: Vec<Vec<u8>>,
}

pub type Shared = Rc<RefCell<Record>>;

pub fn record() -> Shared {
    Rc::new(RefCell::new(Record::default()))
}

impl Record {
    pub fn connects(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Connect).count()
    }

    pub fn signals(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Signal).count()
    }

    /// The last request as text.
    pub fn request(&self) -> String {
        String::from_utf8(self.requests.last().cloned().unwrap_or_default()).unwrap()
    }

    /// The body of the last request.
    pub fn body(&self) -> String {
        let request = self.request();
        match request.split_once("\r\n\r\n") {
            Some((_, body)) => body.to_string(),
            None => String::new(),
        }
    }
}

/// A watchdog that logs every feed into `record`.
pub fn watchdog(record: &Shared) -> impl FnMut() + '_ {
    move || record.borrow_mut().events.push(Event::Signal)
}

/// A complete HTTP/1.1 response with a JSON body.
pub fn http_response(status: u16, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

#[derive(Debug)]
enum Behaviour {
    Respond(Vec<u8>),
    RefuseWith(Error),
    FailReads,
}

/// Opens [`MockConnection`]s and records where it was asked to connect.
#[derive(Debug)]
pub struct MockConnector {
    behaviour: Behaviour,
    record: Shared,
}

impl MockConnector {
    /// Every exchange reads back `response`.
    pub fn responding(record: &Shared, response: Vec<u8>) -> Self {
        Self {
            behaviour: Behaviour::Respond(response),
            record: record.clone(),
        }
    }

    /// Connecting fails with `err`.
    pub fn refusing(record: &Shared, err: Error) -> Self {
        Self {
            behaviour: Behaviour::RefuseWith(err),
            record: record.clone(),
        }
    }

    /// Connecting succeeds but no response can be read.
    pub fn failing_reads(record: &Shared) -> Self {
        Self {
            behaviour: Behaviour::FailReads,
            record: record.clone(),
        }
    }
}

impl Connect for MockConnector {
    type Connection = MockConnection;

    fn connect(&mut self, endpoint: &Endpoint) -> Result<Self::Connection, Error> {
        let mut record = self.record.borrow_mut();
        record.events.push(Event::Connect);
        record.endpoints.push(endpoint.clone());

        let (response, fail_reads) = match &self.behaviour {
            Behaviour::RefuseWith(err) => return Err(*err),
            Behaviour::Respond(response) => (response.clone(), false),
            Behaviour::FailReads => (Vec::new(), true),
        };

        record.requests.push(Vec::new());
        Ok(MockConnection {
            response,
            read_pos: 0,
            fail_reads,
            index: record.requests.len() - 1,
            record: self.record.clone(),
        })
    }
}

/// One exchange: written bytes go to the record, reads replay a response.
#[derive(Debug)]
pub struct MockConnection {
    response: Vec<u8>,
    read_pos: usize,
    fail_reads: bool,
    index: usize,
    record: Shared,
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(Error::ReadError);
        }
        let remaining = &self.response[self.read_pos..];
        let len = buf.len().min(remaining.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.record.borrow_mut().requests[self.index].extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.record.borrow_mut().events.push(Event::Close);
        Ok(())
    }
}

impl Connection for MockConnection {}

/// A link that is either up or down, optionally coming up on `ensure`.
#[derive(Debug)]
pub struct MockLink {
    up: Cell<bool>,
    comes_up_on_ensure: bool,
    ensures: Cell<u32>,
    record: Shared,
}

impl MockLink {
    pub fn up(record: &Shared) -> Self {
        Self::with(record, true, false)
    }

    pub fn down(record: &Shared) -> Self {
        Self::with(record, false, false)
    }

    pub fn reconnecting(record: &Shared) -> Self {
        Self::with(record, false, true)
    }

    fn with(record: &Shared, up: bool, comes_up_on_ensure: bool) -> Self {
        Self {
            up: Cell::new(up),
            comes_up_on_ensure,
            ensures: Cell::new(0),
            record: record.clone(),
        }
    }

    pub fn ensures(&self) -> u32 {
        self.ensures.get()
    }

    pub fn drop_link(&self) {
        self.up.set(false);
    }
}

impl Link for MockLink {
    fn ensure(&self, _watchdog: &mut dyn Liveness) {
        self.ensures.set(self.ensures.get() + 1);
        self.record.borrow_mut().events.push(Event::Ensure);
        if self.comes_up_on_ensure {
            self.up.set(true);
        }
    }

    fn is_up(&self) -> bool {
        self.up.get()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}
