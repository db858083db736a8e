use crate::network::error::Error;
use crate::network::{Connection, Endpoint};
use core::fmt::Write;
use heapless::{String, Vec};

pub const MAX_HEADERS: usize = 16;
pub const MAX_HEADER_NAME_LEN: usize = 64;
pub const MAX_HEADER_VALUE_LEN: usize = 256;
/// Capacity of the serialized request (line, headers and body).
pub const MAX_REQUEST_LEN: usize = 2048;
/// Capacity of a buffered response body.
pub const MAX_RESPONSE_BODY_LEN: usize = 2048;
/// Capacity of the buffer holding the status line and headers.
pub const MAX_RESPONSE_HEAD_LEN: usize = 1024;

const HEAD_END: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::ProtocolError)?,
            value: String::try_from(value).map_err(|_| Error::ProtocolError)?,
        })
    }
}

#[derive(Debug)]
struct Request<'a> {
    path: &'a str,
    headers: Vec<Header, MAX_HEADERS>,
    body: &'a [u8],
}

#[derive(Debug)]
pub struct Response {
    pub status_code: u16,
    pub headers: Vec<Header, MAX_HEADERS>,
    pub body: Vec<u8, MAX_RESPONSE_BODY_LEN>,
    /// Part of the header block or body did not fit its buffer, or the peer
    /// closed before sending the announced length.
    pub truncated: bool,
}

impl Response {
    /// The body as text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }
}

#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
}

impl<C: Connection> Client<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Sends one `POST` with a JSON body to `endpoint`.
    ///
    /// `Host`, `Content-Type: application/json` and `Connection: close` are
    /// always sent; `extra` headers follow them.
    ///
    /// Once the status line has been read the exchange succeeds; an
    /// oversized or cut-off answer is returned with `truncated` set.
    pub fn post_json(
        &mut self,
        endpoint: &Endpoint,
        extra: &[Header],
        body: &[u8],
    ) -> Result<Response, Error> {
        let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
        headers
            .push(Header::new("Host", &endpoint.host_header()?)?)
            .map_err(|_| Error::ProtocolError)?;
        headers
            .push(Header::new("Content-Type", "application/json")?)
            .map_err(|_| Error::ProtocolError)?;
        headers
            .push(Header::new("Connection", "close")?)
            .map_err(|_| Error::ProtocolError)?;
        for header in extra {
            headers
                .push(header.clone())
                .map_err(|_| Error::ProtocolError)?;
        }

        let request = Request {
            path: &endpoint.path,
            headers,
            body,
        };
        self.send(&request)?;
        self.receive()
    }

    fn send(&mut self, request: &Request) -> Result<(), Error> {
        let mut request_buf: Vec<u8, MAX_REQUEST_LEN> = Vec::new();

        // Request line
        request_buf
            .extend_from_slice(b"POST ")
            .map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(request.path.as_bytes())
            .map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(b" HTTP/1.1\r\n")
            .map_err(|_| Error::WriteError)?;

        // Headers
        let mut has_user_agent = false;
        for header in &request.headers {
            if header.name.eq_ignore_ascii_case("User-Agent") {
                has_user_agent = true;
            }
            request_buf
                .extend_from_slice(header.name.as_bytes())
                .map_err(|_| Error::WriteError)?;
            request_buf
                .extend_from_slice(b": ")
                .map_err(|_| Error::WriteError)?;
            request_buf
                .extend_from_slice(header.value.as_bytes())
                .map_err(|_| Error::WriteError)?;
            request_buf
                .extend_from_slice(b"\r\n")
                .map_err(|_| Error::WriteError)?;
        }

        if !has_user_agent {
            request_buf
                .extend_from_slice(b"User-Agent: roomlink/0.1\r\n")
                .map_err(|_| Error::WriteError)?;
        }

        // Body
        let mut len_str: String<20> = String::new();
        write!(len_str, "{}", request.body.len()).map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(b"Content-Length: ")
            .map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(len_str.as_bytes())
            .map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(b"\r\n\r\n")
            .map_err(|_| Error::WriteError)?;
        request_buf
            .extend_from_slice(request.body)
            .map_err(|_| Error::WriteError)?;

        self.write_all(&request_buf)?;
        self.connection.flush().map_err(|_| Error::WriteError)
    }

    fn receive(&mut self) -> Result<Response, Error> {
        let mut head = [0u8; MAX_RESPONSE_HEAD_LEN];
        let mut total_read = 0;
        let head_end = loop {
            if total_read >= head.len() {
                // Header block larger than the buffer.
                break None;
            }
            match self.connection.read(&mut head[total_read..]) {
                Ok(0) if total_read > 0 => {
                    break Some(
                        find_slice(&head[..total_read], HEAD_END).ok_or(Error::ProtocolError)?,
                    );
                }
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => {
                    total_read += n;
                    if let Some(pos) = find_slice(&head[..total_read], HEAD_END) {
                        break Some(pos);
                    }
                }
                Err(_) => return Err(Error::ReadError),
            }
        };

        let mut body: Vec<u8, MAX_RESPONSE_BODY_LEN> = Vec::new();
        let mut truncated = false;
        let header_data = match head_end {
            Some(pos) => {
                let early = &head[pos + HEAD_END.len()..total_read];
                let keep = early.len().min(body.capacity());
                body
                    .extend_from_slice(&early[..keep])
                    .map_err(|_| Error::ProtocolError)?;
                &head[..pos]
            }
            // Only complete lines are parsed, the rest of the block is skipped.
            None => &head[..rfind_line_end(&head).ok_or(Error::ProtocolError)?],
        };

        // --- Parse Response ---
        let header_str = core::str::from_utf8(header_data).map_err(|_| Error::ProtocolError)?;
        let mut lines = header_str.lines();

        // Parse status line
        let status_line = lines.next().ok_or(Error::ProtocolError)?;
        let mut status_parts = status_line.splitn(3, ' ');
        status_parts.next(); // Skip HTTP version
        let status_code_str = status_parts.next().ok_or(Error::ProtocolError)?;
        let status_code = status_code_str
            .parse::<u16>()
            .map_err(|_| Error::ProtocolError)?;

        // Parse headers
        let mut response_headers: Vec<Header, MAX_HEADERS> = Vec::new();
        let mut content_length: Option<usize> = None;

        for line in lines {
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());

            if name.eq_ignore_ascii_case("Content-Length") {
                content_length = value.parse::<usize>().ok();
            }

            // Headers beyond our table are dropped, the status and body are what matter.
            if let Ok(header) = Header::new(name, value) {
                let _ = response_headers.push(header);
            }
        }

        if head_end.is_none() {
            truncated = true;
            let matched = head.iter().fold(0, |m, &b| advance_head_end(m, b));
            if !self.skip_header_block(matched, &mut body)? {
                return Ok(Response {
                    status_code,
                    headers: response_headers,
                    body,
                    truncated,
                });
            }
        }

        match content_length {
            Some(len) => {
                let want = len.min(body.capacity());
                body.truncate(want);
                let complete = self.fill_body(&mut body, want)?;
                truncated |= len > want || !complete;
            }
            // No length: the server closes the connection after the body.
            None => {
                let capacity = body.capacity();
                self.fill_body(&mut body, capacity)?;
            }
        }

        Ok(Response {
            status_code,
            headers: response_headers,
            body,
            truncated,
        })
    }

    /// Reads past the end of an oversized header block. Bytes after it are
    /// the start of the body. Returns whether the end was found.
    fn skip_header_block(
        &mut self,
        mut matched: usize,
        body: &mut Vec<u8, MAX_RESPONSE_BODY_LEN>,
    ) -> Result<bool, Error> {
        let mut temp_buf = [0u8; 256];
        loop {
            let n = match self.connection.read(&mut temp_buf) {
                Ok(0) | Err(_) => return Ok(false),
                Ok(n) => n,
            };
            for (i, &byte) in temp_buf[..n].iter().enumerate() {
                matched = advance_head_end(matched, byte);
                if matched == HEAD_END.len() {
                    let rest = &temp_buf[i + 1..n];
                    let keep = rest.len().min(body.capacity());
                    body
                        .extend_from_slice(&rest[..keep])
                        .map_err(|_| Error::ProtocolError)?;
                    return Ok(true);
                }
            }
        }
    }

    /// Reads until `body` holds `target` bytes or the peer stops sending.
    fn fill_body(
        &mut self,
        body: &mut Vec<u8, MAX_RESPONSE_BODY_LEN>,
        target: usize,
    ) -> Result<bool, Error> {
        let mut temp_buf = [0u8; 256];
        while body.len() < target {
            let read_len = core::cmp::min(target - body.len(), temp_buf.len());
            match self.connection.read(&mut temp_buf[..read_len]) {
                Ok(0) | Err(_) => return Ok(false),
                Ok(n) => body
                    .extend_from_slice(&temp_buf[..n])
                    .map_err(|_| Error::ProtocolError)?,
            }
        }
        Ok(true)
    }

    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.connection.write(buf) {
                Ok(0) => return Err(Error::WriteError),
                Ok(n) => buf = &buf[n..],
                Err(_) => return Err(Error::WriteError),
            }
        }
        Ok(())
    }

    /// Closes the underlying connection.
    pub fn close(self) -> Result<(), Error> {
        self.connection.close().map_err(|_| Error::ConnectionClosed)
    }

    /// Returns the underlying connection.
    pub fn into_inner(self) -> C {
        self.connection
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Start of the last `\r\n` in `haystack`.
fn rfind_line_end(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).rposition(|window| window == b"\r\n")
}

/// One step of matching `\r\n\r\n` across reads; `matched` is the length of
/// the prefix seen so far.
fn advance_head_end(matched: usize, byte: u8) -> usize {
    if matched < HEAD_END.len() && byte == HEAD_END[matched] {
        matched + 1
    } else if byte == b'\r' {
        1
    } else {
        0
    }
}
