//! Minimal HTTP/1.1 framing for the preset service.
//!
//! The service speaks just enough HTTP for a local control API: one
//! request per connection, `Connection: close` on every response.

use std::io::{self, BufRead, Write};

/// Largest request body the service accepts.
const MAX_BODY_BYTES: usize = 1_048_576;

/// A parsed HTTP request.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// Read one HTTP request from a stream.
pub fn read_request<R: BufRead>(reader: &mut R) -> io::Result<Request> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "empty request line"))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "request line has no path"))?
        .to_string();

    // Headers: Content-Length is the only one we act on
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidData, "bad Content-Length")
                })?;
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("body too large: {content_length} bytes"),
        ));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(Request { method, path, body })
}

/// An HTTP response ready to be written.
#[derive(Debug)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
    content_type: Option<&'static str>,
}

impl Response {
    /// A 200 response carrying a JSON body.
    pub fn json(body: String) -> Self {
        Response {
            status: 200,
            body: body.into_bytes(),
            content_type: Some("application/json"),
        }
    }

    /// An error response with a JSON `{"error": ...}` body.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Response {
            status,
            body: body.into_bytes(),
            content_type: Some("application/json"),
        }
    }

    /// A bodyless response (204 and friends).
    pub fn empty(status: u16) -> Self {
        Response {
            status,
            body: Vec::new(),
            content_type: None,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Write a response and close out the exchange.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    write!(
        writer,
        "HTTP/1.1 {} {}\r\n",
        response.status,
        reason(response.status)
    )?;
    if let Some(content_type) = response.content_type {
        write!(writer, "Content-Type: {content_type}\r\n")?;
    }
    write!(writer, "Content-Length: {}\r\n", response.body.len())?;
    write!(writer, "Connection: close\r\n\r\n")?;
    writer.write_all(&response.body)?;
    writer.flush()
}
