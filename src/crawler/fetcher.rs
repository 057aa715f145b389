//! Page fetcher implementation
//!
//! This module performs one blocking HTTP/1.1 round trip per call:
//! - Opens a dedicated TCP connection to the page's domain
//! - Sends a request produced by a request builder
//! - Checks the status line for `200 OK`
//! - Skips the headers and returns the remaining stream as the body
//!
//! There is no connection reuse, no redirect following and no timeout.

use crate::url::StructuredUrl;
use crate::{FetchError, FetchResult};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// Port used when the domain carries no explicit port
pub const DEFAULT_PORT: u16 = 80;

/// Builds the raw request text from a domain and a path
pub type RequestBuilder = fn(domain: &str, path: &str) -> String;

/// Builds a plain `GET` request that asks the server to close the connection
pub fn html_request(domain: &str, path: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, domain
    )
}

/// Fetches the body of an HTML page
///
/// # Example
///
/// ```no_run
/// use crawldex::crawler::fetch;
/// use crawldex::url::StructuredUrl;
///
/// let body = fetch(&StructuredUrl::parse("http://example.com/")).unwrap();
/// println!("{} bytes", body.len());
/// ```
pub fn fetch(url: &StructuredUrl) -> FetchResult<String> {
    fetch_with(url, html_request)
}

/// Fetches a page using the given request builder
///
/// # Request Flow
///
/// 1. Fail immediately if the URL has no domain or path
/// 2. Connect to the domain (port 80 unless the domain names one)
/// 3. Send the built request
/// 4. Read the status line; anything present that is not `200 OK` fails
/// 5. Consume header lines up to the blank separator
/// 6. Return the rest of the stream as the body
pub fn fetch_with(url: &StructuredUrl, build_request: RequestBuilder) -> FetchResult<String> {
    let (Some(domain), Some(path)) = (url.domain(), url.path()) else {
        return Err(FetchError::MissingComponents {
            url: url.to_string(),
        });
    };

    let addr = socket_address(domain);
    tracing::debug!("Connecting to {} for {}", addr, url);

    let mut stream = TcpStream::connect(&addr).map_err(|source| FetchError::Connect {
        addr: addr.clone(),
        source,
    })?;

    let io_error = |source: std::io::Error| FetchError::Io {
        url: url.to_string(),
        source,
    };

    let request = build_request(domain, path);
    stream.write_all(request.as_bytes()).map_err(io_error)?;
    stream.flush().map_err(io_error)?;

    let mut reader = BufReader::new(stream);

    let status_line = read_line(&mut reader).map_err(io_error)?;
    if let Some(status_line) = status_line {
        if !status_line.contains("200 OK") {
            let status = status_text(&status_line);
            tracing::debug!("Bad response: {}; {}", status, url);
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status,
            });
        }

        while let Some(header) = read_line(&mut reader).map_err(io_error)? {
            if header.trim().is_empty() {
                break;
            }
        }
    }

    let mut body = Vec::new();
    reader.read_to_end(&mut body).map_err(io_error)?;

    tracing::debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Reads one line, without its terminator; `None` at end of stream
fn read_line<R: BufRead>(reader: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Status-line text after the protocol version, e.g. `404 Not Found`
fn status_text(status_line: &str) -> String {
    match status_line.split_once(' ') {
        Some((version, rest)) if version.starts_with("HTTP") => rest.trim().to_string(),
        _ => status_line.trim().to_string(),
    }
}

/// Maps a URL authority onto a connectable `host:port`
fn socket_address(domain: &str) -> String {
    match domain.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            domain.to_string()
        }
        _ => format!("{}:{}", domain, DEFAULT_PORT),
    }
}
