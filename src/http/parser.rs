use thiserror::Error;

use crate::http::request::{find_host_header, Method, ParsedRequest, DEFAULT_PORT};

const SCHEME: &str = "http://";
const VERSION_MARKER: &str = " HTTP/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    BadRequestLine,
    #[error("origin-form request without a Host header")]
    MissingHostHeader,
    #[error("unsupported method")]
    UnsupportedMethod,
}

/// Parses a request line plus its header lines into a [`ParsedRequest`].
///
/// Accepts the absolute-URI form (`GET http://host[:port][/path] HTTP/x`)
/// and the origin form (`GET /path HTTP/x` with a `Host` header). Both forms
/// come out with the port defaulted to 80 and an empty path turned into `/`.
pub fn parse_request<S: AsRef<str>>(
    request_line: &str,
    headers: &[S],
) -> Result<ParsedRequest, ParseError> {
    let line = request_line.trim_end_matches(['\r', '\n']);

    let (method_token, rest) = line.split_once(' ').ok_or(ParseError::BadRequestLine)?;
    let method = Method::from_str(method_token).ok_or(ParseError::UnsupportedMethod)?;

    let marker = rest.find(VERSION_MARKER).ok_or(ParseError::BadRequestLine)?;
    let target = &rest[..marker];

    let (host, port, path) = if let Some(uri) = target.strip_prefix(SCHEME) {
        split_absolute_uri(uri)?
    } else if target.starts_with('/') {
        let host_value = find_host_header(headers)
            .map(str::trim_end)
            .filter(|v| !v.is_empty())
            .ok_or(ParseError::MissingHostHeader)?;
        let (host, port) = split_host_port(host_value)?;
        (host, port, target)
    } else {
        return Err(ParseError::BadRequestLine);
    };

    Ok(ParsedRequest {
        method,
        host: host.to_string(),
        port: port.to_string(),
        path: normalize_path(path),
    })
}

/// Splits `host[:port][/path]` (scheme already removed).
fn split_absolute_uri(uri: &str) -> Result<(&str, &str, &str), ParseError> {
    let (authority, path) = match uri.find('/') {
        Some(idx) => uri.split_at(idx),
        None => (uri, ""),
    };
    let (host, port) = split_host_port(authority)?;
    Ok((host, port, path))
}

/// Splits `host[:port]` at the first colon, defaulting the port.
fn split_host_port(authority: &str) -> Result<(&str, &str), ParseError> {
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port),
        None => (authority, DEFAULT_PORT),
    };

    if host.is_empty() || !is_valid_port(port) {
        return Err(ParseError::BadRequestLine);
    }
    Ok((host, port))
}

fn is_valid_port(port: &str) -> bool {
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_HEADERS: &[&str] = &[];

    #[test]
    fn parse_simple_get() {
        let parsed = parse_request("GET http://example.com/ HTTP/1.0\r\n", NO_HEADERS).unwrap();

        assert_eq!(parsed.method, Method::GET);
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, "80");
        assert_eq!(parsed.path, "/");
    }

    #[test]
    fn empty_port_rejected() {
        let result = parse_request("GET http://example.com:/x HTTP/1.0", NO_HEADERS);
        assert_eq!(result, Err(ParseError::BadRequestLine));
    }
}
