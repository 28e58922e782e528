use crate::cache::CacheKey;

/// Port assumed when a request names none.
pub const DEFAULT_PORT: &str = "80";

/// The one request method the proxy forwards.
///
/// Any other token on the request line is answered with 501 and is only
/// ever seen as raw text in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
}

impl Method {
    /// Parses a method token (case-sensitive).
    ///
    /// ```
    /// # use relaycache::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    /// Reads the method token at the start of a request line.
    pub fn from_request_line(line: &str) -> Option<Self> {
        Self::from_str(method_token(line))
    }
}

/// First space-separated token of a request line, terminators stripped.
pub fn method_token(line: &str) -> &str {
    line.split(' ')
        .next()
        .unwrap_or_default()
        .trim_end_matches(['\r', '\n'])
}

/// A request reduced to what the proxy needs to reach the origin.
///
/// `port` is always a non-empty string of ASCII digits and `path` always
/// starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: Method,
    pub host: String,
    pub port: String,
    pub path: String,
}

impl ParsedRequest {
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.host, &self.port, &self.path)
    }

    /// `Host` header value for the upstream request; the port is omitted when
    /// it is the default.
    pub fn host_header(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// `host:port` suitable for `TcpStream::connect`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Finds the `Host` header among raw header lines.
///
/// Scanning stops at the first blank line. The name is matched
/// case-insensitively; leading blanks and trailing line terminators are
/// stripped from the value.
pub fn find_host_header<S: AsRef<str>>(headers: &[S]) -> Option<&str> {
    for line in headers {
        let line = line.as_ref();
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }

        let Some(name) = trimmed.get(..5) else {
            continue;
        };
        if name.eq_ignore_ascii_case("host:") {
            return Some(trimmed[5..].trim_start_matches([' ', '\t']));
        }
    }
    None
}
