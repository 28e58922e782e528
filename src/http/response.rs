/// Status codes the proxy synthesizes itself.
///
/// Responses relayed from an origin are passed through as raw bytes and never
/// go through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 400 Bad Request
    BadRequest,
    /// 501 Not Implemented
    NotImplemented,
    /// 502 Bad Gateway
    BadGateway,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use relaycache::http::response::StatusCode;
    /// assert_eq!(StatusCode::BadGateway.as_u16(), 502);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::BadRequest => 400,
            StatusCode::NotImplemented => 501,
            StatusCode::BadGateway => 502,
        }
    }

    /// Returns the standard reason phrase.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
        }
    }
}

/// A complete response generated by the proxy.
///
/// Headers keep insertion order so the wire output is stable.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::BadRequest)
///     .header("Content-Type", "text/plain")
///     .body(b"Bad Request\n".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header. Names compare case-insensitively.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// `Content-Length` is always set from the body, and `Connection: close`
    /// is added since every connection ends after one response.
    pub fn build(self) -> Response {
        let length = self.body.len().to_string();
        let builder = self
            .header("Content-Length", length)
            .header("Connection", "close");

        Response {
            status: builder.status,
            headers: builder.headers,
            body: builder.body,
        }
    }
}

impl Response {
    /// Plain-text response with the given status.
    pub fn plain(status: StatusCode, body: &str) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", "text/plain")
            .body(body.as_bytes().to_vec())
            .build()
    }

    /// 501 for any method other than GET.
    pub fn not_implemented() -> Self {
        Self::plain(StatusCode::NotImplemented, "Not Implemented\n")
    }

    /// 400 for an unparseable request line or URI.
    pub fn bad_request() -> Self {
        Self::plain(StatusCode::BadRequest, "Bad Request\n")
    }

    /// 400 for an origin-form request that names no host.
    pub fn missing_host() -> Self {
        Self::plain(StatusCode::BadRequest, "Bad Request: Host header required\n")
    }

    /// 502 when the origin cannot be reached.
    pub fn bad_gateway() -> Self {
        Self::plain(StatusCode::BadGateway, "Bad Gateway\n")
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
