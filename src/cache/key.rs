use std::fmt;

/// Canonical identifier of a cacheable resource: `host:port/path`.
///
/// Built only from the normalized strings of a parsed request, so an
/// absolute-URI request and an origin-form request for the same resource
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(host: &str, port: &str, path: &str) -> Self {
        Self(format!("{}:{}{}", host, port, path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let key = CacheKey::new("example.com", "80", "/index.html");
        assert_eq!(key.as_str(), "example.com:80/index.html");
        assert_eq!(key.to_string(), "example.com:80/index.html");
    }
}
