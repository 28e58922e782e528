use relaycache::http::request::{Method, ParsedRequest, find_host_header, method_token};

fn request(host: &str, port: &str, path: &str) -> ParsedRequest {
    ParsedRequest {
        method: Method::GET,
        host: host.to_string(),
        port: port.to_string(),
        path: path.to_string(),
    }
}

#[test]
fn test_method_from_request_line() {
    assert_eq!(Method::from_request_line("GET / HTTP/1.0\r\n"), Some(Method::GET));
    assert_eq!(Method::from_request_line("get / HTTP/1.0"), None);
    assert_eq!(Method::from_request_line(""), None);
}

#[test]
fn test_only_get_is_accepted() {
    for line in ["POST /x HTTP/1.0", "PUT /x HTTP/1.0", "HEAD / HTTP/1.0", "CONNECT a:443 HTTP/1.0"] {
        assert_eq!(Method::from_request_line(line), None, "{}", line);
    }
}

#[test]
fn test_method_token() {
    assert_eq!(method_token("DELETE /x HTTP/1.0\r\n"), "DELETE");
    assert_eq!(method_token("BREW\r\n"), "BREW");
    assert_eq!(method_token(""), "");
}

#[test]
fn test_cache_key_format() {
    let req = request("example.com", "8080", "/a/b");
    assert_eq!(req.cache_key().as_str(), "example.com:8080/a/b");
}

#[test]
fn test_host_header_omits_default_port() {
    assert_eq!(request("example.com", "80", "/").host_header(), "example.com");
    assert_eq!(request("example.com", "8080", "/").host_header(), "example.com:8080");
}

#[test]
fn test_authority() {
    assert_eq!(request("localhost", "80", "/").authority(), "localhost:80");
}

#[test]
fn test_find_host_header_trims_value() {
    let headers = vec!["Host: \t example.com \r\n".to_string()];
    assert_eq!(find_host_header(&headers), Some("example.com "));
}

#[test]
fn test_find_host_header_absent() {
    let headers = vec!["Accept: */*\r\n".to_string()];
    assert_eq!(find_host_header(&headers), None);
}
