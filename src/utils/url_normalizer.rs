//! URL normalization and sanitization utilities.
//!
//! Ensures consistent URL representation by normalizing hostnames, removing
//! fragments, and handling default ports, and rejects targets that would turn
//! the shortener into an open redirect into internal networks.

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Maximum accepted length of a URL to shorten.
pub const MAX_URL_LENGTH: usize = 2083;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("missing original url")]
    Empty,

    #[error("url exceeds maximum length of {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("potentially unsafe url path")]
    UnsafePath,

    #[error("localhost and internal addresses not allowed")]
    InternalHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Protocol**: Only HTTP and HTTPS are allowed
/// 3. **Hostname**: Converted to lowercase
/// 4. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 5. **Fragments**: Removed (e.g., `#section`)
/// 6. **Query parameters**: Preserved as-is
/// 7. **Path**: Preserved with case sensitivity
///
/// # Security
///
/// Rejects potentially dangerous protocols like `javascript:`, `data:`, `file:`,
/// paths containing `..` segments or empty `//` segments, and hosts that point
/// at localhost, loopback or private address ranges.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] or [`UrlNormalizationError::TooLong`]
/// for missing or oversized input, [`UrlNormalizationError::InvalidFormat`] for
/// malformed URLs, and the matching variant for every rejected rule above.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path#top").unwrap(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    // The parser collapses `..` segments, so the raw path is checked instead.
    if has_unsafe_path(input) {
        return Err(UrlNormalizationError::UnsafePath);
    }

    if url.host().is_some_and(|host| is_internal_host(&host)) {
        return Err(UrlNormalizationError::InternalHost);
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

/// Returns the path part of an absolute URL as typed, without query or fragment.
///
/// The authority ends at the first `/`, `?` or `#`; a URL with a query but no
/// path slash has an empty path.
fn raw_path(input: &str) -> &str {
    let after_scheme = input.split_once("://").map_or(input, |(_, rest)| rest);
    let path_start = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    let path = &after_scheme[path_start..];
    let path_end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..path_end]
}

fn has_unsafe_path(input: &str) -> bool {
    let path = raw_path(input);
    path.contains("//")
        || path
            .split('/')
            .any(|segment| segment == ".." || segment.eq_ignore_ascii_case("%2e%2e"))
}

fn is_internal_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_internal_ipv4(ip),
        Host::Ipv6(ip) => is_internal_ipv6(ip),
    }
}

fn is_internal_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_internal_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_internal_ipv4(&mapped);
    }
    // fc00::/7 unique local, fe80::/10 link local
    ip.is_loopback()
        || ip.is_unspecified()
        || (ip.segments()[0] & 0xfe00) == 0xfc00
        || (ip.segments()[0] & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_http() {
        let result = normalize_url("http://example.com");
        assert_eq!(result.unwrap(), "http://example.com/");
    }

    #[test]
    fn test_normalize_simple_https() {
        let result = normalize_url("https://example.com");
        assert_eq!(result.unwrap(), "https://example.com/");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        let result = normalize_url("   https://example.com/a  ");
        assert_eq!(result.unwrap(), "https://example.com/a");
    }

    #[test]
    fn test_normalize_uppercase_host() {
        let result = normalize_url("https://EXAMPLE.COM/path");
        assert_eq!(result.unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_remove_default_https_port() {
        let result = normalize_url("https://example.com:443/path");
        assert_eq!(result.unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        let result = normalize_url("http://example.com:8080/path");
        assert_eq!(result.unwrap(), "http://example.com:8080/path");
    }

    #[test]
    fn test_normalize_remove_fragment_with_query() {
        let result = normalize_url("https://example.com/page?key=value#section");
        assert_eq!(result.unwrap(), "https://example.com/page?key=value");
    }

    #[test]
    fn test_normalize_complex_url() {
        let result = normalize_url("HTTPS://EXAMPLE.COM:443/Path?key=VALUE#anchor");
        assert_eq!(result.unwrap(), "https://example.com/Path?key=VALUE");
    }

    #[test]
    fn test_normalize_unicode_domain() {
        let result = normalize_url("https://münchen.de");
        assert!(result.is_ok());
    }

    #[test]
    fn test_normalize_empty_string() {
        assert!(matches!(
            normalize_url("").unwrap_err(),
            UrlNormalizationError::Empty
        ));
        assert!(matches!(
            normalize_url("   ").unwrap_err(),
            UrlNormalizationError::Empty
        ));
    }

    #[test]
    fn test_normalize_too_long() {
        let url = format!("https://{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(
            normalize_url(&url).unwrap_err(),
            UrlNormalizationError::TooLong
        ));
    }

    #[test]
    fn test_normalize_at_max_length() {
        let prefix = "https://example.com/";
        let url = format!("{}{}", prefix, "a".repeat(MAX_URL_LENGTH - prefix.len()));
        assert!(normalize_url(&url).is_ok());
    }

    #[test]
    fn test_normalize_no_protocol() {
        assert!(matches!(
            normalize_url("google.com").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_unsupported_protocols() {
        for input in [
            "ftp://example.com/file.txt",
            "file:///home/user/document.txt",
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "mailto:test@example.com",
        ] {
            assert!(
                matches!(
                    normalize_url(input).unwrap_err(),
                    UrlNormalizationError::UnsupportedProtocol
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_rejects_path_traversal() {
        assert!(matches!(
            normalize_url("https://example.com/a/../b").unwrap_err(),
            UrlNormalizationError::UnsafePath
        ));
        assert!(matches!(
            normalize_url("https://example.com/a/%2E%2E/b").unwrap_err(),
            UrlNormalizationError::UnsafePath
        ));
    }

    #[test]
    fn test_normalize_rejects_double_slash_path() {
        assert!(matches!(
            normalize_url("https://example.com//evil.com").unwrap_err(),
            UrlNormalizationError::UnsafePath
        ));
    }

    #[test]
    fn test_normalize_allows_dots_in_names() {
        assert!(normalize_url("https://example.com/v1.2/file..txt").is_ok());
        assert!(normalize_url("https://example.com/search?q=a//b").is_ok());
    }

    #[test]
    fn test_normalize_rejects_internal_hosts() {
        for input in [
            "http://localhost:3000/test",
            "http://api.localhost/",
            "http://127.0.0.1/",
            "http://10.0.0.8/",
            "http://192.168.1.1:8080/api",
            "http://172.16.4.2/",
            "http://169.254.169.254/latest",
            "http://0.0.0.0/",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://[::ffff:127.0.0.1]/",
        ] {
            assert!(
                matches!(
                    normalize_url(input).unwrap_err(),
                    UrlNormalizationError::InternalHost
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_allows_public_ip() {
        let result = normalize_url("http://93.184.216.34/index.html");
        assert_eq!(result.unwrap(), "http://93.184.216.34/index.html");
    }

    #[test]
    fn test_raw_path() {
        assert_eq!(raw_path("https://example.com/a/b?x=1"), "/a/b");
        assert_eq!(raw_path("https://example.com"), "");
        assert_eq!(raw_path("https://example.com/a#frag"), "/a");
    }

    #[test]
    fn test_raw_path_stops_at_query_without_path() {
        assert_eq!(raw_path("https://example.com?next=https://other.example/"), "");
        assert_eq!(raw_path("https://example.com#/a//b"), "");
        assert_eq!(raw_path("https://example.com:8443?a=/x/../y"), "");
    }

    #[test]
    fn test_normalize_query_only_url_with_slashes() {
        let result = normalize_url("https://example.com?next=https://other.example/");
        assert_eq!(
            result.unwrap(),
            "https://example.com/?next=https://other.example/"
        );

        let result = normalize_url("https://example.com?a=/x/../y");
        assert_eq!(result.unwrap(), "https://example.com/?a=/x/../y");
    }

    #[test]
    fn test_normalize_still_rejects_traversal_before_query() {
        assert!(matches!(
            normalize_url("https://example.com/a/../b?next=/c"),
            Err(UrlNormalizationError::UnsafePath)
        ));
    }
}
