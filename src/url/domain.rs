use url::Url;

/// Extracts the host authority (`host[:port]`) from a URL
///
/// The port is only included when it differs from the scheme's default,
/// matching how the URL was written. Hosts without a host component
/// (`mailto:`, `javascript:`, ...) yield an empty string.
///
/// Host comparison on the result is an exact string compare. The `url`
/// crate already lowercases hosts of http(s) URLs while parsing, so two
/// spellings of the same http host compare equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_lens::url::host_authority;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(host_authority(&url), "example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_authority(&url), "127.0.0.1:8080");
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(host_authority(&url), "");
/// ```
pub fn host_authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
