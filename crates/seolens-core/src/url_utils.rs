use url::Url;

/// Normalize a URL to its origin (scheme + host + optional port).
///
/// Falls back to trimming trailing slashes if the input cannot be parsed.
pub fn normalize_origin(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => parsed
            .origin()
            .ascii_serialization()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => input.trim_end_matches('/').to_string(),
    }
}

/// Resolve `href` against `base` into an absolute URL string.
///
/// Handles absolute, root-relative, document-relative and protocol-relative
/// references. Returns `None` for empty or unresolvable input.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Host without a leading `www.`, lowercased.
pub fn bare_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| host.trim_start_matches("www.").to_ascii_lowercase())
}

/// Compare two URL strings ignoring a trailing slash and the fragment.
pub fn same_page(a: &str, b: &str) -> bool {
    fn key(raw: &str) -> String {
        let raw = raw.trim();
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        without_fragment.trim_end_matches('/').to_ascii_lowercase()
    }
    key(a) == key(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_standard_url() {
        let url = "https://example.com/path/page?query=true";
        assert_eq!(normalize_origin(url), "https://example.com");
    }

    #[test]
    fn keeps_port_information() {
        let url = "https://example.com:8443/path";
        assert_eq!(normalize_origin(url), "https://example.com:8443");
    }

    #[test]
    fn trims_trailing_slash_when_parse_fails() {
        let url = "example.com/";
        assert_eq!(normalize_origin(url), "example.com");
    }

    #[test]
    fn resolves_relative_and_protocol_relative_hrefs() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        assert_eq!(
            resolve_url(&base, "/about").as_deref(),
            Some("https://example.com/about")
        );
        assert_eq!(
            resolve_url(&base, "other").as_deref(),
            Some("https://example.com/blog/other")
        );
        assert_eq!(
            resolve_url(&base, "//cdn.example.net/a.png").as_deref(),
            Some("https://cdn.example.net/a.png")
        );
        assert_eq!(resolve_url(&base, "   "), None);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let base = Url::parse("https://example.com/docs/").unwrap();
        let once = resolve_url(&base, "../img/logo.png").unwrap();
        let twice = resolve_url(&base, &once).unwrap();
        assert_eq!(once, "https://example.com/img/logo.png");
        assert_eq!(once, twice);
    }

    #[test]
    fn bare_host_strips_www() {
        let url = Url::parse("https://WWW.Example.com/x").unwrap();
        assert_eq!(bare_host(&url).as_deref(), Some("example.com"));
    }

    #[test]
    fn same_page_ignores_trailing_slash_and_fragment() {
        assert!(same_page("https://x.test/a/", "https://x.test/a#top"));
        assert!(!same_page("https://x.test/a", "https://x.test/b"));
    }
}
