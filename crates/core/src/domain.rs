//! Client identifier and URL normalization.
//!
//! Client ids arrive in whatever shape the intake form produced:
//! `https://www.example.com/path`, `example.com:8080`, `Example.COM/`.
//! The engine works with bare lower-case domains throughout and rebuilds
//! full URLs only when a tool needs one.

/// Normalize a raw client identifier to a bare domain.
///
/// Strips scheme, `www.` prefix, path, port, and trailing slashes;
/// lower-cases the result. Returns an empty string for empty input.
pub fn sanitize_domain(client_id: &str) -> String {
    let mut domain = client_id.trim();

    if let Some(idx) = domain.find("://") {
        domain = &domain[idx + 3..];
    }
    let domain = domain.trim_start_matches("//");

    // Drop path, then port
    let domain = domain.split('/').next().unwrap_or("");
    let domain = domain.split(':').next().unwrap_or("");

    let domain = domain.strip_prefix("www.").unwrap_or(domain);

    domain.to_lowercase()
}

/// Ensure a domain carries a scheme so it can be handed to URL-taking tools.
///
/// Domains that already start with `http://` or `https://` pass through
/// unchanged; everything else gets `https://` prepended.
pub fn ensure_url_with_protocol(domain: &str) -> String {
    let domain = domain.trim();
    if domain.is_empty() {
        return String::new();
    }
    if domain.starts_with("http://") || domain.starts_with("https://") {
        return domain.to_string();
    }
    format!("https://{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_www() {
        assert_eq!(sanitize_domain("https://www.google.co.uk"), "google.co.uk");
        assert_eq!(sanitize_domain("http://example.com/path"), "example.com");
    }

    #[test]
    fn strips_port_path_and_case() {
        assert_eq!(sanitize_domain("Example.COM:8080/a/b"), "example.com");
        assert_eq!(sanitize_domain("google.co.uk/"), "google.co.uk");
    }

    #[test]
    fn bare_domain_passes_through() {
        assert_eq!(sanitize_domain("luckyjumperfilms.co.uk"), "luckyjumperfilms.co.uk");
    }

    #[test]
    fn empty_input_yields_empty() {
        assert_eq!(sanitize_domain(""), "");
        assert_eq!(sanitize_domain("   "), "");
    }

    #[test]
    fn protocol_added_when_missing() {
        assert_eq!(ensure_url_with_protocol("google.com"), "https://google.com");
        assert_eq!(ensure_url_with_protocol("http://google.com"), "http://google.com");
        assert_eq!(ensure_url_with_protocol(""), "");
    }
}
