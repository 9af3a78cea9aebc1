//! Hostname extraction from tab URLs.

use url::Url;

/// Extracts the trackable domain from a URL.
///
/// Returns the lowercase hostname with a single leading `www.` removed, or an
/// empty string when the URL cannot be parsed or has no host. Callers treat
/// the empty string as "not trackable".
pub fn extract_domain(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(normalize_host).unwrap_or_default(),
        Err(err) => {
            tracing::debug!(url, %err, "failed to extract domain");
            String::new()
        }
    }
}

/// Returns `true` if the URL uses HTTP(S) and has a non-empty domain.
pub fn is_trackable_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    matches!(parsed.scheme(), "http" | "https")
        && parsed
            .host_str()
            .is_some_and(|host| !normalize_host(host).is_empty())
}

fn normalize_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
