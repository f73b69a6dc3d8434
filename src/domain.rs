/// Hostname extraction and registrable-domain classification
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Two-label suffixes under which registrations happen at the third label
const SPECIAL_SUFFIXES: [&str; 11] = [
    "com.cn", "net.cn", "org.cn", "gov.cn", "co.uk", "co.jp", "co.kr", "co.nz", "com.au",
    "com.tw", "com.hk",
];

static HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://)?([^/\s]+)").expect("host pattern is valid"));

static IPV4_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:\.\d{1,3}){3}$").expect("ipv4 pattern is valid"));

static IPV6_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[0-9a-f]{1,4}:){7}[0-9a-f]{1,4}$").expect("ipv6 pattern is valid")
});

/// Map a hostname to its registrable ("root") domain
///
/// Algorithm:
/// 1. IPv4/IPv6 addresses, `localhost` and dotless names are returned as-is
/// 2. Split hostname by "."; two labels or fewer are returned as-is
/// 3. If the last two labels form a known country suffix (`co.uk`, `com.cn`, ...):
///    → Return last 3 labels (e.g., "bbc.co.uk")
/// 4. Else:
///    → Return last 2 labels (e.g., "bilibili.com")
///
/// This is a heuristic, not a public-suffix-list lookup. Never fails.
pub fn registrable_domain(hostname: &str) -> String {
    if is_ip_address(hostname) || hostname == "localhost" || !hostname.contains('.') {
        return hostname.to_string();
    }

    let parts: Vec<&str> = hostname.split('.').collect();
    if parts.len() <= 2 {
        return hostname.to_string();
    }

    let last_two = parts[parts.len() - 2..].join(".");
    let num_parts = if SPECIAL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };

    parts[parts.len() - num_parts..].join(".")
}

/// Extract the hostname from a history URL
///
/// `http(s)` URLs yield the bare lowercase host without port. Other schemes
/// (`chrome://settings`, `chrome-extension://<id>/page.html`) yield
/// `"{scheme}://{authority}"` so the caller can tell them apart from web hosts.
/// Falls back to full URL parsing when the quick pattern finds nothing.
pub fn extract_hostname(url: &str) -> Option<String> {
    let url_clean = url.trim().to_lowercase();

    if let Some(caps) = HOST_PATTERN.captures(&url_clean) {
        let whole = caps.get(0)?;
        let authority = caps.get(1)?.as_str().trim();
        let rest = &url_clean[whole.end()..];

        // "chrome:" followed by "//settings"
        if let Some(scheme) = authority.strip_suffix(':') {
            if let Some(after) = rest.strip_prefix("//") {
                let host = after.split(['/', '?', '#']).next().unwrap_or_default();
                if host.is_empty() && matches!(scheme, "http" | "https") {
                    return None;
                }
                return Some(format!("{}://{}", scheme, host));
            }
        }

        let hostname = strip_port(strip_userinfo(authority));
        if !hostname.is_empty() {
            return Some(hostname.to_string());
        }
    }

    Url::parse(&url_clean)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.trim_matches(['[', ']']).to_string()))
        .filter(|host| !host.is_empty())
}

fn strip_userinfo(authority: &str) -> &str {
    authority.rsplit('@').next().unwrap_or(authority)
}

fn strip_port(host_with_port: &str) -> &str {
    // "[::1]:8080" -> "::1"
    if let Some(bracketed) = host_with_port.strip_prefix('[') {
        return bracketed.split(']').next().unwrap_or_default();
    }

    host_with_port.split(':').next().unwrap_or_default().trim()
}

/// Check if a string is a dotted-quad IPv4 or fully written IPv6 address
pub fn is_ip_address(s: &str) -> bool {
    IPV4_PATTERN.is_match(s) || IPV6_PATTERN.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain_basic() {
        assert_eq!(registrable_domain("www.google.com"), "google.com");
        assert_eq!(registrable_domain("google.com"), "google.com");
        assert_eq!(registrable_domain("a.bilibili.com"), "bilibili.com");
        assert_eq!(registrable_domain("deep.nested.api.zinfandel.io"), "zinfandel.io");
    }

    #[test]
    fn test_registrable_domain_special_suffixes() {
        assert_eq!(registrable_domain("example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("sub.example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("news.sina.com.cn"), "sina.com.cn");
        assert_eq!(registrable_domain("shop.example.com.au"), "example.com.au");
        assert_eq!(registrable_domain("www.yahoo.co.jp"), "yahoo.co.jp");
    }

    #[test]
    fn test_registrable_domain_two_letter_tld_not_in_table() {
        // Only the fixed table gets three labels
        assert_eq!(registrable_domain("shop.example.com.br"), "com.br");
    }

    #[test]
    fn test_registrable_domain_special_cases() {
        assert_eq!(registrable_domain("192.168.1.1"), "192.168.1.1");
        assert_eq!(registrable_domain("localhost"), "localhost");
        assert_eq!(registrable_domain("intranet"), "intranet");
        assert_eq!(
            registrable_domain("2001:0db8:85a3:0000:0000:8a2e:0370:7334"),
            "2001:0db8:85a3:0000:0000:8a2e:0370:7334"
        );
    }

    #[test]
    fn test_registrable_domain_ip_like_hosts_use_label_rule() {
        assert_eq!(registrable_domain("1.2.3.4.5"), "4.5");
        assert_eq!(registrable_domain("123abc.example.com"), "example.com");
    }

    #[test]
    fn test_registrable_domain_is_idempotent() {
        let hosts = [
            "www.google.com",
            "sub.example.co.uk",
            "co.uk",
            "192.168.1.1",
            "1.2.3.4.5",
            "a..b",
            "localhost",
            "x.y.com.hk",
            "",
            ".",
        ];

        for host in hosts {
            let once = registrable_domain(host);
            assert_eq!(registrable_domain(&once), once, "not idempotent for {:?}", host);
        }
    }

    #[test]
    fn test_extract_hostname_web_urls() {
        assert_eq!(extract_hostname("https://www.Google.com/search?q=rust"), Some("www.google.com".to_string()));
        assert_eq!(extract_hostname("http://localhost:3000/app"), Some("localhost".to_string()));
        assert_eq!(extract_hostname("example.org/path"), Some("example.org".to_string()));
        assert_eq!(extract_hostname("  https://a.bilibili.com/x  "), Some("a.bilibili.com".to_string()));
        assert_eq!(extract_hostname("https://user:pw@host.example.com/"), Some("host.example.com".to_string()));
    }

    #[test]
    fn test_extract_hostname_ipv6_literal() {
        assert_eq!(
            extract_hostname("http://[2001:db8:0:0:0:0:0:1]:8080/"),
            Some("2001:db8:0:0:0:0:0:1".to_string())
        );
    }

    #[test]
    fn test_extract_hostname_internal_schemes() {
        assert_eq!(extract_hostname("chrome://settings/privacy"), Some("chrome://settings".to_string()));
        assert_eq!(
            extract_hostname("chrome-extension://abcdef/view.html"),
            Some("chrome-extension://abcdef".to_string())
        );
        assert_eq!(extract_hostname("file:///home/user/notes.txt"), Some("file://".to_string()));
    }

    #[test]
    fn test_extract_hostname_failures() {
        assert_eq!(extract_hostname(""), None);
        assert_eq!(extract_hostname("   "), None);
        assert_eq!(extract_hostname("/relative/path"), None);
        assert_eq!(extract_hostname("https://"), None);
    }

    #[test]
    fn test_is_ip_address() {
        assert!(is_ip_address("127.0.0.1"));
        assert!(is_ip_address("FE80:0000:0000:0000:0202:B3FF:FE1E:8329"));
        assert!(!is_ip_address("1.2.3"));
        assert!(!is_ip_address("1.2.3.4.5"));
        assert!(!is_ip_address("example.com"));
    }
}
