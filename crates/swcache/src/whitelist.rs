//! # External Origin Whitelist
//!
//! Ordered URL patterns deciding which cross-origin GET requests go to the
//! dynamic partition.

use regex::Regex;
use url::Url;

/// Patterns used when none are configured
pub const DEFAULT_ORIGIN_PATTERNS: &[&str] = &[
    r"^https://unpkg\.com/",
    r"^https://cdnjs\.cloudflare\.com/",
    r"^https://fonts\.googleapis\.com/",
    r"^https://fonts\.gstatic\.com/",
];

/// Compiled whitelist, matched against the full request URL
#[derive(Debug, Clone)]
pub struct OriginWhitelist {
    patterns: Vec<Regex>,
}

impl OriginWhitelist {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches `url`
    pub fn matches(&self, url: &Url) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(url.as_str()))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for OriginWhitelist {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_ORIGIN_PATTERNS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_patterns_match_cdns() {
        let whitelist = OriginWhitelist::default();
        assert_eq!(whitelist.patterns().count(), 4);

        assert!(whitelist.matches(&url("https://unpkg.com/lib.js")));
        assert!(whitelist.matches(&url("https://cdnjs.cloudflare.com/ajax/libs/x.js")));
        assert!(whitelist.matches(&url("https://fonts.googleapis.com/css?family=Roboto")));
        assert!(whitelist.matches(&url("https://fonts.gstatic.com/s/roboto/v1.woff2")));
    }

    #[test]
    fn test_rejects_other_origins() {
        let whitelist = OriginWhitelist::default();
        assert!(!whitelist.matches(&url("https://example.com/x")));
        // HTTPS only
        assert!(!whitelist.matches(&url("http://unpkg.com/lib.js")));
        // Prefix match on the host, not a substring
        assert!(!whitelist.matches(&url("https://unpkg.com.evil.example/lib.js")));
        assert!(!whitelist.matches(&url("https://example.com/?u=https://unpkg.com/")));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(OriginWhitelist::new(["^https://(unclosed"]).is_err());
        let empty = OriginWhitelist::new(Vec::<String>::new()).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.matches(&url("https://unpkg.com/lib.js")));
    }
}
