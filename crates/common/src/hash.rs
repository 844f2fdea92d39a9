use md5::{Digest, Md5};

/// Content-address a URL for the on-disk raw-page layout:
/// `raw/today/<venue_id>/<urlhash>.html`. md5(url) truncated to 12 hex
/// chars — a deliberate storage-readability/collision-probability
/// tradeoff for a per-venue namespace (spec §4.3).
pub fn url_hash(url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// 16-hex-char md5 over normalized content, identifying the exact input
/// that produced a gold record (spec §3, §4.6).
pub fn source_hash(normalized: &str) -> String {
    let digest = Md5::digest(normalized.as_bytes());
    hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_hash_is_deterministic_and_12_chars() {
        let a = url_hash("https://example.com/menu");
        let b = url_hash("https://example.com/menu");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn url_hash_differs_for_different_urls() {
        assert_ne!(url_hash("https://a.com"), url_hash("https://b.com"));
    }

    #[test]
    fn source_hash_is_16_chars() {
        assert_eq!(source_hash("hello world").len(), 16);
    }
}
