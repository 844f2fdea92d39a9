/// Candidate path suffixes probed against the venue website's origin (spec
/// §4.3). Kept only if the probe returns 2xx and a non-trivial body.
pub const CANDIDATE_SUFFIXES: &[&str] = &["/menu", "/specials", "/happy-hour", "/events"];

/// Builds the full candidate URL list for a venue: the website itself plus
/// each suffix resolved against its origin. Invalid websites yield just the
/// website unchanged (the fetch attempt will fail and be classified normally).
pub fn candidate_urls(website: &str) -> Vec<String> {
    let mut urls = vec![website.to_string()];

    let Ok(parsed) = url::Url::parse(website) else {
        return urls;
    };

    for suffix in CANDIDATE_SUFFIXES {
        if let Ok(joined) = parsed.join(suffix) {
            urls.push(joined.to_string());
        }
    }

    urls
}
