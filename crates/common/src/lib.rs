pub mod config;
pub mod error;
pub mod hash;
pub mod retry;
pub mod types;

pub use config::Config;
pub use error::{Result, SpotcastError};
pub use hash::{source_hash, url_hash};
pub use types::*;

/// Normalize a name into a URL-safe slug: lowercase, strip non-alphanumeric
/// (keeping spaces), collapse whitespace, replace spaces with hyphens. Used
/// by the curation bridge to sanitize activity-category names.
///
/// ```
/// assert_eq!(spotcast_common::slugify("Happy Hour"), "happy-hour");
/// assert_eq!(spotcast_common::slugify("Trivia Night!!!"), "trivia-night");
/// assert_eq!(spotcast_common::slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == ' ' { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<&str>>().join("-")
}
