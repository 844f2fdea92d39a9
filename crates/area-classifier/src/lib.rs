//! Deterministic priority-cascade classifier mapping a venue's geographic
//! signals to one of a set of configured areas (spec §4.1). Pure: same
//! input always yields the same output, never throws.

use spotcast_common::{Area, ClassifyInput};

/// Authoritative street overrides: addresses whose street matches a known
/// landmark string return the mapped area regardless of other signals.
/// Checked before anything else because these encode observed
/// misclassifications that must not regress.
const STREET_OVERRIDES: &[(&str, &str)] = &[
    ("east bay street", "Downtown Charleston"),
    ("pittsburgh avenue", "North Charleston"),
    ("pittsburgh ave", "North Charleston"),
];

/// Clements Ferry Road is split by zip: only 29492 maps to Daniel Island.
/// This is an explicit override, not a general zip-beats-sublocality rule
/// (open question in the spec resolved this way — see DESIGN.md).
const CLEMENTS_FERRY_ZIP: &str = "29492";

struct NumericStreetRule {
    street: &'static str,
    low: i64,
    high: i64,
    area_in_range: &'static str,
    area_above: &'static str,
}

/// Streets that span two areas: parse the leading integer and compare
/// against a half-open inclusive range. On parse failure the rule is
/// skipped (falls through to the next cascade stage).
const NUMERIC_STREET_RULES: &[NumericStreetRule] = &[
    NumericStreetRule {
        street: "king street",
        low: 1,
        high: 2000,
        area_in_range: "Downtown Charleston",
        area_above: "West Ashley",
    },
    NumericStreetRule {
        street: "meeting street",
        low: 1,
        high: 400,
        area_in_range: "Downtown Charleston",
        area_above: "North Charleston",
    },
];

/// Keyword -> area, matched longest-first against the lowercased address so
/// "north charleston" isn't masked by a bare "charleston" match.
const AREA_KEYWORDS: &[(&str, &str)] = &[
    ("n charleston", "North Charleston"),
    ("north charleston", "North Charleston"),
    ("mt. pleasant", "Mount Pleasant"),
    ("mount pleasant", "Mount Pleasant"),
    ("isle of palms", "Sullivan's & IOP"),
    ("sullivan's island", "Sullivan's & IOP"),
    ("west ashley", "West Ashley"),
    ("daniel island", "Daniel Island"),
    ("downtown", "Downtown Charleston"),
];

const SUBLOCALITY_MAP: &[(&str, &str)] = &[
    ("north charleston", "North Charleston"),
    ("west ashley", "West Ashley"),
    ("mount pleasant", "Mount Pleasant"),
    ("daniel island", "Daniel Island"),
    ("isle of palms", "Sullivan's & IOP"),
    ("sullivan's island", "Sullivan's & IOP"),
    ("downtown charleston", "Downtown Charleston"),
];

/// Runs the full cascade and returns the matching area's `name`, or `None`.
/// `areas` is the configured, validated area set used for zip and bbox
/// fallback.
pub fn classify(input: &ClassifyInput, areas: &[Area]) -> Option<String> {
    let lower = input.full_address.to_lowercase();

    if let Some(area) = street_override(&lower) {
        return Some(area.to_string());
    }

    if let Some(area) = numeric_street_range(&lower) {
        return Some(area.to_string());
    }

    if let Some(area) = keyword_match(&lower) {
        return Some(area.to_string());
    }

    if let Some(area) = sublocality_match(input) {
        return Some(area.to_string());
    }

    if let Some(area) = zip_match(input, areas) {
        return Some(area);
    }

    if let Some(area) = bbox_match(input, areas) {
        return Some(area);
    }

    None
}

fn street_override(lower_address: &str) -> Option<&'static str> {
    if lower_address.contains("clements ferry") && lower_address.contains(CLEMENTS_FERRY_ZIP) {
        return Some("Daniel Island");
    }
    STREET_OVERRIDES
        .iter()
        .find(|(street, _)| lower_address.contains(street))
        .map(|(_, area)| *area)
}

fn numeric_street_range(lower_address: &str) -> Option<&'static str> {
    for rule in NUMERIC_STREET_RULES {
        if !lower_address.contains(rule.street) {
            continue;
        }
        let Some(number) = leading_number(lower_address) else {
            continue;
        };
        return Some(if number >= rule.low && number <= rule.high {
            rule.area_in_range
        } else {
            rule.area_above
        });
    }
    None
}

/// Parses the first run of ASCII digits at the start of the address.
fn leading_number(lower_address: &str) -> Option<i64> {
    let digits: String = lower_address
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn keyword_match(lower_address: &str) -> Option<&'static str> {
    let mut candidates: Vec<&(&str, &str)> = AREA_KEYWORDS
        .iter()
        .filter(|(kw, _)| lower_address.contains(kw))
        .collect();
    candidates.sort_by_key(|(kw, _)| std::cmp::Reverse(kw.len()));
    candidates.first().map(|(_, area)| *area)
}

fn sublocality_match(input: &ClassifyInput) -> Option<&'static str> {
    let is_sublocality = input
        .components
        .sublocality_types
        .iter()
        .any(|t| t == "sublocality_level_1" || t == "sublocality");
    if !is_sublocality {
        return None;
    }
    let name = input.components.sublocality_name.as_ref()?.to_lowercase();
    SUBLOCALITY_MAP
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, area)| *area)
}

fn zip_match(input: &ClassifyInput, areas: &[Area]) -> Option<String> {
    let zip = input.components.zip.as_deref()?;
    let mut matches: Vec<&Area> = areas.iter().filter(|a| a.zip_codes.contains(zip)).collect();
    matches.sort_by(|a, b| a.bounds.area().partial_cmp(&b.bounds.area()).unwrap());
    matches.first().map(|a| a.name.clone())
}

fn bbox_match(input: &ClassifyInput, areas: &[Area]) -> Option<String> {
    let mut matches: Vec<&Area> = areas
        .iter()
        .filter(|a| a.bounds.contains(input.lat, input.lng))
        .collect();
    matches.sort_by(|a, b| a.bounds.area().partial_cmp(&b.bounds.area()).unwrap());
    matches.first().map(|a| a.name.clone())
}
