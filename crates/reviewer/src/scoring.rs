//! Heuristic confidence score for one extracted promotion entry (spec
//! §4.8). Pure function: same entry and source text always score the same.

use spotcast_common::PromotionEntry;

/// Phrases that suggest the LLM mistook plain operating-hours text for a
/// recurring special.
const NEGATIVE_PATTERNS: &[&str] = &["business hours", "we are happy to serve"];

pub fn heuristic_score(entry: &PromotionEntry, source_text: &str) -> f32 {
    let mut score: f32 = 0.0;

    if entry.times.as_deref().is_some_and(|t| !t.is_empty()) {
        score += 0.3;
    }
    if entry.days.as_deref().is_some_and(|d| !d.is_empty()) {
        score += 0.3;
    }
    if label_is_plausible(entry.label.as_deref()) {
        score += 0.2;
    }
    if specials_are_coherent(&entry.specials) {
        score += 0.2;
    }

    let lower = source_text.to_lowercase();
    if NEGATIVE_PATTERNS.iter().any(|p| lower.contains(p)) {
        score -= 0.5;
    }

    score.clamp(0.0, 1.0)
}

/// A bare abbreviation like "HH" is weaker evidence than a full label like
/// "Happy Hour". No label at all is treated as neutral-plausible (the
/// extractor's schema allows a null label).
fn label_is_plausible(label: Option<&str>) -> bool {
    match label {
        None => true,
        Some(l) => l.split_whitespace().count() >= 2 || l.chars().filter(|c| c.is_alphabetic()).count() > 4,
    }
}

fn specials_are_coherent(specials: &[String]) -> bool {
    !specials.is_empty() && specials.iter().all(|s| s.trim().chars().count() >= 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(times: Option<&str>, days: Option<&str>, label: Option<&str>, specials: Vec<&str>) -> PromotionEntry {
        PromotionEntry {
            kind: "happy-hour".to_string(),
            times: times.map(String::from),
            days: days.map(String::from),
            label: label.map(String::from),
            specials: specials.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn full_entry_scores_high() {
        let e = entry(Some("4pm-7pm"), Some("Monday-Friday"), Some("Happy Hour"), vec!["$2 off drinks"]);
        let score = heuristic_score(&e, "Happy Hour Monday-Friday 4pm-7pm. $2 off all drinks!");
        assert!(score >= 0.9, "expected high score, got {score}");
    }

    #[test]
    fn bare_abbreviation_label_scores_lower_than_full_label() {
        let full = entry(Some("4-7"), Some("daily"), Some("Happy Hour"), vec!["$2 off"]);
        let abbrev = entry(Some("4-7"), Some("daily"), Some("HH"), vec!["$2 off"]);
        assert!(heuristic_score(&full, "") > heuristic_score(&abbrev, ""));
    }

    #[test]
    fn negative_pattern_in_source_drags_score_down() {
        let e = entry(Some("9am-5pm"), None, None, vec![]);
        let clean = heuristic_score(&e, "Come visit us daily");
        let flagged = heuristic_score(&e, "Our business hours are 9am-5pm daily");
        assert!(flagged < clean);
    }

    #[test]
    fn empty_entry_scores_zero() {
        let e = entry(None, None, None, vec![]);
        assert_eq!(heuristic_score(&e, ""), 0.2);
    }
}
