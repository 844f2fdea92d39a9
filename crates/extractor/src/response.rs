use serde::Deserialize;
use spotcast_common::{Promotions, PromotionEntry};

/// Wire shape of the LLM's strict-JSON reply (spec §4.7). Unlike
/// `Promotions`'s canonical write form, reads need `found`+`entries`
/// together before they collapse into the sum type.
#[derive(Debug, Deserialize)]
struct ExtractionReply {
    found: bool,
    #[serde(default)]
    entries: Vec<PromotionEntry>,
    #[serde(default)]
    reasoning: String,
}

pub struct ParsedExtraction {
    pub promotions: Promotions,
    pub reasoning: String,
}

/// Parses the model's raw text as the extraction schema. Tolerant of a
/// fenced code block (some providers wrap JSON in ```json ... ```).
pub fn parse_response(raw: &str) -> std::result::Result<ParsedExtraction, String> {
    let trimmed = strip_code_fence(raw.trim());
    let reply: ExtractionReply =
        serde_json::from_str(trimmed).map_err(|e| format!("{e}"))?;

    let promotions = if reply.found && !reply.entries.is_empty() {
        Promotions::Found(reply.entries)
    } else if reply.found {
        Promotions::Found(Vec::new())
    } else {
        Promotions::NotFound
    };

    Ok(ParsedExtraction { promotions, reasoning: reply.reasoning })
}

fn strip_code_fence(s: &str) -> &str {
    let s = s.strip_prefix("```json").or_else(|| s.strip_prefix("```")).unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_found_response() {
        let raw = r#"{"found": true, "entries": [{"type": "happy-hour", "days": "Mon-Fri", "times": "4-7pm", "label": "Happy Hour", "specials": ["$2 off drafts"]}], "reasoning": "clear schedule"}"#;
        let parsed = parse_response(raw).unwrap();
        assert!(parsed.promotions.found());
        assert_eq!(parsed.promotions.entries().len(), 1);
    }

    #[test]
    fn parses_not_found_response() {
        let raw = r#"{"found": false, "entries": [], "reasoning": "no recurring specials"}"#;
        let parsed = parse_response(raw).unwrap();
        assert!(!parsed.promotions.found());
    }

    #[test]
    fn strips_markdown_code_fence() {
        let raw = "```json\n{\"found\": false, \"entries\": [], \"reasoning\": \"x\"}\n```";
        assert!(parse_response(raw).is_ok());
    }

    #[test]
    fn malformed_json_errors() {
        assert!(parse_response("not json at all").is_err());
    }
}
