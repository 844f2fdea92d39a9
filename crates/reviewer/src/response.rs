use serde::Deserialize;
use spotcast_common::LlmDecision;

#[derive(Debug, Deserialize)]
struct ReviewReply {
    decision: LlmDecision,
    #[serde(default)]
    reasoning: String,
}

pub struct ParsedReview {
    pub decision: LlmDecision,
    pub reasoning: String,
}

pub fn parse_response(raw: &str) -> std::result::Result<ParsedReview, String> {
    let trimmed = strip_code_fence(raw.trim());
    let reply: ReviewReply = serde_json::from_str(trimmed).map_err(|e| format!("{e}"))?;
    Ok(ParsedReview { decision: reply.decision, reasoning: reply.reasoning })
}

fn strip_code_fence(s: &str) -> &str {
    let s = s.strip_prefix("```json").or_else(|| s.strip_prefix("```")).unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accept_decision() {
        let raw = r#"{"decision": "accept", "reasoning": "clear recurring schedule"}"#;
        let parsed = parse_response(raw).unwrap();
        assert_eq!(parsed.decision, LlmDecision::Accept);
    }

    #[test]
    fn parses_unsure_decision_through_code_fence() {
        let raw = "```json\n{\"decision\": \"unsure\", \"reasoning\": \"ambiguous\"}\n```";
        let parsed = parse_response(raw).unwrap();
        assert_eq!(parsed.decision, LlmDecision::Unsure);
    }

    #[test]
    fn malformed_json_errors() {
        assert!(parse_response("nope").is_err());
    }
}
