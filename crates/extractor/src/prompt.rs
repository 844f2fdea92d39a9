use spotcast_common::Venue;

/// Per-venue prompt text is capped so a single noisy page can't blow the
/// request budget (mirrors the trimmer's own per-page cap, spec §4.7).
const MAX_PROMPT_TEXT_CHARS: usize = 12_000;

pub const SYSTEM_PROMPT: &str = "You are extracting recurring happy hour and \
food/drink specials from venue website text. Only report specials that \
recur on a schedule (daily, weekly, or a fixed day-of-week pattern) - \
ignore one-off events. Respond with strict JSON matching the schema: \
{ \"found\": bool, \"entries\": [{ \"type\": string, \"days\": string|null, \
\"times\": string|null, \"label\": string|null, \"specials\": [string] }], \
\"reasoning\": string }. If nothing recurring is found, set found=false \
and entries=[]. Do not include any text outside the JSON object.";

pub fn user_prompt(venue: &Venue, pages_text: &str) -> String {
    let truncated = if pages_text.len() > MAX_PROMPT_TEXT_CHARS {
        &pages_text[..MAX_PROMPT_TEXT_CHARS]
    } else {
        pages_text
    };
    format!(
        "Venue: {}\nArea: {}\nWebsite: {}\n\nSite text:\n{}",
        venue.name,
        venue.area.as_deref().unwrap_or("unknown"),
        venue.website.as_deref().unwrap_or("none"),
        truncated
    )
}

pub fn repair_prompt(parse_error: &str) -> String {
    format!(
        "Your previous reply could not be parsed as the required JSON ({parse_error}). \
         Reply again with ONLY the JSON object described, no surrounding text."
    )
}
