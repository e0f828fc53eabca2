//! Recovery of a string list from a raw model reply
//!
//! Models asked for "only a JSON array" still wrap it in code fences or
//! drift into one-item-per-line prose. The strict path handles the first;
//! the line heuristic salvages the second.

/// Fallback lines must be strictly longer than this many characters to be kept.
/// Tunable policy, not a business rule.
pub const MIN_FALLBACK_ITEM_CHARS: usize = 10;

/// Fence markers removed from the reply before a strict parse.
/// Rules are tried in order; the first match is applied and the scan restarts
/// until no rule matches.
const STRIP_RULES: &[StripRule] = &[
    StripRule::Prefix("```json"),
    StripRule::Prefix("```"),
    StripRule::Suffix("```"),
];

#[derive(Debug, Clone, Copy)]
enum StripRule {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl StripRule {
    fn apply<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            StripRule::Prefix(marker) => text.strip_prefix(*marker),
            StripRule::Suffix(marker) => text.strip_suffix(*marker),
        }
    }
}

/// Normalize a raw reply into at most `expected_count` items (best effort).
///
/// A reply that parses as a JSON string array is returned verbatim, even if it
/// holds more or fewer items than requested. Anything else goes through the
/// line heuristic. Never fails.
pub fn normalize(raw: &str, expected_count: usize) -> Vec<String> {
    let content = strip_fences(raw);

    match serde_json::from_str::<Option<Vec<String>>>(content) {
        Ok(items) => items.unwrap_or_default(),
        Err(e) => {
            tracing::debug!("Strict list parse failed ({}), falling back to line split", e);
            extract_lines(content, expected_count)
        }
    }
}

/// Strip surrounding whitespace and code-fence markers
pub fn strip_fences(raw: &str) -> &str {
    let mut content = raw.trim();

    while let Some(stripped) = STRIP_RULES.iter().find_map(|rule| rule.apply(content)) {
        content = stripped.trim();
    }

    content
}

/// Line-by-line salvage for replies that are not a valid list
fn extract_lines(content: &str, expected_count: usize) -> Vec<String> {
    let mut items = Vec::new();

    for line in content.split(['\n', '\r']) {
        if items.len() >= expected_count {
            break;
        }

        let cleaned = clean_line(line);
        if cleaned.chars().count() > MIN_FALLBACK_ITEM_CHARS {
            items.push(cleaned.to_string());
        }
    }

    items
}

fn clean_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | ',' | '[' | ']'))
}
