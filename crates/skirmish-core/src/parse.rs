//! Recovering a command object from free-form decider text.
//!
//! Text-producing deciders rarely return clean JSON. [`extract_command_json`]
//! tries, in order:
//!
//! 1. The whole text as JSON
//! 2. The contents of the first fenced code block
//! 3. The first balanced `{ ... }` span
//!
//! Each candidate is retried with trailing commas stripped. Only JSON
//! objects count; anything else yields `None` and the caller treats the
//! turn as a no-op.

use serde_json::Value;

/// Extract the first JSON object found in `text`.
pub fn extract_command_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let candidates = [
        Some(trimmed),
        extract_json_from_codeblock(trimmed),
        first_balanced_object(trimmed),
    ];
    candidates.into_iter().flatten().find_map(parse_object)
}

fn parse_object(candidate: &str) -> Option<Value> {
    let direct = serde_json::from_str::<Value>(candidate).ok();
    let value = direct.or_else(|| serde_json::from_str(&strip_trailing_commas(candidate)).ok())?;
    value.is_object().then_some(value)
}

/// Contents of the first ```` ```json ```` or plain ```` ``` ```` block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let fence = text.find("```")?;
    let after_fence = fence.checked_add(3)?;
    let rest = text.get(after_fence..)?;
    // Skip the info string (`json`, `JSON`, nothing) up to the newline.
    let body_start = rest.find('\n').and_then(|nl| nl.checked_add(1)).unwrap_or(0);
    let body = rest.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// The first `{` and its matching `}`, ignoring braces inside strings.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text.get(start..)?.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth = depth.saturating_add(1),
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start.checked_add(offset)?.checked_add(1)?;
                    return text.get(start..end);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip trailing commas before closing braces and brackets.
///
/// Commas inside string literals are kept as written.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars
                .iter()
                .skip(i.saturating_add(1))
                .find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(c);
    }
    result
}
