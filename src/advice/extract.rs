//! Pull a JSON object out of free-form model output.

/// Strip code fences, normalize smart quotes and drop trailing commas.
pub fn sanitize_raw_output(raw: &str) -> String {
    let stripped = raw
        .replace("```json", "")
        .replace("```", "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    remove_trailing_commas(stripped.trim())
}

/// Remove a comma when the next non-whitespace character closes an object
/// or array. Commas inside strings are left alone.
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}

/// Byte range of the first balanced `{...}` starting at or after `from`.
fn balanced_object(text: &str, from: usize) -> Option<(usize, usize)> {
    let start = from + text.get(from..)?.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, start + offset + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Return the first substring of `text` that parses as a JSON object.
///
/// Tries the whole sanitized text, then every balanced object in order, so
/// prose before or after the payload is ignored.
pub fn extract_json(text: &str) -> anyhow::Result<String> {
    let cleaned = sanitize_raw_output(text);
    if cleaned.starts_with('{') && serde_json::from_str::<serde_json::Value>(&cleaned).is_ok() {
        return Ok(cleaned);
    }

    let mut from = 0;
    while let Some((start, end)) = balanced_object(&cleaned, from) {
        let candidate = &cleaned[start..end];
        if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
            tracing::debug!(start, end, "Extracted JSON object from model output");
            return Ok(candidate.to_string());
        }
        from = start + 1;
    }

    let preview: String = cleaned.chars().take(80).collect();
    anyhow::bail!("No JSON object found in model output: {}", preview)
}
