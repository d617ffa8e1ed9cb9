//! Isolate the JSON array inside free-form provider text.

use crate::error::MalformedResponse;

const FENCE: &str = "```";

/// Strip formatting noise from `raw` and return the candidate JSON array.
///
/// Removes surrounding whitespace and a leading code fence (with or without
/// a language tag) plus its closing fence, then returns the slice from the
/// first `[` to the last `]` inclusive. Prose before or after the array is
/// dropped. The result is not parsed here.
pub fn sanitize(raw: &str) -> Result<&str, MalformedResponse> {
    let text = strip_fence(raw.trim()).trim();

    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(MalformedResponse::NoArrayBoundary),
    }
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    // Language tag, e.g. "json" in ```json.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    rest.strip_suffix(FENCE).unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_array_passes_through() {
        assert_eq!(sanitize("[1, 2, 3]").unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("\n\n  [ {\"day\": 1} ]  \n").unwrap(), "[ {\"day\": 1} ]");
    }

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n[{\"day\": 1}]\n```";
        assert_eq!(sanitize(raw).unwrap(), "[{\"day\": 1}]");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n[{\"day\": 1}]\n```";
        assert_eq!(sanitize(raw).unwrap(), "[{\"day\": 1}]");
    }

    #[test]
    fn fence_followed_by_prose() {
        let raw = "```json\n[ {\"day\": 1}, {\"day\": 2} ]\n```\nThanks!";
        assert_eq!(sanitize(raw).unwrap(), "[ {\"day\": 1}, {\"day\": 2} ]");
    }

    #[test]
    fn drops_preamble_and_postamble() {
        let raw = "Sure! Here is your plan:\n[{\"day\": 1}]\nLet me know if you need more.";
        assert_eq!(sanitize(raw).unwrap(), "[{\"day\": 1}]");
    }

    #[test]
    fn keeps_nested_arrays_intact() {
        let raw = "{\"days\": [{\"day\": 1, \"tasks\": [\"a\", \"b\"]}]}";
        assert_eq!(
            sanitize(raw).unwrap(),
            "[{\"day\": 1, \"tasks\": [\"a\", \"b\"]}]"
        );
    }

    #[test]
    fn invalid_json_inside_brackets_is_still_returned() {
        assert_eq!(sanitize("[not json at all]").unwrap(), "[not json at all]");
    }

    #[test]
    fn no_brackets_fails() {
        assert_eq!(
            sanitize("I cannot help with that.").unwrap_err(),
            MalformedResponse::NoArrayBoundary
        );
    }

    #[test]
    fn reversed_brackets_fail() {
        assert_eq!(
            sanitize("] oops [").unwrap_err(),
            MalformedResponse::NoArrayBoundary
        );
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(sanitize("   ").unwrap_err(), MalformedResponse::NoArrayBoundary);
    }
}
