//! Permissive JSON-island extraction (spec.md §9): the reasoning service is
//! asked for strict JSON but replies may carry surrounding prose or fenced
//! code blocks. Find the first balanced `{...}` span and hand it to a
//! strictly-typed parser; callers own the per-field defaults on failure.

/// Return the first balanced, string-aware `{...}` substring of `text`, or
/// `None` if no balanced object is present.
pub fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the first JSON island and deserialize it as `T`.
pub fn extract_json<T: serde::de::DeserializeOwned>(text: &str) -> Option<T> {
    let island = first_json_object(text)?;
    serde_json::from_str(island).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Verdict {
        is_relevant: bool,
        confidence: f64,
    }

    #[test]
    fn extracts_bare_object() {
        let text = r#"{"is_relevant": true, "confidence": 0.9}"#;
        assert_eq!(
            extract_json::<Verdict>(text),
            Some(Verdict { is_relevant: true, confidence: 0.9 })
        );
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure, here is my analysis:\n```json\n{\"is_relevant\": false, \"confidence\": 0.1}\n```\nHope that helps!";
        assert_eq!(
            extract_json::<Verdict>(text),
            Some(Verdict { is_relevant: false, confidence: 0.1 })
        );
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"is_relevant": true, "confidence": 0.5, "note": "a {nested} brace"}"#;
        let island = first_json_object(text).unwrap();
        assert_eq!(island, text);
    }

    #[test]
    fn no_object_returns_none() {
        assert_eq!(first_json_object("no json here"), None);
        assert!(extract_json::<Verdict>("no json here").is_none());
    }

    #[test]
    fn unbalanced_object_returns_none() {
        assert_eq!(first_json_object("{\"is_relevant\": true"), None);
    }
}
