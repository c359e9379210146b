//! Strict parser for array literals embedded in page scripts and attributes.
//!
//! Chart libraries receive their data as JavaScript array literals. Those
//! literals are read as data only: platform null spellings are rewritten to
//! `null`, single-quoted strings become JSON strings, and the result goes
//! through `serde_json`. Nothing on the page is ever evaluated.

use serde_json::Value;

use crate::types::{HarvestError, HarvestResult};

/// Bare identifiers that stand for a missing value.
const NULL_TOKENS: &[&str] = &["null", "undefined", "None", "NaN"];

/// Rewrite a JavaScript-style literal into JSON text.
///
/// Outside string literals, any identifier in [`NULL_TOKENS`] becomes `null`.
/// Single-quoted strings are re-quoted with double quotes. Everything else is
/// passed through untouched for `serde_json` to accept or reject.
pub fn normalize_literal(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '\'' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => {}
                        },
                        '\'' => break,
                        '"' => out.push_str("\\\""),
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' || next == '$' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if NULL_TOKENS.contains(&ident.as_str()) {
                    out.push_str("null");
                } else {
                    out.push_str(&ident);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Parse a literal that must be an array of arrays.
///
/// `context` names the source (e.g. `"chart-1"`) for error messages.
pub fn parse_rows(src: &str, context: &str) -> HarvestResult<Vec<Vec<Value>>> {
    let normalized = normalize_literal(src);
    let parsed: Value = serde_json::from_str(&normalized).map_err(|e| HarvestError::Literal {
        context: context.to_string(),
        message: e.to_string(),
    })?;

    let Value::Array(items) = parsed else {
        return Err(HarvestError::Literal {
            context: context.to_string(),
            message: "expected an array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Array(row) => Ok(row),
            other => Err(HarvestError::Literal {
                context: context.to_string(),
                message: format!("row {i} is not an array: {other}"),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pairs() {
        let rows = parse_rows(r#"[["2023-01-01", 100], ["2023-01-02", "abc"]]"#, "chart-2").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![json!("2023-01-01"), json!(100)]);
        assert_eq!(rows[1], vec![json!("2023-01-02"), json!("abc")]);
    }

    #[test]
    fn test_null_spellings() {
        let rows = parse_rows("[[1, None], [undefined, NaN], [null, 2.5]]", "fundingData").unwrap();
        assert_eq!(rows[0][1], Value::Null);
        assert_eq!(rows[1], vec![Value::Null, Value::Null]);
        assert_eq!(rows[2][1], json!(2.5));
    }

    #[test]
    fn test_null_tokens_inside_strings_are_kept() {
        let rows = parse_rows(r#"[["None of it", 'null or undefined']]"#, "x").unwrap();
        assert_eq!(rows[0][0], json!("None of it"));
        assert_eq!(rows[0][1], json!("null or undefined"));
    }

    #[test]
    fn test_single_quoted_strings() {
        let rows = parse_rows(r#"[['it\'s', 'say "hi"']]"#, "x").unwrap();
        assert_eq!(rows[0][0], json!("it's"));
        assert_eq!(rows[0][1], json!("say \"hi\""));
    }

    #[test]
    fn test_code_is_rejected() {
        let err = parse_rows("[[alert(1), 2]]", "chart-1").unwrap_err();
        assert!(matches!(err, HarvestError::Literal { .. }));
    }

    #[test]
    fn test_non_array_rows_rejected() {
        let err = parse_rows("[[1, 2], 3]", "chart-1").unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(parse_rows("{\"a\": 1}", "chart-1").is_err());
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_rows("[]", "chart-1").unwrap().is_empty());
    }
}
