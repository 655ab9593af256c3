//! Decoder for TLC value literals.
//!
//! Composite values are split at depth-0 separators by one left-to-right scan;
//! nested groups and quoted strings are skipped as whole units. Scalars resolve,
//! in order, as a quoted string, `TRUE`/`FALSE`, a caller symbol, an integer, and
//! finally an opaque symbol.

use crate::error::DecodeError;
use crate::hooks::EntryHook;
use crate::scanner::{self, Delimiter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tlatrace_types::Value;

const RECORD_ARROW: &str = "|->";
const FUNCTION_ARROW: &str = ":>";
const FUNCTION_SEP: &str = "@@";
const ELEMENT_SEP: &str = ",";

/// Caller-supplied decoding behavior. Immutable once built; share it behind an `Arc`.
#[derive(Clone, Default)]
pub struct DecoderOptions {
    /// Bare identifiers that resolve to a fixed value
    pub symbols: HashMap<String, Value>,
    pub entry_hook: Option<Arc<dyn EntryHook>>,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, name: impl Into<String>, value: Value) -> Self {
        self.symbols.insert(name.into(), value);
        self
    }

    pub fn with_entry_hook(mut self, hook: impl EntryHook + 'static) -> Self {
        self.entry_hook = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for DecoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderOptions")
            .field("symbols", &self.symbols)
            .field("entry_hook", &self.entry_hook.is_some())
            .finish()
    }
}

pub struct Decoder<'a> {
    options: &'a DecoderOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(options: &'a DecoderOptions) -> Self {
        Self { options }
    }

    /// Decode one complete literal. Surrounding whitespace is ignored.
    pub fn decode(&self, text: &str) -> Result<Value, DecodeError> {
        self.value(text, 0)
    }

    /// `base` is the offset of `src` within the text handed to [`Decoder::decode`].
    fn value(&self, src: &str, base: usize) -> Result<Value, DecodeError> {
        let base = base + (src.len() - src.trim_start().len());
        let text = src.trim();
        if text.is_empty() {
            return Err(DecodeError::Empty);
        }

        let bytes = text.as_bytes();
        let Some(delim) = Delimiter::opens(bytes) else {
            return self.scalar(text, base);
        };

        let end = scanner::find_close(bytes, 0, delim).map_err(|e| e.shifted(base))?;
        if end != bytes.len() {
            return Err(DecodeError::TrailingInput { offset: base + end });
        }
        let body_start = delim.open().len();
        let body = &text[body_start..end - delim.close().len()];
        self.composite(delim, body, base + body_start)
    }

    fn composite(&self, delim: Delimiter, body: &str, base: usize) -> Result<Value, DecodeError> {
        let empty = body.trim().is_empty();
        let sep = match delim {
            Delimiter::Function => FUNCTION_SEP,
            _ => ELEMENT_SEP,
        };
        let pieces = if empty {
            Vec::new()
        } else {
            scanner::split_top_level(body, sep).map_err(|e| e.shifted(base))?
        };

        match delim {
            Delimiter::Seq | Delimiter::Set => {
                let items = pieces
                    .into_iter()
                    .map(|(at, piece)| self.value(piece, base + at))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match delim {
                    Delimiter::Seq => Value::Seq(items),
                    _ => Value::Set(items),
                })
            }
            Delimiter::Record => {
                let mut entries = Vec::with_capacity(pieces.len());
                for (at, piece) in pieces {
                    let (key, value) = self.entry(piece, base + at, RECORD_ARROW)?;
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(DecodeError::Empty);
                    }
                    entries.push(match &self.options.entry_hook {
                        Some(hook) => hook.record_entry(key.to_string(), value),
                        None => (key.to_string(), value),
                    });
                }
                Ok(Value::record(entries))
            }
            Delimiter::Function => {
                let mut entries = Vec::with_capacity(pieces.len());
                for (at, piece) in pieces {
                    let (key, value) = self.entry(piece, base + at, FUNCTION_ARROW)?;
                    let key = self.value(key, base + at)?;
                    entries.push(match &self.options.entry_hook {
                        Some(hook) => hook.function_entry(key, value),
                        None => (key, value),
                    });
                }
                Ok(Value::function(entries))
            }
        }
    }

    /// Split an entry at its first depth-0 `arrow` and decode the value side.
    fn entry<'s>(
        &self,
        piece: &'s str,
        base: usize,
        arrow: &'static str,
    ) -> Result<(&'s str, Value), DecodeError> {
        let split = scanner::find_top_level(piece, 0, arrow).map_err(|e| e.shifted(base))?;
        let Some(pos) = split else {
            return Err(DecodeError::MissingArrow {
                arrow,
                entry: piece.trim().to_string(),
            });
        };
        let value_at = pos + arrow.len();
        let value = self.value(&piece[value_at..], base + value_at)?;
        Ok((&piece[..pos], value))
    }

    fn scalar(&self, text: &str, base: usize) -> Result<Value, DecodeError> {
        let bytes = text.as_bytes();
        if bytes[0] == b'"' {
            let end = scanner::skip_string(bytes, 0).map_err(|e| e.shifted(base))?;
            if end != bytes.len() {
                return Err(DecodeError::TrailingInput { offset: base + end });
            }
            return Ok(Value::Str(unescape(&text[1..end - 1])));
        }

        for pos in 0..bytes.len() {
            let rest = &bytes[pos..];
            if let Some(close) = Delimiter::closes(rest) {
                return Err(DecodeError::UnexpectedClose {
                    close: close.close(),
                    offset: base + pos,
                });
            }
            if Delimiter::opens(rest).is_some() || rest[0] == b'"' {
                return Err(DecodeError::TrailingInput { offset: base + pos });
            }
        }

        Ok(match text {
            "TRUE" => Value::Bool(true),
            "FALSE" => Value::Bool(false),
            _ => match self.options.symbols.get(text) {
                Some(value) => value.clone(),
                None => match text.parse::<i64>() {
                    Ok(n) => Value::Int(n),
                    Err(_) => Value::Symbol(text.to_string()),
                },
            },
        })
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decode with no symbols and no hooks.
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    let options = DecoderOptions::default();
    Decoder::new(&options).decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_record_with_nested_sequence() {
        let value = decode("[a |-> 1, b |-> <<2,3>>]").unwrap();
        assert_eq!(
            value,
            Value::record([("a", int(1)), ("b", Value::Seq(vec![int(2), int(3)]))])
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(decode(" FALSE ").unwrap(), Value::Bool(false));
        assert_eq!(decode("-42").unwrap(), int(-42));
        assert_eq!(decode("m1").unwrap(), Value::symbol("m1"));
        assert_eq!(decode(r#""a \"b\"\n""#).unwrap(), Value::str("a \"b\"\n"));
    }

    #[test]
    fn test_function_literal() {
        let value = decode("(1 :> \"x\" @@ 2 :> {3, 4})").unwrap();
        assert_eq!(
            value,
            Value::function([
                (int(1), Value::str("x")),
                (int(2), Value::Set(vec![int(3), int(4)])),
            ])
        );
    }

    #[test]
    fn test_function_with_composite_keys() {
        let value = decode("(<<1, 2>> :> TRUE @@ [p |-> 1] :> FALSE)").unwrap();
        let key = Value::Seq(vec![int(1), int(2)]);
        assert_eq!(value.apply(&key), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(decode("<<>>").unwrap(), Value::Seq(vec![]));
        assert_eq!(decode("{ }").unwrap(), Value::Set(vec![]));
        assert_eq!(decode("[]").unwrap(), Value::Record(vec![]));
    }

    #[test]
    fn test_strings_hide_delimiters() {
        let value = decode(r#"{"}", "<<", "a, b"}"#).unwrap();
        assert_eq!(
            value,
            Value::Set(vec![Value::str("}"), Value::str("<<"), Value::str("a, b")])
        );
    }

    #[test]
    fn test_repeated_record_key_last_wins() {
        let value = decode("[a |-> 1, a |-> 2]").unwrap();
        assert_eq!(value, Value::record([("a", int(2))]));
    }

    #[test]
    fn test_symbol_table() {
        let options = DecoderOptions::new().with_symbol("Nil", Value::str("nil"));
        let decoder = Decoder::new(&options);
        assert_eq!(
            decoder.decode("<<Nil, Other>>").unwrap(),
            Value::Seq(vec![Value::str("nil"), Value::symbol("Other")])
        );
    }

    #[test]
    fn test_entry_hook_sees_every_entry() {
        struct Upper;
        impl EntryHook for Upper {
            fn record_entry(&self, key: String, value: Value) -> (String, Value) {
                (key.to_uppercase(), value)
            }
        }

        let options = DecoderOptions::new().with_entry_hook(Upper);
        let value = Decoder::new(&options)
            .decode("[a |-> [b |-> 1]]")
            .unwrap();
        assert_eq!(value, Value::record([("A", Value::record([("B", int(1))]))]));
    }

    #[test]
    fn test_unmatched_delimiters_are_errors() {
        assert_eq!(
            decode("<<1, 2").unwrap_err(),
            DecodeError::Unmatched { open: "<<", offset: 0 }
        );
        assert_eq!(
            decode("[a |-> {1]").unwrap_err(),
            DecodeError::Mismatched {
                expected: "}",
                found: "]",
                offset: 9
            }
        );
        assert_eq!(
            decode("{1, 2}}").unwrap_err(),
            DecodeError::TrailingInput { offset: 6 }
        );
        assert_eq!(
            decode("abc]").unwrap_err(),
            DecodeError::UnexpectedClose { close: "]", offset: 3 }
        );
    }

    #[test]
    fn test_error_offsets_are_absolute() {
        assert_eq!(
            decode("<<1, \"ab>>").unwrap_err(),
            DecodeError::UnterminatedString { offset: 5 }
        );
        assert_eq!(
            decode(r#"<<1, [a |-> x"y"]>>"#).unwrap_err(),
            DecodeError::TrailingInput { offset: 13 }
        );
    }

    #[test]
    fn test_missing_arrow_and_empty() {
        assert_eq!(
            decode("[a |-> 1, b]").unwrap_err(),
            DecodeError::MissingArrow {
                arrow: "|->",
                entry: "b".to_string()
            }
        );
        assert_eq!(decode("   ").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode("{1, }").unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn test_render_roundtrip() {
        let text = r#"[q |-> <<[src |-> m1, body |-> "hi"]>>, s |-> {3, 1}, f |-> (a :> 1 @@ b :> 2)]"#;
        let value = tlatrace_types::canonicalize(decode(text).unwrap());
        let again = tlatrace_types::canonicalize(decode(&value.to_string()).unwrap());
        assert_eq!(value, again);
    }
}
