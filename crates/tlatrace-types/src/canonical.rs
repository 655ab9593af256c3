//! Canonical form and content digests.
//!
//! A value is canonical when record and function entries are sorted by key, set
//! elements are sorted and deduplicated, and empty functions are represented as
//! the empty sequence (TLC prints both as `<<>>`). Digests are computed by one
//! tagged, length-prefixed encoding pass over the canonical form, fed into SHA-256.
//! The first eight bytes of the hash, big-endian, are the digest.
//!
//! Digests are never verified by deep equality: two different states whose
//! digests collide are treated as the same state.

use crate::state::State;
use crate::value::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_STR: u8 = 0x03;
const TAG_SYMBOL: u8 = 0x04;
const TAG_SEQ: u8 = 0x05;
const TAG_SET: u8 = 0x06;
const TAG_RECORD: u8 = 0x07;
const TAG_FUNCTION: u8 = 0x08;
const TAG_STATE: u8 = 0x10;
const TAG_TRACE: u8 = 0x11;

macro_rules! digest_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub fn from_u64(raw: u64) -> Self {
                Self(raw)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        /// Fixed-width lowercase hex, the form written to hash files
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:016x}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                u64::from_str_radix(s, 16).map(Self)
            }
        }
    };
}

digest_newtype!(
    /// Deduplication key of a single state (action excluded)
    CanonicalDigest
);

digest_newtype!(
    /// Digest of the ordered list of state digests of one trace
    TraceDigest
);

/// Normalize a value so that structurally equal inputs have identical representations.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Seq(items) => Value::Seq(items.into_iter().map(canonicalize).collect()),
        Value::Set(items) => {
            let mut items: Vec<Value> = items.into_iter().map(canonicalize).collect();
            items.sort();
            items.dedup();
            Value::Set(items)
        }
        Value::Record(entries) => {
            let mut entries: Vec<(String, Value)> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Record(entries)
        }
        Value::Function(entries) if entries.is_empty() => Value::Seq(Vec::new()),
        Value::Function(entries) => {
            let mut entries: Vec<(Value, Value)> = entries
                .into_iter()
                .map(|(k, v)| (canonicalize(k), canonicalize(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Function(entries)
        }
        scalar => scalar,
    }
}

/// Digest of the canonical form of `value`.
pub fn digest(value: &Value) -> CanonicalDigest {
    let canonical = canonicalize(value.clone());
    let mut hasher = Sha256::new();
    encode_value(&canonical, &mut hasher);
    CanonicalDigest(finish(hasher))
}

/// Digest of a whole trace, order-sensitive.
pub fn trace_digest(states: &[CanonicalDigest]) -> TraceDigest {
    let mut hasher = Sha256::new();
    hasher.update([TAG_TRACE]);
    encode_len(&mut hasher, states.len());
    for state in states {
        hasher.update(state.0.to_be_bytes());
    }
    TraceDigest(finish(hasher))
}

impl State {
    /// Sort variables by name and canonicalize every value.
    pub fn canonicalize(mut self) -> State {
        if self.canonical {
            return self;
        }
        let vars = std::mem::take(self.vars_mut());
        let mut vars: Vec<(String, Value)> =
            vars.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        *self.vars_mut() = vars;
        self.canonical = true;
        self
    }

    /// Digest of the variable mapping; the action name does not participate.
    pub fn digest(&self) -> CanonicalDigest {
        let owned;
        let vars = if self.canonical {
            self.raw_vars()
        } else {
            owned = self.clone().canonicalize();
            owned.raw_vars()
        };

        let mut hasher = Sha256::new();
        hasher.update([TAG_STATE]);
        encode_len(&mut hasher, vars.len());
        for (name, value) in vars {
            encode_str(&mut hasher, TAG_STR, name);
            encode_value(value, &mut hasher);
        }
        CanonicalDigest(finish(hasher))
    }
}

fn finish(hasher: Sha256) -> u64 {
    let out = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&out[..8]);
    u64::from_be_bytes(head)
}

fn encode_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_be_bytes());
}

fn encode_str(hasher: &mut Sha256, tag: u8, s: &str) {
    hasher.update([tag]);
    encode_len(hasher, s.len());
    hasher.update(s.as_bytes());
}

fn encode_value(value: &Value, hasher: &mut Sha256) {
    match value {
        Value::Bool(b) => hasher.update([TAG_BOOL, u8::from(*b)]),
        Value::Int(n) => {
            hasher.update([TAG_INT]);
            hasher.update(n.to_be_bytes());
        }
        Value::Str(s) => encode_str(hasher, TAG_STR, s),
        Value::Symbol(s) => encode_str(hasher, TAG_SYMBOL, s),
        Value::Seq(items) | Value::Set(items) => {
            let tag = if matches!(value, Value::Seq(_)) {
                TAG_SEQ
            } else {
                TAG_SET
            };
            hasher.update([tag]);
            encode_len(hasher, items.len());
            for item in items {
                encode_value(item, hasher);
            }
        }
        Value::Record(entries) => {
            hasher.update([TAG_RECORD]);
            encode_len(hasher, entries.len());
            for (k, v) in entries {
                encode_str(hasher, TAG_STR, k);
                encode_value(v, hasher);
            }
        }
        Value::Function(entries) => {
            hasher.update([TAG_FUNCTION]);
            encode_len(hasher, entries.len());
            for (k, v) in entries {
                encode_value(k, hasher);
                encode_value(v, hasher);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_set_digest_is_order_independent() {
        let a = Value::Set(vec![int(1), Value::str("b")]);
        let b = Value::Set(vec![Value::str("b"), int(1)]);
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn test_set_duplicates_collapse() {
        let a = Value::Set(vec![int(1), int(1), int(2)]);
        let b = Value::Set(vec![int(2), int(1)]);
        assert_eq!(canonicalize(a.clone()), canonicalize(b.clone()));
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn test_seq_digest_is_order_sensitive() {
        let a = Value::Seq(vec![int(1), int(2)]);
        let b = Value::Seq(vec![int(2), int(1)]);
        assert_ne!(digest(&a), digest(&b));
    }

    #[test]
    fn test_seq_and_set_with_same_elements_differ() {
        let seq = Value::Seq(vec![int(1), int(2)]);
        let set = Value::Set(vec![int(1), int(2)]);
        assert_ne!(digest(&seq), digest(&set));
    }

    #[test]
    fn test_record_key_order_ignored() {
        let a = Value::record([("x", int(1)), ("y", int(2))]);
        let b = Value::record([("y", int(2)), ("x", int(1))]);
        assert_eq!(canonicalize(a.clone()), canonicalize(b.clone()));
        assert_eq!(digest(&a), digest(&b));
    }

    #[test]
    fn test_nested_function_canonicalized() {
        let a = Value::function([
            (int(2), Value::Set(vec![int(3), int(1)])),
            (int(1), Value::Set(vec![])),
        ]);
        let b = Value::function([
            (int(1), Value::Set(vec![])),
            (int(2), Value::Set(vec![int(1), int(3)])),
        ]);
        assert_eq!(canonicalize(a), canonicalize(b));
    }

    #[test]
    fn test_empty_function_is_empty_sequence() {
        let f = Value::Function(vec![]);
        assert_eq!(canonicalize(f.clone()), Value::Seq(vec![]));
        assert_eq!(digest(&f), digest(&Value::Seq(vec![])));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let v = Value::record([
            ("msgs", Value::Set(vec![Value::str("a"), Value::str("b")])),
            ("n", int(7)),
        ]);
        assert_eq!(digest(&v), digest(&v.clone()));
    }

    #[test]
    fn test_digest_is_pinned() {
        // Fixed encoding: any change here breaks hash files written by earlier runs.
        assert_eq!(digest(&int(1)).to_string(), "f83f60940c1ec44c");
        let state = State::new().with_var("x", int(1));
        assert_eq!(state.digest().to_string(), "528bb5d2d498497e");
    }

    #[test]
    fn test_state_var_order_ignored() {
        let a = State::new().with_var("x", int(1)).with_var("y", int(2));
        let b = State::new().with_var("y", int(2)).with_var("x", int(1));
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.canonicalize(), b.canonicalize());
    }

    #[test]
    fn test_state_digest_ignores_action() {
        let a = State::new().with_var("x", int(1)).with_action("Inc");
        let b = State::new().with_var("x", int(1)).with_action("Dec");
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_canonical_state_digest_matches_raw() {
        let raw = State::new().with_var("b", int(2)).with_var("a", int(1));
        let canonical = raw.clone().canonicalize();
        assert!(canonical.is_canonical());
        assert_eq!(raw.digest(), canonical.digest());
    }

    #[test]
    fn test_trace_digest_order_sensitive() {
        let a = digest(&int(1));
        let b = digest(&int(2));
        assert_ne!(trace_digest(&[a, b]), trace_digest(&[b, a]));
        assert_eq!(trace_digest(&[a, b]), trace_digest(&[a, b]));
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let d = digest(&Value::str("hello"));
        let parsed: CanonicalDigest = d.to_string().parse().unwrap();
        assert_eq!(parsed, d);
    }
}
