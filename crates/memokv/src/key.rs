//! Cache-key derivation.
//!
//! A key is a 128-bit digest over the canonical rendering of
//! `(identity, positional values, sorted keyword items, version)`, formatted
//! as fixed-width hex under a constant namespace prefix. Equal inputs always
//! yield equal keys; the digest collision probability is treated as
//! negligible. Bumping the version token therefore re-keys every call of a
//! function without touching any stored entry.

use serde_json::Value;

use crate::args::ArgumentTuple;

/// Namespace prefix shared by cache keys and version-token keys, so the
/// memoizer cannot collide with unrelated keys in the same store.
pub const KEY_PREFIX: &str = "memoize";

/// Derive the cache key for one normalized call under one version token.
pub fn derive_key(identity: &str, args: &ArgumentTuple, version: &str) -> String {
    let digest = md5::compute(canonical_bytes(identity, args, version));
    format!("{}:{:x}", KEY_PREFIX, digest)
}

/// The store key holding a function's version token.
pub(crate) fn verhash_key(identity: &str) -> String {
    format!("{}:verhash:{}", KEY_PREFIX, identity)
}

/// Deterministic byte rendering of the full key tuple.
///
/// Strings are quoted with `"` and `\` escaped, so field boundaries cannot be
/// forged by argument content; numbers render through `serde_json::Number`,
/// which gives equal values an identical textual form. `serde_json::Value`
/// cannot hold NaN or infinity, so every representable value canonicalizes.
fn canonical_bytes(identity: &str, args: &ArgumentTuple, version: &str) -> Vec<u8> {
    let mut out = String::new();
    out.push('(');
    write_str(&mut out, identity);
    out.push_str(",(");
    for value in &args.positional {
        write_value(&mut out, value);
        out.push(',');
    }
    out.push_str("),(");
    for (name, value) in &args.keyword {
        out.push('(');
        write_str(&mut out, name);
        out.push(',');
        write_value(&mut out, value);
        out.push_str("),");
    }
    out.push_str("),");
    write_str(&mut out, version);
    out.push(')');
    out.into_bytes()
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for item in items {
                write_value(out, item);
                out.push(',');
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sort explicitly; do not rely on the map's own ordering.
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            out.push('{');
            for (k, v) in pairs {
                write_str(out, k);
                out.push(':');
                write_value(out, v);
                out.push(',');
            }
            out.push('}');
        }
    }
}

fn write_str(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}
