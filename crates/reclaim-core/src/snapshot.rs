// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of stored cart snapshots.
//!
//! Cart contents arrive in one of two encodings: the legacy length-prefixed
//! typed serialization (`a:1:{i:0;a:2:{s:10:"product_id";i:42;...}}`) or JSON.
//! Decoding tries the legacy form first, then JSON, and falls back to
//! [`CartSnapshot::Empty`] when neither yields an object or array.

use serde_json::{Map, Number, Value};
use strum::Display;

use crate::types::{LineItem, ProductId};

/// Which encoding a snapshot was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SnapshotEncoding {
    Legacy,
    Json,
}

/// Result of decoding a raw `cart_contents` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartSnapshot {
    /// Decoded from the legacy typed serialization.
    Legacy(Vec<LineItem>),
    /// Decoded from JSON.
    Json(Vec<LineItem>),
    /// Neither encoding produced an object or array.
    Empty,
}

impl CartSnapshot {
    /// Decode a raw snapshot, never failing.
    pub fn decode(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return CartSnapshot::Empty;
        }

        if let Some(value) = LegacyParser::new(raw)
            .parse_document()
            .filter(is_container)
        {
            return CartSnapshot::Legacy(extract_line_items(&value));
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value) if is_container(&value) => CartSnapshot::Json(extract_line_items(&value)),
            _ => CartSnapshot::Empty,
        }
    }

    /// The decoded line items; empty for [`CartSnapshot::Empty`].
    pub fn line_items(&self) -> &[LineItem] {
        match self {
            CartSnapshot::Legacy(items) | CartSnapshot::Json(items) => items,
            CartSnapshot::Empty => &[],
        }
    }

    /// The encoding the snapshot was read from, if any.
    pub fn encoding(&self) -> Option<SnapshotEncoding> {
        match self {
            CartSnapshot::Legacy(_) => Some(SnapshotEncoding::Legacy),
            CartSnapshot::Json(_) => Some(SnapshotEncoding::Json),
            CartSnapshot::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CartSnapshot::Empty)
    }
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// Pull `{product_id, quantity}` pairs out of a decoded container.
///
/// Accepts either a list of item objects or a map keyed by an opaque line
/// key. Entries without a usable product id are skipped; a missing quantity
/// counts as one.
fn extract_line_items(value: &Value) -> Vec<LineItem> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let product_id = obj.get("product_id").and_then(as_u64)?;
            let quantity = obj
                .get("quantity")
                .and_then(as_u64)
                .map(|q| u32::try_from(q).unwrap_or(u32::MAX))
                .unwrap_or(1);
            Some(LineItem {
                product_id: ProductId(product_id),
                quantity,
            })
        })
        .collect()
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Nesting limit for legacy containers. Deeper input is rejected rather than
/// recursed into.
const MAX_LEGACY_DEPTH: usize = 64;

/// Minimal reader for the legacy typed serialization.
///
/// Supports `N;`, `b:`, `i:`, `d:`, `s:`, `a:` and `O:` values. Objects are
/// read as maps of their properties. Integer keys become string keys.
struct LegacyParser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> LegacyParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    /// Parse one value that must span the whole input.
    fn parse_document(mut self) -> Option<Value> {
        let value = self.parse_value()?;
        (self.pos == self.input.len()).then_some(value)
    }

    fn parse_value(&mut self) -> Option<Value> {
        let tag = self.next()?;
        match tag {
            b'N' => {
                self.expect(b';')?;
                Some(Value::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let raw = self.read_until(b';')?;
                match raw {
                    "0" => Some(Value::Bool(false)),
                    "1" => Some(Value::Bool(true)),
                    _ => None,
                }
            }
            b'i' => {
                self.expect(b':')?;
                let n: i64 = self.read_until(b';')?.parse().ok()?;
                Some(Value::Number(n.into()))
            }
            b'd' => {
                self.expect(b':')?;
                let f: f64 = self.read_until(b';')?.parse().ok()?;
                Number::from_f64(f).map(Value::Number).or(Some(Value::Null))
            }
            b's' => {
                self.expect(b':')?;
                let s = self.read_string()?;
                self.expect(b';')?;
                Some(Value::String(s))
            }
            b'a' => {
                self.expect(b':')?;
                let len: usize = self.read_until(b':')?.parse().ok()?;
                self.read_members(len)
            }
            b'O' => {
                self.expect(b':')?;
                // Class name is irrelevant for line-item extraction.
                self.read_string()?;
                self.expect(b':')?;
                let len: usize = self.read_until(b':')?.parse().ok()?;
                self.read_members(len)
            }
            _ => None,
        }
    }

    fn read_members(&mut self, len: usize) -> Option<Value> {
        if self.depth >= MAX_LEGACY_DEPTH {
            return None;
        }
        self.depth += 1;
        self.expect(b'{')?;
        let mut map = Map::new();
        for _ in 0..len {
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let value = self.parse_value()?;
            map.insert(key, value);
        }
        self.expect(b'}')?;
        self.depth -= 1;
        Some(Value::Object(map))
    }

    /// Read `LEN:"bytes"` where LEN counts bytes, not characters.
    fn read_string(&mut self) -> Option<String> {
        let len: usize = self.read_until(b':')?.parse().ok()?;
        self.expect(b'"')?;
        let end = self.pos.checked_add(len)?;
        let bytes = self.input.get(self.pos..end)?;
        let s = std::str::from_utf8(bytes).ok()?.to_string();
        self.pos = end;
        self.expect(b'"')?;
        Some(s)
    }

    fn read_until(&mut self, delim: u8) -> Option<&'a str> {
        let input = self.input;
        let start = self.pos;
        let offset = input.get(start..)?.iter().position(|&b| b == delim)?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&input[start..start + offset]).ok()
    }

    fn next(&mut self) -> Option<u8> {
        let b = *self.input.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn expect(&mut self, want: u8) -> Option<()> {
        (self.next()? == want).then_some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, qty: u32) -> LineItem {
        LineItem {
            product_id: ProductId(id),
            quantity: qty,
        }
    }

    #[test]
    fn decodes_json_array() {
        let snap = CartSnapshot::decode(r#"[{"product_id":42,"quantity":2},{"product_id":"7"}]"#);
        assert_eq!(snap.encoding(), Some(SnapshotEncoding::Json));
        assert_eq!(snap.line_items(), &[item(42, 2), item(7, 1)]);
    }

    #[test]
    fn decodes_json_object_keyed_by_line() {
        let snap = CartSnapshot::decode(
            r#"{"a1f3":{"product_id":42,"quantity":1,"line_total":19.5},"b2c4":{"product_id":7,"quantity":3}}"#,
        );
        let mut items = snap.line_items().to_vec();
        items.sort_by_key(|i| i.product_id);
        assert_eq!(items, vec![item(7, 3), item(42, 1)]);
    }

    #[test]
    fn decodes_legacy_serialization() {
        let raw = r#"a:2:{s:4:"k1ab";a:2:{s:10:"product_id";i:42;s:8:"quantity";i:2;}i:1;a:3:{s:10:"product_id";s:1:"7";s:8:"quantity";i:1;s:4:"name";s:4:"Tシ";}}"#;
        let snap = CartSnapshot::decode(raw);
        assert_eq!(snap.encoding(), Some(SnapshotEncoding::Legacy));
        let mut items = snap.line_items().to_vec();
        items.sort_by_key(|i| i.product_id);
        assert_eq!(items, vec![item(7, 1), item(42, 2)]);
    }

    #[test]
    fn decodes_legacy_object_form() {
        let raw = r#"O:8:"stdClass":1:{s:5:"line1";a:2:{s:10:"product_id";i:9;s:8:"quantity";d:2;}}"#;
        let snap = CartSnapshot::decode(raw);
        assert_eq!(snap.line_items(), &[item(9, 2)]);
    }

    #[test]
    fn scalars_and_garbage_are_empty() {
        assert!(CartSnapshot::decode("").is_empty());
        assert!(CartSnapshot::decode("   ").is_empty());
        assert!(CartSnapshot::decode("i:5;").is_empty());
        assert!(CartSnapshot::decode("\"just a string\"").is_empty());
        assert!(CartSnapshot::decode("a:3:{i:0;").is_empty());
        assert!(CartSnapshot::decode("{not json").is_empty());
        assert!(CartSnapshot::decode("42").is_empty());
    }

    #[test]
    fn entries_without_product_id_are_skipped() {
        let snap = CartSnapshot::decode(r#"[{"quantity":2},{"product_id":-3},{"product_id":5}]"#);
        assert_eq!(snap.line_items(), &[item(5, 1)]);
    }

    #[test]
    fn container_without_items_is_not_empty_variant() {
        let snap = CartSnapshot::decode("[]");
        assert_eq!(snap, CartSnapshot::Json(Vec::new()));
        assert!(snap.line_items().is_empty());
    }

    #[test]
    fn deeply_nested_legacy_input_is_empty() {
        let raw = "a:1:{i:0;".repeat(20_000);
        assert!(CartSnapshot::decode(&raw).is_empty());

        let mut closed = "a:1:{i:0;".repeat(200);
        closed.push_str("i:1;");
        closed.push_str(&"}".repeat(200));
        assert!(CartSnapshot::decode(&closed).is_empty());
    }

    #[test]
    fn nesting_within_limit_still_decodes() {
        let mut raw = "a:1:{i:0;".repeat(10);
        raw.push_str(r#"a:1:{s:10:"product_id";i:8;}"#);
        raw.push_str(&"}".repeat(10));
        assert_eq!(CartSnapshot::decode(&raw), CartSnapshot::Legacy(Vec::new()));
    }

    #[test]
    fn legacy_string_length_counts_bytes() {
        // "é" is two bytes; a character-count length would misparse.
        let raw = r#"a:1:{i:0;a:2:{s:10:"product_id";i:3;s:4:"note";s:2:"é";}}"#;
        assert_eq!(CartSnapshot::decode(raw).line_items(), &[item(3, 1)]);
    }
}
