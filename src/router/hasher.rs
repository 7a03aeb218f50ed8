//! Shard-key hashing.
//!
//! FNV-1a 64-bit over a per-kind byte encoding: strings hash their UTF-8
//! bytes, integers widen to 64-bit little-endian, booleans use one
//! canonical byte, and everything else falls back to its textual form.
//! Equality across kinds is not guaranteed — the integer 1 and the string
//! "1" land on different shards — so a shard-key column must keep one
//! stable type.

use std::hash::Hasher;

use fnv::FnvHasher;

use crate::sql::SqlValue;

/// Hash output used for ring placement.
pub type HashValue = u64;

/// Hash one shard-key value.
pub fn hash_value(value: &SqlValue) -> HashValue {
    let mut hasher = FnvHasher::default();
    match value {
        SqlValue::Str(text) => hasher.write(text.as_bytes()),
        SqlValue::Int(int) => hasher.write(&int.to_le_bytes()),
        SqlValue::Bool(flag) => hasher.write(&[*flag as u8]),
        SqlValue::Float(text) => hasher.write(text.as_bytes()),
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_string_vectors() {
        // Reference values for FNV-1a 64.
        assert_eq!(hash_value(&SqlValue::Str("u-1".into())), 5585686303297530434);
        assert_eq!(hash_value(&SqlValue::Str("u-2".into())), 5585685203785902223);
        assert_eq!(hash_value(&SqlValue::Str("alice".into())), 5803779529149266183);
    }

    #[test]
    fn test_known_integer_vectors() {
        assert_eq!(hash_value(&SqlValue::Int(1)), 9929646806074584996);
        assert_eq!(hash_value(&SqlValue::Int(42)), 18391255480883862255);
    }

    #[test]
    fn test_boolean_canonical_bytes() {
        assert_eq!(hash_value(&SqlValue::Bool(true)), 12638152016183539244);
        assert_eq!(hash_value(&SqlValue::Bool(false)), 12638153115695167455);
    }

    #[test]
    fn test_hashing_is_deterministic() {
        let value = SqlValue::Str("customer-123".into());
        assert_eq!(hash_value(&value), hash_value(&value));
    }

    #[test]
    fn test_kinds_do_not_collide_by_construction() {
        // Documented caveat: these are simply different inputs.
        assert_ne!(
            hash_value(&SqlValue::Int(1)),
            hash_value(&SqlValue::Str("1".into()))
        );
    }
}
