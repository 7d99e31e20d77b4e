//! `encodeData`: a struct's record rendered as a sequence of 32-byte
//! words, type hash first, then one word per declared field. Dynamic types
//! contribute the hash of their contents, struct references contribute
//! their own struct hash, and atomic types are packed in place.

use alloy_primitives::{hex, keccak256, Address, B256, I256, U256};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::schema::{FieldDef, FieldKind, TypeRegistry};

impl TypeRegistry {
    /// Encode `record` against the declared fields of `primary`.
    ///
    /// The result is the exact byte sequence the struct hash is taken
    /// over. Any missing field or wrong-shaped value fails before any
    /// partial encoding escapes.
    pub fn encode_data(&self, primary: &str, record: &Json) -> Result<Vec<u8>> {
        let fields = self
            .fields_of(primary)
            .ok_or_else(|| Error::MissingType(primary.to_owned()))?;
        let record = record.as_object().ok_or_else(|| Error::ValueMismatch {
            field: primary.to_owned(),
            expected: "a JSON object".to_owned(),
            got: json_kind(record).to_owned(),
        })?;

        let mut words = Vec::with_capacity((fields.len() + 1) * 32);
        words.extend_from_slice(self.type_hash(primary)?.as_slice());
        for field in fields {
            let value = record.get(&field.name).ok_or_else(|| Error::MissingField {
                type_name: primary.to_owned(),
                field: field.name.clone(),
            })?;
            let word = self.encode_field(field, value)?;
            words.extend_from_slice(word.as_slice());
        }
        Ok(words)
    }

    /// `keccak256(encode_data(primary, record))`. Nested struct fields
    /// contribute this value to their parent's encoding, which keeps the
    /// encoded size flat regardless of nesting depth.
    pub fn struct_hash(&self, primary: &str, record: &Json) -> Result<B256> {
        self.encode_data(primary, record).map(keccak256)
    }

    fn encode_field(&self, field: &FieldDef, value: &Json) -> Result<B256> {
        let name = field.name.as_str();
        match self.classify(&field.type_name)? {
            FieldKind::Uint(bits) => {
                let v = coerce_uint(name, value)?;
                if bits < 256 && v.bit_len() > bits {
                    return Err(out_of_range(name, &field.type_name));
                }
                Ok(B256::from(v))
            }
            FieldKind::Int(bits) => {
                let raw = coerce_int(name, value)?.into_raw();
                if bits < 256 && !fits_signed(raw, bits) {
                    return Err(out_of_range(name, &field.type_name));
                }
                Ok(B256::from(raw))
            }
            FieldKind::Address => {
                let Json::String(s) = value else {
                    return Err(mismatch(name, "a 0x-prefixed address string", value));
                };
                let addr: Address = s.parse().map_err(|source| Error::InvalidHex {
                    field: name.to_owned(),
                    source,
                })?;
                Ok(addr.into_word())
            }
            FieldKind::Bool => {
                let Json::Bool(b) = value else {
                    return Err(mismatch(name, "a boolean", value));
                };
                Ok(B256::with_last_byte(*b as u8))
            }
            FieldKind::FixedBytes(len) => {
                let raw = decode_hex(name, value)?;
                if raw.len() != len {
                    return Err(Error::ValueMismatch {
                        field: name.to_owned(),
                        expected: format!("{len} hex-encoded bytes"),
                        got: format!("{} bytes", raw.len()),
                    });
                }
                let mut word = B256::ZERO;
                word[..len].copy_from_slice(&raw);
                Ok(word)
            }
            FieldKind::Bytes => Ok(keccak256(decode_hex(name, value)?)),
            FieldKind::String => {
                let Json::String(s) = value else {
                    return Err(mismatch(name, "a string", value));
                };
                Ok(keccak256(s.as_bytes()))
            }
            FieldKind::Struct(type_name) => self.struct_hash(&type_name, value),
            FieldKind::Array(type_name) => Err(Error::UnsupportedArray(type_name)),
        }
    }
}

fn coerce_uint(field: &str, value: &Json) -> Result<U256> {
    match value {
        Json::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| mismatch(field, "an unsigned integer", value)),
        Json::String(s) => s
            .parse::<U256>()
            .map_err(|_| mismatch(field, "an unsigned integer", value)),
        _ => Err(mismatch(field, "an unsigned integer", value)),
    }
}

fn coerce_int(field: &str, value: &Json) -> Result<I256> {
    match value {
        Json::Number(n) => {
            let n = n
                .as_i64()
                .ok_or_else(|| mismatch(field, "a signed integer", value))?;
            let magnitude = I256::from_raw(U256::from(n.unsigned_abs()));
            Ok(if n < 0 { -magnitude } else { magnitude })
        }
        Json::String(s) => s
            .parse::<I256>()
            .map_err(|_| mismatch(field, "a signed integer", value)),
        _ => Err(mismatch(field, "a signed integer", value)),
    }
}

// Two's complement width check: every bit above the declared width must
// equal the sign bit.
fn fits_signed(raw: U256, bits: usize) -> bool {
    let mask = U256::MAX << bits;
    if raw.bit(bits - 1) {
        raw & mask == mask
    } else {
        raw & mask == U256::ZERO
    }
}

fn decode_hex(field: &str, value: &Json) -> Result<Vec<u8>> {
    let Json::String(s) = value else {
        return Err(mismatch(field, "a 0x-prefixed hex string", value));
    };
    hex::decode(s).map_err(|source| Error::InvalidHex {
        field: field.to_owned(),
        source,
    })
}

fn mismatch(field: &str, expected: &str, got: &Json) -> Error {
    Error::ValueMismatch {
        field: field.to_owned(),
        expected: expected.to_owned(),
        got: json_kind(got).to_owned(),
    }
}

fn out_of_range(field: &str, type_name: &str) -> Error {
    Error::OutOfRange {
        field: field.to_owned(),
        type_name: type_name.to_owned(),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
