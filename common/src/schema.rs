//! The user-declared type schema: struct type declarations, their
//! transitive dependency closure, and the canonical `encodeType` string
//! whose hash binds the shape of the data into every digest.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single `{name, type}` field declaration.
///
/// Declaration order within a struct type is significant: it fixes both the
/// canonical type string and the order of the struct's encoded words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The set of struct type declarations a typed-data document is hashed
/// against, keyed by type name. Matches the `types` object of the
/// `eth_signTypedData` interchange form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: BTreeMap<String, Vec<FieldDef>>,
}

/// A declared field type resolved against the registry.
///
/// Resolution happens once per field; everything downstream dispatches on
/// the variant instead of re-probing type-name strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// `uint8` through `uint256`, big-endian left-padded.
    Uint(usize),
    /// `int8` through `int256`, two's complement sign-extended.
    Int(usize),
    Address,
    Bool,
    /// `bytes1` through `bytes32`, right-padded.
    FixedBytes(usize),
    /// Dynamic `bytes`; hashed, never packed inline.
    Bytes,
    /// Dynamic `string`; hashed, never packed inline.
    String,
    /// A struct type declared in the registry, hashed recursively.
    Struct(String),
    /// `T[]` or `T[N]`; recognized so that rejection is deliberate.
    Array(String),
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a struct type. Replaces any previous declaration of `name`.
    pub fn declare(&mut self, name: impl Into<String>, fields: Vec<FieldDef>) {
        self.types.insert(name.into(), fields);
    }

    /// The ordered field declarations of `name`, if declared.
    pub fn fields_of(&self, name: &str) -> Option<&[FieldDef]> {
        self.types.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All struct types transitively reachable from `primary`, in
    /// first-visit depth-first order.
    ///
    /// Names that are not registry keys are dead ends: primitives and the
    /// array-suffix family never appear in the result. Cyclic schemas
    /// terminate, with every reachable type collected exactly once.
    pub fn dependencies_of<'a>(&'a self, primary: &'a str) -> Vec<&'a str> {
        let mut found = Vec::new();
        self.collect_dependencies(primary, &mut found);
        found
    }

    fn collect_dependencies<'a>(&'a self, name: &'a str, found: &mut Vec<&'a str>) {
        if found.contains(&name) {
            return;
        }
        let Some(fields) = self.types.get(name) else {
            return;
        };
        found.push(name);
        for field in fields {
            self.collect_dependencies(field.type_name.as_str(), found);
        }
    }

    /// The canonical type signature of `primary`: its own fragment first,
    /// then every dependency sorted lexicographically, each fragment
    /// rendered as `Name(type1 name1,type2 name2,...)` with fields in
    /// declared order and no separator between fragments.
    ///
    /// Two schemas that differ in field order or dependency set produce
    /// different signatures, and therefore different digests.
    pub fn encode_type(&self, primary: &str) -> Result<String> {
        if !self.types.contains_key(primary) {
            return Err(Error::MissingType(primary.to_owned()));
        }
        let mut deps = self.dependencies_of(primary);
        deps.retain(|name| *name != primary);
        deps.sort_unstable();

        let mut out = String::new();
        for name in std::iter::once(primary).chain(deps) {
            out.push_str(name);
            out.push('(');
            for (i, field) in self.types[name].iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&field.type_name);
                out.push(' ');
                out.push_str(&field.name);
            }
            out.push(')');
        }
        Ok(out)
    }

    /// keccak256 of the canonical type signature; the first word of every
    /// encoding of `primary`.
    pub fn type_hash(&self, primary: &str) -> Result<B256> {
        self.encode_type(primary).map(keccak256)
    }

    /// Resolve a declared field type into its encoding class.
    ///
    /// Anything that is neither a declared struct type nor a recognized
    /// primitive fails with [`Error::UnknownType`].
    pub fn classify(&self, type_name: &str) -> Result<FieldKind> {
        if type_name.ends_with(']') {
            return Ok(FieldKind::Array(type_name.to_owned()));
        }
        if self.types.contains_key(type_name) {
            return Ok(FieldKind::Struct(type_name.to_owned()));
        }
        match type_name {
            "address" => return Ok(FieldKind::Address),
            "bool" => return Ok(FieldKind::Bool),
            "string" => return Ok(FieldKind::String),
            "bytes" => return Ok(FieldKind::Bytes),
            // Solidity aliases for the 256-bit forms.
            "uint" => return Ok(FieldKind::Uint(256)),
            "int" => return Ok(FieldKind::Int(256)),
            _ => {}
        }
        if let Some(bits) = type_name.strip_prefix("uint").and_then(parse_bits) {
            return Ok(FieldKind::Uint(bits));
        }
        if let Some(bits) = type_name.strip_prefix("int").and_then(parse_bits) {
            return Ok(FieldKind::Int(bits));
        }
        if let Some(len) = type_name.strip_prefix("bytes").and_then(parse_fixed_len) {
            return Ok(FieldKind::FixedBytes(len));
        }
        Err(Error::UnknownType(type_name.to_owned()))
    }
}

fn parse_bits(suffix: &str) -> Option<usize> {
    let bits: usize = suffix.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

fn parse_fixed_len(suffix: &str) -> Option<usize> {
    let len: usize = suffix.parse().ok()?;
    (1..=32).contains(&len).then_some(len)
}
