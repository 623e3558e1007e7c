//! Enum types for Milvus metadata
//!
//! Every enum here is closed on the Rust side but open on the wire: the
//! diagnostic tool can grow new states ahead of this crate. Conversion from a
//! wire string or numeric code is therefore total and lands on the enum's
//! designated default member when the value is not recognized.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STRING CONVERSIONS
// ============================================================================

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (default $default:ident) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in wire-code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling used by the diagnostic tool.
            pub fn as_wire_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Numeric protobuf code of this member.
            pub fn code(&self) -> i32 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            /// Look up a member by numeric code; unknown codes map to the default.
            pub fn from_code(code: i64) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    _ => $name::$default,
                }
            }

            /// Look up a member by its wire spelling.
            ///
            /// Matching ignores case, whitespace, `_` and `-`, and accepts a
            /// decimal code. Unknown values map to the default member.
            pub fn from_wire(raw: &str) -> Self {
                let trimmed = raw.trim();
                if let Ok(code) = trimmed.parse::<i64>() {
                    return Self::from_code(code);
                }
                let wanted = normalize_token(trimmed);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| normalize_token(member.as_wire_str()) == wanted)
                    .unwrap_or($name::$default)
            }

            /// Convert any decoded JSON value: strings by name, numbers by code.
            pub fn from_value(value: &Value) -> Self {
                match value {
                    Value::String(s) => Self::from_wire(s),
                    Value::Number(n) => n.as_i64().map(Self::from_code).unwrap_or_default(),
                    _ => $name::$default,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire_str())
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from_wire(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_wire(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                Ok(Self::from_value(&value))
            }
        }
    };
}

// ============================================================================
// SEGMENT ENUMS
// ============================================================================

wire_enum! {
    /// Lifecycle state of a segment.
    pub enum SegmentState (default SegmentStateNone) {
        /// Unset or not recognized.
        SegmentStateNone = 0 => "SegmentStateNone",
        NotExist = 1 => "NotExist",
        Growing = 2 => "Growing",
        Sealed = 3 => "Sealed",
        Flushed = 4 => "Flushed",
        Flushing = 5 => "Flushing",
        Dropped = 6 => "Dropped",
        Importing = 7 => "Importing",
    }
}

impl SegmentState {
    pub fn is_dropped(&self) -> bool {
        matches!(self, SegmentState::Dropped)
    }

    /// Whether rows in this segment still count toward the collection.
    pub fn is_healthy(&self) -> bool {
        !self.is_dropped()
    }
}

wire_enum! {
    /// Storage tier of a segment. L0 holds deletes only.
    pub enum SegmentLevel (default Legacy) {
        /// Pre-leveling segments, and anything not recognized.
        Legacy = 0 => "Legacy",
        L0 = 1 => "L0",
        L1 = 2 => "L1",
        L2 = 3 => "L2",
    }
}

// ============================================================================
// COLLECTION ENUMS
// ============================================================================

wire_enum! {
    /// Lifecycle state of a collection.
    pub enum CollectionState (default CollectionCreated) {
        CollectionCreated = 0 => "CollectionCreated",
        CollectionCreating = 1 => "CollectionCreating",
        CollectionDropping = 2 => "CollectionDropping",
        CollectionDropped = 3 => "CollectionDropped",
    }
}

wire_enum! {
    /// Field data type. The wire carries either the name or the numeric code.
    pub enum DataType (default None) {
        None = 0 => "None",
        Bool = 1 => "Bool",
        Int8 = 2 => "Int8",
        Int16 = 3 => "Int16",
        Int32 = 4 => "Int32",
        Int64 = 5 => "Int64",
        Float = 10 => "Float",
        Double = 11 => "Double",
        String = 20 => "String",
        VarChar = 21 => "VarChar",
        Array = 22 => "Array",
        Json = 23 => "JSON",
        Geometry = 24 => "Geometry",
        Timestamptz = 26 => "Timestamptz",
        BinaryVector = 100 => "BinaryVector",
        FloatVector = 101 => "FloatVector",
        Float16Vector = 102 => "Float16Vector",
        BFloat16Vector = 103 => "BFloat16Vector",
        SparseFloatVector = 104 => "SparseFloatVector",
        Int8Vector = 105 => "Int8Vector",
    }
}

impl DataType {
    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            DataType::BinaryVector
                | DataType::FloatVector
                | DataType::Float16Vector
                | DataType::BFloat16Vector
                | DataType::SparseFloatVector
                | DataType::Int8Vector
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
