//! PostgreSQL text-format value types
//!
//! This crate provides:
//! - The [`PgType`] contract and configured [`Factory`] constructors
//! - Every scalar type (integers, numeric, money, character, bit, temporal,
//!   geometric, uuid, json, enum)
//! - Generic [`Range`] and [`MultiRange`] engines over any ordered scalar
//! - The array literal codec
//! - The dynamic [`PgValue`] enum
//!
//! ```
//! use pgtext_types::{Int4Range, PgType, TimestampTZ};
//!
//! let range = Int4Range::parse("[1,10)").unwrap();
//! assert!(range.is_within_range(5).unwrap());
//!
//! let utc = TimestampTZ::parse("2023-01-01T00:00:00+00:00").unwrap();
//! assert!(utc.equals("2023-01-01T09:00:00+09:00").unwrap());
//! ```

/// Implement the [`PgValue`] glue of a [`PgType`] impl for one variant
macro_rules! value_glue {
    ($variant:ident) => {
        fn guard(value: &crate::PgValue) -> Option<&Self> {
            match value {
                crate::PgValue::$variant(v) => Some(v),
                _ => None,
            }
        }

        fn into_pg_value(self) -> crate::PgValue {
            crate::PgValue::$variant(self)
        }
    };
}
pub(crate) use value_glue;

pub mod array;
pub mod multirange;
pub mod numeric;
pub mod range;
pub mod scalar;
pub mod timezone;

mod structure;
mod traits;
mod value;

pub use array::{
    ArrayCodec, ArrayElement, MAX_DIMENSIONS, PgArray, RawElement, parse_array_literal, serialize_raw_array,
};
pub use multirange::MultiRange;
pub use range::{Range, RangeSubtype};
pub use scalar::*;
pub use structure::{Fields, expect_keys};
pub use traits::{Equality, Factory, PgType};
pub use value::*;
