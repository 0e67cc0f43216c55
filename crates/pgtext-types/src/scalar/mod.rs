//! Scalar value types
//!
//! One type per PostgreSQL column type. Values can only be built through
//! their [`PgType`](crate::PgType) factory, so every live value is valid for
//! its type's domain.

mod bit;
mod boolean;
mod character;
mod enumeration;
mod geometry;
mod interval;
mod json;
mod money;
mod number;
mod temporal;
mod time;
mod timestamp;
mod uuid;

pub use self::bit::*;
pub use self::boolean::*;
pub use self::character::*;
pub use self::enumeration::*;
pub use self::geometry::*;
pub use self::interval::*;
pub use self::json::*;
pub use self::money::*;
pub use self::number::*;
pub use self::temporal::{Date, Temporal};
pub use self::time::*;
pub use self::timestamp::*;
pub use self::uuid::*;
