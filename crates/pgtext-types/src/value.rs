//! Dynamic value representation
//!
//! [`PgValue`] holds a value of any supported type. It is what the parser
//! adapter and the type registry hand back when the concrete type is only
//! known at runtime; [`PgType::guard`] narrows it back to a concrete type.

use crate::multirange::MultiRange;
use crate::range::{Range, RangeSubtype};
use crate::{
    Bit, BitVarying, Boolean, Character, CharacterVarying, Circle, Date, Float4, Float8, Int2,
    Int4, Int8, Interval, Json, Jsonb, Line, LineSegment, Money, Name, Numeric, Oid, Path, PgArray,
    PgBox, PgEnum, PgType, Point, Polygon, Text, Time, TimeTZ, Timestamp, TimestampTZ, Uuid,
};
use crate::array::ArrayElement;
use serde_json::Value;
use std::fmt;

macro_rules! pg_value {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A value of any supported PostgreSQL type
        #[derive(Debug, Clone, PartialEq)]
        pub enum PgValue {
            $($variant($ty),)*
            /// An array; elements keep their own variant
            Array(PgArray<PgValue>),
        }

        impl PgValue {
            /// PostgreSQL type name of the held value (`array` for arrays)
            pub fn type_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$ty as PgType>::type_name(),)*
                    Self::Array(_) => "array",
                }
            }

            /// PostgreSQL type OID of the held value, when it has a fixed one
            pub fn type_oid(&self) -> Option<u32> {
                match self {
                    $(Self::$variant(_) => <$ty as PgType>::type_oid(),)*
                    Self::Array(_) => None,
                }
            }

            /// Structural form of the held value
            pub fn to_json(&self) -> Value {
                match self {
                    $(Self::$variant(v) => v.to_json(),)*
                    Self::Array(array) => array_json(array.elements()),
                }
            }
        }

        impl fmt::Display for PgValue {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(v) => fmt::Display::fmt(v, f),)*
                    Self::Array(array) => fmt::Display::fmt(array, f),
                }
            }
        }

        $(
            impl From<$ty> for PgValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

pg_value! {
    Int2(Int2),
    Int4(Int4),
    Int8(Int8),
    Oid(Oid),
    Float4(Float4),
    Float8(Float8),
    Numeric(Numeric),
    Money(Money),
    Character(Character),
    CharacterVarying(CharacterVarying),
    Text(Text),
    Name(Name),
    Bit(Bit),
    BitVarying(BitVarying),
    Boolean(Boolean),
    Date(Date),
    Time(Time),
    TimeTZ(TimeTZ),
    Timestamp(Timestamp),
    TimestampTZ(TimestampTZ),
    Interval(Interval),
    Point(Point),
    Line(Line),
    LineSegment(LineSegment),
    Box(PgBox),
    Circle(Circle),
    Path(Path),
    Polygon(Polygon),
    Uuid(Uuid),
    Json(Json),
    Jsonb(Jsonb),
    Enum(PgEnum),
    Int4Range(Range<Int4>),
    Int8Range(Range<Int8>),
    NumRange(Range<Numeric>),
    TsRange(Range<Timestamp>),
    TsTzRange(Range<TimestampTZ>),
    DateRange(Range<Date>),
    Int4MultiRange(MultiRange<Int4>),
    Int8MultiRange(MultiRange<Int8>),
    NumMultiRange(MultiRange<Numeric>),
    TsMultiRange(MultiRange<Timestamp>),
    TsTzMultiRange(MultiRange<TimestampTZ>),
    DateMultiRange(MultiRange<Date>),
}

fn array_json(elements: &[ArrayElement<PgValue>]) -> Value {
    Value::Array(
        elements
            .iter()
            .map(|e| match e {
                ArrayElement::Null => Value::Null,
                ArrayElement::Value(v) => v.to_json(),
                ArrayElement::Array(items) => array_json(items),
            })
            .collect(),
    )
}

impl From<PgArray<PgValue>> for PgValue {
    fn from(array: PgArray<PgValue>) -> Self {
        Self::Array(array)
    }
}

impl PgValue {
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Narrow to a concrete type
    pub fn downcast_ref<T: PgType>(&self) -> Option<&T> {
        T::guard(self)
    }
}

macro_rules! range_subtype {
    ($ty:ty, $range:ident($range_name:literal, $range_oid:literal), $multi:ident($multi_name:literal, $multi_oid:literal)) => {
        impl RangeSubtype for $ty {
            const RANGE_NAME: &'static str = $range_name;
            const RANGE_OID: u32 = $range_oid;
            const MULTIRANGE_NAME: &'static str = $multi_name;
            const MULTIRANGE_OID: u32 = $multi_oid;

            fn wrap_range(range: Range<Self>) -> PgValue {
                PgValue::$range(range)
            }

            fn guard_range(value: &PgValue) -> Option<&Range<Self>> {
                match value {
                    PgValue::$range(range) => Some(range),
                    _ => None,
                }
            }

            fn wrap_multirange(multirange: MultiRange<Self>) -> PgValue {
                PgValue::$multi(multirange)
            }

            fn guard_multirange(value: &PgValue) -> Option<&MultiRange<Self>> {
                match value {
                    PgValue::$multi(multirange) => Some(multirange),
                    _ => None,
                }
            }
        }
    };
}

range_subtype!(Int4, Int4Range("int4range", 3904), Int4MultiRange("int4multirange", 4451));
range_subtype!(Numeric, NumRange("numrange", 3906), NumMultiRange("nummultirange", 4532));
range_subtype!(Timestamp, TsRange("tsrange", 3908), TsMultiRange("tsmultirange", 4533));
range_subtype!(TimestampTZ, TsTzRange("tstzrange", 3910), TsTzMultiRange("tstzmultirange", 4534));
range_subtype!(Date, DateRange("daterange", 3912), DateMultiRange("datemultirange", 4535));
range_subtype!(Int8, Int8Range("int8range", 3926), Int8MultiRange("int8multirange", 4536));

pub type Int4Range = Range<Int4>;
pub type Int8Range = Range<Int8>;
pub type NumRange = Range<Numeric>;
pub type TsRange = Range<Timestamp>;
pub type TsTzRange = Range<TimestampTZ>;
pub type DateRange = Range<Date>;

pub type Int4MultiRange = MultiRange<Int4>;
pub type Int8MultiRange = MultiRange<Int8>;
pub type NumMultiRange = MultiRange<Numeric>;
pub type TsMultiRange = MultiRange<Timestamp>;
pub type TsTzMultiRange = MultiRange<TimestampTZ>;
pub type DateMultiRange = MultiRange<Date>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Factory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_dynamic_metadata() {
        let v = Int4::parse(5).unwrap().into_pg_value();
        assert_eq!(v.type_name(), "int4");
        assert_eq!(v.type_oid(), Some(23));
        assert_eq!(v.to_string(), "5");

        let r = Int4Range::parse("[1,2)").unwrap().into_pg_value();
        assert_eq!(r.type_name(), "int4range");
        assert_eq!(r.type_oid(), Some(3904));

        let m = DateMultiRange::parse("{}").unwrap().into_pg_value();
        assert_eq!(m.type_name(), "datemultirange");
        assert_eq!(m.type_oid(), Some(4535));
    }

    #[test]
    fn test_guards() {
        let v = PgValue::from(Text::parse("abc").unwrap());
        assert!(Factory::<Text>::default().is(&v));
        assert!(!Factory::<Name>::default().is(&v));
        assert_eq!(v.downcast_ref::<Text>().map(Text::as_str), Some("abc"));
        assert!(v.downcast_ref::<Int4Range>().is_none());

        let r = TsRange::parse("(,)").unwrap().into_pg_value();
        assert!(r.downcast_ref::<TsRange>().is_some());
        assert!(r.downcast_ref::<TsTzRange>().is_none());
    }

    #[test]
    fn test_array_json() {
        let v = crate::ArrayCodec::<Boolean>::default()
            .parse("{t,NULL}")
            .unwrap()
            .into_pg_value();
        assert!(v.is_array());
        assert_eq!(v.to_json(), json!([{ "value": "t" }, null]));
        assert_eq!(v.to_string(), "{t,NULL}");
    }
}
