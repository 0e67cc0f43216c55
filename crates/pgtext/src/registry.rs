//! Type lookup by name or OID
//!
//! Drivers learn a column's type as an OID (or a name from the catalog) and
//! need a [`Parser`] for it. Array types resolve by their `_`-prefixed name
//! and their own OID to an array-mode parser of the element type.

use crate::parser::Parser;
use indexmap::IndexMap;
use pgtext_types::{
    Bit, BitVarying, Boolean, Character, CharacterVarying, Circle, Date, DateMultiRange, DateRange,
    EnumLabels, Factory, Float4, Float8, Int2, Int4, Int4MultiRange, Int4Range, Int8,
    Int8MultiRange, Int8Range, Interval, Json, Jsonb, Line, LineSegment, Money, Name,
    NumMultiRange, NumRange, Numeric, Oid, Path, PgBox, PgEnum, PgType, Point, Polygon, Text, Time,
    TimeTZ, Timestamp, TimestampTZ, TsMultiRange, TsRange, TsTzMultiRange, TsTzRange, Uuid,
};

/// SQL spellings accepted in place of the catalog name
const ALIASES: &[(&str, &str)] = &[
    ("smallint", "int2"),
    ("integer", "int4"),
    ("int", "int4"),
    ("bigint", "int8"),
    ("real", "float4"),
    ("double precision", "float8"),
    ("decimal", "numeric"),
    ("boolean", "bool"),
    ("character", "bpchar"),
    ("char", "bpchar"),
    ("character varying", "varchar"),
    ("bit varying", "varbit"),
    ("time without time zone", "time"),
    ("time with time zone", "timetz"),
    ("timestamp without time zone", "timestamp"),
    ("timestamp with time zone", "timestamptz"),
];

/// Parsers keyed by type name, with an OID index
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    parsers: IndexMap<String, Parser>,
    oids: IndexMap<u32, String>,
}

impl TypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in type and its array type
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Int2>(Some(1005));
        registry.register::<Int4>(Some(1007));
        registry.register::<Int8>(Some(1016));
        registry.register::<Oid>(Some(1028));
        registry.register::<Float4>(Some(1021));
        registry.register::<Float8>(Some(1022));
        registry.register::<Numeric>(Some(1231));
        registry.register::<Money>(Some(791));
        registry.register::<Character>(Some(1014));
        registry.register::<CharacterVarying>(Some(1015));
        registry.register::<Text>(Some(1009));
        registry.register::<Name>(Some(1003));
        registry.register::<Bit>(Some(1561));
        registry.register::<BitVarying>(Some(1563));
        registry.register::<Boolean>(Some(1000));
        registry.register::<Date>(Some(1182));
        registry.register::<Time>(Some(1183));
        registry.register::<TimeTZ>(Some(1270));
        registry.register::<Timestamp>(Some(1115));
        registry.register::<TimestampTZ>(Some(1185));
        registry.register::<Interval>(Some(1187));
        registry.register::<Point>(Some(1017));
        registry.register::<Line>(Some(629));
        registry.register::<LineSegment>(Some(1018));
        registry.register::<PgBox>(Some(1020));
        registry.register::<Circle>(Some(719));
        registry.register::<Path>(Some(1019));
        registry.register::<Polygon>(Some(1027));
        registry.register::<Uuid>(Some(2951));
        registry.register::<Json>(Some(199));
        registry.register::<Jsonb>(Some(3807));
        registry.register::<Int4Range>(Some(3905));
        registry.register::<NumRange>(Some(3907));
        registry.register::<TsRange>(Some(3909));
        registry.register::<TsTzRange>(Some(3911));
        registry.register::<DateRange>(Some(3913));
        registry.register::<Int8Range>(Some(3927));
        registry.register::<Int4MultiRange>(Some(6150));
        registry.register::<NumMultiRange>(Some(6151));
        registry.register::<TsMultiRange>(Some(6152));
        registry.register::<TsTzMultiRange>(Some(6153));
        registry.register::<DateMultiRange>(Some(6155));
        registry.register::<Int8MultiRange>(Some(6157));
        registry
    }

    /// Register `T` with its default configuration
    pub fn register<T: PgType>(&mut self, array_oid: Option<u32>) {
        self.register_factory(T::type_name(), Factory::<T>::default(), T::type_oid(), array_oid);
    }

    /// Register a configured factory under a name
    pub fn register_factory<T: PgType>(
        &mut self,
        name: &str,
        factory: Factory<T>,
        oid: Option<u32>,
        array_oid: Option<u32>,
    ) {
        let parser = Parser::typed(factory);
        self.insert(name.to_string(), parser.clone(), oid);
        self.insert(format!("_{}", name), parser.array(), array_oid);
    }

    /// Register a user-defined enum type
    pub fn register_enum(&mut self, name: &str, labels: EnumLabels, oid: Option<u32>, array_oid: Option<u32>) {
        self.register_factory(name, Factory::<PgEnum>::new(labels), oid, array_oid);
    }

    fn insert(&mut self, name: String, parser: Parser, oid: Option<u32>) {
        log::trace!("registering type {} (oid {:?})", name, oid);
        if let Some(oid) = oid {
            self.oids.insert(oid, name.clone());
        }
        self.parsers.insert(name, parser);
    }

    /// Look up a type by catalog name or SQL spelling
    ///
    /// Lookup is case-insensitive and `name[]` means the array type.
    pub fn by_name(&self, name: &str) -> Option<&Parser> {
        let lowered = name.trim().to_ascii_lowercase();
        let (base, array) = match lowered.strip_suffix("[]") {
            Some(base) => (base.trim_end(), true),
            None => (lowered.as_str(), false),
        };
        let canonical = ALIASES
            .iter()
            .find(|(alias, _)| *alias == base)
            .map_or(base, |(_, target)| *target);
        let key = if array {
            format!("_{}", canonical)
        } else {
            canonical.to_string()
        };
        let found = self.parsers.get(&key);
        if found.is_none() {
            log::debug!("no parser registered for type {:?}", name);
        }
        found
    }

    pub fn by_oid(&self, oid: u32) -> Option<&Parser> {
        let found = self.oids.get(&oid).and_then(|name| self.parsers.get(name));
        if found.is_none() {
            log::debug!("no parser registered for oid {}", oid);
        }
        found
    }

    /// Registered type names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
