//! Tag tables for PerfData records.
//!
//! HotSpot describes each counter with one-byte tags: a JVM type signature
//! character for the data type, plus small integer codes for the unit of
//! measure and the variability class. The numeric values of [`BasicType`]
//! match HotSpot's `BasicType` enum so they line up with runtime dumps.

use serde::Serialize;

/// Semantic kind of a counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BasicType {
    Boolean = 4,
    Char = 5,
    Float = 6,
    Double = 7,
    Byte = 8,
    Short = 9,
    Int = 10,
    Long = 11,
    Object = 12,
    Array = 13,
    Void = 14,
    Illegal = 99,
}

/// Every kind with a tag and display name, in `BasicType` order.
const KNOWN_TYPES: [BasicType; 11] = [
    BasicType::Boolean,
    BasicType::Char,
    BasicType::Float,
    BasicType::Double,
    BasicType::Byte,
    BasicType::Short,
    BasicType::Int,
    BasicType::Long,
    BasicType::Object,
    BasicType::Array,
    BasicType::Void,
];

impl BasicType {
    /// Map a record's `data_type` tag to its kind.
    pub const fn from_tag(tag: u8) -> Self {
        match tag {
            b'B' => BasicType::Byte,
            b'C' => BasicType::Char,
            b'D' => BasicType::Double,
            b'F' => BasicType::Float,
            b'I' => BasicType::Int,
            b'J' => BasicType::Long,
            b'S' => BasicType::Short,
            b'Z' => BasicType::Boolean,
            b'V' => BasicType::Void,
            b'L' => BasicType::Object,
            b'[' => BasicType::Array,
            _ => BasicType::Illegal,
        }
    }

    /// The signature character for this kind.
    pub const fn tag(self) -> Option<u8> {
        match self {
            BasicType::Boolean => Some(b'Z'),
            BasicType::Char => Some(b'C'),
            BasicType::Float => Some(b'F'),
            BasicType::Double => Some(b'D'),
            BasicType::Byte => Some(b'B'),
            BasicType::Short => Some(b'S'),
            BasicType::Int => Some(b'I'),
            BasicType::Long => Some(b'J'),
            BasicType::Object => Some(b'L'),
            BasicType::Array => Some(b'['),
            BasicType::Void => Some(b'V'),
            BasicType::Illegal => None,
        }
    }

    /// Java-level type name, `None` for [`BasicType::Illegal`].
    pub const fn display_name(self) -> Option<&'static str> {
        match self {
            BasicType::Boolean => Some("boolean"),
            BasicType::Char => Some("char"),
            BasicType::Float => Some("float"),
            BasicType::Double => Some("double"),
            BasicType::Byte => Some("byte"),
            BasicType::Short => Some("short"),
            BasicType::Int => Some("int"),
            BasicType::Long => Some("long"),
            BasicType::Object => Some("object"),
            BasicType::Array => Some("array"),
            BasicType::Void => Some("void"),
            BasicType::Illegal => None,
        }
    }

    /// Inverse of [`BasicType::display_name`] by exact match.
    pub fn from_display_name(name: &str) -> Self {
        KNOWN_TYPES
            .iter()
            .copied()
            .find(|kind| kind.display_name() == Some(name))
            .unwrap_or(BasicType::Illegal)
    }

    /// Width in bytes of one element, for kinds that carry a fixed-size payload.
    pub const fn element_size(self) -> Option<usize> {
        match self {
            BasicType::Boolean | BasicType::Byte => Some(1),
            BasicType::Char | BasicType::Short => Some(2),
            BasicType::Int | BasicType::Float => Some(4),
            BasicType::Long | BasicType::Double => Some(8),
            BasicType::Object | BasicType::Array | BasicType::Void | BasicType::Illegal => None,
        }
    }

    /// All kinds that have a tag.
    pub fn known() -> &'static [BasicType] {
        &KNOWN_TYPES
    }
}

/// Unit of measure published with a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    None,
    Bytes,
    Ticks,
    Events,
    String,
    Hertz,
}

impl Units {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Units::None),
            2 => Some(Units::Bytes),
            3 => Some(Units::Ticks),
            4 => Some(Units::Events),
            5 => Some(Units::String),
            6 => Some(Units::Hertz),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Units::None => "none",
            Units::Bytes => "bytes",
            Units::Ticks => "ticks",
            Units::Events => "events",
            Units::String => "string",
            Units::Hertz => "hertz",
        }
    }
}

/// How a counter's value may change after publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variability {
    /// Never changes after first publication.
    Constant,
    /// Only increases.
    Monotonic,
    /// Changes freely.
    Variable,
}

impl Variability {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Variability::Constant),
            2 => Some(Variability::Monotonic),
            3 => Some(Variability::Variable),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Variability::Constant => "constant",
            Variability::Monotonic => "monotonic",
            Variability::Variable => "variable",
        }
    }
}

/// Record flag: the counter is a supported (stable) interface.
pub const FLAG_SUPPORTED: u8 = 0x1;

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED_TAGS: &[u8] = b"BZJISCDFVL[";

    #[test]
    fn test_tags_round_trip_through_display_names() {
        for &tag in SUPPORTED_TAGS {
            let kind = BasicType::from_tag(tag);
            assert_ne!(kind, BasicType::Illegal, "tag {}", tag as char);

            let name = kind.display_name().unwrap();
            assert_eq!(BasicType::from_display_name(name), kind);
            assert_eq!(kind.tag(), Some(tag));
        }
    }

    #[test]
    fn test_unknown_tags_are_illegal() {
        for tag in [0u8, b'A', b'b', b'X', b'?', 0xff] {
            assert_eq!(BasicType::from_tag(tag), BasicType::Illegal);
        }
        assert_eq!(BasicType::Illegal.display_name(), None);
        assert_eq!(BasicType::Illegal.tag(), None);
    }

    #[test]
    fn test_display_name_lookup_is_exact() {
        assert_eq!(BasicType::from_display_name("long"), BasicType::Long);
        assert_eq!(BasicType::from_display_name("Long"), BasicType::Illegal);
        assert_eq!(BasicType::from_display_name("long "), BasicType::Illegal);
        assert_eq!(BasicType::from_display_name(""), BasicType::Illegal);
    }

    #[test]
    fn test_known_kinds_are_consistent() {
        assert_eq!(BasicType::known().len(), SUPPORTED_TAGS.len());
        for &kind in BasicType::known() {
            let tag = kind.tag().unwrap();
            assert_eq!(BasicType::from_tag(tag), kind);
        }
    }

    #[test]
    fn test_element_sizes() {
        assert_eq!(BasicType::Long.element_size(), Some(8));
        assert_eq!(BasicType::Char.element_size(), Some(2));
        assert_eq!(BasicType::Byte.element_size(), Some(1));
        assert_eq!(BasicType::Object.element_size(), None);
    }

    #[test]
    fn test_units_and_variability_tags() {
        assert_eq!(Units::from_tag(2), Some(Units::Bytes));
        assert_eq!(Units::from_tag(6), Some(Units::Hertz));
        assert_eq!(Units::from_tag(0), None);
        assert_eq!(Variability::from_tag(2), Some(Variability::Monotonic));
        assert_eq!(Variability::from_tag(4), None);
    }
}
