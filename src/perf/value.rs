//! Typed decoding of counter payloads.

use serde::{Serialize, Serializer};
use std::fmt;

use super::layout::ByteOrder;
use super::types::BasicType;

/// A counter value decoded from the region's current bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PerfValue {
    Boolean(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Byte vector up to its first NUL, or the whole vector without one.
    #[serde(serialize_with = "serialize_lossy")]
    String(Vec<u8>),
    Array {
        element: BasicType,
        values: Vec<PerfValue>,
    },
}

#[allow(clippy::ptr_arg)]
fn serialize_lossy<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

impl PerfValue {
    /// Numeric view of scalar values, `None` for strings and arrays.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PerfValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
            PerfValue::Char(c) => Some(f64::from(c)),
            PerfValue::Byte(b) => Some(f64::from(b)),
            PerfValue::Short(s) => Some(f64::from(s)),
            PerfValue::Int(i) => Some(f64::from(i)),
            PerfValue::Long(l) => Some(l as f64),
            PerfValue::Float(f) => Some(f64::from(f)),
            PerfValue::Double(d) => Some(d),
            PerfValue::String(_) | PerfValue::Array { .. } => None,
        }
    }

    /// Integer view of integral scalars.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PerfValue::Boolean(b) => Some(i64::from(b)),
            PerfValue::Char(c) => Some(i64::from(c)),
            PerfValue::Byte(b) => Some(i64::from(b)),
            PerfValue::Short(s) => Some(i64::from(s)),
            PerfValue::Int(i) => Some(i64::from(i)),
            PerfValue::Long(l) => Some(l),
            _ => None,
        }
    }

    /// Text of a string counter, lossily decoded.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PerfValue::String(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

impl fmt::Display for PerfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerfValue::Boolean(b) => write!(f, "{b}"),
            PerfValue::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(ch) => write!(f, "{ch}"),
                None => write!(f, "\\u{c:04x}"),
            },
            PerfValue::Byte(v) => write!(f, "{v}"),
            PerfValue::Short(v) => write!(f, "{v}"),
            PerfValue::Int(v) => write!(f, "{v}"),
            PerfValue::Long(v) => write!(f, "{v}"),
            PerfValue::Float(v) => write!(f, "{v}"),
            PerfValue::Double(v) => write!(f, "{v}"),
            PerfValue::String(bytes) => write!(f, "\"{}\"", String::from_utf8_lossy(bytes)),
            PerfValue::Array { values, .. } => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            },
        }
    }
}

/// Decode one scalar of `kind` at `offset`.
fn decode_scalar(buf: &[u8], order: ByteOrder, kind: BasicType, offset: usize) -> Option<PerfValue> {
    Some(match kind {
        BasicType::Boolean => PerfValue::Boolean(*buf.get(offset)? != 0),
        BasicType::Byte => PerfValue::Byte(i8::from_ne_bytes([*buf.get(offset)?])),
        BasicType::Char => PerfValue::Char(order.read_u16(buf, offset)?),
        BasicType::Short => PerfValue::Short(order.read_u16(buf, offset)? as i16),
        BasicType::Int => PerfValue::Int(order.read_i32(buf, offset)?),
        BasicType::Long => PerfValue::Long(order.read_i64(buf, offset)?),
        BasicType::Float => PerfValue::Float(order.read_f32(buf, offset)?),
        BasicType::Double => PerfValue::Double(order.read_f64(buf, offset)?),
        BasicType::Object | BasicType::Array | BasicType::Void | BasicType::Illegal => return None,
    })
}

/// Decode the value of a `kind` counter with `vector_length` elements at
/// `offset`. Returns `None` when the kind has no fixed payload or the bytes
/// are no longer inside `buf`.
pub fn decode(
    buf: &[u8],
    order: ByteOrder,
    kind: BasicType,
    vector_length: usize,
    offset: usize,
) -> Option<PerfValue> {
    if vector_length == 0 {
        return decode_scalar(buf, order, kind, offset);
    }

    let size = kind.element_size()?;
    let end = size.checked_mul(vector_length)?.checked_add(offset)?;
    let payload = buf.get(offset..end)?;

    if kind == BasicType::Byte {
        let len = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        return Some(PerfValue::String(payload[..len].to_vec()));
    }

    let values = (0..vector_length)
        .map(|i| decode_scalar(buf, order, kind, offset + i * size))
        .collect::<Option<Vec<_>>>()?;
    Some(PerfValue::Array {
        element: kind,
        values,
    })
}
