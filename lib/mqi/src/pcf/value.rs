use bytes::Bytes;
use indexmap::IndexMap;

use crate::structure::trim_chars;

/// Decoded PCF parameters keyed by parameter identifier, in the order they were received.
pub type ParameterMap = IndexMap<i32, PcfValue>;

/// Value of a decoded PCF parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum PcfValue {
    Integer(i32),
    Integer64(i64),
    String(Bytes),
    ByteString(Bytes),
    IntegerList(Vec<i32>),
    Integer64List(Vec<i64>),
    StringList(Vec<Bytes>),

    /// Every occurrence of a group with this identifier, in order.
    Group(Vec<ParameterMap>),

    /// A filter condition, as found in command messages.
    Filter { operator: i32, value: Box<PcfValue> },
}

impl PcfValue {
    /// Integer value, widened to 64 bits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(i64::from(*value)),
            Self::Integer64(value) => Some(*value),
            _ => None,
        }
    }

    /// Sum of an integer or integer list value.
    ///
    /// Statistics messages report some counters per persistence class as two-element lists.
    pub fn sum_i64(&self) -> Option<i64> {
        match self {
            Self::IntegerList(values) => Some(values.iter().map(|v| i64::from(*v)).sum()),
            Self::Integer64List(values) => Some(values.iter().sum()),
            other => other.as_i64(),
        }
    }

    /// String value with trailing blanks removed.
    pub fn as_str(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(trim_chars(value)),
            _ => None,
        }
    }

    /// Raw string or byte string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(value) | Self::ByteString(value) => Some(value),
            _ => None,
        }
    }

    /// Group occurrences.
    pub fn as_groups(&self) -> Option<&[ParameterMap]> {
        match self {
            Self::Group(groups) => Some(groups),
            _ => None,
        }
    }
}

impl From<i32> for PcfValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for PcfValue {
    fn from(value: i64) -> Self {
        Self::Integer64(value)
    }
}

impl From<&'static str> for PcfValue {
    fn from(value: &'static str) -> Self {
        Self::String(Bytes::from_static(value.as_bytes()))
    }
}

impl From<Vec<i32>> for PcfValue {
    fn from(values: Vec<i32>) -> Self {
        Self::IntegerList(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        assert_eq!(PcfValue::Integer(7).as_i64(), Some(7));
        assert_eq!(PcfValue::Integer64(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(PcfValue::from("QUEUE.1     ").as_str().as_deref(), Some("QUEUE.1"));
        assert_eq!(PcfValue::IntegerList(vec![3, 4]).sum_i64(), Some(7));
        assert_eq!(PcfValue::IntegerList(vec![3, 4]).as_i64(), None);
        assert!(PcfValue::Integer(1).as_groups().is_none());
    }
}
