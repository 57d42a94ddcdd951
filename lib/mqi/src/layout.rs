use std::{fmt, str::FromStr};

use crate::{
    constants::cmqc::{MQENC_INTEGER_MASK, MQENC_INTEGER_NORMAL},
    error::{Error, Interface},
};

/// Encodings for which integers are written most significant byte first.
const BIG_ENDIAN_ENCODINGS: &[i32] = &[1, 16, 256, 768, 17, 257, 272, 273];

/// Byte order of multi-byte integers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Byte order implied by an `MQENC_*` encoding value.
    pub fn from_encoding(encoding: i32) -> Self {
        if BIG_ENDIAN_ENCODINGS.contains(&encoding) || encoding & MQENC_INTEGER_MASK == MQENC_INTEGER_NORMAL {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// How fields are laid out in a packed buffer.
///
/// Structures passed across the MQI boundary use the host's layout: native byte order, natural field alignment and
/// the host's pointer width. PCF messages and RFH2 headers are unaligned streams of 32-bit integers whose byte order is
/// dictated by the message encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub byte_order: ByteOrder,
    pub pointer_width: usize,
    pub aligned: bool,
}

impl Layout {
    /// Host layout.
    pub const fn native() -> Self {
        Self {
            byte_order: ByteOrder::native(),
            pointer_width: std::mem::size_of::<usize>(),
            aligned: true,
        }
    }

    /// Unaligned layout with the given byte order.
    pub const fn packed(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            pointer_width: std::mem::size_of::<usize>(),
            aligned: false,
        }
    }

    /// Unaligned layout matching the integer encoding of a message.
    pub fn for_encoding(encoding: i32) -> Self {
        Self::packed(ByteOrder::from_encoding(encoding))
    }

    /// Overrides the pointer width.
    pub const fn with_pointer_width(mut self, pointer_width: usize) -> Self {
        self.pointer_width = pointer_width;
        self
    }

    pub(crate) fn align(&self, offset: usize, size: usize) -> usize {
        if self.aligned && size > 1 {
            padded_count(offset, size)
        } else {
            offset
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::native()
    }
}

/// Version of the MQ client library, which gates the fields present in several structures.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MqLevel {
    V5,
    V6_0,
    V7_0,
    V7_1,
    #[default]
    V8_0,
}

impl MqLevel {
    pub const ALL: [MqLevel; 5] = [Self::V5, Self::V6_0, Self::V7_0, Self::V7_1, Self::V8_0];
}

impl fmt::Display for MqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V5 => "5",
            Self::V6_0 => "6.0",
            Self::V7_0 => "7.0",
            Self::V7_1 => "7.1",
            Self::V8_0 => "8.0",
        };
        f.write_str(s)
    }
}

impl FromStr for MqLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" | "5.0" => Ok(Self::V5),
            "6" | "6.0" => Ok(Self::V6_0),
            "7" | "7.0" => Ok(Self::V7_0),
            "7.1" => Ok(Self::V7_1),
            "8" | "8.0" => Ok(Self::V8_0),
            other => Interface {
                reason: format!("unsupported MQ level '{}'", other),
            }
            .fail(),
        }
    }
}

/// Rounds `count` up to the next multiple of `boundary`, which must be a power of two.
pub const fn padded_count(count: usize, boundary: usize) -> usize {
    (count + boundary - 1) & !(boundary - 1)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn padded_count_examples() {
        assert_eq!(padded_count(0, 4), 0);
        assert_eq!(padded_count(5, 4), 8);
        assert_eq!(padded_count(8, 4), 8);
        assert_eq!(padded_count(9, 8), 16);
    }

    #[test]
    fn encoding_byte_order() {
        assert_eq!(ByteOrder::from_encoding(546), ByteOrder::Little);
        assert_eq!(ByteOrder::from_encoding(273), ByteOrder::Big);
        assert_eq!(ByteOrder::from_encoding(785), ByteOrder::Big);
        assert_eq!(ByteOrder::from_encoding(768), ByteOrder::Big);
        assert_eq!(ByteOrder::from_encoding(0), ByteOrder::Little);
    }

    #[test]
    fn level_parse_and_order() {
        assert_eq!("7.1".parse::<MqLevel>().expect("should parse"), MqLevel::V7_1);
        assert_eq!("5".parse::<MqLevel>().expect("should parse"), MqLevel::V5);
        assert!("9.3".parse::<MqLevel>().is_err());
        assert!(MqLevel::V6_0 < MqLevel::V7_0);
        assert_eq!(MqLevel::default(), MqLevel::V8_0);
    }

    proptest! {
        #[test]
        fn property_test_padded_count(count in 0usize..1_000_000, shift in 0u32..5) {
            let boundary = 1usize << shift;
            let padded = padded_count(count, boundary);
            prop_assert!(padded >= count);
            prop_assert_eq!(padded % boundary, 0);
            prop_assert!(padded - count < boundary);
        }
    }
}
