use bytes::{BufMut as _, Bytes, BytesMut};
use snafu::OptionExt as _;

use crate::{
    constants::cmqcfc::*,
    error::{InvalidLength, Result, Truncated, UnsupportedParameterType},
    layout::{padded_count, ByteOrder, Layout},
};

use super::PcfValue;

/// A single PCF parameter structure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Parameter {
    /// `MQCFIN`
    Integer { parameter: i32, value: i32 },
    /// `MQCFIN64`
    Integer64 { parameter: i32, value: i64 },
    /// `MQCFST`
    String { parameter: i32, ccsid: i32, value: Bytes },
    /// `MQCFSL`
    StringList {
        parameter: i32,
        ccsid: i32,
        values: Vec<Bytes>,
    },
    /// `MQCFBS`
    ByteString { parameter: i32, value: Bytes },
    /// `MQCFIL`
    IntegerList { parameter: i32, values: Vec<i32> },
    /// `MQCFIL64`
    Integer64List { parameter: i32, values: Vec<i64> },
    /// `MQCFGR`
    Group { parameter: i32, count: i32 },
    /// `MQCFIF`
    IntegerFilter { parameter: i32, operator: i32, value: i32 },
    /// `MQCFSF`
    StringFilter {
        parameter: i32,
        operator: i32,
        ccsid: i32,
        value: Bytes,
    },
    /// `MQCFBF`
    ByteStringFilter { parameter: i32, operator: i32, value: Bytes },
}

impl Parameter {
    /// Structure type tag (`MQCFT_*`).
    pub fn type_tag(&self) -> i32 {
        match self {
            Self::Integer { .. } => MQCFT_INTEGER,
            Self::Integer64 { .. } => MQCFT_INTEGER64,
            Self::String { .. } => MQCFT_STRING,
            Self::StringList { .. } => MQCFT_STRING_LIST,
            Self::ByteString { .. } => MQCFT_BYTE_STRING,
            Self::IntegerList { .. } => MQCFT_INTEGER_LIST,
            Self::Integer64List { .. } => MQCFT_INTEGER64_LIST,
            Self::Group { .. } => MQCFT_GROUP,
            Self::IntegerFilter { .. } => MQCFT_INTEGER_FILTER,
            Self::StringFilter { .. } => MQCFT_STRING_FILTER,
            Self::ByteStringFilter { .. } => MQCFT_BYTE_STRING_FILTER,
        }
    }

    /// Parameter identifier.
    pub fn parameter(&self) -> i32 {
        match self {
            Self::Integer { parameter, .. }
            | Self::Integer64 { parameter, .. }
            | Self::String { parameter, .. }
            | Self::StringList { parameter, .. }
            | Self::ByteString { parameter, .. }
            | Self::IntegerList { parameter, .. }
            | Self::Integer64List { parameter, .. }
            | Self::Group { parameter, .. }
            | Self::IntegerFilter { parameter, .. }
            | Self::StringFilter { parameter, .. }
            | Self::ByteStringFilter { parameter, .. } => *parameter,
        }
    }

    /// Encoded length of the structure, including padding.
    pub fn struc_length(&self) -> usize {
        match self {
            Self::Integer { .. } => MQCFIN_STRUC_LENGTH,
            Self::Integer64 { .. } => MQCFIN64_STRUC_LENGTH,
            Self::String { value, .. } => MQCFST_STRUC_LENGTH_FIXED + padded_count(value.len(), 4),
            Self::StringList { values, .. } => MQCFSL_STRUC_LENGTH_FIXED + values.len() * string_list_width(values),
            Self::ByteString { value, .. } => MQCFBS_STRUC_LENGTH_FIXED + padded_count(value.len(), 4),
            Self::IntegerList { values, .. } => MQCFIL_STRUC_LENGTH_FIXED + values.len() * 4,
            Self::Integer64List { values, .. } => MQCFIL64_STRUC_LENGTH_FIXED + values.len() * 8,
            Self::Group { .. } => MQCFGR_STRUC_LENGTH,
            Self::IntegerFilter { .. } => MQCFIF_STRUC_LENGTH,
            Self::StringFilter { value, .. } => MQCFSF_STRUC_LENGTH_FIXED + padded_count(value.len(), 4),
            Self::ByteStringFilter { value, .. } => MQCFBF_STRUC_LENGTH_FIXED + padded_count(value.len(), 4),
        }
    }

    /// Appends the encoded structure to `buf`.
    pub fn encode(&self, layout: Layout, buf: &mut BytesMut) {
        let mut w = Writer {
            order: layout.byte_order,
            buf,
        };
        w.long(self.type_tag());
        w.len(self.struc_length());
        w.long(self.parameter());

        match self {
            Self::Integer { value, .. } => w.long(*value),
            Self::Integer64 { value, .. } => {
                w.long(0);
                w.int64(*value);
            }
            Self::String { ccsid, value, .. } => {
                w.long(*ccsid);
                w.len(value.len());
                w.padded(value, padded_count(value.len(), 4), 0);
            }
            Self::StringList { ccsid, values, .. } => {
                let width = string_list_width(values);
                w.long(*ccsid);
                w.len(values.len());
                w.len(width);
                for value in values {
                    w.padded(value, width, b' ');
                }
            }
            Self::ByteString { value, .. } => {
                w.len(value.len());
                w.padded(value, padded_count(value.len(), 4), 0);
            }
            Self::IntegerList { values, .. } => {
                w.len(values.len());
                values.iter().for_each(|v| w.long(*v));
            }
            Self::Integer64List { values, .. } => {
                w.len(values.len());
                values.iter().for_each(|v| w.int64(*v));
            }
            Self::Group { count, .. } => w.long(*count),
            Self::IntegerFilter { operator, value, .. } => {
                w.long(*operator);
                w.long(*value);
            }
            Self::StringFilter {
                operator, ccsid, value, ..
            } => {
                w.long(*operator);
                w.long(*ccsid);
                w.len(value.len());
                w.padded(value, padded_count(value.len(), 4), 0);
            }
            Self::ByteStringFilter { operator, value, .. } => {
                w.long(*operator);
                w.len(value.len());
                w.padded(value, padded_count(value.len(), 4), 0);
            }
        }
    }

    /// Decodes the structure at the start of `buf`, returning it and the number of bytes it occupied.
    ///
    /// The record is trusted to occupy exactly `StrucLength` bytes, which must cover the fixed part of its type and
    /// fit in `buf`.
    pub fn decode(buf: &[u8], layout: Layout) -> Result<(Self, usize)> {
        let mut prefix = Reader {
            order: layout.byte_order,
            data: buf,
        };
        let tag = prefix.long()?;
        let (fixed_length, decode) = DECODERS
            .iter()
            .find(|(candidate, _, _)| *candidate == tag)
            .map(|(_, fixed_length, decode)| (*fixed_length, *decode))
            .context(UnsupportedParameterType { tag })?;

        let struc_length = prefix.len("StrucLength")?;
        if struc_length < fixed_length {
            return InvalidLength {
                what: "StrucLength",
                length: struc_length as i64,
            }
            .fail();
        }
        if struc_length > buf.len() {
            return Truncated {
                needed: struc_length,
                remaining: buf.len(),
            }
            .fail();
        }

        let parameter = prefix.long()?;
        let mut body = Reader {
            order: layout.byte_order,
            data: &buf[12..struc_length],
        };
        Ok((decode(parameter, &mut body)?, struc_length))
    }

    /// Converts a decoded parameter into its value.
    ///
    /// Groups carry no value of their own and return `None`.
    pub fn into_value(self) -> Option<PcfValue> {
        let value = match self {
            Self::Integer { value, .. } => PcfValue::Integer(value),
            Self::Integer64 { value, .. } => PcfValue::Integer64(value),
            Self::String { value, .. } => PcfValue::String(value),
            Self::StringList { values, .. } => PcfValue::StringList(values),
            Self::ByteString { value, .. } => PcfValue::ByteString(value),
            Self::IntegerList { values, .. } => PcfValue::IntegerList(values),
            Self::Integer64List { values, .. } => PcfValue::Integer64List(values),
            Self::Group { .. } => return None,
            Self::IntegerFilter { operator, value, .. } => PcfValue::Filter {
                operator,
                value: Box::new(PcfValue::Integer(value)),
            },
            Self::StringFilter { operator, value, .. } => PcfValue::Filter {
                operator,
                value: Box::new(PcfValue::String(value)),
            },
            Self::ByteStringFilter { operator, value, .. } => PcfValue::Filter {
                operator,
                value: Box::new(PcfValue::ByteString(value)),
            },
        };
        Some(value)
    }
}

type DecodeFn = fn(i32, &mut Reader<'_>) -> Result<Parameter>;

/// Decoders keyed by structure type, with the fixed length of each structure.
static DECODERS: &[(i32, usize, DecodeFn)] = &[
    (MQCFT_INTEGER, MQCFIN_STRUC_LENGTH, decode_integer),
    (MQCFT_INTEGER64, MQCFIN64_STRUC_LENGTH, decode_integer64),
    (MQCFT_STRING, MQCFST_STRUC_LENGTH_FIXED, decode_string),
    (MQCFT_STRING_LIST, MQCFSL_STRUC_LENGTH_FIXED, decode_string_list),
    (MQCFT_BYTE_STRING, MQCFBS_STRUC_LENGTH_FIXED, decode_byte_string),
    (MQCFT_INTEGER_LIST, MQCFIL_STRUC_LENGTH_FIXED, decode_integer_list),
    (MQCFT_INTEGER64_LIST, MQCFIL64_STRUC_LENGTH_FIXED, decode_integer64_list),
    (MQCFT_GROUP, MQCFGR_STRUC_LENGTH, decode_group),
    (MQCFT_INTEGER_FILTER, MQCFIF_STRUC_LENGTH, decode_integer_filter),
    (MQCFT_STRING_FILTER, MQCFSF_STRUC_LENGTH_FIXED, decode_string_filter),
    (MQCFT_BYTE_STRING_FILTER, MQCFBF_STRUC_LENGTH_FIXED, decode_byte_string_filter),
];

fn decode_integer(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    Ok(Parameter::Integer {
        parameter,
        value: r.long()?,
    })
}

fn decode_integer64(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let _reserved = r.long()?;
    Ok(Parameter::Integer64 {
        parameter,
        value: r.int64()?,
    })
}

fn decode_string(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let ccsid = r.long()?;
    let length = r.len("StringLength")?;
    Ok(Parameter::String {
        parameter,
        ccsid,
        value: r.bytes(length)?,
    })
}

fn decode_string_list(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let ccsid = r.long()?;
    let count = r.len("Count")?;
    let width = r.len("StringLength")?;
    r.ensure_items(count, width)?;
    let values = (0..count).map(|_| r.bytes(width)).collect::<Result<_>>()?;
    Ok(Parameter::StringList {
        parameter,
        ccsid,
        values,
    })
}

fn decode_byte_string(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let length = r.len("StringLength")?;
    Ok(Parameter::ByteString {
        parameter,
        value: r.bytes(length)?,
    })
}

fn decode_integer_list(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let count = r.len("Count")?;
    r.ensure_items(count, 4)?;
    let values = (0..count).map(|_| r.long()).collect::<Result<_>>()?;
    Ok(Parameter::IntegerList { parameter, values })
}

fn decode_integer64_list(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let count = r.len("Count")?;
    r.ensure_items(count, 8)?;
    let values = (0..count).map(|_| r.int64()).collect::<Result<_>>()?;
    Ok(Parameter::Integer64List { parameter, values })
}

fn decode_group(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let count = r.len("ParameterCount")?;
    Ok(Parameter::Group {
        parameter,
        count: count as i32,
    })
}

fn decode_integer_filter(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    Ok(Parameter::IntegerFilter {
        parameter,
        operator: r.long()?,
        value: r.long()?,
    })
}

fn decode_string_filter(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let operator = r.long()?;
    let ccsid = r.long()?;
    let length = r.len("FilterValueLength")?;
    Ok(Parameter::StringFilter {
        parameter,
        operator,
        ccsid,
        value: r.bytes(length)?,
    })
}

fn decode_byte_string_filter(parameter: i32, r: &mut Reader<'_>) -> Result<Parameter> {
    let operator = r.long()?;
    let length = r.len("FilterValueLength")?;
    Ok(Parameter::ByteStringFilter {
        parameter,
        operator,
        value: r.bytes(length)?,
    })
}

/// Width every entry of a string list is padded to.
fn string_list_width(values: &[Bytes]) -> usize {
    padded_count(values.iter().map(Bytes::len).max().unwrap_or(0), 4)
}

struct Writer<'a> {
    order: ByteOrder,
    buf: &'a mut BytesMut,
}

impl Writer<'_> {
    fn long(&mut self, value: i32) {
        match self.order {
            ByteOrder::Little => self.buf.put_i32_le(value),
            ByteOrder::Big => self.buf.put_i32(value),
        }
    }

    fn len(&mut self, value: usize) {
        self.long(i32::try_from(value).unwrap_or(i32::MAX));
    }

    fn int64(&mut self, value: i64) {
        match self.order {
            ByteOrder::Little => self.buf.put_i64_le(value),
            ByteOrder::Big => self.buf.put_i64(value),
        }
    }

    fn padded(&mut self, value: &[u8], width: usize, fill: u8) {
        self.buf.put_slice(value);
        self.buf.put_bytes(fill, width - value.len());
    }
}

/// Cursor over the bytes of a single record.
struct Reader<'a> {
    order: ByteOrder,
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        if self.data.len() < needed {
            return Truncated {
                needed,
                remaining: self.data.len(),
            }
            .fail();
        }
        let (head, tail) = self.data.split_at(needed);
        self.data = tail;
        Ok(head)
    }

    fn long(&mut self) -> Result<i32> {
        let raw = self.take(4)?;
        let raw = [raw[0], raw[1], raw[2], raw[3]];
        Ok(match self.order {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        })
    }

    fn int64(&mut self) -> Result<i64> {
        let raw = self.take(8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(raw);
        Ok(match self.order {
            ByteOrder::Little => i64::from_le_bytes(out),
            ByteOrder::Big => i64::from_be_bytes(out),
        })
    }

    /// Reads a length or count field, which must not be negative.
    fn len(&mut self, what: &'static str) -> Result<usize> {
        let value = self.long()?;
        usize::try_from(value).map_err(|_| {
            InvalidLength {
                what,
                length: i64::from(value),
            }
            .build()
        })
    }

    /// Checks that `count` entries of `width` bytes fit in the rest of the record.
    ///
    /// Zero-width entries still take one byte each, so a count can never outgrow the record it is read from.
    fn ensure_items(&self, count: usize, width: usize) -> Result<()> {
        match count.checked_mul(width.max(1)) {
            Some(needed) if needed <= self.data.len() => Ok(()),
            _ => InvalidLength {
                what: "Count",
                length: count as i64,
            }
            .fail(),
        }
    }

    fn bytes(&mut self, length: usize) -> Result<Bytes> {
        self.take(length).map(Bytes::copy_from_slice)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut as _;

    use super::*;
    use crate::error::Error;

    fn round_trip(parameter: Parameter, layout: Layout) {
        let mut buf = BytesMut::new();
        parameter.encode(layout, &mut buf);
        assert_eq!(buf.len(), parameter.struc_length());
        assert_eq!(buf.len() % 4, 0);

        let (decoded, used) = Parameter::decode(&buf, layout).expect("should decode");
        assert_eq!(used, buf.len());
        assert_eq!(decoded, parameter);
    }

    #[test]
    fn every_variant_round_trips() {
        let layout = Layout::packed(ByteOrder::Big);
        round_trip(Parameter::Integer { parameter: 1, value: -5 }, layout);
        round_trip(Parameter::Integer64 { parameter: 2, value: 1 << 40 }, layout);
        round_trip(
            Parameter::String {
                parameter: 3,
                ccsid: 1208,
                value: Bytes::from_static(b"abcde"),
            },
            layout,
        );
        round_trip(
            Parameter::StringList {
                parameter: 4,
                ccsid: 0,
                values: vec![Bytes::from_static(b"AAAA"), Bytes::from_static(b"BBBB")],
            },
            layout,
        );
        round_trip(
            Parameter::ByteString {
                parameter: 5,
                value: Bytes::from_static(&[1, 2, 3]),
            },
            layout,
        );
        round_trip(
            Parameter::IntegerList {
                parameter: 6,
                values: vec![1, 2, 3],
            },
            layout,
        );
        round_trip(
            Parameter::Integer64List {
                parameter: 7,
                values: vec![-1, 1 << 33],
            },
            layout,
        );
        round_trip(Parameter::Group { parameter: 8, count: 2 }, layout);
        round_trip(
            Parameter::IntegerFilter {
                parameter: 9,
                operator: MQCFOP_GREATER,
                value: 10,
            },
            layout,
        );
        round_trip(
            Parameter::StringFilter {
                parameter: 10,
                operator: MQCFOP_LIKE,
                ccsid: 0,
                value: Bytes::from_static(b"APP.*"),
            },
            layout,
        );
        round_trip(
            Parameter::ByteStringFilter {
                parameter: 11,
                operator: MQCFOP_EQUAL,
                value: Bytes::from_static(&[9; 6]),
            },
            layout,
        );
    }

    #[test]
    fn string_list_entries_share_a_width() {
        let parameter = Parameter::StringList {
            parameter: 4,
            ccsid: 0,
            values: vec![Bytes::from_static(b"A"), Bytes::from_static(b"BBBBB")],
        };
        let mut buf = BytesMut::new();
        parameter.encode(Layout::packed(ByteOrder::Little), &mut buf);
        assert_eq!(buf.len(), 24 + 2 * 8);
        assert_eq!(&buf[24..32], b"A       ");
    }

    #[test]
    fn single_byte_string_is_read() {
        let parameter = Parameter::String {
            parameter: 3,
            ccsid: 0,
            value: Bytes::from_static(b"Y"),
        };
        round_trip(parameter, Layout::packed(ByteOrder::Little));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut buf = BytesMut::new();
        Parameter::Integer { parameter: 1, value: 1 }.encode(Layout::packed(ByteOrder::Little), &mut buf);
        buf[0] = 99;

        let error = Parameter::decode(&buf, Layout::packed(ByteOrder::Little)).expect_err("should fail");
        assert!(matches!(error, Error::UnsupportedParameterType { tag: 99 }));
    }

    #[test]
    fn struc_length_is_validated() {
        let layout = Layout::packed(ByteOrder::Little);
        let mut buf = BytesMut::new();
        Parameter::Integer { parameter: 1, value: 1 }.encode(layout, &mut buf);

        let mut short = buf.clone();
        short[4] = 8;
        assert!(matches!(
            Parameter::decode(&short, layout),
            Err(Error::InvalidLength { .. })
        ));

        assert!(matches!(
            Parameter::decode(&buf[..12], layout),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn string_length_beyond_record_is_truncated() {
        let layout = Layout::packed(ByteOrder::Little);
        let mut buf = BytesMut::new();
        Parameter::String {
            parameter: 3,
            ccsid: 0,
            value: Bytes::from_static(b"abcd"),
        }
        .encode(layout, &mut buf);
        buf[16] = 40;

        assert!(matches!(
            Parameter::decode(&buf, layout),
            Err(Error::Truncated { .. })
        ));
    }

    fn list_header(type_: i32, struc_length: i32, count: i32, width: Option<i32>) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i32_le(type_);
        buf.put_i32_le(struc_length);
        buf.put_i32_le(4);
        if width.is_some() {
            buf.put_i32_le(0);
        }
        buf.put_i32_le(count);
        if let Some(width) = width {
            buf.put_i32_le(width);
        }
        buf
    }

    #[test]
    fn list_count_is_bounded_by_the_record() {
        let layout = Layout::packed(ByteOrder::Little);

        let empty_strings = list_header(MQCFT_STRING_LIST, 24, 5_000_000, Some(0));
        assert!(matches!(
            Parameter::decode(&empty_strings, layout),
            Err(Error::InvalidLength { what: "Count", .. })
        ));

        let wide_strings = list_header(MQCFT_STRING_LIST, 24, i32::MAX, Some(i32::MAX));
        assert!(matches!(
            Parameter::decode(&wide_strings, layout),
            Err(Error::InvalidLength { what: "Count", .. })
        ));

        let integers = list_header(MQCFT_INTEGER_LIST, 16, 1_000_000, None);
        assert!(matches!(
            Parameter::decode(&integers, layout),
            Err(Error::InvalidLength { what: "Count", .. })
        ));

        let mut integer64s = list_header(MQCFT_INTEGER64_LIST, 24, 2, None);
        integer64s.put_i64_le(7);
        assert!(matches!(
            Parameter::decode(&integer64s, layout),
            Err(Error::InvalidLength { what: "Count", .. })
        ));
    }
}
