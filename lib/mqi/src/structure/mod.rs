//! Fixed-layout MQI structures.
//!
//! Every structure is a plain record implementing [`MqStructure`]. The record describes its field list, in C declaration
//! order, by calling into a [`FieldVisitor`]; sizing, packing, unpacking and field dumps are all visitors over that one
//! description, so the byte layout can never drift between them.
//!
//! Version-gated structures carry the [`MqLevel`](crate::MqLevel) they were built for and only visit the fields that
//! exist at that level.

use std::fmt;

use bytes::{BufMut as _, Bytes, BytesMut};

use crate::{
    error::{BufferTooLong, Result},
    layout::{ByteOrder, Layout},
};

mod cd;
pub use self::cd::ChannelDefinition;

mod charv;
pub use self::charv::VarString;

mod gmo;
pub use self::gmo::GetMessageOptions;

mod md;
pub use self::md::MessageDescriptor;

mod od;
pub use self::od::ObjectDescriptor;

mod pmo;
pub use self::pmo::PutMessageOptions;

mod rfh2;
pub use self::rfh2::{Folder, Rfh2};

mod sco;
pub use self::sco::SslConfigurationOptions;

/// Receives the fields of a structure in declaration order.
pub trait FieldVisitor {
    /// Width of pointer fields, in bytes.
    fn pointer_width(&self) -> usize;

    fn chars(&mut self, name: &'static str, value: &mut [u8]);
    fn byte(&mut self, name: &'static str, value: &mut u8);
    fn long(&mut self, name: &'static str, value: &mut i32);
    fn longs(&mut self, name: &'static str, values: &mut [i32]);
    fn int64(&mut self, name: &'static str, value: &mut i64);
    fn pointer(&mut self, name: &'static str, value: &mut u64);
}

/// A fixed-layout MQI structure.
pub trait MqStructure: Clone {
    /// Visits every field of the structure, in declaration order.
    fn visit_fields<V: FieldVisitor>(&mut self, visitor: &mut V);
}

/// Returns the packed length of a structure.
pub fn length<S: MqStructure>(structure: &S, layout: Layout) -> usize {
    let mut sizer = Sizer { layout, offset: 0 };
    structure.clone().visit_fields(&mut sizer);
    sizer.offset
}

/// Packs a structure into a new buffer.
pub fn pack<S: MqStructure>(structure: &S, layout: Layout) -> Bytes {
    let mut buf = BytesMut::with_capacity(length(structure, layout));
    pack_into(structure, layout, &mut buf);
    buf.freeze()
}

/// Packs a structure at the end of `buf`.
pub fn pack_into<S: MqStructure>(structure: &S, layout: Layout, buf: &mut BytesMut) {
    let mut packer = Packer {
        layout,
        start: buf.len(),
        buf,
    };
    structure.clone().visit_fields(&mut packer);
}

/// Unpacks a structure from `buf`.
///
/// Buffers shorter than the structure are padded with zeros, so trailing fields missing from the buffer read as zero.
/// Buffers longer than the structure are rejected.
pub fn unpack<S: MqStructure>(structure: &mut S, buf: &[u8], layout: Layout) -> Result<()> {
    let expected = length(structure, layout);
    if buf.len() > expected {
        return BufferTooLong {
            expected,
            actual: buf.len(),
        }
        .fail();
    }

    let mut padded = Vec::with_capacity(expected);
    padded.extend_from_slice(buf);
    padded.resize(expected, 0);

    let mut unpacker = Unpacker {
        layout,
        data: &padded,
        offset: 0,
    };
    structure.visit_fields(&mut unpacker);
    Ok(())
}

/// Returns the name and value of every field, in declaration order.
pub fn fields<S: MqStructure>(structure: &S) -> Vec<(&'static str, FieldValue)> {
    let mut dump = FieldDump {
        layout: Layout::native(),
        fields: Vec::new(),
    };
    structure.clone().visit_fields(&mut dump);
    dump.fields
}

/// Writes each field as a `Name: value` line.
pub(crate) fn write_fields<S: MqStructure>(structure: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (name, value)) in fields(structure).into_iter().enumerate() {
        if i > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{}: {}", name, value)?;
    }
    Ok(())
}

macro_rules! impl_display_fields {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    $crate::structure::write_fields(self, f)
                }
            }
        )+
    };
}

impl_display_fields!(
    ChannelDefinition,
    GetMessageOptions,
    MessageDescriptor,
    ObjectDescriptor,
    PutMessageOptions,
    SslConfigurationOptions,
    crate::pcf::CommandHeader,
);

/// Converts a string into a fixed-size character field, truncating or padding with NUL bytes.
pub fn fixed_chars<const N: usize>(value: impl AsRef<[u8]>) -> [u8; N] {
    let value = value.as_ref();
    let mut out = [0u8; N];
    let len = value.len().min(N);
    out[..len].copy_from_slice(&value[..len]);
    out
}

/// Converts a string into a fixed-size character field, truncating or padding with spaces.
pub fn blank_padded<const N: usize>(value: impl AsRef<[u8]>) -> [u8; N] {
    let value = value.as_ref();
    let mut out = [b' '; N];
    let len = value.len().min(N);
    out[..len].copy_from_slice(&value[..len]);
    out
}

/// Trims trailing NULs and spaces from a character field and decodes it lossily.
pub fn trim_chars(value: &[u8]) -> String {
    let end = value
        .iter()
        .rposition(|b| *b != 0 && *b != b' ')
        .map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&value[..end]).into_owned()
}

/// Value of a single structure field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Chars(Vec<u8>),
    Byte(u8),
    Long(i32),
    Longs(Vec<i32>),
    Int64(i64),
    Pointer(u64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars(value) => write!(f, "{:?}", String::from_utf8_lossy(value).trim_end_matches('\0')),
            Self::Byte(value) => write!(f, "{:?}", *value as char),
            Self::Long(value) => write!(f, "{}", value),
            Self::Longs(values) => write!(f, "{:?}", values),
            Self::Int64(value) => write!(f, "{}", value),
            Self::Pointer(value) => write!(f, "{:#x}", value),
        }
    }
}

struct Sizer {
    layout: Layout,
    offset: usize,
}

impl Sizer {
    fn advance(&mut self, size: usize, count: usize) {
        self.offset = self.layout.align(self.offset, size) + size * count;
    }
}

impl FieldVisitor for Sizer {
    fn pointer_width(&self) -> usize {
        self.layout.pointer_width
    }

    fn chars(&mut self, _: &'static str, value: &mut [u8]) {
        self.advance(1, value.len());
    }

    fn byte(&mut self, _: &'static str, _: &mut u8) {
        self.advance(1, 1);
    }

    fn long(&mut self, _: &'static str, _: &mut i32) {
        self.advance(4, 1);
    }

    fn longs(&mut self, _: &'static str, values: &mut [i32]) {
        self.advance(4, values.len());
    }

    fn int64(&mut self, _: &'static str, _: &mut i64) {
        self.advance(8, 1);
    }

    fn pointer(&mut self, _: &'static str, _: &mut u64) {
        self.advance(self.layout.pointer_width, 1);
    }
}

struct Packer<'a> {
    layout: Layout,
    start: usize,
    buf: &'a mut BytesMut,
}

impl Packer<'_> {
    fn align(&mut self, size: usize) {
        let offset = self.buf.len() - self.start;
        let aligned = self.layout.align(offset, size);
        self.buf.put_bytes(0, aligned - offset);
    }

    fn put_i32(&mut self, value: i32) {
        match self.layout.byte_order {
            ByteOrder::Little => self.buf.put_i32_le(value),
            ByteOrder::Big => self.buf.put_i32(value),
        }
    }
}

impl FieldVisitor for Packer<'_> {
    fn pointer_width(&self) -> usize {
        self.layout.pointer_width
    }

    fn chars(&mut self, _: &'static str, value: &mut [u8]) {
        self.buf.put_slice(value);
    }

    fn byte(&mut self, _: &'static str, value: &mut u8) {
        self.buf.put_u8(*value);
    }

    fn long(&mut self, _: &'static str, value: &mut i32) {
        self.align(4);
        self.put_i32(*value);
    }

    fn longs(&mut self, _: &'static str, values: &mut [i32]) {
        self.align(4);
        for value in values.iter() {
            self.put_i32(*value);
        }
    }

    fn int64(&mut self, _: &'static str, value: &mut i64) {
        self.align(8);
        match self.layout.byte_order {
            ByteOrder::Little => self.buf.put_i64_le(*value),
            ByteOrder::Big => self.buf.put_i64(*value),
        }
    }

    fn pointer(&mut self, _: &'static str, value: &mut u64) {
        let width = self.layout.pointer_width;
        self.align(width);
        match (self.layout.byte_order, width) {
            (ByteOrder::Little, 4) => self.buf.put_u32_le(*value as u32),
            (ByteOrder::Big, 4) => self.buf.put_u32(*value as u32),
            (ByteOrder::Little, _) => self.buf.put_u64_le(*value),
            (ByteOrder::Big, _) => self.buf.put_u64(*value),
        }
    }
}

struct Unpacker<'a> {
    layout: Layout,
    data: &'a [u8],
    offset: usize,
}

impl Unpacker<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        self.offset = self.layout.align(self.offset, N);
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn read_i32(&mut self) -> i32 {
        let raw = self.take::<4>();
        match self.layout.byte_order {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        }
    }
}

impl FieldVisitor for Unpacker<'_> {
    fn pointer_width(&self) -> usize {
        self.layout.pointer_width
    }

    fn chars(&mut self, _: &'static str, value: &mut [u8]) {
        let end = self.offset + value.len();
        value.copy_from_slice(&self.data[self.offset..end]);
        self.offset = end;
    }

    fn byte(&mut self, _: &'static str, value: &mut u8) {
        *value = self.data[self.offset];
        self.offset += 1;
    }

    fn long(&mut self, _: &'static str, value: &mut i32) {
        *value = self.read_i32();
    }

    fn longs(&mut self, _: &'static str, values: &mut [i32]) {
        for value in values.iter_mut() {
            *value = self.read_i32();
        }
    }

    fn int64(&mut self, _: &'static str, value: &mut i64) {
        let raw = self.take::<8>();
        *value = match self.layout.byte_order {
            ByteOrder::Little => i64::from_le_bytes(raw),
            ByteOrder::Big => i64::from_be_bytes(raw),
        };
    }

    fn pointer(&mut self, _: &'static str, value: &mut u64) {
        *value = if self.layout.pointer_width == 4 {
            let raw = self.take::<4>();
            match self.layout.byte_order {
                ByteOrder::Little => u32::from_le_bytes(raw) as u64,
                ByteOrder::Big => u32::from_be_bytes(raw) as u64,
            }
        } else {
            let raw = self.take::<8>();
            match self.layout.byte_order {
                ByteOrder::Little => u64::from_le_bytes(raw),
                ByteOrder::Big => u64::from_be_bytes(raw),
            }
        };
    }
}

struct FieldDump {
    layout: Layout,
    fields: Vec<(&'static str, FieldValue)>,
}

impl FieldVisitor for FieldDump {
    fn pointer_width(&self) -> usize {
        self.layout.pointer_width
    }

    fn chars(&mut self, name: &'static str, value: &mut [u8]) {
        self.fields.push((name, FieldValue::Chars(value.to_vec())));
    }

    fn byte(&mut self, name: &'static str, value: &mut u8) {
        self.fields.push((name, FieldValue::Byte(*value)));
    }

    fn long(&mut self, name: &'static str, value: &mut i32) {
        self.fields.push((name, FieldValue::Long(*value)));
    }

    fn longs(&mut self, name: &'static str, values: &mut [i32]) {
        self.fields.push((name, FieldValue::Longs(values.to_vec())));
    }

    fn int64(&mut self, name: &'static str, value: &mut i64) {
        self.fields.push((name, FieldValue::Int64(*value)));
    }

    fn pointer(&mut self, name: &'static str, value: &mut u64) {
        self.fields.push((name, FieldValue::Pointer(*value)));
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{layout::MqLevel, pcf::CommandHeader};

    fn assert_length_matches_pack<S: MqStructure>(structure: &S, layout: Layout) {
        assert_eq!(length(structure, layout), pack(structure, layout).len());
    }

    #[test]
    fn length_matches_pack_at_every_level() {
        let layouts = [
            Layout::native(),
            Layout::native().with_pointer_width(4),
            Layout::packed(ByteOrder::Big),
        ];
        for layout in layouts {
            assert_length_matches_pack(&MessageDescriptor::default(), layout);
            assert_length_matches_pack(&CommandHeader::default(), layout);
            for level in MqLevel::ALL {
                assert_length_matches_pack(&ObjectDescriptor::new(level), layout);
                assert_length_matches_pack(&GetMessageOptions::new(level), layout);
                assert_length_matches_pack(&PutMessageOptions::new(level), layout);
                assert_length_matches_pack(&ChannelDefinition::new(level), layout);
                assert_length_matches_pack(&SslConfigurationOptions::new(level), layout);
            }
        }
    }

    #[test]
    fn known_lengths() {
        let layout = Layout::native().with_pointer_width(8);
        assert_eq!(length(&MessageDescriptor::default(), layout), 364);
        assert_eq!(length(&CommandHeader::default(), layout), 36);
        assert_eq!(length(&GetMessageOptions::new(MqLevel::V6_0), layout), 100);
        assert_eq!(length(&GetMessageOptions::new(MqLevel::V7_0), layout), 112);
    }

    #[test]
    fn pointer_width_only_affects_pointer_fields() {
        let narrow = Layout::native().with_pointer_width(4);
        let wide = Layout::native().with_pointer_width(8);
        assert_eq!(
            length(&MessageDescriptor::default(), narrow),
            length(&MessageDescriptor::default(), wide)
        );
        assert!(length(&PutMessageOptions::new(MqLevel::V6_0), narrow) < length(&PutMessageOptions::new(MqLevel::V6_0), wide));
    }

    #[test]
    fn unpack_short_buffer_zero_pads() {
        let layout = Layout::native();
        let packed = pack(&MessageDescriptor::default(), layout);

        let mut md = MessageDescriptor::default();
        unpack(&mut md, &packed[..24], layout).expect("should unpack short buffer");
        assert_eq!(md.msg_type, MessageDescriptor::default().msg_type);
        assert_eq!(md.encoding, 0);
        assert_eq!(md.priority, 0);
        assert_eq!(md.original_length, 0);
    }

    #[test]
    fn unpack_rejects_long_buffer() {
        let layout = Layout::native();
        let mut packed = pack(&CommandHeader::default(), layout).to_vec();
        packed.push(0);

        let mut header = CommandHeader::default();
        assert!(unpack(&mut header, &packed, layout).is_err());
    }

    #[test]
    fn round_trip_defaults() {
        let layout = Layout::native();
        for level in MqLevel::ALL {
            let cd = ChannelDefinition::new(level);
            let mut decoded = ChannelDefinition::new(level);
            decoded.batch_size = 0;
            unpack(&mut decoded, &pack(&cd, layout), layout).expect("should unpack");
            similar_asserts::assert_eq!(fields(&cd), fields(&decoded));
        }
    }

    #[test]
    fn fixed_chars_truncates_and_pads() {
        assert_eq!(fixed_chars::<4>("ab"), *b"ab\0\0");
        assert_eq!(fixed_chars::<2>("abcd"), *b"ab");
        assert_eq!(blank_padded::<4>("ab"), *b"ab  ");
        assert_eq!(trim_chars(b"QM1   \0\0"), "QM1");
        assert_eq!(trim_chars(b"\0\0"), "");
    }

    #[test]
    fn display_lists_fields() {
        let rendered = CommandHeader::default().to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Type: 1"));
        assert_eq!(lines.next(), Some("StrucLength: 36"));
        assert_eq!(rendered.lines().count(), 9);
    }

    proptest! {
        #[test]
        fn property_test_md_round_trip(
            report in any::<i32>(),
            expiry in any::<i32>(),
            priority in any::<i32>(),
            msg_id in any::<[u8; 24]>(),
            big_endian in any::<bool>(),
        ) {
            let layout = if big_endian { Layout::packed(ByteOrder::Big) } else { Layout::native() };
            let md = MessageDescriptor { report, expiry, priority, msg_id, ..MessageDescriptor::default() };

            let mut decoded = MessageDescriptor::default();
            unpack(&mut decoded, &pack(&md, layout), layout).expect("should unpack");
            prop_assert_eq!(decoded, md);
        }
    }
}
