use bytes::Bytes;

use super::FieldVisitor;

/// Variable-length string (`MQCHARV`).
///
/// The string is held in a shared buffer, so clones made while packing point at the same memory. When packed, the
/// pointer field carries the address of that buffer, which is only meaningful to a native MQI call made while this value
/// is alive. Unpacking records the raw pointer, offset and length fields without dereferencing the pointer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VarString {
    value: Bytes,
    pub offset: i32,
    pub buffer_size: i32,
    pub ccsid: i32,
    address: u64,
    length: i32,
}

impl VarString {
    /// Creates a variable-length string holding `value`.
    pub fn new(value: impl Into<Bytes>) -> Self {
        let mut vs = Self::default();
        vs.set(value);
        vs
    }

    /// Replaces the owned string.
    pub fn set(&mut self, value: impl Into<Bytes>) {
        self.value = value.into();
        self.sync();
    }

    /// Owned string, if one was set.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Raw pointer field, as last packed or unpacked.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Raw length field, as last packed or unpacked.
    pub fn length(&self) -> i32 {
        self.length
    }

    fn sync(&mut self) {
        if self.value.is_empty() {
            self.address = 0;
            self.length = 0;
        } else {
            self.address = self.value.as_ptr() as u64;
            self.length = i32::try_from(self.value.len()).unwrap_or(i32::MAX);
        }
    }

    pub(crate) fn visit<V: FieldVisitor>(&mut self, v: &mut V, names: [&'static str; 5]) {
        if !self.value.is_empty() {
            self.sync();
        }

        v.pointer(names[0], &mut self.address);
        v.long(names[1], &mut self.offset);
        v.long(names[2], &mut self.buffer_size);
        v.long(names[3], &mut self.length);
        v.long(names[4], &mut self.ccsid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_owned_buffer() {
        let vs = VarString::new("SYSTEM.ADMIN.*");
        assert_eq!(vs.value(), b"SYSTEM.ADMIN.*");
        assert_eq!(vs.length(), 14);
        assert_ne!(vs.address(), 0);

        let empty = VarString::default();
        assert_eq!(empty.address(), 0);
        assert_eq!(empty.length(), 0);
    }
}
