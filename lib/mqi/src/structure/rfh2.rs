use bytes::Bytes;
use quick_xml::{events::Event, Reader};

use super::{FieldVisitor, MqStructure};
use crate::{
    constants::cmqc::*,
    error::{Interface, InvalidLength, Result},
    layout::{ByteOrder, Layout},
};

/// A named XML folder carried by an RFH2 header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Folder {
    name: String,
    length: i32,
    data: Vec<u8>,
}

impl Folder {
    /// Root element name of the folder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder contents, including any trailing padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Rules and formatting header, version 2 (`MQRFH2`).
///
/// The fixed 36-byte header is followed by any number of XML folders, each prefixed with its length. Folders are
/// checked for well-formedness when added or decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rfh2 {
    pub struc_id: [u8; 4],
    pub version: i32,
    pub struc_length: i32,
    pub encoding: i32,
    pub coded_char_set_id: i32,
    pub format: [u8; 8],
    pub flags: i32,
    pub name_value_ccsid: i32,
    folders: Vec<Folder>,
}

impl Default for Rfh2 {
    fn default() -> Self {
        Self {
            struc_id: *MQRFH_STRUC_ID,
            version: MQRFH_VERSION_2,
            struc_length: 0,
            encoding: MQENC_NATIVE,
            coded_char_set_id: MQCCSI_Q_MGR,
            format: *MQFMT_NONE,
            flags: 0,
            name_value_ccsid: MQCCSI_Q_MGR,
            folders: Vec::new(),
        }
    }
}

impl Rfh2 {
    /// Folders, in the order they appear in the header.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Appends an XML folder, padding it with spaces to a multiple of four bytes and updating `struc_length`.
    pub fn add_folder(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        let mut data = data.into();
        let name = root_element(&data)?;

        let remainder = data.len() % 4;
        if remainder != 0 {
            data.resize(data.len() + 4 - remainder, b' ');
        }

        self.folders.push(Folder {
            name,
            length: to_mqlong(data.len())?,
            data,
        });
        self.struc_length = to_mqlong(super::length(self, Layout::native()))?;
        Ok(())
    }

    /// Packs the header and its folders.
    ///
    /// Integers are written big-endian for the "normal" MQ encodings and little-endian otherwise. Without an encoding
    /// the host byte order is used.
    pub fn pack(&self, encoding: Option<i32>) -> Bytes {
        let byte_order = match encoding {
            Some(encoding) if is_big_endian_encoding(encoding) => ByteOrder::Big,
            Some(_) => ByteOrder::Little,
            None => ByteOrder::native(),
        };
        super::pack(self, Layout::packed(byte_order))
    }

    /// Decodes a header and its folders.
    ///
    /// The byte order comes from `encoding`, normally the `Encoding` of the preceding message descriptor. Without one,
    /// it is inferred from the first byte of the version field.
    pub fn unpack(buf: &[u8], encoding: Option<i32>) -> Result<Self> {
        if buf.get(0..4) != Some(MQRFH_STRUC_ID.as_slice()) {
            return Interface {
                reason: format!(
                    "RFH2 StrucId is not MQRFH_STRUC_ID: {:?}",
                    String::from_utf8_lossy(&buf[..buf.len().min(4)])
                ),
            }
            .fail();
        }

        if buf.len() < MQRFH_STRUC_LENGTH_FIXED_2 {
            return Interface {
                reason: format!(
                    "RFH2 buffer too short: expected at least {} bytes, got {}",
                    MQRFH_STRUC_LENGTH_FIXED_2,
                    buf.len()
                ),
            }
            .fail();
        }

        let byte_order = match encoding {
            Some(encoding) if is_big_endian_encoding(encoding) => ByteOrder::Big,
            Some(_) => ByteOrder::Little,
            None if buf[4] == 0 => ByteOrder::Big,
            None => ByteOrder::Little,
        };
        let layout = Layout::packed(byte_order);

        let mut rfh2 = Rfh2::default();
        super::unpack(&mut rfh2, &buf[..MQRFH_STRUC_LENGTH_FIXED_2], layout)?;

        if rfh2.struc_length < 0 {
            return Interface {
                reason: "RFH2 StrucLength is negative, check the numeric encoding",
            }
            .fail();
        }

        let struc_length = rfh2.struc_length as usize;
        if buf.len() > MQRFH_STRUC_LENGTH_FIXED_2 && struc_length > buf.len() {
            return Interface {
                reason: format!(
                    "RFH2 buffer too short: StrucLength is {} but the buffer holds {} bytes",
                    struc_length,
                    buf.len()
                ),
            }
            .fail();
        }

        let end = struc_length.min(buf.len());
        let mut rest = buf.get(MQRFH_STRUC_LENGTH_FIXED_2..end).unwrap_or_default();
        while !rest.is_empty() {
            if rest.len() < 4 {
                return Interface {
                    reason: "RFH2 folder length is truncated",
                }
                .fail();
            }
            let (length_bytes, tail) = rest.split_at(4);
            let length_bytes = [length_bytes[0], length_bytes[1], length_bytes[2], length_bytes[3]];
            let length = match byte_order {
                ByteOrder::Big => i32::from_be_bytes(length_bytes),
                ByteOrder::Little => i32::from_le_bytes(length_bytes),
            };
            if length < 0 || length as usize > tail.len() {
                return InvalidLength {
                    what: "RFH2 folder",
                    length: i64::from(length),
                }
                .fail();
            }

            let (data, tail) = tail.split_at(length as usize);
            rfh2.folders.push(Folder {
                name: root_element(data)?,
                length,
                data: data.to_vec(),
            });
            rest = tail;
        }

        Ok(rfh2)
    }
}

impl MqStructure for Rfh2 {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.long("StrucLength", &mut self.struc_length);
        v.long("Encoding", &mut self.encoding);
        v.long("CodedCharSetId", &mut self.coded_char_set_id);
        v.chars("Format", &mut self.format);
        v.long("Flags", &mut self.flags);
        v.long("NameValueCCSID", &mut self.name_value_ccsid);

        for folder in &mut self.folders {
            v.long("FolderLength", &mut folder.length);
            v.chars("Folder", &mut folder.data);
        }
    }
}

impl std::fmt::Display for Rfh2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        super::write_fields(self, f)
    }
}

fn is_big_endian_encoding(encoding: i32) -> bool {
    ByteOrder::from_encoding(encoding) == ByteOrder::Big
}

fn to_mqlong(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        InvalidLength {
            what: "RFH2",
            length: i64::try_from(len).unwrap_or(i64::MAX),
        }
        .build()
    })
}

/// Checks that `data` is a single well-formed XML element and returns its name.
fn root_element(data: &[u8]) -> Result<String> {
    let malformed = |detail: String| {
        Interface {
            reason: format!("RFH2 XML folder is not well formed: {}", detail),
        }
        .build()
    };

    let mut reader = Reader::from_reader(data);
    reader.check_end_names(true).trim_text(true);

    let mut buf = Vec::new();
    let mut root = None;
    let mut depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if depth == 0 && root.is_some() {
                    return Err(malformed("multiple root elements".to_string()));
                }
                if depth == 0 {
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err(malformed("multiple root elements".to_string()));
                    }
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(_)) | Ok(Event::CData(_)) if depth == 0 => {
                return Err(malformed("text outside of the root element".to_string()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e.to_string())),
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed("unclosed element".to_string()));
    }
    root.ok_or_else(|| malformed("no root element".to_string()))
}
