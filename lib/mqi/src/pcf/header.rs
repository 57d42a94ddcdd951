use crate::{
    constants::{cmqc::MQCC_OK, cmqcfc::*},
    error::{MqiError, Result, Truncated},
    layout::Layout,
    structure::{unpack, FieldVisitor, MqStructure},
};

/// PCF header (`MQCFH`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandHeader {
    pub type_: i32,
    pub struc_length: i32,
    pub version: i32,
    pub command: i32,
    pub msg_seq_number: i32,
    pub control: i32,
    pub comp_code: i32,
    pub reason: i32,
    pub parameter_count: i32,
}

impl Default for CommandHeader {
    fn default() -> Self {
        Self {
            type_: MQCFT_COMMAND,
            struc_length: MQCFH_STRUC_LENGTH as i32,
            version: MQCFH_VERSION_1,
            command: MQCMD_NONE,
            msg_seq_number: 1,
            control: MQCFC_LAST,
            comp_code: MQCC_OK,
            reason: 0,
            parameter_count: 0,
        }
    }
}

impl CommandHeader {
    /// Header for an extended command message.
    pub fn command(command: i32, parameter_count: i32) -> Self {
        Self {
            type_: MQCFT_COMMAND_XR,
            version: MQCFH_VERSION_3,
            command,
            parameter_count,
            ..Self::default()
        }
    }

    /// Reads the header at the start of a PCF message.
    pub fn decode(buf: &[u8], layout: Layout) -> Result<Self> {
        if buf.len() < MQCFH_STRUC_LENGTH {
            return Truncated {
                needed: MQCFH_STRUC_LENGTH,
                remaining: buf.len(),
            }
            .fail();
        }

        let mut header = Self::default();
        unpack(&mut header, &buf[..MQCFH_STRUC_LENGTH], layout)?;
        Ok(header)
    }

    /// Returns `true` if this is the last message of a response.
    pub fn is_last(&self) -> bool {
        self.control == MQCFC_LAST
    }

    /// Fails with the header's completion and reason codes if the command did not succeed.
    pub fn check_completion(&self) -> Result<(), MqiError> {
        if self.comp_code == MQCC_OK {
            Ok(())
        } else {
            Err(MqiError::new(self.comp_code, self.reason))
        }
    }
}

impl MqStructure for CommandHeader {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.long("Type", &mut self.type_);
        v.long("StrucLength", &mut self.struc_length);
        v.long("Version", &mut self.version);
        v.long("Command", &mut self.command);
        v.long("MsgSeqNumber", &mut self.msg_seq_number);
        v.long("Control", &mut self.control);
        v.long("CompCode", &mut self.comp_code);
        v.long("Reason", &mut self.reason);
        v.long("ParameterCount", &mut self.parameter_count);
    }
}
