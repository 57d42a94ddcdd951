use super::{FieldVisitor, MqStructure};
use crate::{constants::cmqc::*, layout::MqLevel};

/// Get message options (`MQGMO`).
///
/// The message handle fields only exist from MQ 7.0.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetMessageOptions {
    level: MqLevel,
    pub struc_id: [u8; 4],
    pub version: i32,
    pub options: i32,
    pub wait_interval: i32,
    pub signal1: i32,
    pub signal2: i32,
    pub resolved_q_name: [u8; 48],
    pub match_options: i32,
    pub group_status: u8,
    pub segment_status: u8,
    pub segmentation: u8,
    pub reserved1: u8,
    pub msg_token: [u8; 16],
    pub returned_length: i32,
    pub reserved2: i32,
    pub msg_handle: i64,
}

impl GetMessageOptions {
    pub fn new(level: MqLevel) -> Self {
        Self {
            level,
            struc_id: *MQGMO_STRUC_ID,
            version: MQGMO_VERSION_1,
            options: MQGMO_NO_WAIT,
            wait_interval: 0,
            signal1: 0,
            signal2: 0,
            resolved_q_name: [0; 48],
            match_options: MQMO_MATCH_MSG_ID | MQMO_MATCH_CORREL_ID,
            group_status: MQGS_NOT_IN_GROUP,
            segment_status: MQSS_NOT_A_SEGMENT,
            segmentation: MQSEG_INHIBITED,
            reserved1: b' ',
            msg_token: [0; 16],
            returned_length: MQRL_UNDEFINED,
            reserved2: 0,
            msg_handle: 0,
        }
    }

    pub fn level(&self) -> MqLevel {
        self.level
    }
}

impl Default for GetMessageOptions {
    fn default() -> Self {
        Self::new(MqLevel::default())
    }
}

impl MqStructure for GetMessageOptions {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.long("Options", &mut self.options);
        v.long("WaitInterval", &mut self.wait_interval);
        v.long("Signal1", &mut self.signal1);
        v.long("Signal2", &mut self.signal2);
        v.chars("ResolvedQName", &mut self.resolved_q_name);
        v.long("MatchOptions", &mut self.match_options);
        v.byte("GroupStatus", &mut self.group_status);
        v.byte("SegmentStatus", &mut self.segment_status);
        v.byte("Segmentation", &mut self.segmentation);
        v.byte("Reserved1", &mut self.reserved1);
        v.chars("MsgToken", &mut self.msg_token);
        v.long("ReturnedLength", &mut self.returned_length);

        if self.level >= MqLevel::V7_0 {
            v.long("Reserved2", &mut self.reserved2);
            v.int64("MsgHandle", &mut self.msg_handle);
        }
    }
}
