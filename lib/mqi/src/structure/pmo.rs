use super::{FieldVisitor, MqStructure};
use crate::{constants::cmqc::*, layout::MqLevel};

/// Put message options (`MQPMO`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PutMessageOptions {
    level: MqLevel,
    pub struc_id: [u8; 4],
    pub version: i32,
    pub options: i32,
    pub timeout: i32,
    pub context: i32,
    pub known_dest_count: i32,
    pub unknown_dest_count: i32,
    pub invalid_dest_count: i32,
    pub resolved_q_name: [u8; 48],
    pub resolved_q_mgr_name: [u8; 48],
    pub recs_present: i32,
    pub put_msg_rec_fields: i32,
    pub put_msg_rec_offset: i32,
    pub response_rec_offset: i32,
    pub put_msg_rec_ptr: u64,
    pub response_rec_ptr: u64,
    pub original_msg_handle: i64,
    pub new_msg_handle: i64,
    pub action: i32,
    pub pub_level: i32,
}

impl PutMessageOptions {
    pub fn new(level: MqLevel) -> Self {
        Self {
            level,
            struc_id: *MQPMO_STRUC_ID,
            version: MQPMO_VERSION_1,
            options: MQPMO_NONE,
            timeout: -1,
            context: 0,
            known_dest_count: 0,
            unknown_dest_count: 0,
            invalid_dest_count: 0,
            resolved_q_name: [0; 48],
            resolved_q_mgr_name: [0; 48],
            recs_present: 0,
            put_msg_rec_fields: 0,
            put_msg_rec_offset: 0,
            response_rec_offset: 0,
            put_msg_rec_ptr: 0,
            response_rec_ptr: 0,
            original_msg_handle: 0,
            new_msg_handle: 0,
            action: 0,
            pub_level: 0,
        }
    }
}

impl Default for PutMessageOptions {
    fn default() -> Self {
        Self::new(MqLevel::default())
    }
}

impl MqStructure for PutMessageOptions {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.long("Options", &mut self.options);
        v.long("Timeout", &mut self.timeout);
        v.long("Context", &mut self.context);
        v.long("KnownDestCount", &mut self.known_dest_count);
        v.long("UnknownDestCount", &mut self.unknown_dest_count);
        v.long("InvalidDestCount", &mut self.invalid_dest_count);
        v.chars("ResolvedQName", &mut self.resolved_q_name);
        v.chars("ResolvedQMgrName", &mut self.resolved_q_mgr_name);
        v.long("RecsPresent", &mut self.recs_present);
        v.long("PutMsgRecFields", &mut self.put_msg_rec_fields);
        v.long("PutMsgRecOffset", &mut self.put_msg_rec_offset);
        v.long("ResponseRecOffset", &mut self.response_rec_offset);
        v.pointer("PutMsgRecPtr", &mut self.put_msg_rec_ptr);
        v.pointer("ResponseRecPtr", &mut self.response_rec_ptr);

        if self.level >= MqLevel::V7_0 {
            v.int64("OriginalMsgHandle", &mut self.original_msg_handle);
            v.int64("NewMsgHandle", &mut self.new_msg_handle);
            v.long("Action", &mut self.action);
            v.long("PubLevel", &mut self.pub_level);
        }
    }
}
