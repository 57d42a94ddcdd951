use super::{FieldVisitor, MqStructure};
use crate::constants::cmqc::*;

/// Message descriptor (`MQMD`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageDescriptor {
    pub struc_id: [u8; 4],
    pub version: i32,
    pub report: i32,
    pub msg_type: i32,
    pub expiry: i32,
    pub feedback: i32,
    pub encoding: i32,
    pub coded_char_set_id: i32,
    pub format: [u8; 8],
    pub priority: i32,
    pub persistence: i32,
    pub msg_id: [u8; 24],
    pub correl_id: [u8; 24],
    pub backout_count: i32,
    pub reply_to_q: [u8; 48],
    pub reply_to_q_mgr: [u8; 48],
    pub user_identifier: [u8; 12],
    pub accounting_token: [u8; 32],
    pub appl_identity_data: [u8; 32],
    pub put_appl_type: i32,
    pub put_appl_name: [u8; 28],
    pub put_date: [u8; 8],
    pub put_time: [u8; 8],
    pub appl_origin_data: [u8; 4],
    pub group_id: [u8; 24],
    pub msg_seq_number: i32,
    pub offset: i32,
    pub msg_flags: i32,
    pub original_length: i32,
}

impl Default for MessageDescriptor {
    fn default() -> Self {
        Self {
            struc_id: *MQMD_STRUC_ID,
            version: MQMD_VERSION_1,
            report: MQRO_NONE,
            msg_type: MQMT_DATAGRAM,
            expiry: MQEI_UNLIMITED,
            feedback: MQFB_NONE,
            encoding: MQENC_NATIVE,
            coded_char_set_id: MQCCSI_Q_MGR,
            format: [0; 8],
            priority: MQPRI_PRIORITY_AS_Q_DEF,
            persistence: MQPER_PERSISTENCE_AS_Q_DEF,
            msg_id: [0; 24],
            correl_id: [0; 24],
            backout_count: 0,
            reply_to_q: [0; 48],
            reply_to_q_mgr: [0; 48],
            user_identifier: [0; 12],
            accounting_token: [0; 32],
            appl_identity_data: [0; 32],
            put_appl_type: MQAT_NO_CONTEXT,
            put_appl_name: [0; 28],
            put_date: [0; 8],
            put_time: [0; 8],
            appl_origin_data: [0; 4],
            group_id: [0; 24],
            msg_seq_number: 1,
            offset: 0,
            msg_flags: MQMF_NONE,
            original_length: MQOL_UNDEFINED,
        }
    }
}

impl MqStructure for MessageDescriptor {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.long("Report", &mut self.report);
        v.long("MsgType", &mut self.msg_type);
        v.long("Expiry", &mut self.expiry);
        v.long("Feedback", &mut self.feedback);
        v.long("Encoding", &mut self.encoding);
        v.long("CodedCharSetId", &mut self.coded_char_set_id);
        v.chars("Format", &mut self.format);
        v.long("Priority", &mut self.priority);
        v.long("Persistence", &mut self.persistence);
        v.chars("MsgId", &mut self.msg_id);
        v.chars("CorrelId", &mut self.correl_id);
        v.long("BackoutCount", &mut self.backout_count);
        v.chars("ReplyToQ", &mut self.reply_to_q);
        v.chars("ReplyToQMgr", &mut self.reply_to_q_mgr);
        v.chars("UserIdentifier", &mut self.user_identifier);
        v.chars("AccountingToken", &mut self.accounting_token);
        v.chars("ApplIdentityData", &mut self.appl_identity_data);
        v.long("PutApplType", &mut self.put_appl_type);
        v.chars("PutApplName", &mut self.put_appl_name);
        v.chars("PutDate", &mut self.put_date);
        v.chars("PutTime", &mut self.put_time);
        v.chars("ApplOriginData", &mut self.appl_origin_data);
        v.chars("GroupId", &mut self.group_id);
        v.long("MsgSeqNumber", &mut self.msg_seq_number);
        v.long("Offset", &mut self.offset);
        v.long("MsgFlags", &mut self.msg_flags);
        v.long("OriginalLength", &mut self.original_length);
    }
}
