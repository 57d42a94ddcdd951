use super::{FieldVisitor, MqStructure, VarString};
use crate::{constants::cmqc::*, layout::MqLevel};

/// Object descriptor (`MQOD`).
///
/// From MQ 7.0 the descriptor carries three variable-length strings and the resolved object type. On 64-bit hosts the
/// 7.0 layout ends with four bytes of padding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectDescriptor {
    level: MqLevel,
    pub struc_id: [u8; 4],
    pub version: i32,
    pub object_type: i32,
    pub object_name: [u8; 48],
    pub object_q_mgr_name: [u8; 48],
    pub dynamic_q_name: [u8; 48],
    pub alternate_user_id: [u8; 12],
    pub recs_present: i32,
    pub known_dest_count: i32,
    pub unknown_dest_count: i32,
    pub invalid_dest_count: i32,
    pub object_rec_offset: i32,
    pub response_rec_offset: i32,
    pub object_rec_ptr: u64,
    pub response_rec_ptr: u64,
    pub alternate_security_id: [u8; 40],
    pub resolved_q_name: [u8; 48],
    pub resolved_q_mgr_name: [u8; 48],
    pub object_string: VarString,
    pub selection_string: VarString,
    pub res_object_string: VarString,
    pub resolved_type: i32,
    pad: [u8; 4],
}

impl ObjectDescriptor {
    pub fn new(level: MqLevel) -> Self {
        Self {
            level,
            struc_id: *MQOD_STRUC_ID,
            version: MQOD_VERSION_1,
            object_type: MQOT_Q,
            object_name: [0; 48],
            object_q_mgr_name: [0; 48],
            dynamic_q_name: super::fixed_chars("AMQ.*"),
            alternate_user_id: [0; 12],
            recs_present: 0,
            known_dest_count: 0,
            unknown_dest_count: 0,
            invalid_dest_count: 0,
            object_rec_offset: 0,
            response_rec_offset: 0,
            object_rec_ptr: 0,
            response_rec_ptr: 0,
            alternate_security_id: [0; 40],
            resolved_q_name: [0; 48],
            resolved_q_mgr_name: [0; 48],
            object_string: VarString::default(),
            selection_string: VarString::default(),
            res_object_string: VarString::default(),
            resolved_type: -3,
            pad: [0; 4],
        }
    }

    /// Descriptor for a queue with the given name.
    pub fn queue(level: MqLevel, name: &str) -> Self {
        Self {
            object_name: super::fixed_chars(name),
            ..Self::new(level)
        }
    }

    /// Descriptor for a queue manager.
    pub fn queue_manager(level: MqLevel, name: &str) -> Self {
        Self {
            object_type: MQOT_Q_MGR,
            object_q_mgr_name: super::fixed_chars(name),
            ..Self::new(level)
        }
    }
}

impl Default for ObjectDescriptor {
    fn default() -> Self {
        Self::new(MqLevel::default())
    }
}

impl MqStructure for ObjectDescriptor {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.long("ObjectType", &mut self.object_type);
        v.chars("ObjectName", &mut self.object_name);
        v.chars("ObjectQMgrName", &mut self.object_q_mgr_name);
        v.chars("DynamicQName", &mut self.dynamic_q_name);
        v.chars("AlternateUserId", &mut self.alternate_user_id);
        v.long("RecsPresent", &mut self.recs_present);
        v.long("KnownDestCount", &mut self.known_dest_count);
        v.long("UnknownDestCount", &mut self.unknown_dest_count);
        v.long("InvalidDestCount", &mut self.invalid_dest_count);
        v.long("ObjectRecOffset", &mut self.object_rec_offset);
        v.long("ResponseRecOffset", &mut self.response_rec_offset);
        v.pointer("ObjectRecPtr", &mut self.object_rec_ptr);
        v.pointer("ResponseRecPtr", &mut self.response_rec_ptr);
        v.chars("AlternateSecurityId", &mut self.alternate_security_id);
        v.chars("ResolvedQName", &mut self.resolved_q_name);
        v.chars("ResolvedQMgrName", &mut self.resolved_q_mgr_name);

        if self.level >= MqLevel::V7_0 {
            self.object_string.visit(
                v,
                [
                    "ObjectStringVSPtr",
                    "ObjectStringVSOffset",
                    "ObjectStringVSBufSize",
                    "ObjectStringVSLength",
                    "ObjectStringVSCCSID",
                ],
            );
            self.selection_string.visit(
                v,
                [
                    "SelectionStringVSPtr",
                    "SelectionStringVSOffset",
                    "SelectionStringVSBufSize",
                    "SelectionStringVSLength",
                    "SelectionStringVSCCSID",
                ],
            );
            self.res_object_string.visit(
                v,
                [
                    "ResObjectStringVSPtr",
                    "ResObjectStringVSOffset",
                    "ResObjectStringVSBufSize",
                    "ResObjectStringVSLength",
                    "ResObjectStringVSCCSID",
                ],
            );
            v.long("ResolvedType", &mut self.resolved_type);

            if v.pointer_width() == 8 {
                v.chars("pad", &mut self.pad);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::Layout,
        structure::{length, pack, trim_chars, unpack},
    };

    #[test]
    fn version_gated_fields() {
        let layout = Layout::native().with_pointer_width(8);
        let v6 = length(&ObjectDescriptor::new(MqLevel::V6_0), layout);
        let v7 = length(&ObjectDescriptor::new(MqLevel::V7_0), layout);
        assert_eq!(v6, 344);
        assert_eq!(v7, v6 + 3 * 24 + 4 + 4);
    }

    #[test]
    fn object_string_round_trip() {
        let layout = Layout::native();
        let mut od = ObjectDescriptor::queue(MqLevel::V8_0, "APP.QUEUE");
        od.object_string.set("APP.TOPIC");
        od.object_string.ccsid = 1208;

        let mut decoded = ObjectDescriptor::new(MqLevel::V8_0);
        unpack(&mut decoded, &pack(&od, layout), layout).expect("should unpack");
        assert_eq!(trim_chars(&decoded.object_name), "APP.QUEUE");
        assert_eq!(decoded.object_string.length(), 9);
        assert_eq!(decoded.object_string.address(), od.object_string.address());
        assert_eq!(decoded.object_string.ccsid, 1208);
        assert_eq!(decoded.resolved_type, -3);
    }
}
