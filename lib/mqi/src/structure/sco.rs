use super::{FieldVisitor, MqStructure};
use crate::{constants::cmqc::*, layout::MqLevel};

/// SSL configuration options (`MQSCO`).
///
/// Both the `Version` and the field list follow the client level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SslConfigurationOptions {
    level: MqLevel,
    pub struc_id: [u8; 4],
    pub version: i32,
    pub key_repository: [u8; 256],
    pub crypto_hardware: [u8; 256],
    pub auth_info_rec_count: i32,
    pub auth_info_rec_offset: i32,
    pub auth_info_rec_ptr: u64,
    pub key_reset_count: i32,
    pub fips_required: i32,
    pub encryption_policy_suite_b: [i32; 4],
    pub certificate_val_policy: i32,
    pub certificate_label: [u8; 64],
}

impl SslConfigurationOptions {
    pub fn new(level: MqLevel) -> Self {
        let version = match level {
            MqLevel::V8_0 => MQSCO_VERSION_5,
            MqLevel::V7_1 => MQSCO_VERSION_4,
            MqLevel::V7_0 => MQSCO_VERSION_3,
            MqLevel::V6_0 => MQSCO_VERSION_2,
            MqLevel::V5 => MQSCO_VERSION_1,
        };

        Self {
            level,
            struc_id: *MQSCO_STRUC_ID,
            version,
            key_repository: [0; 256],
            crypto_hardware: [0; 256],
            auth_info_rec_count: 0,
            auth_info_rec_offset: 0,
            auth_info_rec_ptr: 0,
            key_reset_count: 0,
            fips_required: 0,
            encryption_policy_suite_b: [1, 0, 0, 0],
            certificate_val_policy: 0,
            certificate_label: [0; 64],
        }
    }
}

impl Default for SslConfigurationOptions {
    fn default() -> Self {
        Self::new(MqLevel::default())
    }
}

impl MqStructure for SslConfigurationOptions {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("StrucId", &mut self.struc_id);
        v.long("Version", &mut self.version);
        v.chars("KeyRepository", &mut self.key_repository);
        v.chars("CryptoHardware", &mut self.crypto_hardware);
        v.long("AuthInfoRecCount", &mut self.auth_info_rec_count);
        v.long("AuthInfoRecOffset", &mut self.auth_info_rec_offset);
        v.pointer("AuthInfoRecPtr", &mut self.auth_info_rec_ptr);

        if self.level >= MqLevel::V6_0 {
            v.long("KeyResetCount", &mut self.key_reset_count);
            v.long("FipsRequired", &mut self.fips_required);
        }
        if self.level >= MqLevel::V7_0 {
            v.longs("EncryptionPolicySuiteB", &mut self.encryption_policy_suite_b);
        }
        if self.level >= MqLevel::V7_1 {
            v.long("CertificateValPolicy", &mut self.certificate_val_policy);
        }
        if self.level >= MqLevel::V8_0 {
            v.chars("CertificateLabel", &mut self.certificate_label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout::Layout, structure::length};

    #[test]
    fn version_follows_level() {
        let versions: Vec<i32> = MqLevel::ALL
            .iter()
            .map(|level| SslConfigurationOptions::new(*level).version)
            .collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn lengths_grow_with_level() {
        let layout = Layout::native().with_pointer_width(8);
        let lengths: Vec<usize> = MqLevel::ALL
            .iter()
            .map(|level| length(&SslConfigurationOptions::new(*level), layout))
            .collect();
        assert_eq!(lengths, vec![536, 544, 560, 564, 628]);
    }
}
