use super::{fixed_chars, FieldVisitor, MqStructure};
use crate::{
    constants::{cmqc::*, cmqxc::MQCD_VERSION_6},
    layout::{Layout, MqLevel},
};

/// Channel definition (`MQCD`), as used for client connections.
///
/// The field list covers channel definition versions 1 through 11; `version` tells the queue manager how much of it to
/// read. Client libraries older than 7.1 on 64-bit hosts expect four trailing bytes of padding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelDefinition {
    level: MqLevel,
    pub channel_name: [u8; 20],
    pub version: i32,
    pub channel_type: i32,
    pub transport_type: i32,
    pub desc: [u8; 64],
    pub q_mgr_name: [u8; 48],
    pub xmit_q_name: [u8; 48],
    pub short_connection_name: [u8; 20],
    pub mca_name: [u8; 20],
    pub mode_name: [u8; 8],
    pub tp_name: [u8; 64],
    pub batch_size: i32,
    pub disc_interval: i32,
    pub short_retry_count: i32,
    pub short_retry_interval: i32,
    pub long_retry_count: i32,
    pub long_retry_interval: i32,
    pub security_exit: [u8; 128],
    pub msg_exit: [u8; 128],
    pub send_exit: [u8; 128],
    pub receive_exit: [u8; 128],
    pub seq_number_wrap: i32,
    pub max_msg_length: i32,
    pub put_authority: i32,
    pub data_conversion: i32,
    pub security_user_data: [u8; 32],
    pub msg_user_data: [u8; 32],
    pub send_user_data: [u8; 32],
    pub receive_user_data: [u8; 32],
    pub user_identifier: [u8; 12],
    pub password: [u8; 12],
    pub mca_user_identifier: [u8; 12],
    pub mca_type: i32,
    pub connection_name: [u8; 264],
    pub remote_user_identifier: [u8; 12],
    pub remote_password: [u8; 12],
    pub msg_retry_exit: [u8; 128],
    pub msg_retry_user_data: [u8; 32],
    pub msg_retry_count: i32,
    pub msg_retry_interval: i32,
    pub heartbeat_interval: i32,
    pub batch_interval: i32,
    pub non_persistent_msg_speed: i32,
    pub struc_length: i32,
    pub exit_name_length: i32,
    pub exit_data_length: i32,
    pub msg_exits_defined: i32,
    pub send_exits_defined: i32,
    pub receive_exits_defined: i32,
    pub msg_exit_ptr: u64,
    pub msg_user_data_ptr: u64,
    pub send_exit_ptr: u64,
    pub send_user_data_ptr: u64,
    pub receive_exit_ptr: u64,
    pub receive_user_data_ptr: u64,
    pub cluster_ptr: u64,
    pub clusters_defined: i32,
    pub network_priority: i32,
    pub long_mca_user_id_length: i32,
    pub long_remote_user_id_length: i32,
    pub long_mca_user_id_ptr: u64,
    pub long_remote_user_id_ptr: u64,
    pub mca_security_id: [u8; 40],
    pub remote_security_id: [u8; 40],
    pub ssl_cipher_spec: [u8; 32],
    pub ssl_peer_name_ptr: u64,
    pub ssl_peer_name_length: i32,
    pub ssl_client_auth: i32,
    pub keep_alive_interval: i32,
    pub local_address: [u8; 48],
    pub batch_heartbeat: i32,
    pub hdr_comp_list: [i32; 2],
    pub msg_comp_list: [i32; 16],
    pub clwl_channel_rank: i32,
    pub clwl_channel_priority: i32,
    pub clwl_channel_weight: i32,
    pub channel_monitoring: i32,
    pub channel_statistics: i32,
    pub sharing_conversations: i32,
    pub property_control: i32,
    pub max_instances: i32,
    pub max_instances_per_client: i32,
    pub client_channel_weight: i32,
    pub connection_affinity: i32,
    pub batch_data_limit: i32,
    pub use_dlq: i32,
    pub def_reconnect: i32,
    pub certificate_label: [u8; 64],
    pub spl_protection: i32,
    pad: [u8; 4],
}

impl ChannelDefinition {
    pub fn new(level: MqLevel) -> Self {
        let mut msg_comp_list = [-1; 16];
        msg_comp_list[0] = 0;

        let mut cd = Self {
            level,
            channel_name: [0; 20],
            version: MQCD_VERSION_6,
            channel_type: MQCHT_CLNTCONN,
            transport_type: MQXPT_TCP,
            desc: [0; 64],
            q_mgr_name: [0; 48],
            xmit_q_name: [0; 48],
            short_connection_name: [0; 20],
            mca_name: [0; 20],
            mode_name: [0; 8],
            tp_name: [0; 64],
            batch_size: 50,
            disc_interval: 6000,
            short_retry_count: 10,
            short_retry_interval: 60,
            long_retry_count: 999_999_999,
            long_retry_interval: 1200,
            security_exit: [0; 128],
            msg_exit: [0; 128],
            send_exit: [0; 128],
            receive_exit: [0; 128],
            seq_number_wrap: 999_999_999,
            max_msg_length: 4_194_304,
            put_authority: MQPA_DEFAULT,
            data_conversion: MQCDC_NO_SENDER_CONVERSION,
            security_user_data: [0; 32],
            msg_user_data: [0; 32],
            send_user_data: [0; 32],
            receive_user_data: [0; 32],
            user_identifier: [0; 12],
            password: [0; 12],
            mca_user_identifier: [0; 12],
            mca_type: MQMCAT_PROCESS,
            connection_name: [0; 264],
            remote_user_identifier: [0; 12],
            remote_password: [0; 12],
            msg_retry_exit: [0; 128],
            msg_retry_user_data: [0; 32],
            msg_retry_count: 10,
            msg_retry_interval: 1000,
            heartbeat_interval: 300,
            batch_interval: 0,
            non_persistent_msg_speed: MQNPMS_FAST,
            struc_length: 0,
            exit_name_length: MQ_EXIT_NAME_LENGTH,
            exit_data_length: MQ_EXIT_DATA_LENGTH,
            msg_exits_defined: 0,
            send_exits_defined: 0,
            receive_exits_defined: 0,
            msg_exit_ptr: 0,
            msg_user_data_ptr: 0,
            send_exit_ptr: 0,
            send_user_data_ptr: 0,
            receive_exit_ptr: 0,
            receive_user_data_ptr: 0,
            cluster_ptr: 0,
            clusters_defined: 0,
            network_priority: 0,
            long_mca_user_id_length: 0,
            long_remote_user_id_length: 0,
            long_mca_user_id_ptr: 0,
            long_remote_user_id_ptr: 0,
            mca_security_id: [0; 40],
            remote_security_id: [0; 40],
            ssl_cipher_spec: [0; 32],
            ssl_peer_name_ptr: 0,
            ssl_peer_name_length: 0,
            ssl_client_auth: 0,
            keep_alive_interval: -1,
            local_address: [0; 48],
            batch_heartbeat: 0,
            hdr_comp_list: [0, -1],
            msg_comp_list,
            clwl_channel_rank: 0,
            clwl_channel_priority: 0,
            clwl_channel_weight: 50,
            channel_monitoring: 0,
            channel_statistics: 0,
            sharing_conversations: 10,
            property_control: 0,
            max_instances: 999_999_999,
            max_instances_per_client: 999_999_999,
            client_channel_weight: 0,
            connection_affinity: 1,
            batch_data_limit: 5000,
            use_dlq: 2,
            def_reconnect: 0,
            certificate_label: [0; 64],
            spl_protection: 0,
            pad: [0; 4],
        };
        cd.struc_length = i32::try_from(super::length(&cd, Layout::native())).unwrap_or(i32::MAX);
        cd
    }

    /// Client connection definition for the given channel and connection name.
    pub fn client(level: MqLevel, channel_name: &str, connection_name: &str) -> Self {
        Self {
            channel_name: fixed_chars(channel_name),
            connection_name: fixed_chars(connection_name),
            ..Self::new(level)
        }
    }
}

impl Default for ChannelDefinition {
    fn default() -> Self {
        Self::new(MqLevel::default())
    }
}

impl MqStructure for ChannelDefinition {
    fn visit_fields<V: FieldVisitor>(&mut self, v: &mut V) {
        v.chars("ChannelName", &mut self.channel_name);
        v.long("Version", &mut self.version);
        v.long("ChannelType", &mut self.channel_type);
        v.long("TransportType", &mut self.transport_type);
        v.chars("Desc", &mut self.desc);
        v.chars("QMgrName", &mut self.q_mgr_name);
        v.chars("XmitQName", &mut self.xmit_q_name);
        v.chars("ShortConnectionName", &mut self.short_connection_name);
        v.chars("MCAName", &mut self.mca_name);
        v.chars("ModeName", &mut self.mode_name);
        v.chars("TpName", &mut self.tp_name);
        v.long("BatchSize", &mut self.batch_size);
        v.long("DiscInterval", &mut self.disc_interval);
        v.long("ShortRetryCount", &mut self.short_retry_count);
        v.long("ShortRetryInterval", &mut self.short_retry_interval);
        v.long("LongRetryCount", &mut self.long_retry_count);
        v.long("LongRetryInterval", &mut self.long_retry_interval);
        v.chars("SecurityExit", &mut self.security_exit);
        v.chars("MsgExit", &mut self.msg_exit);
        v.chars("SendExit", &mut self.send_exit);
        v.chars("ReceiveExit", &mut self.receive_exit);
        v.long("SeqNumberWrap", &mut self.seq_number_wrap);
        v.long("MaxMsgLength", &mut self.max_msg_length);
        v.long("PutAuthority", &mut self.put_authority);
        v.long("DataConversion", &mut self.data_conversion);
        v.chars("SecurityUserData", &mut self.security_user_data);
        v.chars("MsgUserData", &mut self.msg_user_data);
        v.chars("SendUserData", &mut self.send_user_data);
        v.chars("ReceiveUserData", &mut self.receive_user_data);

        // Version 1.
        v.chars("UserIdentifier", &mut self.user_identifier);
        v.chars("Password", &mut self.password);
        v.chars("MCAUserIdentifier", &mut self.mca_user_identifier);
        v.long("MCAType", &mut self.mca_type);
        v.chars("ConnectionName", &mut self.connection_name);
        v.chars("RemoteUserIdentifier", &mut self.remote_user_identifier);
        v.chars("RemotePassword", &mut self.remote_password);

        // Version 2.
        v.chars("MsgRetryExit", &mut self.msg_retry_exit);
        v.chars("MsgRetryUserData", &mut self.msg_retry_user_data);
        v.long("MsgRetryCount", &mut self.msg_retry_count);
        v.long("MsgRetryInterval", &mut self.msg_retry_interval);

        // Version 3.
        v.long("HeartbeatInterval", &mut self.heartbeat_interval);
        v.long("BatchInterval", &mut self.batch_interval);
        v.long("NonPersistentMsgSpeed", &mut self.non_persistent_msg_speed);
        v.long("StrucLength", &mut self.struc_length);
        v.long("ExitNameLength", &mut self.exit_name_length);
        v.long("ExitDataLength", &mut self.exit_data_length);
        v.long("MsgExitsDefined", &mut self.msg_exits_defined);
        v.long("SendExitsDefined", &mut self.send_exits_defined);
        v.long("ReceiveExitsDefined", &mut self.receive_exits_defined);
        v.pointer("MsgExitPtr", &mut self.msg_exit_ptr);
        v.pointer("MsgUserDataPtr", &mut self.msg_user_data_ptr);
        v.pointer("SendExitPtr", &mut self.send_exit_ptr);
        v.pointer("SendUserDataPtr", &mut self.send_user_data_ptr);
        v.pointer("ReceiveExitPtr", &mut self.receive_exit_ptr);
        v.pointer("ReceiveUserDataPtr", &mut self.receive_user_data_ptr);

        // Version 4.
        v.pointer("ClusterPtr", &mut self.cluster_ptr);
        v.long("ClustersDefined", &mut self.clusters_defined);
        v.long("NetworkPriority", &mut self.network_priority);
        v.long("LongMCAUserIdLength", &mut self.long_mca_user_id_length);
        v.long("LongRemoteUserIdLength", &mut self.long_remote_user_id_length);

        // Version 5.
        v.pointer("LongMCAUserIdPtr", &mut self.long_mca_user_id_ptr);
        v.pointer("LongRemoteUserIdPtr", &mut self.long_remote_user_id_ptr);
        v.chars("MCASecurityId", &mut self.mca_security_id);
        v.chars("RemoteSecurityId", &mut self.remote_security_id);

        // Version 6.
        v.chars("SSLCipherSpec", &mut self.ssl_cipher_spec);
        v.pointer("SSLPeerNamePtr", &mut self.ssl_peer_name_ptr);
        v.long("SSLPeerNameLength", &mut self.ssl_peer_name_length);
        v.long("SSLClientAuth", &mut self.ssl_client_auth);
        v.long("KeepAliveInterval", &mut self.keep_alive_interval);
        v.chars("LocalAddress", &mut self.local_address);
        v.long("BatchHeartbeat", &mut self.batch_heartbeat);

        // Version 7.
        v.longs("HdrCompList", &mut self.hdr_comp_list);
        v.longs("MsgCompList", &mut self.msg_comp_list);
        v.long("CLWLChannelRank", &mut self.clwl_channel_rank);
        v.long("CLWLChannelPriority", &mut self.clwl_channel_priority);
        v.long("CLWLChannelWeight", &mut self.clwl_channel_weight);
        v.long("ChannelMonitoring", &mut self.channel_monitoring);
        v.long("ChannelStatistics", &mut self.channel_statistics);

        // Version 8.
        v.long("SharingConversations", &mut self.sharing_conversations);
        v.long("PropertyControl", &mut self.property_control);
        v.long("MaxInstances", &mut self.max_instances);
        v.long("MaxInstancesPerClient", &mut self.max_instances_per_client);
        v.long("ClientChannelWeight", &mut self.client_channel_weight);
        v.long("ConnectionAffinity", &mut self.connection_affinity);

        // Version 9.
        v.long("BatchDataLimit", &mut self.batch_data_limit);
        v.long("UseDLQ", &mut self.use_dlq);
        v.long("DefReconnect", &mut self.def_reconnect);

        // Version 10.
        v.chars("CertificateLabel", &mut self.certificate_label);

        // Version 11.
        v.long("SPLProtection", &mut self.spl_protection);

        if self.level < MqLevel::V7_1 && v.pointer_width() == 8 {
            v.chars("pad", &mut self.pad);
        }
    }
}
