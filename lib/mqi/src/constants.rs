//! MQI constants.
//!
//! Only the subset of `cmqc.h`, `cmqcfc.h` and `cmqxc.h` that this workspace uses is defined here. Reason codes and
//! attribute selectors are also registered in lookup tables so they can be rendered as their mnemonics.

/// Declares a group of `MQLONG` constants and a mnemonic table covering them.
macro_rules! mnemonics {
    ($table:ident { $($name:ident = $value:expr),* $(,)? }) => {
        $(pub const $name: i32 = $value;)*

        pub(crate) const $table: &[(i32, &str)] = &[$(($value, stringify!($name))),*];
    };
}

pub mod cmqc {
    //! Core MQI constants (`cmqc.h`).

    // Completion codes.
    pub const MQCC_OK: i32 = 0;
    pub const MQCC_WARNING: i32 = 1;
    pub const MQCC_FAILED: i32 = 2;
    pub const MQCC_UNKNOWN: i32 = -1;

    mnemonics!(REASONS {
        MQRC_NONE = 0,
        MQRC_ALIAS_BASE_Q_TYPE_ERROR = 2001,
        MQRC_ALREADY_CONNECTED = 2002,
        MQRC_CONNECTION_BROKEN = 2009,
        MQRC_GET_INHIBITED = 2016,
        MQRC_HCONN_ERROR = 2018,
        MQRC_HOBJ_ERROR = 2019,
        MQRC_NO_MSG_AVAILABLE = 2033,
        MQRC_NOT_AUTHORIZED = 2035,
        MQRC_OBJECT_IN_USE = 2042,
        MQRC_PUT_INHIBITED = 2051,
        MQRC_Q_FULL = 2053,
        MQRC_Q_MGR_NAME_ERROR = 2058,
        MQRC_Q_MGR_NOT_AVAILABLE = 2059,
        MQRC_SECURITY_ERROR = 2063,
        MQRC_SELECTOR_ERROR = 2067,
        MQRC_TRUNCATED_MSG_ACCEPTED = 2079,
        MQRC_TRUNCATED_MSG_FAILED = 2080,
        MQRC_UNKNOWN_OBJECT_NAME = 2085,
        MQRC_Q_MGR_QUIESCING = 2161,
        MQRC_Q_MGR_STOPPING = 2162,
        MQRC_UNEXPECTED_ERROR = 2195,
        MQRC_CONNECTION_QUIESCING = 2202,
        MQRC_CONNECTION_STOPPING = 2203,
        MQRC_SSL_INITIALIZATION_ERROR = 2393,
        MQRC_CHANNEL_NOT_AVAILABLE = 2537,
        MQRC_HOST_NOT_AVAILABLE = 2538,
        MQRC_CHANNEL_CONFIG_ERROR = 2539,
        MQRC_UNKNOWN_CHANNEL_NAME = 2540,
    });

    // Character attribute selectors.
    pub const MQCA_FIRST: i32 = 2001;
    pub const MQCA_LAST: i32 = 4000;

    mnemonics!(CHARACTER_ATTRIBUTES {
        MQCA_BASE_Q_NAME = 2002,
        MQCA_CREATION_DATE = 2004,
        MQCA_CREATION_TIME = 2005,
        MQCA_Q_DESC = 2013,
        MQCA_Q_MGR_NAME = 2015,
        MQCA_Q_NAME = 2016,
        MQCA_REMOTE_Q_MGR_NAME = 2017,
    });

    // Integer attribute selectors.
    pub const MQIA_FIRST: i32 = 1;
    pub const MQIA_LAST: i32 = 2000;

    mnemonics!(INTEGER_ATTRIBUTES {
        MQIA_CURRENT_Q_DEPTH = 3,
        MQIA_DEF_INPUT_OPEN_OPTION = 4,
        MQIA_DEF_PERSISTENCE = 5,
        MQIA_DEF_PRIORITY = 6,
        MQIA_DEFINITION_TYPE = 7,
        MQIA_HARDEN_GET_BACKOUT = 8,
        MQIA_INHIBIT_GET = 9,
        MQIA_INHIBIT_PUT = 10,
        MQIA_MAX_HANDLES = 11,
        MQIA_USAGE = 12,
        MQIA_MAX_MSG_LENGTH = 13,
        MQIA_MAX_PRIORITY = 14,
        MQIA_MAX_Q_DEPTH = 15,
        MQIA_MSG_DELIVERY_SEQUENCE = 16,
        MQIA_OPEN_INPUT_COUNT = 17,
        MQIA_OPEN_OUTPUT_COUNT = 18,
        MQIA_Q_TYPE = 20,
        MQIA_RETENTION_INTERVAL = 21,
        MQIA_BACKOUT_THRESHOLD = 22,
        MQIA_SHAREABILITY = 23,
        MQIA_TRIGGER_CONTROL = 24,
        MQIA_TRIGGER_INTERVAL = 25,
        MQIA_TRIGGER_MSG_PRIORITY = 26,
        MQIA_TRIGGER_TYPE = 28,
        MQIA_TRIGGER_DEPTH = 29,
        MQIA_COMMAND_LEVEL = 31,
        MQIA_PLATFORM = 32,
        MQIA_DIST_LISTS = 34,
        MQIA_TIME_SINCE_RESET = 35,
        MQIA_HIGH_Q_DEPTH = 36,
        MQIA_MSG_ENQ_COUNT = 37,
        MQIA_MSG_DEQ_COUNT = 38,
        MQIA_Q_DEPTH_HIGH_LIMIT = 40,
        MQIA_Q_DEPTH_LOW_LIMIT = 41,
        MQIA_Q_DEPTH_MAX_EVENT = 42,
        MQIA_Q_DEPTH_HIGH_EVENT = 43,
        MQIA_Q_DEPTH_LOW_EVENT = 44,
        MQIA_SCOPE = 45,
        MQIA_Q_SERVICE_INTERVAL_EVENT = 46,
        MQIA_Q_SERVICE_INTERVAL = 54,
    });

    // Object types.
    pub const MQOT_Q: i32 = 1;
    pub const MQOT_Q_MGR: i32 = 5;
    pub const MQOT_CHANNEL: i32 = 6;

    // Queue types.
    pub const MQQT_LOCAL: i32 = 1;
    pub const MQQT_MODEL: i32 = 2;
    pub const MQQT_ALIAS: i32 = 3;
    pub const MQQT_REMOTE: i32 = 6;
    pub const MQQT_CLUSTER: i32 = 7;
    pub const MQQT_ALL: i32 = 1001;

    // Queue definition types.
    pub const MQQDT_PREDEFINED: i32 = 1;
    pub const MQQDT_PERMANENT_DYNAMIC: i32 = 2;
    pub const MQQDT_TEMPORARY_DYNAMIC: i32 = 3;
    pub const MQQDT_SHARED_DYNAMIC: i32 = 4;

    // Open and close options.
    pub const MQOO_INPUT_AS_Q_DEF: i32 = 1;
    pub const MQOO_INPUT_SHARED: i32 = 2;
    pub const MQOO_INPUT_EXCLUSIVE: i32 = 4;
    pub const MQOO_BROWSE: i32 = 8;
    pub const MQOO_OUTPUT: i32 = 16;
    pub const MQOO_INQUIRE: i32 = 32;
    pub const MQOO_FAIL_IF_QUIESCING: i32 = 8192;
    pub const MQCO_NONE: i32 = 0;

    // Structure identifiers and versions.
    pub const MQOD_STRUC_ID: &[u8; 4] = b"OD  ";
    pub const MQOD_VERSION_1: i32 = 1;
    pub const MQOD_VERSION_2: i32 = 2;
    pub const MQOD_VERSION_3: i32 = 3;
    pub const MQOD_VERSION_4: i32 = 4;
    pub const MQMD_STRUC_ID: &[u8; 4] = b"MD  ";
    pub const MQMD_VERSION_1: i32 = 1;
    pub const MQMD_VERSION_2: i32 = 2;
    pub const MQGMO_STRUC_ID: &[u8; 4] = b"GMO ";
    pub const MQGMO_VERSION_1: i32 = 1;
    pub const MQGMO_VERSION_2: i32 = 2;
    pub const MQGMO_VERSION_3: i32 = 3;
    pub const MQGMO_VERSION_4: i32 = 4;
    pub const MQPMO_STRUC_ID: &[u8; 4] = b"PMO ";
    pub const MQPMO_VERSION_1: i32 = 1;
    pub const MQPMO_VERSION_2: i32 = 2;
    pub const MQPMO_VERSION_3: i32 = 3;
    pub const MQSCO_STRUC_ID: &[u8; 4] = b"SCO ";
    pub const MQSCO_VERSION_1: i32 = 1;
    pub const MQSCO_VERSION_2: i32 = 2;
    pub const MQSCO_VERSION_3: i32 = 3;
    pub const MQSCO_VERSION_4: i32 = 4;
    pub const MQSCO_VERSION_5: i32 = 5;
    pub const MQRFH_STRUC_ID: &[u8; 4] = b"RFH ";
    pub const MQRFH_VERSION_2: i32 = 2;
    pub const MQRFH_STRUC_LENGTH_FIXED_2: usize = 36;

    // Message descriptor values.
    pub const MQMT_REQUEST: i32 = 1;
    pub const MQMT_REPLY: i32 = 2;
    pub const MQMT_REPORT: i32 = 4;
    pub const MQMT_DATAGRAM: i32 = 8;
    pub const MQRO_NONE: i32 = 0;
    pub const MQRO_PASS_DISCARD_AND_EXPIRY: i32 = 16384;
    pub const MQRO_DISCARD_MSG: i32 = 134217728;
    pub const MQFB_NONE: i32 = 0;
    pub const MQEI_UNLIMITED: i32 = -1;
    pub const MQCCSI_DEFAULT: i32 = 0;
    pub const MQCCSI_Q_MGR: i32 = 0;
    pub const MQPRI_PRIORITY_AS_Q_DEF: i32 = -1;
    pub const MQPER_PERSISTENCE_AS_Q_DEF: i32 = 2;
    pub const MQAT_NO_CONTEXT: i32 = 0;
    pub const MQMF_NONE: i32 = 0;
    pub const MQOL_UNDEFINED: i32 = -1;

    // Message formats.
    pub const MQFMT_NONE: &[u8; 8] = b"        ";
    pub const MQFMT_ADMIN: &[u8; 8] = b"MQADMIN ";
    pub const MQFMT_STRING: &[u8; 8] = b"MQSTR   ";
    pub const MQFMT_RF_HEADER_2: &[u8; 8] = b"MQHRF2  ";

    // Encodings.
    pub const MQENC_INTEGER_MASK: i32 = 0x0000000f;
    pub const MQENC_INTEGER_NORMAL: i32 = 0x00000001;
    pub const MQENC_INTEGER_REVERSED: i32 = 0x00000002;
    pub const MQENC_DECIMAL_NORMAL: i32 = 0x00000010;
    pub const MQENC_DECIMAL_REVERSED: i32 = 0x00000020;
    pub const MQENC_FLOAT_IEEE_NORMAL: i32 = 0x00000100;
    pub const MQENC_FLOAT_IEEE_REVERSED: i32 = 0x00000200;
    pub const MQENC_FLOAT_S390: i32 = 0x00000300;
    pub const MQENC_NATIVE: i32 = if cfg!(target_endian = "big") {
        MQENC_INTEGER_NORMAL | MQENC_DECIMAL_NORMAL | MQENC_FLOAT_IEEE_NORMAL
    } else {
        MQENC_INTEGER_REVERSED | MQENC_DECIMAL_REVERSED | MQENC_FLOAT_IEEE_REVERSED
    };

    // Get message options.
    pub const MQGMO_NO_WAIT: i32 = 0;
    pub const MQGMO_WAIT: i32 = 1;
    pub const MQGMO_NO_SYNCPOINT: i32 = 4;
    pub const MQGMO_BROWSE_FIRST: i32 = 16;
    pub const MQGMO_BROWSE_NEXT: i32 = 32;
    pub const MQGMO_ACCEPT_TRUNCATED_MSG: i32 = 64;
    pub const MQGMO_FAIL_IF_QUIESCING: i32 = 8192;
    pub const MQGMO_CONVERT: i32 = 16384;
    pub const MQMO_NONE: i32 = 0;
    pub const MQMO_MATCH_MSG_ID: i32 = 1;
    pub const MQMO_MATCH_CORREL_ID: i32 = 2;
    pub const MQGS_NOT_IN_GROUP: u8 = b' ';
    pub const MQSS_NOT_A_SEGMENT: u8 = b' ';
    pub const MQSEG_INHIBITED: u8 = b' ';
    pub const MQRL_UNDEFINED: i32 = -1;
    pub const MQWI_UNLIMITED: i32 = -1;

    // Put message options.
    pub const MQPMO_NONE: i32 = 0;
    pub const MQPMO_NO_SYNCPOINT: i32 = 4;
    pub const MQPMO_FAIL_IF_QUIESCING: i32 = 8192;

    // Channel definition values.
    pub const MQCHT_SENDER: i32 = 1;
    pub const MQCHT_SERVER: i32 = 2;
    pub const MQCHT_RECEIVER: i32 = 3;
    pub const MQCHT_REQUESTER: i32 = 4;
    pub const MQCHT_CLNTCONN: i32 = 6;
    pub const MQCHT_SVRCONN: i32 = 7;
    pub const MQCHT_CLUSRCVR: i32 = 8;
    pub const MQCHT_CLUSSDR: i32 = 9;
    pub const MQXPT_TCP: i32 = 2;
    pub const MQPA_DEFAULT: i32 = 1;
    pub const MQCDC_NO_SENDER_CONVERSION: i32 = 0;
    pub const MQMCAT_PROCESS: i32 = 1;
    pub const MQNPMS_FAST: i32 = 2;
    pub const MQ_EXIT_NAME_LENGTH: i32 = 128;
    pub const MQ_EXIT_DATA_LENGTH: i32 = 32;

    // Channel status values.
    pub const MQCHS_INACTIVE: i32 = 0;
    pub const MQCHS_BINDING: i32 = 1;
    pub const MQCHS_STARTING: i32 = 2;
    pub const MQCHS_RUNNING: i32 = 3;
    pub const MQCHS_STOPPING: i32 = 4;
    pub const MQCHS_RETRYING: i32 = 5;
    pub const MQCHS_STOPPED: i32 = 6;
    pub const MQCHS_REQUESTING: i32 = 7;
    pub const MQCHS_PAUSED: i32 = 8;
    pub const MQCHS_DISCONNECTED: i32 = 9;
    pub const MQCHS_INITIALIZING: i32 = 13;
    pub const MQCHS_SWITCHING: i32 = 14;
}

pub mod cmqcfc {
    //! Programmable command format constants (`cmqcfc.h`).

    // Structure types.
    pub const MQCFT_NONE: i32 = 0;
    pub const MQCFT_COMMAND: i32 = 1;
    pub const MQCFT_RESPONSE: i32 = 2;
    pub const MQCFT_INTEGER: i32 = 3;
    pub const MQCFT_STRING: i32 = 4;
    pub const MQCFT_INTEGER_LIST: i32 = 5;
    pub const MQCFT_STRING_LIST: i32 = 6;
    pub const MQCFT_EVENT: i32 = 7;
    pub const MQCFT_BYTE_STRING: i32 = 9;
    pub const MQCFT_INTEGER_FILTER: i32 = 13;
    pub const MQCFT_STRING_FILTER: i32 = 14;
    pub const MQCFT_BYTE_STRING_FILTER: i32 = 15;
    pub const MQCFT_COMMAND_XR: i32 = 16;
    pub const MQCFT_GROUP: i32 = 20;
    pub const MQCFT_STATISTICS: i32 = 21;
    pub const MQCFT_ACCOUNTING: i32 = 22;
    pub const MQCFT_INTEGER64: i32 = 23;
    pub const MQCFT_INTEGER64_LIST: i32 = 25;

    // Structure lengths.
    pub const MQCFH_STRUC_LENGTH: usize = 36;
    pub const MQCFIN_STRUC_LENGTH: usize = 16;
    pub const MQCFIN64_STRUC_LENGTH: usize = 24;
    pub const MQCFST_STRUC_LENGTH_FIXED: usize = 20;
    pub const MQCFSL_STRUC_LENGTH_FIXED: usize = 24;
    pub const MQCFIL_STRUC_LENGTH_FIXED: usize = 16;
    pub const MQCFIL64_STRUC_LENGTH_FIXED: usize = 16;
    pub const MQCFBS_STRUC_LENGTH_FIXED: usize = 16;
    pub const MQCFGR_STRUC_LENGTH: usize = 16;
    pub const MQCFIF_STRUC_LENGTH: usize = 20;
    pub const MQCFSF_STRUC_LENGTH_FIXED: usize = 24;
    pub const MQCFBF_STRUC_LENGTH_FIXED: usize = 20;

    // Header values.
    pub const MQCFH_VERSION_1: i32 = 1;
    pub const MQCFH_VERSION_3: i32 = 3;
    pub const MQCFC_NOT_LAST: i32 = 0;
    pub const MQCFC_LAST: i32 = 1;

    // Commands.
    pub const MQCMD_NONE: i32 = 0;
    pub const MQCMD_INQUIRE_Q_MGR: i32 = 2;
    pub const MQCMD_INQUIRE_Q: i32 = 13;
    pub const MQCMD_RESET_Q_STATS: i32 = 17;
    pub const MQCMD_INQUIRE_Q_NAMES: i32 = 18;
    pub const MQCMD_INQUIRE_CHANNEL: i32 = 25;
    pub const MQCMD_PING_Q_MGR: i32 = 40;
    pub const MQCMD_INQUIRE_Q_STATUS: i32 = 41;
    pub const MQCMD_INQUIRE_CHANNEL_STATUS: i32 = 42;
    pub const MQCMD_INQUIRE_Q_MGR_STATUS: i32 = 161;
    pub const MQCMD_STATISTICS_MQI: i32 = 164;
    pub const MQCMD_STATISTICS_Q: i32 = 165;
    pub const MQCMD_STATISTICS_CHANNEL: i32 = 166;

    // Filter operators.
    pub const MQCFOP_LESS: i32 = 1;
    pub const MQCFOP_EQUAL: i32 = 2;
    pub const MQCFOP_NOT_GREATER: i32 = 3;
    pub const MQCFOP_GREATER: i32 = 4;
    pub const MQCFOP_NOT_EQUAL: i32 = 5;
    pub const MQCFOP_NOT_LESS: i32 = 6;
    pub const MQCFOP_CONTAINS: i32 = 10;
    pub const MQCFOP_EXCLUDES: i32 = 13;
    pub const MQCFOP_LIKE: i32 = 18;
    pub const MQCFOP_NOT_LIKE: i32 = 21;
    pub const MQCFOP_CONTAINS_GEN: i32 = 26;
    pub const MQCFOP_EXCLUDES_GEN: i32 = 29;

    mnemonics!(REASONS {
        MQRCCF_COMMAND_FAILED = 3008,
        MQRCCF_CHL_STATUS_NOT_FOUND = 3065,
        MQRCCF_CHANNEL_NOT_FOUND = 3200,
    });

    mnemonics!(INTEGER_ATTRIBUTES {
        MQIACF_Q_MGR_ATTRS = 1001,
        MQIACF_Q_ATTRS = 1002,
        MQIACF_ALL = 1009,
        MQIACF_CHANNEL_ATTRS = 1015,
        MQIACF_Q_STATUS_ATTRS = 1026,
        MQIACF_UNCOMMITTED_MSGS = 1027,
        MQIACF_Q_TIME_INDICATOR = 1226,
        MQIACF_OLDEST_MSG_AGE = 1227,
        MQIACH_BATCH_SIZE = 1502,
        MQIACH_DISC_INTERVAL = 1503,
        MQIACH_SHORT_TIMER = 1504,
        MQIACH_SHORT_RETRY = 1505,
        MQIACH_LONG_TIMER = 1506,
        MQIACH_LONG_RETRY = 1507,
        MQIACH_MAX_MSG_LENGTH = 1510,
        MQIACH_CHANNEL_TYPE = 1511,
        MQIACH_CHANNEL_INSTANCE_TYPE = 1523,
        MQIACH_CHANNEL_INSTANCE_ATTRS = 1524,
        MQIACH_CHANNEL_STATUS = 1527,
        MQIACH_CURRENT_MSGS = 1531,
        MQIACH_MSGS = 1534,
        MQIACH_BYTES_SENT = 1535,
        MQIACH_BYTES_RCVD = 1536,
        MQIACH_BATCHES = 1537,
        MQIACH_BUFFERS_SENT = 1538,
        MQIACH_BUFFERS_RCVD = 1539,
        MQIACH_MCA_STATUS = 1542,
        MQIACH_MR_COUNT = 1544,
        MQIACH_MR_INTERVAL = 1545,
        MQIACH_NPM_SPEED = 1562,
        MQIACH_HB_INTERVAL = 1563,
        MQIACH_BATCH_INTERVAL = 1564,
        MQIACH_NETWORK_PRIORITY = 1565,
        MQIACH_KEEP_ALIVE_INTERVAL = 1566,
        MQIAMO_AVG_BATCH_SIZE = 702,
        MQIAMO_AVG_Q_TIME = 703,
        MQIAMO_FULL_BATCHES = 720,
        MQIAMO_GETS = 722,
        MQIAMO_GETS_FAILED = 725,
        MQIAMO_INCOMPLETE_BATCHES = 726,
        MQIAMO_MSGS = 728,
        MQIAMO_PUTS = 735,
        MQIAMO_PUTS_FAILED = 737,
        MQIAMO_PUT_RETRIES = 738,
        MQIAMO_Q_MAX_DEPTH = 739,
        MQIAMO_Q_MIN_DEPTH = 740,
        MQIAMO64_BYTES = 746,
    });

    mnemonics!(CHARACTER_ATTRIBUTES {
        MQCACF_LAST_GET_DATE = 3128,
        MQCACF_LAST_GET_TIME = 3129,
        MQCACF_LAST_PUT_DATE = 3130,
        MQCACF_LAST_PUT_TIME = 3131,
        MQCACH_CHANNEL_NAME = 3501,
        MQCACH_DESC = 3502,
        MQCACH_XMIT_Q_NAME = 3505,
        MQCACH_CONNECTION_NAME = 3506,
    });

    mnemonics!(GROUPS {
        MQGACF_Q_STATISTICS_DATA = 8011,
        MQGACF_CHL_STATISTICS_DATA = 8012,
    });

    /// Attribute selectors that the command server only accepts as integer lists.
    pub const ATTRIBUTE_LIST_SELECTORS: &[i32] = &[
        MQIACF_Q_MGR_ATTRS,
        MQIACF_Q_ATTRS,
        MQIACF_CHANNEL_ATTRS,
        MQIACF_Q_STATUS_ATTRS,
        MQIACH_CHANNEL_INSTANCE_ATTRS,
    ];
}

pub mod cmqxc {
    //! Exit and channel definition constants (`cmqxc.h`).

    pub const MQCD_VERSION_1: i32 = 1;
    pub const MQCD_VERSION_2: i32 = 2;
    pub const MQCD_VERSION_3: i32 = 3;
    pub const MQCD_VERSION_4: i32 = 4;
    pub const MQCD_VERSION_5: i32 = 5;
    pub const MQCD_VERSION_6: i32 = 6;
    pub const MQCD_VERSION_7: i32 = 7;
    pub const MQCD_VERSION_8: i32 = 8;
    pub const MQCD_VERSION_9: i32 = 9;
    pub const MQCD_VERSION_10: i32 = 10;
    pub const MQCD_VERSION_11: i32 = 11;
}

/// Returns the mnemonic of a reason code, such as `MQRC_NO_MSG_AVAILABLE`.
pub fn reason_name(reason: i32) -> Option<&'static str> {
    lookup(&[cmqc::REASONS, cmqcfc::REASONS], reason)
}

/// Returns the mnemonic of an attribute selector.
///
/// Character and integer selectors share numeric ranges with other constant families, so the caller indicates which
/// kind of value the selector carried. This mirrors how PCF responses are usually inspected: the value type is known
/// from the parameter, and the selector is looked up in the matching table.
pub fn attribute_name(selector: i32, is_character: bool) -> Option<&'static str> {
    if is_character {
        lookup(&[cmqc::CHARACTER_ATTRIBUTES, cmqcfc::CHARACTER_ATTRIBUTES], selector)
    } else {
        lookup(
            &[cmqc::INTEGER_ATTRIBUTES, cmqcfc::INTEGER_ATTRIBUTES, cmqcfc::GROUPS],
            selector,
        )
    }
}

fn lookup(tables: &[&[(i32, &'static str)]], value: i32) -> Option<&'static str> {
    tables
        .iter()
        .flat_map(|table| table.iter())
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_mnemonics() {
        assert_eq!(reason_name(2033), Some("MQRC_NO_MSG_AVAILABLE"));
        assert_eq!(reason_name(3065), Some("MQRCCF_CHL_STATUS_NOT_FOUND"));
        assert_eq!(reason_name(12345), None);
    }

    #[test]
    fn attribute_mnemonics() {
        assert_eq!(attribute_name(cmqc::MQCA_Q_NAME, true), Some("MQCA_Q_NAME"));
        assert_eq!(attribute_name(cmqc::MQIA_CURRENT_Q_DEPTH, false), Some("MQIA_CURRENT_Q_DEPTH"));
        assert_eq!(
            attribute_name(cmqcfc::MQCACH_CHANNEL_NAME, true),
            Some("MQCACH_CHANNEL_NAME")
        );
        assert_eq!(attribute_name(cmqc::MQCA_Q_NAME, false), None);
    }
}
