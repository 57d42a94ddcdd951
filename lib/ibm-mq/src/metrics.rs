//! Metric tables: which PCF attributes are reported, and under which names.

use chrono::{DateTime, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use integration_check::metric::Type;
use mqi::{
    constants::{cmqc::*, cmqcfc::*},
    pcf::{ParameterMap, PcfValue},
};

pub const METRIC_PREFIX: &str = "ibm_mq";

/// Inquired on the queue manager object with MQINQ.
pub const QUEUE_MANAGER_METRICS: &[(&str, i32)] = &[("dist_lists", MQIA_DIST_LISTS), ("max_msg_list", MQIA_MAX_MSG_LENGTH)];

/// Attributes read from `MQCMD_INQUIRE_Q` responses.
pub const QUEUE_METRICS: &[(&str, i32)] = &[
    ("service_interval", MQIA_Q_SERVICE_INTERVAL),
    ("inhibit_put", MQIA_INHIBIT_PUT),
    ("depth_low_limit", MQIA_Q_DEPTH_LOW_LIMIT),
    ("inhibit_get", MQIA_INHIBIT_GET),
    ("harden_get_backout", MQIA_HARDEN_GET_BACKOUT),
    ("service_interval_event", MQIA_Q_SERVICE_INTERVAL_EVENT),
    ("trigger_control", MQIA_TRIGGER_CONTROL),
    ("usage", MQIA_USAGE),
    ("scope", MQIA_SCOPE),
    ("type", MQIA_Q_TYPE),
    ("depth_max", MQIA_MAX_Q_DEPTH),
    ("backout_threshold", MQIA_BACKOUT_THRESHOLD),
    ("depth_high_event", MQIA_Q_DEPTH_HIGH_EVENT),
    ("depth_high_limit", MQIA_Q_DEPTH_HIGH_LIMIT),
    ("message_delivery_sequence", MQIA_MSG_DELIVERY_SEQUENCE),
    ("open_input_count", MQIA_OPEN_INPUT_COUNT),
    ("open_output_count", MQIA_OPEN_OUTPUT_COUNT),
    ("depth_current", MQIA_CURRENT_Q_DEPTH),
    ("depth_max_event", MQIA_Q_DEPTH_MAX_EVENT),
    ("depth_low_event", MQIA_Q_DEPTH_LOW_EVENT),
    ("trigger_message_priority", MQIA_TRIGGER_MSG_PRIORITY),
    ("max_message_length", MQIA_MAX_MSG_LENGTH),
    ("trigger_type", MQIA_TRIGGER_TYPE),
    ("trigger_depth", MQIA_TRIGGER_DEPTH),
    ("persistence", MQIA_DEF_PERSISTENCE),
    ("priority", MQIA_DEF_PRIORITY),
    ("retention_interval", MQIA_RETENTION_INTERVAL),
    ("trigger_interval", MQIA_TRIGGER_INTERVAL),
];

/// Status attribute whose value is only meaningful above a sentinel.
pub struct SentinelMetric {
    pub name: &'static str,
    pub selector: i32,
    pub failure: i64,
}

/// Attributes read from `MQCMD_INQUIRE_Q_STATUS` responses.
///
/// The queue manager reports `-1` when queue monitoring is off.
pub const QUEUE_STATUS_METRICS: &[SentinelMetric] = &[
    SentinelMetric {
        name: "oldest_message_age",
        selector: MQIACF_OLDEST_MSG_AGE,
        failure: -1,
    },
    SentinelMetric {
        name: "uncommitted_msgs",
        selector: MQIACF_UNCOMMITTED_MSGS,
        failure: -1,
    },
];

/// Attributes read from `MQCMD_RESET_Q_STATS` responses.
pub const QUEUE_RESET_METRICS: &[(&str, i32, Type)] = &[
    ("high_q_depth", MQIA_HIGH_Q_DEPTH, Type::Gauge),
    ("msg_deq_count", MQIA_MSG_DEQ_COUNT, Type::Count),
    ("msg_enq_count", MQIA_MSG_ENQ_COUNT, Type::Count),
    ("time_since_reset", MQIA_TIME_SINCE_RESET, Type::Count),
];

/// Attributes read from `MQCMD_INQUIRE_CHANNEL` responses.
pub const CHANNEL_METRICS: &[(&str, i32)] = &[
    ("batch_size", MQIACH_BATCH_SIZE),
    ("batch_interval", MQIACH_BATCH_INTERVAL),
    ("long_retry", MQIACH_LONG_RETRY),
    ("long_timer", MQIACH_LONG_TIMER),
    ("max_message_length", MQIACH_MAX_MSG_LENGTH),
    ("short_retry", MQIACH_SHORT_RETRY),
    ("short_timer", MQIACH_SHORT_TIMER),
    ("disc_interval", MQIACH_DISC_INTERVAL),
    ("hb_interval", MQIACH_HB_INTERVAL),
    ("keep_alive_interval", MQIACH_KEEP_ALIVE_INTERVAL),
    ("mr_count", MQIACH_MR_COUNT),
    ("mr_interval", MQIACH_MR_INTERVAL),
    ("network_priority", MQIACH_NETWORK_PRIORITY),
    ("npm_speed", MQIACH_NPM_SPEED),
];

/// Attributes read from `MQCMD_INQUIRE_CHANNEL_STATUS` responses.
pub const CHANNEL_STATUS_METRICS: &[(&str, i32)] = &[
    ("buffers_rcvd", MQIACH_BUFFERS_RCVD),
    ("buffers_sent", MQIACH_BUFFERS_SENT),
    ("bytes_rcvd", MQIACH_BYTES_RCVD),
    ("bytes_sent", MQIACH_BYTES_SENT),
    ("channel_status", MQIACH_CHANNEL_STATUS),
    ("mca_status", MQIACH_MCA_STATUS),
    ("msgs", MQIACH_MSGS),
    ("batches", MQIACH_BATCHES),
    ("current_msgs", MQIACH_CURRENT_MSGS),
];

/// Channel statistics, from `MQCMD_STATISTICS_CHANNEL` messages.
pub const CHANNEL_STATS_METRICS: &[(&str, i32, Type)] = &[
    ("msgs", MQIAMO_MSGS, Type::Count),
    ("bytes", MQIAMO64_BYTES, Type::Count),
    ("put_retries", MQIAMO_PUT_RETRIES, Type::Count),
    ("full_batches", MQIAMO_FULL_BATCHES, Type::Count),
    ("incomplete_batches", MQIAMO_INCOMPLETE_BATCHES, Type::Count),
    ("avg_batch_size", MQIAMO_AVG_BATCH_SIZE, Type::Gauge),
];

/// Queue statistics, from `MQCMD_STATISTICS_Q` messages.
pub const QUEUE_STATS_METRICS: &[(&str, i32, Type)] = &[
    ("q_min_depth", MQIAMO_Q_MIN_DEPTH, Type::Gauge),
    ("q_max_depth", MQIAMO_Q_MAX_DEPTH, Type::Gauge),
    ("avg_q_time", MQIAMO_AVG_Q_TIME, Type::Gauge),
    ("put_count", MQIAMO_PUTS, Type::Count),
    ("put_fail_count", MQIAMO_PUTS_FAILED, Type::Count),
    ("get_count", MQIAMO_GETS, Type::Count),
    ("get_fail_count", MQIAMO_GETS_FAILED, Type::Count),
];

/// Channel statuses and the labels they are tagged with.
pub const CHANNEL_STATUSES: &[(i32, &str)] = &[
    (MQCHS_INACTIVE, "inactive"),
    (MQCHS_BINDING, "binding"),
    (MQCHS_STARTING, "starting"),
    (MQCHS_RUNNING, "running"),
    (MQCHS_STOPPING, "stopping"),
    (MQCHS_RETRYING, "retrying"),
    (MQCHS_STOPPED, "stopped"),
    (MQCHS_REQUESTING, "requesting"),
    (MQCHS_PAUSED, "paused"),
    (MQCHS_DISCONNECTED, "disconnected"),
    (MQCHS_INITIALIZING, "initializing"),
    (MQCHS_SWITCHING, "switching"),
];

pub const CHANNEL_TYPES: &[(i32, &str)] = &[
    (MQCHT_SENDER, "sender"),
    (MQCHT_SERVER, "server"),
    (MQCHT_RECEIVER, "receiver"),
    (MQCHT_REQUESTER, "requester"),
    (MQCHT_CLNTCONN, "clntconn"),
    (MQCHT_SVRCONN, "svrconn"),
    (MQCHT_CLUSRCVR, "clusrcvr"),
    (MQCHT_CLUSSDR, "clussdr"),
];

pub const QUEUE_TYPES: &[(i32, &str)] = &[
    (MQQT_LOCAL, "local"),
    (MQQT_MODEL, "model"),
    (MQQT_ALIAS, "alias"),
    (MQQT_REMOTE, "remote"),
    (MQQT_CLUSTER, "cluster"),
];

pub const DEFINITION_TYPES: &[(i32, &str)] = &[
    (MQQDT_PREDEFINED, "predefined"),
    (MQQDT_PERMANENT_DYNAMIC, "permanent_dynamic"),
    (MQQDT_TEMPORARY_DYNAMIC, "temporary_dynamic"),
    (MQQDT_SHARED_DYNAMIC, "shared_dynamic"),
];

/// Full metric name for a metric of the given family, such as `ibm_mq.queue.depth_current`.
pub fn metric_name(family: &str, metric: &str) -> String {
    format!("{}.{}.{}", METRIC_PREFIX, family, metric)
}

/// Looks up a label in one of the code tables.
pub fn label(table: &[(i32, &'static str)], code: i32) -> Option<&'static str> {
    table.iter().find(|(candidate, _)| *candidate == code).map(|(_, label)| *label)
}

/// Channel status code for a status name such as `running`, ignoring case.
pub fn channel_status_code(name: &str) -> Option<i32> {
    let name = name.trim().to_ascii_lowercase();
    let name = name.strip_prefix("mqchs_").unwrap_or(&name);
    CHANNEL_STATUSES
        .iter()
        .find(|(_, label)| *label == name)
        .map(|(code, _)| *code)
}

/// Current depth as a percentage of the maximum depth.
pub fn depth_percent(queue_info: &ParameterMap) -> Option<f64> {
    let current = queue_info.get(&MQIA_CURRENT_Q_DEPTH).and_then(PcfValue::as_i64)?;
    let max = queue_info.get(&MQIA_MAX_Q_DEPTH).and_then(PcfValue::as_i64)?;
    if max <= 0 {
        return None;
    }
    Some(current as f64 / max as f64 * 100.0)
}

/// Seconds since the last message was got from the queue.
pub fn last_get_time(timezone: Tz, queue_info: &ParameterMap, now: DateTime<Utc>) -> Option<f64> {
    seconds_since(timezone, queue_info, MQCACF_LAST_GET_DATE, MQCACF_LAST_GET_TIME, now)
}

/// Seconds since the last message was put to the queue.
pub fn last_put_time(timezone: Tz, queue_info: &ParameterMap, now: DateTime<Utc>) -> Option<f64> {
    seconds_since(timezone, queue_info, MQCACF_LAST_PUT_DATE, MQCACF_LAST_PUT_TIME, now)
}

// Dates are `yyyy-mm-dd` and times `hh.mm.ss`, both in the queue manager's local time. Queues that were never
// read or written report blanks.
fn seconds_since(timezone: Tz, queue_info: &ParameterMap, date: i32, time: i32, now: DateTime<Utc>) -> Option<f64> {
    let date = queue_info.get(&date).and_then(PcfValue::as_str)?;
    let time = queue_info.get(&time).and_then(PcfValue::as_str)?;
    if date.is_empty() || time.is_empty() {
        return None;
    }

    let local = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H.%M.%S").ok()?;
    let at = timezone.from_local_datetime(&local).earliest()?;
    Some((now - at.with_timezone(&Utc)).num_seconds() as f64)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::TimeZone as _;
    use proptest::prelude::*;

    use super::*;

    fn string(value: &'static str) -> PcfValue {
        PcfValue::String(Bytes::from_static(value.as_bytes()))
    }

    #[test]
    fn depth_percentage() {
        let mut info = ParameterMap::new();
        info.insert(MQIA_CURRENT_Q_DEPTH, PcfValue::Integer(25));
        assert_eq!(depth_percent(&info), None);

        info.insert(MQIA_MAX_Q_DEPTH, PcfValue::Integer(200));
        assert_eq!(depth_percent(&info), Some(12.5));

        info.insert(MQIA_MAX_Q_DEPTH, PcfValue::Integer(0));
        assert_eq!(depth_percent(&info), None);
    }

    #[test]
    fn last_activity_in_queue_manager_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).single().expect("valid instant");
        let mut info = ParameterMap::new();
        info.insert(MQCACF_LAST_GET_DATE, string("2024-01-15"));
        info.insert(MQCACF_LAST_GET_TIME, string("12.59.00"));
        info.insert(MQCACF_LAST_PUT_DATE, string("2024-01-15"));
        info.insert(MQCACF_LAST_PUT_TIME, string("11.58.30"));

        assert_eq!(last_get_time(chrono_tz::Europe::Paris, &info, now), Some(60.0));
        assert_eq!(last_put_time(Tz::UTC, &info, now), Some(90.0));
    }

    #[test]
    fn blank_activity_is_absent() {
        let now = Utc::now();
        let mut info = ParameterMap::new();
        info.insert(MQCACF_LAST_GET_DATE, string("          "));
        info.insert(MQCACF_LAST_GET_TIME, string("        "));
        assert_eq!(last_get_time(Tz::UTC, &info, now), None);
        assert_eq!(last_put_time(Tz::UTC, &info, now), None);
    }

    #[test]
    fn channel_status_names() {
        assert_eq!(channel_status_code("running"), Some(MQCHS_RUNNING));
        assert_eq!(channel_status_code("STOPPED"), Some(MQCHS_STOPPED));
        assert_eq!(channel_status_code("MQCHS_PAUSED"), Some(MQCHS_PAUSED));
        assert_eq!(channel_status_code("sleeping"), None);
        assert_eq!(label(CHANNEL_STATUSES, MQCHS_SWITCHING), Some("switching"));
    }

    proptest! {
        #[test]
        fn property_test_depth_percent_is_bounded(max in 1i32..=999_999_999, fill in 0.0f64..=1.0) {
            let current = (max as f64 * fill) as i32;
            let mut info = ParameterMap::new();
            info.insert(MQIA_CURRENT_Q_DEPTH, PcfValue::Integer(current));
            info.insert(MQIA_MAX_Q_DEPTH, PcfValue::Integer(max));

            let percent = depth_percent(&info).expect("should compute percentage");
            prop_assert!((0.0..=100.0).contains(&percent));
        }
    }
}
