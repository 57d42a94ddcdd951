use std::{
    collections::{BTreeMap, HashMap},
    num::NonZeroUsize,
    str::FromStr as _,
    time::Duration,
};

use chrono_tz::Tz;
use integration_check::{config::ConfigurationError, service_check::Status, Mapping, Tags};
use mqi::constants::cmqc::*;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_yaml::Value;
use tracing::warn;

use crate::metrics::channel_status_code;

/// Queues that reject status and reset inquiries.
pub const DISALLOWED_QUEUES: &[&str] = &[
    "SYSTEM.MQSC.REPLY.QUEUE",
    "SYSTEM.DEFAULT.MODEL.QUEUE",
    "SYSTEM.DURABLE.MODEL.QUEUE",
    "SYSTEM.JMS.TEMPQ.MODEL",
    "SYSTEM.NDURABLE.MODEL.QUEUE",
    "SYSTEM.CLUSTER.TRANSMIT.MODEL.QUEUE",
];

const DEFAULT_QUEUE_MANAGER: &str = "default";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 1414;
const DEFAULT_TIMEOUT_SECS: f64 = 5.0;
const DEFAULT_MQCD_VERSION: i32 = 6;
const DEFAULT_SSL_CIPHER_SPEC: &str = "TLS_RSA_WITH_AES_256_CBC_SHA";
const DEFAULT_SSL_KEY_REPOSITORY: &str = "/var/mqm/ssl-db/client/KeyringClient";
const DEFAULT_MIN_COLLECTION_INTERVAL_SECS: u64 = 15;
const QUEUE_MANAGER_PLACEHOLDER: &str = "<queue_manager>";

const DEFAULT_CHANNEL_STATUS_MAPPING: &[(i32, Status)] = &[
    (MQCHS_INACTIVE, Status::Critical),
    (MQCHS_BINDING, Status::Warning),
    (MQCHS_STARTING, Status::Warning),
    (MQCHS_RUNNING, Status::Ok),
    (MQCHS_STOPPING, Status::Critical),
    (MQCHS_RETRYING, Status::Warning),
    (MQCHS_STOPPED, Status::Critical),
    (MQCHS_REQUESTING, Status::Warning),
    (MQCHS_PAUSED, Status::Warning),
    (MQCHS_INITIALIZING, Status::Warning),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawInitConfig {
    queue_manager_process: Option<String>,
    queue_manager_process_limit: Option<usize>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawInstanceConfig {
    channel: Option<String>,
    queue_manager: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    connection_name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    queues: Vec<String>,
    queue_patterns: Vec<String>,
    queue_regex: Vec<String>,
    auto_discover_queues: bool,
    collect_reset_queue_metrics: Option<bool>,
    collect_statistics_metrics: bool,
    channels: Vec<String>,
    auto_discover_channels: Option<bool>,
    channel_status_mapping: BTreeMap<String, String>,
    tags: Vec<String>,
    queue_tag_re: BTreeMap<String, String>,
    timeout: Option<f64>,
    convert_endianness: bool,
    mqcd_version: Option<i32>,
    ssl_auth: Option<bool>,
    ssl_cipher_spec: Option<String>,
    ssl_key_repository_location: Option<String>,
    ssl_certificate_label: Option<String>,
    queue_manager_timezone: Option<String>,
    queue_manager_process: Option<String>,
    hostname: Option<String>,
    min_collection_interval: Option<u64>,
}

/// Validated configuration of one IBM MQ check instance.
#[derive(Clone, Debug)]
pub struct IbmMqConfig {
    pub channel: String,
    pub queue_manager_name: String,

    /// Host and port, when the connection name was derived from them.
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connection_name: String,
    pub username: Option<String>,
    pub password: Option<String>,

    pub queues: Vec<String>,
    pub queue_patterns: Vec<String>,
    pub queue_regex: Vec<Regex>,
    pub auto_discover_queues: bool,
    pub collect_reset_queue_metrics: bool,
    pub collect_statistics_metrics: bool,

    pub channels: Vec<String>,
    pub auto_discover_channels: bool,

    /// Service check status reported for each `MQCHS_*` channel status.
    pub channel_status_mapping: HashMap<i32, Status>,

    /// Instance tags, including the configured channel.
    pub tags: Tags,

    /// Instance tags without the configured channel, the base for per-channel tags.
    pub tags_no_channel: Tags,

    /// Extra tags for queues whose name matches the paired pattern.
    pub queue_tag_re: Vec<(Regex, Tags)>,

    /// How long to wait for each PCF reply.
    pub timeout: Duration,
    pub convert_endianness: bool,
    pub mqcd_version: i32,

    pub ssl_auth: bool,
    pub ssl_cipher_spec: String,
    pub ssl_key_repository_location: String,
    pub ssl_certificate_label: Option<String>,

    pub queue_manager_timezone: Tz,
    pub queue_manager_process: Option<Regex>,
    pub queue_manager_process_limit: NonZeroUsize,
    pub hostname: Option<String>,
    pub min_collection_interval: Duration,
}

impl IbmMqConfig {
    /// Validates an instance configuration against the check's `init_config`.
    ///
    /// # Errors
    ///
    /// If a required option is missing, options conflict, or a value cannot be parsed, an error is returned.
    pub fn from_mappings(init_config: &Mapping, instance: &Mapping) -> Result<Self, ConfigurationError> {
        let init: RawInitConfig = deserialize(init_config)?;
        let raw: RawInstanceConfig = deserialize(instance)?;

        let channel = non_empty(raw.channel)
            .ok_or_else(|| ConfigurationError::missing_field("channel", "channel and queue_manager are required."))?;
        let queue_manager_name = match raw.queue_manager {
            None => DEFAULT_QUEUE_MANAGER.to_string(),
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigurationError::missing_field(
                    "queue_manager",
                    "channel and queue_manager are required.",
                ))
            }
            Some(name) => name,
        };

        let (host, port, connection_name) = match non_empty(raw.connection_name) {
            Some(connection_name) => {
                if raw.host.is_some() || raw.port.is_some() {
                    return Err(ConfigurationError::invalid_value(
                        "connection_name",
                        format!(
                            "specify only one of host/port or connection_name (host={:?}, port={:?}, connection_name={})",
                            raw.host, raw.port, connection_name
                        ),
                    ));
                }
                (None, None, connection_name)
            }
            None => {
                let host = non_empty(raw.host).unwrap_or_else(|| DEFAULT_HOST.to_string());
                let port = raw.port.unwrap_or(DEFAULT_PORT);
                if port == 0 {
                    return Err(ConfigurationError::invalid_value("port", "must be between 1 and 65535"));
                }
                let connection_name = format!("{}({})", host, port);
                (Some(host), Some(port), connection_name)
            }
        };

        let mqcd_version = raw.mqcd_version.unwrap_or(DEFAULT_MQCD_VERSION);
        if !(1..=9).contains(&mqcd_version) {
            return Err(ConfigurationError::invalid_value(
                "mqcd_version",
                format!("must be a number between 1 and 9, got {}", mqcd_version),
            ));
        }

        let timeout_secs = raw.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(ConfigurationError::invalid_value("timeout", "must be a positive number of seconds"));
        }

        let queue_regex = raw
            .queue_regex
            .iter()
            .map(|pattern| compile_anchored("queue_regex", pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let queue_tag_re = raw
            .queue_tag_re
            .iter()
            .map(|(pattern, tags)| {
                let tags = tags
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
                compile_anchored("queue_tag_re", pattern).map(|regex| (regex, tags))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let channel_status_mapping = channel_status_mapping(&raw.channel_status_mapping)?;

        let queue_manager_timezone = match raw.queue_manager_timezone {
            Some(name) => Tz::from_str(&name).map_err(|_| {
                ConfigurationError::invalid_value("queue_manager_timezone", format!("unknown timezone '{}'", name))
            })?,
            None => Tz::UTC,
        };

        let queue_manager_process = raw
            .queue_manager_process
            .or(init.queue_manager_process)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                let pattern = pattern.replace(QUEUE_MANAGER_PLACEHOLDER, &regex::escape(&queue_manager_name));
                compile("queue_manager_process", &pattern)
            })
            .transpose()?;

        let queue_manager_process_limit = NonZeroUsize::new(init.queue_manager_process_limit.unwrap_or(1))
            .ok_or_else(|| ConfigurationError::invalid_value("queue_manager_process_limit", "must be at least 1"))?;

        let ssl_options_given =
            raw.ssl_cipher_spec.is_some() || raw.ssl_key_repository_location.is_some() || raw.ssl_certificate_label.is_some();
        let ssl_auth = match raw.ssl_auth {
            Some(ssl_auth) => ssl_auth,
            None if ssl_options_given => {
                warn!(
                    queue_manager = %queue_manager_name,
                    "TLS options are set without `ssl_auth`; enabling TLS."
                );
                true
            }
            None => false,
        };

        let mut tags_no_channel = raw.tags;
        tags_no_channel.push(format!("queue_manager:{}", queue_manager_name));
        if let (Some(host), Some(port)) = (&host, port) {
            tags_no_channel.push(format!("mq_host:{}", host));
            tags_no_channel.push(format!("port:{}", port));
        }
        tags_no_channel.push(format!("connection_name:{}", connection_name));

        let mut tags = tags_no_channel.clone();
        tags.push(format!("channel:{}", channel));

        Ok(Self {
            channel,
            queue_manager_name,
            host,
            port,
            connection_name,
            username: non_empty(raw.username),
            password: non_empty(raw.password),
            queues: raw.queues,
            queue_patterns: raw.queue_patterns,
            queue_regex,
            auto_discover_queues: raw.auto_discover_queues,
            collect_reset_queue_metrics: raw.collect_reset_queue_metrics.unwrap_or(true),
            collect_statistics_metrics: raw.collect_statistics_metrics,
            channels: raw.channels,
            auto_discover_channels: raw.auto_discover_channels.unwrap_or(true),
            channel_status_mapping,
            tags,
            tags_no_channel,
            queue_tag_re,
            timeout: Duration::from_secs_f64(timeout_secs),
            convert_endianness: raw.convert_endianness,
            mqcd_version,
            ssl_auth,
            ssl_cipher_spec: raw
                .ssl_cipher_spec
                .unwrap_or_else(|| DEFAULT_SSL_CIPHER_SPEC.to_string()),
            ssl_key_repository_location: raw
                .ssl_key_repository_location
                .unwrap_or_else(|| DEFAULT_SSL_KEY_REPOSITORY.to_string()),
            ssl_certificate_label: non_empty(raw.ssl_certificate_label),
            queue_manager_timezone,
            queue_manager_process,
            queue_manager_process_limit,
            hostname: non_empty(raw.hostname),
            min_collection_interval: Duration::from_secs(
                raw.min_collection_interval
                    .unwrap_or(DEFAULT_MIN_COLLECTION_INTERVAL_SECS)
                    .max(1),
            ),
        })
    }

    /// Wait interval for PCF replies, in milliseconds.
    pub fn wait_interval_ms(&self) -> i32 {
        i32::try_from(self.timeout.as_millis()).unwrap_or(i32::MAX)
    }

    /// Returns `true` if status and reset inquiries may be sent for the queue.
    pub fn allows_queue_inquiries(queue: &str) -> bool {
        !DISALLOWED_QUEUES.contains(&queue)
    }
}

fn deserialize<T: DeserializeOwned + Default>(mapping: &Mapping) -> Result<T, ConfigurationError> {
    if mapping.is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_value(Value::Mapping(mapping.clone())).map_err(|e| ConfigurationError::Generic { source: e.into() })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Queue patterns match from the start of the name.
fn compile_anchored(field: &'static str, pattern: &str) -> Result<Regex, ConfigurationError> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| invalid_pattern(field, pattern, e))
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigurationError> {
    Regex::new(pattern).map_err(|e| invalid_pattern(field, pattern, e))
}

fn invalid_pattern(field: &'static str, pattern: &str, error: regex::Error) -> ConfigurationError {
    ConfigurationError::invalid_value(field, format!("invalid pattern '{}': {}", pattern, error))
}

fn channel_status_mapping(custom: &BTreeMap<String, String>) -> Result<HashMap<i32, Status>, ConfigurationError> {
    if custom.is_empty() {
        return Ok(DEFAULT_CHANNEL_STATUS_MAPPING.iter().copied().collect());
    }

    custom
        .iter()
        .map(|(channel_status, service_check_status)| {
            let code = channel_status_code(channel_status).ok_or_else(|| {
                ConfigurationError::invalid_value(
                    "channel_status_mapping",
                    format!("unknown channel status '{}'", channel_status),
                )
            })?;
            let status = service_check_status
                .parse::<Status>()
                .map_err(|reason| ConfigurationError::invalid_value("channel_status_mapping", reason))?;
            Ok((code, status))
        })
        .collect()
}
