//! Building blocks for agent integration checks.
//!
//! A check implements [`Check`](check::Check) and reports what it observes through a [`Sink`](sink::Sink): metrics,
//! service checks, events, histogram buckets and agent-visible log lines. [`CheckRunner`](runner::CheckRunner) drives a
//! check on its collection interval until cancelled.

pub type GenericError = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

/// Raw YAML mapping an `init_config` or instance section is parsed from.
pub type Mapping = serde_yaml::Mapping;

/// Ordered `key:value` (or bare) tags.
pub type Tags = Vec<String>;

pub mod cache;
pub mod check;
pub mod config;
pub mod event;
pub mod histogram;
pub mod log;
pub mod logging;
pub mod metric;
pub mod runner;
pub mod service_check;
pub mod sink;
