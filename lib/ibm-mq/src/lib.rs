//! IBM MQ integration check.
//!
//! Connects to a queue manager as an MQ client, inquires queue manager, queue and channel attributes with PCF
//! commands, optionally drains the statistics queue, and reports everything through an
//! [`integration_check::sink::Sink`].
//!
//! The MQI verbs themselves sit behind [`connection::MqiSession`] and [`connection::QueueManagerConnector`]; a native
//! client binding provides the production implementation, and [`testing::InMemoryQueueManager`] stands in for a queue
//! manager in tests.

pub mod check;
pub use self::check::{IbmMqCheck, IbmMqCheckFactory};

pub mod collectors;
pub mod config;
pub mod connection;
pub mod metrics;
pub mod pcf_execute;
pub mod process_matcher;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
