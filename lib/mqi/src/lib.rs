//! IBM MQ Message Queue Interface (MQI) structures and the Programmable Command Format (PCF) codec.
//!
//! MQI structures are typed records that pack into, and unpack from, the byte layout the queue manager expects for a
//! given [`Layout`] and [`MqLevel`]. The [`pcf`] module builds administrative commands and decodes their responses.

pub mod constants;

mod error;
pub use self::error::{CompletionCode, Error, MqiError, Result};

pub mod layout;
pub use self::layout::{padded_count, ByteOrder, Layout, MqLevel};

pub mod pcf;

pub mod structure;
