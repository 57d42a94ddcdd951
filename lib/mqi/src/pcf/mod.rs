//! Programmable Command Format (PCF) messages.
//!
//! Commands are built with [`PcfCommand`] and encoded into a header followed by parameter records. Responses are
//! decoded by [`decode_response`] into a [`ParameterMap`], with group parameters collected into nested maps.

mod command;
pub use self::command::PcfCommand;

mod decoder;
pub use self::decoder::{decode_command, decode_response};

mod filter;
pub use self::filter::{Filter, FilterBuilder, FilterOperator, FilterValue};

mod header;
pub use self::header::CommandHeader;

mod parameter;
pub use self::parameter::Parameter;

mod value;
pub use self::value::{ParameterMap, PcfValue};
