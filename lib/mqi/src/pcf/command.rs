use bytes::{Bytes, BytesMut};

use super::{CommandHeader, Filter, Parameter};
use crate::{constants::cmqcfc::ATTRIBUTE_LIST_SELECTORS, layout::Layout, structure::pack_into};

/// A PCF command message under construction.
///
/// Parameters are encoded in the order they were added, followed by any filter conditions.
#[derive(Clone, Debug)]
pub struct PcfCommand {
    command: i32,
    parameters: Vec<Parameter>,
    filters: Vec<Filter>,
}

impl PcfCommand {
    /// Creates an empty command with the given `MQCMD_*` code.
    pub fn new(command: i32) -> Self {
        Self {
            command,
            parameters: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_string(self, parameter: i32, value: impl AsRef<[u8]>) -> Self {
        self.with_parameter(Parameter::String {
            parameter,
            ccsid: 0,
            value: Bytes::copy_from_slice(value.as_ref()),
        })
    }

    pub fn with_bytes(self, parameter: i32, value: impl Into<Bytes>) -> Self {
        self.with_parameter(Parameter::ByteString {
            parameter,
            value: value.into(),
        })
    }

    /// Adds an integer parameter.
    ///
    /// Attribute list selectors (`MQIACF_Q_ATTRS` and friends) only accept lists, so a single value given for one of
    /// them is sent as a one-element list.
    pub fn with_integer(self, parameter: i32, value: i32) -> Self {
        if ATTRIBUTE_LIST_SELECTORS.contains(&parameter) {
            self.with_integer_list(parameter, vec![value])
        } else {
            self.with_parameter(Parameter::Integer { parameter, value })
        }
    }

    pub fn with_integer_list(self, parameter: i32, values: Vec<i32>) -> Self {
        self.with_parameter(Parameter::IntegerList { parameter, values })
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn command(&self) -> i32 {
        self.command
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Header this command is sent with.
    pub fn header(&self) -> CommandHeader {
        let count = self.parameters.len() + self.filters.len();
        CommandHeader::command(self.command, i32::try_from(count).unwrap_or(i32::MAX))
    }

    /// Encodes the full command message.
    pub fn encode(&self, layout: Layout) -> Bytes {
        let mut buf = BytesMut::new();
        pack_into(&self.header(), layout, &mut buf);
        for parameter in &self.parameters {
            parameter.encode(layout, &mut buf);
        }
        for filter in &self.filters {
            filter.to_parameter().encode(layout, &mut buf);
        }
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{cmqc::*, cmqcfc::*},
        layout::ByteOrder,
        pcf::decode_command,
    };

    #[test]
    fn attribute_selector_is_promoted_to_a_list() {
        let command = PcfCommand::new(MQCMD_INQUIRE_Q)
            .with_integer(MQIACF_Q_ATTRS, MQIACF_ALL)
            .with_integer(MQIA_Q_TYPE, MQQT_LOCAL);

        assert_eq!(
            command.parameters(),
            &[
                Parameter::IntegerList {
                    parameter: MQIACF_Q_ATTRS,
                    values: vec![MQIACF_ALL],
                },
                Parameter::Integer {
                    parameter: MQIA_Q_TYPE,
                    value: MQQT_LOCAL,
                },
            ]
        );
    }

    #[test]
    fn header_counts_parameters_and_filters() {
        let filter = Filter::new(MQIA_CURRENT_Q_DEPTH)
            .greater(0)
            .expect("should build filter");
        let command = PcfCommand::new(MQCMD_INQUIRE_Q)
            .with_string(MQCA_Q_NAME, "*")
            .with_filter(filter);

        let header = command.header();
        assert_eq!(header.type_, MQCFT_COMMAND_XR);
        assert_eq!(header.version, MQCFH_VERSION_3);
        assert_eq!(header.command, MQCMD_INQUIRE_Q);
        assert_eq!(header.parameter_count, 2);
    }

    #[test]
    fn encoded_command_decodes() {
        let layout = Layout::packed(ByteOrder::Big);
        let filter = Filter::new(MQCA_Q_NAME).like("APP.*").expect("should build filter");
        let command = PcfCommand::new(MQCMD_INQUIRE_Q_STATUS)
            .with_string(MQCA_Q_NAME, "APP.IN")
            .with_integer_list(MQIACF_Q_STATUS_ATTRS, vec![MQIACF_ALL])
            .with_filter(filter.clone());

        let (header, parameters) = decode_command(&command.encode(layout), layout).expect("should decode");
        assert_eq!(header, command.header());
        assert_eq!(parameters.len(), 3);
        assert_eq!(&parameters[..2], command.parameters());
        assert_eq!(parameters[2], filter.to_parameter());
    }
}
