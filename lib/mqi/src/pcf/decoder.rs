use tracing::trace;

use crate::{
    constants::cmqcfc::MQCFH_STRUC_LENGTH,
    error::{InvalidLength, Result},
    layout::Layout,
};

use super::{CommandHeader, Parameter, ParameterMap, PcfValue};

/// A group whose children are still being read.
struct Frame {
    parameter: i32,
    remaining: usize,
    map: ParameterMap,
}

/// Decodes a PCF response message into its parameters and header.
///
/// Parameters are read until the header's `ParameterCount` is exhausted. Each group parameter opens a frame that
/// collects the group's own `ParameterCount` children, so groups may nest to any depth. A completed group is
/// appended to its parent under the group's parameter identifier; repeated scalar identifiers overwrite earlier
/// values.
///
/// # Errors
///
/// If the header reports a failed completion code, `Error::Mqi` is returned with the header's completion and reason
/// codes. Malformed parameter records fail with the parameter decoder's error.
pub fn decode_response(buf: &[u8], layout: Layout) -> Result<(ParameterMap, CommandHeader)> {
    let header = CommandHeader::decode(buf, layout)?;
    header.check_completion()?;

    let mut remaining = count("ParameterCount", header.parameter_count)?;
    let mut root = ParameterMap::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut cursor = MQCFH_STRUC_LENGTH;

    loop {
        while frames.last().is_some_and(|frame| frame.remaining == 0) {
            if let Some(frame) = frames.pop() {
                let parent = frames.last_mut().map_or(&mut root, |parent| &mut parent.map);
                append_group(parent, frame.parameter, frame.map);
            }
        }

        let outstanding = frames.last_mut().map_or(&mut remaining, |frame| &mut frame.remaining);
        if *outstanding == 0 {
            break;
        }
        *outstanding -= 1;

        let (parameter, used) = Parameter::decode(&buf[cursor..], layout)?;
        cursor += used;

        match parameter {
            Parameter::Group { parameter, count: children } => frames.push(Frame {
                parameter,
                remaining: count("ParameterCount", children)?,
                map: ParameterMap::new(),
            }),
            other => {
                let id = other.parameter();
                let target = frames.last_mut().map_or(&mut root, |frame| &mut frame.map);
                if let Some(value) = other.into_value() {
                    target.insert(id, value);
                }
            }
        }
    }

    trace!(
        command = header.command,
        parameters = root.len(),
        last = header.is_last(),
        "Decoded PCF response."
    );
    Ok((root, header))
}

/// Decodes a PCF command message into its header and parameter records, in order.
///
/// Group records are returned as they appear, without collecting their children.
pub fn decode_command(buf: &[u8], layout: Layout) -> Result<(CommandHeader, Vec<Parameter>)> {
    let header = CommandHeader::decode(buf, layout)?;
    let total = count("ParameterCount", header.parameter_count)?;

    let mut parameters = Vec::with_capacity(total);
    let mut cursor = MQCFH_STRUC_LENGTH;
    let mut outstanding = total;
    while outstanding > 0 {
        let (parameter, used) = Parameter::decode(&buf[cursor..], layout)?;
        cursor += used;
        outstanding -= 1;
        if let Parameter::Group { count: children, .. } = &parameter {
            outstanding += count("ParameterCount", *children)?;
        }
        parameters.push(parameter);
    }

    Ok((header, parameters))
}

fn append_group(map: &mut ParameterMap, parameter: i32, group: ParameterMap) {
    match map.get_mut(&parameter) {
        Some(PcfValue::Group(groups)) => groups.push(group),
        _ => {
            map.insert(parameter, PcfValue::Group(vec![group]));
        }
    }
}

fn count(what: &'static str, value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        InvalidLength {
            what,
            length: i64::from(value),
        }
        .build()
    })
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};
    use similar_asserts::assert_eq;

    use super::*;
    use crate::{
        constants::{cmqc::*, cmqcfc::*},
        error::Error,
        layout::ByteOrder,
        structure::pack_into,
    };

    fn message(header: CommandHeader, parameters: &[Parameter], layout: Layout) -> BytesMut {
        let mut buf = BytesMut::new();
        pack_into(&header, layout, &mut buf);
        for parameter in parameters {
            parameter.encode(layout, &mut buf);
        }
        buf
    }

    fn response(count: i32) -> CommandHeader {
        CommandHeader {
            type_: MQCFT_RESPONSE,
            parameter_count: count,
            ..CommandHeader::default()
        }
    }

    fn int(parameter: i32, value: i32) -> Parameter {
        Parameter::Integer { parameter, value }
    }

    fn group(parameter: i32, count: i32) -> Parameter {
        Parameter::Group { parameter, count }
    }

    #[test]
    fn empty_response() {
        let layout = Layout::native();
        let buf = message(response(0), &[], layout);

        let (map, header) = decode_response(&buf, layout).expect("should decode");
        assert!(map.is_empty());
        assert_eq!(header.parameter_count, 0);
    }

    #[test]
    fn integer_and_string() {
        let layout = Layout::packed(ByteOrder::Big);
        let parameters = [
            int(100, 42),
            Parameter::String {
                parameter: 200,
                ccsid: 0,
                value: Bytes::from_static(b"abc"),
            },
        ];
        let buf = message(response(2), &parameters, layout);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        let mut expected = ParameterMap::new();
        expected.insert(100, PcfValue::Integer(42));
        expected.insert(200, PcfValue::String(Bytes::from_static(b"abc")));
        assert_eq!(map, expected);
    }

    #[test]
    fn group_collects_its_children() {
        let layout = Layout::packed(ByteOrder::Little);
        let parameters = [group(8000, 1), int(5, 7)];
        let buf = message(response(1), &parameters, layout);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        let mut inner = ParameterMap::new();
        inner.insert(5, PcfValue::Integer(7));
        assert_eq!(map.get(&8000), Some(&PcfValue::Group(vec![inner])));
    }

    #[test]
    fn repeated_groups_append_and_top_level_resumes() {
        let layout = Layout::packed(ByteOrder::Little);
        let parameters = [
            int(1, 10),
            group(8000, 2),
            int(5, 1),
            int(6, 2),
            group(8000, 1),
            int(5, 3),
            int(2, 20),
        ];
        let buf = message(response(4), &parameters, layout);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 8000, 2]);

        let groups = map.get(&8000).and_then(PcfValue::as_groups).expect("should hold groups");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].get(&6), Some(&PcfValue::Integer(2)));
        assert_eq!(groups[1].get(&5), Some(&PcfValue::Integer(3)));
        assert_eq!(map.get(&2), Some(&PcfValue::Integer(20)));
    }

    #[test]
    fn nested_groups_attach_to_their_parent() {
        let layout = Layout::packed(ByteOrder::Big);
        let parameters = [group(8000, 2), group(8001, 1), int(5, 7), int(6, 8)];
        let buf = message(response(1), &parameters, layout);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        assert_eq!(map.len(), 1);

        let outer = &map.get(&8000).and_then(PcfValue::as_groups).expect("outer group")[0];
        assert_eq!(outer.get(&6), Some(&PcfValue::Integer(8)));
        let inner = &outer.get(&8001).and_then(PcfValue::as_groups).expect("inner group")[0];
        assert_eq!(inner.get(&5), Some(&PcfValue::Integer(7)));
    }

    #[test]
    fn empty_group_is_recorded() {
        let layout = Layout::packed(ByteOrder::Little);
        let parameters = [group(8000, 0), int(1, 1)];
        let buf = message(response(2), &parameters, layout);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        assert_eq!(map.get(&8000), Some(&PcfValue::Group(vec![ParameterMap::new()])));
        assert_eq!(map.get(&1), Some(&PcfValue::Integer(1)));
    }

    #[test]
    fn failed_completion_carries_codes() {
        let layout = Layout::native();
        let header = CommandHeader {
            comp_code: MQCC_FAILED,
            reason: MQRC_UNKNOWN_OBJECT_NAME,
            ..response(0)
        };
        let buf = message(header, &[], layout);

        let error = decode_response(&buf, layout).expect_err("should fail");
        let mqi = error.as_mqi().expect("should be an MQI error");
        assert_eq!(mqi.comp, MQCC_FAILED);
        assert_eq!(mqi.reason, MQRC_UNKNOWN_OBJECT_NAME);
    }

    #[test]
    fn unknown_parameter_type_fails() {
        let layout = Layout::packed(ByteOrder::Little);
        let mut buf = message(response(1), &[int(1, 1)], layout);
        buf[MQCFH_STRUC_LENGTH] = 77;

        let error = decode_response(&buf, layout).expect_err("should fail");
        assert!(matches!(error, Error::UnsupportedParameterType { tag: 77 }));
    }

    #[test]
    fn missing_parameters_are_truncation() {
        let layout = Layout::packed(ByteOrder::Little);
        let buf = message(response(2), &[int(1, 1)], layout);

        let error = decode_response(&buf, layout).expect_err("should fail");
        assert!(matches!(error, Error::Truncated { .. }));
    }

    #[test]
    fn negative_parameter_count_is_rejected() {
        let layout = Layout::packed(ByteOrder::Little);
        let buf = message(response(-1), &[], layout);

        let error = decode_response(&buf, layout).expect_err("should fail");
        assert!(matches!(error, Error::InvalidLength { length: -1, .. }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let layout = Layout::packed(ByteOrder::Little);
        let mut buf = message(response(1), &[int(1, 1)], layout);
        buf.extend_from_slice(&[0xff; 8]);

        let (map, _) = decode_response(&buf, layout).expect("should decode");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn command_records_are_listed_in_order() {
        let layout = Layout::packed(ByteOrder::Big);
        let parameters = [
            Parameter::String {
                parameter: MQCA_Q_NAME,
                ccsid: 0,
                value: Bytes::from_static(b"*"),
            },
            group(8000, 1),
            int(5, 7),
        ];
        let buf = message(CommandHeader::command(MQCMD_INQUIRE_Q, 2), &parameters, layout);

        let (header, decoded) = decode_command(&buf, layout).expect("should decode");
        assert_eq!(header.command, MQCMD_INQUIRE_Q);
        assert_eq!(decoded, parameters.to_vec());
    }
}
