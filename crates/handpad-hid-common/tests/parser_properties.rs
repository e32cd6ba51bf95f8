//! Arbitrary input never panics the parser; reads agree with std decoding.

use handpad_errors::TransportError;
use handpad_hid_common::{ReportBuilder, ReportParser};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_offset_reads_are_total(data in proptest::collection::vec(any::<u8>(), 0..80), offset in 0usize..100) {
        let parser = ReportParser::new(&data);
        match parser.u16_le_at(offset) {
            Ok(value) => {
                let lo = data.get(offset).copied();
                let hi = data.get(offset + 1).copied();
                prop_assert_eq!(Some(value), lo.zip(hi).map(|(l, h)| u16::from_le_bytes([l, h])));
            }
            Err(err) => prop_assert_eq!(
                err,
                TransportError::ShortReport { expected: offset + 2, actual: data.len() }
            ),
        }
    }

    #[test]
    fn prop_builder_then_parser_agree(len in 2usize..64, value in any::<i16>()) {
        let offset = len - 2;
        let mut builder = ReportBuilder::new(len);
        builder.put_i16_le(offset, value);
        prop_assert!(!builder.overflowed());

        let bytes = builder.into_inner();
        let parser = ReportParser::new(&bytes);
        prop_assert_eq!(parser.i16_le_at(offset), Ok(value));
    }
}

#[test]
fn test_short_report_message() {
    let data = [0u8; 3];
    let err = ReportParser::new(&data).require(12);
    insta::assert_snapshot!(
        err.map_or_else(|e| e.to_string(), |()| String::new()),
        @"Short report: expected 12 bytes, got 3"
    );
}
