//! Boundary scanner properties.
//!
//! Checks the scanner against generated section layouts and against real
//! modules compiled from WAT with constructor arguments appended.

mod common;

use ewasm_sandbox::boundary::{scan_boundary, trim, PREAMBLE_LENGTH};
use proptest::prelude::*;

use common::*;

const PREAMBLE: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

fn leb128(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn assemble(sections: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut out = PREAMBLE.to_vec();
    for (id, body) in sections {
        out.push(*id);
        out.extend(leb128(body.len() as u32));
        out.extend_from_slice(body);
    }
    out
}

fn section() -> impl Strategy<Value = (u8, Vec<u8>)> {
    (1u8..=11, prop::collection::vec(any::<u8>(), 0..300))
}

proptest! {
    #[test]
    fn prop_untrailed_module_scans_to_end(sections in prop::collection::vec(section(), 0..8)) {
        let code = assemble(&sections);
        prop_assert_eq!(scan_boundary(&code), code.len());
    }

    #[test]
    fn prop_invalid_trailer_is_excluded(
        sections in prop::collection::vec(section(), 0..8),
        first in prop_oneof![Just(0u8), 12u8..=255],
        rest in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let code = assemble(&sections);
        let mut trailed = code.clone();
        trailed.push(first);
        trailed.extend_from_slice(&rest);
        let boundary = scan_boundary(&trailed);
        prop_assert!(boundary < trailed.len());
        prop_assert_eq!(boundary, code.len());
    }

    #[test]
    fn prop_never_past_end(code in prop::collection::vec(any::<u8>(), 0..512)) {
        let boundary = scan_boundary(&code);
        prop_assert!(boundary <= code.len());
        if code.len() >= PREAMBLE_LENGTH {
            prop_assert!(boundary >= PREAMBLE_LENGTH);
        } else {
            prop_assert_eq!(boundary, code.len());
        }
    }
}

#[test]
fn test_compiled_module_has_no_trailer() {
    let code = compile(ECHO);
    assert_eq!(scan_boundary(&code), code.len());
}

#[test]
fn test_constructor_arguments_are_stripped() {
    let code = compile(ECHO);
    let mut deployed = code.clone();
    // a zero id can never start a section
    deployed.extend_from_slice(&[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(trim(&deployed), &code[..]);
}

#[test]
fn test_trailed_module_still_runs() {
    let fx = Fixture::new();
    let mut deployed = compile(ECHO);
    deployed.extend_from_slice(&[0x00; 40]);
    fx.deploy(CONTRACT, deployed);
    assert_eq!(fx.call(CONTRACT, b"ping").unwrap(), b"ping".to_vec());
}
