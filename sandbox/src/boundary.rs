//! Module boundary scanner.
//!
//! Deployment appends constructor arguments after the last section of a
//! binary module. The interpreter must never see those bytes, so every
//! invocation first walks the section headers to find where the genuine
//! module ends.

use ewasm_primitives::codec::Reader;

/// Length of the magic number and version preamble.
pub const PREAMBLE_LENGTH: usize = 8;

/// Highest section id recognized by the scanner (the data section).
const MAX_SECTION_ID: u8 = 11;

/// Find the byte offset at which the genuine module ends.
///
/// Walks `(id: u8, size: LEB128 u32)` section headers after the preamble
/// and stops at the first header that is not a valid section: an id of 0
/// or above 11, a header that cannot be read, or a size running past the
/// buffer. Never fails and never returns more than `code.len()`.
pub fn scan_boundary(code: &[u8]) -> usize {
    if code.len() < PREAMBLE_LENGTH {
        return code.len();
    }
    let mut reader = Reader::new(code);
    reader.seek(PREAMBLE_LENGTH);
    let mut top = PREAMBLE_LENGTH;
    loop {
        match reader.read_u8() {
            Ok(id) if (1..=MAX_SECTION_ID).contains(&id) => {}
            _ => break,
        }
        let size = match reader.read_var_u32() {
            Ok(size) => size as usize,
            Err(_) => break,
        };
        let end = match reader.position().checked_add(size) {
            Some(end) if end <= code.len() => end,
            _ => break,
        };
        reader.seek(end);
        top = end;
    }
    top
}

/// Strip any trailer from `code`.
pub fn trim(code: &[u8]) -> &[u8] {
    &code[..scan_boundary(code)]
}
