//! Payload sanitizer
//!
//! Filters a received chunk down to printable ASCII and null-terminates it.

/// Printable range accepted on the display
const PRINTABLE_MIN: u8 = 0x20;
const PRINTABLE_MAX: u8 = 0x7E;

/// Check whether a byte survives sanitization
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (PRINTABLE_MIN..=PRINTABLE_MAX).contains(&byte)
}

/// Sanitize `input` into `output`, returning the number of bytes written
/// (excluding the trailing NUL).
///
/// - Empty `output`: nothing is written, returns 0.
/// - Missing or empty `input`: `output[0]` becomes NUL, returns 0.
/// - Otherwise bytes outside `0x20..=0x7E` (CR and LF included) are dropped,
///   the rest are copied in order until only the terminator slot is left.
///
/// The returned length is always `< output.len()` when `output` is non-empty.
pub fn sanitize(input: Option<&[u8]>, output: &mut [u8]) -> usize {
    if output.is_empty() {
        return 0;
    }

    let input = match input {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            output[0] = 0;
            return 0;
        }
    };

    let limit = output.len() - 1;
    let mut written = 0;

    for &byte in input {
        if written == limit {
            break;
        }
        if !is_printable(byte) {
            continue;
        }
        output[written] = byte;
        written += 1;
    }

    output[written] = 0;
    written
}

/// Sanitize `input` into `output` and view the result as text
///
/// The returned slice excludes the terminator and borrows from `output`.
pub fn sanitize_str<'a>(input: &[u8], output: &'a mut [u8]) -> &'a str {
    let len = sanitize(Some(input), output);
    // Printable ASCII is always valid UTF-8
    std::str::from_utf8(&output[..len]).unwrap_or_default()
}
