//! Reserved selector bytes.
//!
//! Variable-length tokens start with a selector byte. Values below the first
//! reserved selector are stored inline in that byte; reserved selectors
//! announce a wider fixed-width payload.

/// Compact int: signed 16-bit payload follows.
pub const INT_SHORT: u8 = 254;

/// Compact int: signed 32-bit payload follows.
pub const INT_FULL: u8 = 255;

/// Compact long: signed 16-bit payload follows.
pub const LONG_SHORT: u8 = 253;

/// Compact long: signed 32-bit payload follows.
pub const LONG_INT: u8 = 254;

/// Compact long: signed 64-bit payload follows.
pub const LONG_FULL: u8 = 255;

/// Big integer: signed 16-bit payload follows.
pub const BIG_SHORT: u8 = 0;

/// Big integer: signed 32-bit payload follows.
pub const BIG_INT: u8 = 1;

/// Big integer: signed 64-bit payload follows.
pub const BIG_LONG: u8 = 2;

/// Big integer: length-prefixed decimal rendering follows.
pub const BIG_DECIMAL: u8 = 3;

/// Big integer: first selector carrying an inline value (`selector - 4`).
pub const BIG_INLINE_OFFSET: u8 = 4;

/// Largest big integer stored inline in its selector byte.
pub const BIG_INLINE_MAX: i16 = 251;

/// Shared string: signed 32-bit dictionary index follows.
pub const STRING_INDEX: u8 = 254;

/// Shared string: first occurrence, length-prefixed UTF-8 follows.
pub const STRING_NEW: u8 = 255;

/// Returns a human-readable name for a big integer selector.
pub fn big_integer_selector_name(selector: u8) -> &'static str {
    match selector {
        BIG_SHORT => "SHORT",
        BIG_INT => "INT",
        BIG_LONG => "LONG",
        BIG_DECIMAL => "DECIMAL",
        _ => "INLINE",
    }
}

/// Returns true if a compact int with this selector is complete in one byte.
pub fn is_inline_int(selector: u8) -> bool {
    selector < INT_SHORT
}

/// Returns true if a compact long with this selector is complete in one byte.
pub fn is_inline_long(selector: u8) -> bool {
    selector < LONG_SHORT
}

/// Returns true if a shared string selector is itself a dictionary index.
pub fn is_inline_index(selector: u8) -> bool {
    selector < STRING_INDEX
}
