//! Binary-coded decimal conversion.
//!
//! CI-V carries every multi-digit number as packed BCD, two decimal digits per
//! byte. Two digit orders are in use on this device:
//!
//! - **low-first** (frequency fields): byte 0 holds the two least significant
//!   digits, with the lower digit in the low nibble. A frequency is 10 digits
//!   in 5 bytes.
//! - **high-first** (level fields): byte 0 holds the most significant digit
//!   pair. An odd digit count leaves the extra digit alone in the low nibble
//!   of byte 0. A level is 4 digits in 2 bytes.
//!
//! Neither direction range-checks. Encoding keeps only the lowest
//! `digits` decimal digits of the value, and decoding assembles whatever
//! nibbles it is given (a nibble above 9 simply contributes its binary
//! value). Controllers rely on this wrap-around behaviour matching the
//! hardware, so it is kept.

/// Digits in a frequency field.
pub const FREQ_DIGITS: usize = 10;

/// Digits in a level field.
pub const LEVEL_DIGITS: usize = 4;

/// Number of bytes needed to hold `digits` BCD digits.
pub const fn byte_len(digits: usize) -> usize {
    digits.div_ceil(2)
}

/// Encode `value` low-digit-first into `byte_len(digits)` bytes.
///
/// ```
/// use civcat_engine::bcd::encode_low_first;
///
/// assert_eq!(encode_low_first(14_250_000, 10), vec![0x00, 0x00, 0x25, 0x14, 0x00]);
/// ```
pub fn encode_low_first(value: u64, digits: usize) -> Vec<u8> {
    let mut out = vec![0u8; byte_len(digits)];
    let mut rest = value;
    for i in 0..digits {
        let digit = (rest % 10) as u8;
        rest /= 10;
        let byte = &mut out[i / 2];
        if i % 2 == 0 {
            *byte |= digit;
        } else {
            *byte |= digit << 4;
        }
    }
    out
}

/// Decode `digits` low-digit-first BCD digits from `bytes`.
///
/// Missing trailing bytes read as zero.
pub fn decode_low_first(bytes: &[u8], digits: usize) -> u64 {
    let mut value: u64 = 0;
    for i in (0..digits).rev() {
        let byte = bytes.get(i / 2).copied().unwrap_or(0);
        let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
        value = value.wrapping_mul(10).wrapping_add(u64::from(nibble));
    }
    value
}

/// Encode `value` high-digit-first into `byte_len(digits)` bytes.
///
/// ```
/// use civcat_engine::bcd::encode_high_first;
///
/// assert_eq!(encode_high_first(128, 4), vec![0x01, 0x28]);
/// assert_eq!(encode_high_first(123, 3), vec![0x01, 0x23]);
/// ```
pub fn encode_high_first(value: u64, digits: usize) -> Vec<u8> {
    let len = byte_len(digits);
    let mut out = vec![0u8; len];
    let mut rest = value;
    for r in 0..digits {
        let digit = (rest % 10) as u8;
        rest /= 10;
        let byte = &mut out[len - 1 - r / 2];
        if r % 2 == 0 {
            *byte |= digit;
        } else {
            *byte |= digit << 4;
        }
    }
    out
}

/// Decode `digits` high-digit-first BCD digits from `bytes`.
///
/// Missing bytes read as zero.
pub fn decode_high_first(bytes: &[u8], digits: usize) -> u64 {
    let len = byte_len(digits);
    let mut value: u64 = 0;
    for r in (0..digits).rev() {
        let byte = bytes.get(len - 1 - r / 2).copied().unwrap_or(0);
        let nibble = if r % 2 == 0 { byte & 0x0F } else { byte >> 4 };
        value = value.wrapping_mul(10).wrapping_add(u64::from(nibble));
    }
    value
}

/// Encode a frequency in hertz as a 5-byte low-first BCD field.
pub fn freq_to_bcd(freq_hz: u64) -> [u8; 5] {
    let mut out = [0u8; 5];
    out.copy_from_slice(&encode_low_first(freq_hz, FREQ_DIGITS));
    out
}

/// Decode a 5-byte low-first BCD frequency field.
pub fn bcd_to_freq(bcd: &[u8]) -> u64 {
    decode_low_first(bcd, FREQ_DIGITS)
}

/// Encode a scaled level as a 2-byte high-first BCD field.
pub fn level_to_bcd(level: u16) -> [u8; 2] {
    let mut out = [0u8; 2];
    out.copy_from_slice(&encode_high_first(u64::from(level), LEVEL_DIGITS));
    out
}

/// Decode a 2-byte high-first BCD level field.
pub fn bcd_to_level(bcd: &[u8]) -> u32 {
    // Four digits never exceed 9999.
    decode_high_first(bcd, LEVEL_DIGITS) as u32
}
