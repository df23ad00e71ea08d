// ABOUTME: Encodes unsigned integers into fixed-width printable strings over a 64-symbol alphabet.
// ABOUTME: Each symbol carries 6 bits; unused leading positions are filled with a reserved pad symbol.

use crate::error::CoreError;

/// Number of bits carried by one symbol.
pub const BITS_PER_SYMBOL: usize = 6;

/// Code point of the symbol representing the digit value 0.
pub const BASE_SYMBOL: u8 = b'(';

/// Code point of the symbol representing the digit value 63.
pub const LAST_SYMBOL: u8 = BASE_SYMBOL + DIGIT_MASK as u8;

/// Reserved left-padding symbol. Lies outside the digit alphabet.
pub const PAD_SYMBOL: u8 = b'#';

const DIGIT_MASK: u64 = (1 << BITS_PER_SYMBOL) - 1;

// Widths at or above this many symbols can hold any non-negative i64.
const UNBOUNDED_WIDTH: usize = 64 / BITS_PER_SYMBOL + 1;

const _: () = assert!(PAD_SYMBOL < BASE_SYMBOL);

/// Encode `value` into exactly `width` symbols.
///
/// Digits are written least-significant first, starting from the rightmost
/// position. Zero encodes as `width - 1` pad symbols followed by the zero digit.
pub fn encode(value: i64, width: usize) -> Result<String, CoreError> {
    if width == 0 {
        return Err(CoreError::validation("encoding width must be at least one symbol"));
    }
    if value < 0 {
        return Err(CoreError::Overflow { value, width });
    }

    let mut remaining = value as u64;
    if width < UNBOUNDED_WIDTH && remaining >> (BITS_PER_SYMBOL * width) != 0 {
        return Err(CoreError::Overflow { value, width });
    }

    let mut symbols = vec![PAD_SYMBOL; width];
    let mut position = width;
    loop {
        position -= 1;
        symbols[position] = BASE_SYMBOL + (remaining & DIGIT_MASK) as u8;
        remaining >>= BITS_PER_SYMBOL;
        if remaining == 0 {
            break;
        }
    }

    Ok(symbols.into_iter().map(char::from).collect())
}

/// Decode a string produced by a single [`encode`] call; its width is the string length.
///
/// Symbols are read from the end toward the start. The first pad symbol met
/// ends the value; anything before it is ignored.
pub fn decode(symbols: &str) -> Result<i64, CoreError> {
    if symbols.is_empty() {
        return Err(CoreError::validation("cannot decode an empty symbol string"));
    }

    let mut value: u128 = 0;
    for (position, symbol) in symbols.chars().rev().enumerate() {
        if symbol == char::from(PAD_SYMBOL) {
            break;
        }
        let digit = digit_of(symbol)?;
        if digit == 0 {
            continue;
        }
        let shift = position * BITS_PER_SYMBOL;
        if shift + BITS_PER_SYMBOL > 128 {
            return Err(CoreError::encoding(format!(
                "encoded value {symbols:?} exceeds the supported integer range"
            )));
        }
        value |= u128::from(digit) << shift;
    }

    i64::try_from(value).map_err(|_| {
        CoreError::encoding(format!(
            "encoded value {symbols:?} exceeds the supported integer range"
        ))
    })
}

/// Encode each `(width, value)` pair in order and concatenate the results.
pub fn encode_many(fields: &[(usize, i64)]) -> Result<String, CoreError> {
    let mut out = String::with_capacity(fields.iter().map(|(width, _)| width).sum());
    for &(width, value) in fields {
        out.push_str(&encode(value, width)?);
    }
    Ok(out)
}

/// Split `symbols` into consecutive fields of the given widths and decode each.
pub fn decode_many(symbols: &str, widths: &[usize]) -> Result<Vec<i64>, CoreError> {
    if widths.contains(&0) {
        return Err(CoreError::validation("field widths must be at least one symbol"));
    }

    let total: usize = widths.iter().sum();
    let length = symbols.chars().count();
    if total != length {
        return Err(CoreError::encoding(format!(
            "expected {total} symbols for fields {widths:?}, found {length}"
        )));
    }
    if !symbols.is_ascii() {
        return Err(CoreError::encoding(format!(
            "encoded string {symbols:?} contains non-ASCII symbols"
        )));
    }

    let mut values = Vec::with_capacity(widths.len());
    let mut offset = 0;
    for &width in widths {
        values.push(decode(&symbols[offset..offset + width])?);
        offset += width;
    }
    Ok(values)
}

fn digit_of(symbol: char) -> Result<u8, CoreError> {
    match u8::try_from(symbol) {
        Ok(code) if (BASE_SYMBOL..=LAST_SYMBOL).contains(&code) => Ok(code - BASE_SYMBOL),
        _ => Err(CoreError::encoding(format!("invalid symbol {symbol:?}"))),
    }
}
