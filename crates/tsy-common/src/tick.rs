//! Treasury fractional price notation (32nds with eighths).
//!
//! `W-XYZ` means `W + (8*XY + Z)/256` dollars: `W` whole dollars, `XY` a
//! zero-padded count of 32nds, `Z` eighths of a 32nd written `0..7`, with `+`
//! standing for 4. A two-character suffix is the shorthand the input feeds
//! use for a raw count of 1/256 ticks (`0-01` is one tick). Bare decimals
//! are accepted on parse.
//!
//! Everything on the 1/256 grid is exact in `Decimal`. The formatter omits
//! a zero eighths digit, which the parser reads back under the raw-tick
//! shorthand, so `parse_px(&format_px(x)) == x` holds everywhere except the
//! non-zero whole-32nd points.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Parse failure for a fractional or decimal price field.
#[derive(Debug, Error)]
pub enum TickParseError {
    #[error("malformed fractional price {0:?}")]
    Malformed(String),

    #[error("32nds field out of range in {0:?}")]
    OutOfRange(String),
}

const TICKS_PER_DOLLAR: Decimal = Decimal::from_parts(256, 0, 0, false, 0);

/// Parse a fractional-tick or bare-decimal price.
pub fn parse_px(text: &str) -> Result<Decimal, TickParseError> {
    let text = text.trim();
    let dash = match text.find('-') {
        // A leading dash is a sign, not the fraction separator.
        Some(0) | None => {
            return text
                .parse::<Decimal>()
                .map_err(|_| TickParseError::Malformed(text.to_string()));
        }
        Some(pos) => pos,
    };

    let whole: i64 = text[..dash]
        .parse()
        .map_err(|_| TickParseError::Malformed(text.to_string()))?;
    let frac = &text[dash + 1..];

    let ticks: u32 = match frac.len() {
        // Shorthand: two digits are a raw 1/256-tick count.
        2 => frac
            .parse()
            .map_err(|_| TickParseError::Malformed(text.to_string()))?,
        3 => {
            let z = match &frac[2..] {
                "+" => 4,
                d => d
                    .parse::<u32>()
                    .map_err(|_| TickParseError::Malformed(text.to_string()))?,
            };
            let xy: u32 = frac[..2]
                .parse()
                .map_err(|_| TickParseError::Malformed(text.to_string()))?;
            if xy > 31 || z > 7 {
                return Err(TickParseError::OutOfRange(text.to_string()));
            }
            8 * xy + z
        }
        _ => return Err(TickParseError::Malformed(text.to_string())),
    };

    Ok(Decimal::from(whole) + Decimal::from(ticks) / TICKS_PER_DOLLAR)
}

/// Render a price in fractional-tick notation.
///
/// The value is rounded to the nearest 1/256 before rendering; a trailing
/// zero eighths digit is omitted and 4 eighths renders as `+`.
pub fn format_px(price: Decimal) -> String {
    let mut whole = price.trunc().to_i64().unwrap_or(0);
    let frac = price - price.trunc();
    let mut ticks = (frac * TICKS_PER_DOLLAR)
        .round()
        .to_i64()
        .unwrap_or(0);
    if ticks == 256 {
        ticks = 0;
        whole += 1;
    }

    let xy = ticks / 8;
    let z = ticks % 8;
    match z {
        0 => format!("{}-{:02}", whole, xy),
        4 => format!("{}-{:02}+", whole, xy),
        _ => format!("{}-{:02}{}", whole, xy, z),
    }
}
