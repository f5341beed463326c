//! Fast field parsers used for type detection and direct-mode decoding.
//!
//! All parsers work on raw field bytes and return `None` on anything they do
//! not fully accept.

use sluice_core::temporal::{date_from_ymd, date_to_timestamp, US_PER_SECOND};
use sluice_core::value::ValueKind;

const POW10: [f64; 19] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18,
];

/// Longest slice handed to the fallback float parser.
const FLOAT_FALLBACK_MAX: usize = 64;

/// Optional sign and 1..=19 decimal digits, range-checked to `i64`.
pub fn parse_int64(s: &[u8]) -> Option<i64> {
    let (negative, digits) = match s.first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || digits.len() > 19 {
        return None;
    }
    let mut magnitude: u64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        magnitude = magnitude * 10 + u64::from(b - b'0');
    }
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Decimal float: short plain decimals take the mantissa/pow10 fast path,
/// exponents and long mantissas go through the standard parser. Tokens with no
/// digits (`nan`, `inf`) and values outside the finite range are rejected.
pub fn parse_float64(s: &[u8]) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let mut i = 0;
    let negative = match s[0] {
        b'-' => {
            i = 1;
            true
        }
        b'+' => {
            i = 1;
            false
        }
        _ => false,
    };

    let mut mantissa: u64 = 0;
    let mut n_digits = 0usize;
    let mut n_frac = 0usize;
    while i < s.len() && s[i].is_ascii_digit() {
        mantissa = mantissa.wrapping_mul(10).wrapping_add(u64::from(s[i] - b'0'));
        n_digits += 1;
        i += 1;
    }
    if i < s.len() && s[i] == b'.' {
        i += 1;
        while i < s.len() && s[i].is_ascii_digit() {
            mantissa = mantissa.wrapping_mul(10).wrapping_add(u64::from(s[i] - b'0'));
            n_digits += 1;
            n_frac += 1;
            i += 1;
        }
    }

    if n_digits == 0 {
        return None;
    }
    if i == s.len() && n_digits <= 18 {
        let v = mantissa as f64 / POW10[n_frac];
        return Some(if negative { -v } else { v });
    }
    if s.len() >= FLOAT_FALLBACK_MAX {
        return None;
    }
    std::str::from_utf8(s)
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn fixed_digits(s: &[u8]) -> Option<u32> {
    let mut v = 0u32;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        v = v * 10 + u32::from(b - b'0');
    }
    Some(v)
}

/// Exactly `YYYY-MM-DD`; returns days since 1970-01-01.
pub fn parse_date(s: &[u8]) -> Option<i32> {
    if s.len() != 10 || s[4] != b'-' || s[7] != b'-' {
        return None;
    }
    let year = fixed_digits(&s[0..4])?;
    let month = fixed_digits(&s[5..7])?;
    let day = fixed_digits(&s[8..10])?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(date_from_ymd(year as i32, month, day))
}

/// `YYYY-MM-DD[T| ]HH:MM:SS[.frac][Z|±HH[:MM]]`; returns UTC microseconds.
pub fn parse_timestamp(s: &[u8]) -> Option<i64> {
    if s.len() < 19 {
        return None;
    }
    if s[10] != b'T' && s[10] != b' ' {
        return None;
    }
    if s[13] != b':' || s[16] != b':' {
        return None;
    }
    let days = parse_date(&s[..10])?;
    let hour = fixed_digits(&s[11..13])?;
    let minute = fixed_digits(&s[14..16])?;
    let second = fixed_digits(&s[17..19])?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let mut pos = 19;
    let mut micros = 0u32;
    if pos < s.len() && s[pos] == b'.' {
        pos += 1;
        let mut kept = 0;
        while pos < s.len() && s[pos].is_ascii_digit() {
            if kept < 6 {
                micros = micros * 10 + u32::from(s[pos] - b'0');
                kept += 1;
            }
            pos += 1;
        }
        for _ in kept..6 {
            micros *= 10;
        }
    }

    let mut offset_secs: i64 = 0;
    if pos < s.len() {
        match s[pos] {
            b'Z' => pos += 1,
            sign @ (b'+' | b'-') => {
                pos += 1;
                let hours = fixed_digits(s.get(pos..pos + 2)?)?;
                pos += 2;
                if pos < s.len() && s[pos] == b':' {
                    pos += 1;
                }
                let mut minutes = 0;
                if pos < s.len() {
                    minutes = fixed_digits(s.get(pos..pos + 2)?)?;
                    pos += 2;
                }
                offset_secs = i64::from(hours) * 3_600 + i64::from(minutes) * 60;
                if sign == b'-' {
                    offset_secs = -offset_secs;
                }
            }
            _ => return None,
        }
    }
    if pos != s.len() {
        return None;
    }

    let time_of_day = (i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second))
        * US_PER_SECOND
        + i64::from(micros);
    Some(date_to_timestamp(days) + time_of_day - offset_secs * US_PER_SECOND)
}

/// Narrowest kind that accepts `s`. Booleans are never inferred.
pub fn detect_kind(s: &[u8]) -> ValueKind {
    if s.is_empty() {
        ValueKind::Null
    } else if parse_int64(s).is_some() {
        ValueKind::Int64
    } else if parse_float64(s).is_some() {
        ValueKind::Float64
    } else if parse_date(s).is_some() {
        ValueKind::Date
    } else if parse_timestamp(s).is_some() {
        ValueKind::Timestamp
    } else {
        ValueKind::String
    }
}
