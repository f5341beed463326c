//! Civil-date arithmetic on epoch offsets (proleptic Gregorian, UTC).
//!
//! Conversions follow Howard Hinnant's `days_from_civil`/`civil_from_days`.

pub const US_PER_SECOND: i64 = 1_000_000;
pub const US_PER_DAY: i64 = 86_400 * US_PER_SECOND;

/// Days since 1970-01-01 for a civil date. Inputs are not range-checked.
pub fn date_from_ymd(year: i32, month: u32, day: u32) -> i32 {
    let y = year as i64 - i64::from(month <= 2);
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    (era * 146_097 + doe - 719_468) as i32
}

/// Civil `(year, month, day)` for days since 1970-01-01.
pub fn date_to_ymd(days: i32) -> (i32, u32, u32) {
    let z = days as i64 + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y as i32, m as u32, d as u32)
}

/// Broken-down UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub micros: u32,
}

pub fn timestamp_from_parts(p: &DateTimeParts) -> i64 {
    date_from_ymd(p.year, p.month, p.day) as i64 * US_PER_DAY
        + p.hour as i64 * 3_600 * US_PER_SECOND
        + p.minute as i64 * 60 * US_PER_SECOND
        + p.second as i64 * US_PER_SECOND
        + p.micros as i64
}

/// Split microseconds since the epoch into civil parts (floor semantics for
/// instants before 1970).
pub fn timestamp_to_parts(us: i64) -> DateTimeParts {
    let days = us.div_euclid(US_PER_DAY);
    let rem = us.rem_euclid(US_PER_DAY);
    let (year, month, day) = date_to_ymd(days as i32);
    let secs = rem / US_PER_SECOND;
    DateTimeParts {
        year,
        month,
        day,
        hour: (secs / 3_600) as u32,
        minute: ((secs / 60) % 60) as u32,
        second: (secs % 60) as u32,
        micros: (rem % US_PER_SECOND) as u32,
    }
}

pub fn date_to_timestamp(days: i32) -> i64 {
    days as i64 * US_PER_DAY
}

/// `YYYY-MM-DD`.
pub fn format_date(days: i32) -> String {
    let (y, m, d) = date_to_ymd(days);
    format!("{:04}-{:02}-{:02}", y, m, d)
}

/// ISO-8601 with a `Z` suffix; the microsecond fraction is omitted when zero
/// and otherwise trimmed of trailing zeros.
pub fn format_timestamp(us: i64) -> String {
    let p = timestamp_to_parts(us);
    let mut out = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        p.year, p.month, p.day, p.hour, p.minute, p.second
    );
    if p.micros > 0 {
        let frac = format!("{:06}", p.micros);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(date_from_ymd(1970, 1, 1), 0);
        assert_eq!(date_to_ymd(0), (1970, 1, 1));
    }

    #[test]
    fn civil_roundtrip_across_eras() {
        for days in [-719_468, -1, 59, 10_957, 11_016, 19_723, 2_932_896] {
            let (y, m, d) = date_to_ymd(days);
            assert_eq!(date_from_ymd(y, m, d), days);
        }
        assert_eq!(date_from_ymd(2000, 3, 1), 11_017);
        assert_eq!(date_to_ymd(-1), (1969, 12, 31));
    }

    #[test]
    fn timestamp_parts_floor_before_epoch() {
        let p = timestamp_to_parts(-1);
        assert_eq!((p.year, p.month, p.day), (1969, 12, 31));
        assert_eq!((p.hour, p.minute, p.second, p.micros), (23, 59, 59, 999_999));
    }

    #[test]
    fn timestamp_format_trims_fraction() {
        let base = date_to_timestamp(date_from_ymd(2024, 1, 15)) + 10 * 3_600 * US_PER_SECOND;
        assert_eq!(format_timestamp(base), "2024-01-15T10:00:00Z");
        assert_eq!(format_timestamp(base + 500_000), "2024-01-15T10:00:00.5Z");
        assert_eq!(format_timestamp(base + 123), "2024-01-15T10:00:00.000123Z");
    }
}
