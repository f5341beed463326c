//! Number rendering shared by encoders and summary steps.

/// Render `v` like C's `%.{precision}g`: `precision` significant digits,
/// trailing zeros removed, scientific notation when the exponent is below -4
/// or at least `precision`.
pub fn format_general(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let p = precision.max(1);
    let sci = format!("{:.*e}", p - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= p as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `%.17g`: enough digits to round-trip any `f64`.
pub fn format_roundtrip(v: f64) -> String {
    format_general(v, 17)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_matches_printf_style() {
        assert_eq!(format_general(18.0, 6), "18");
        assert_eq!(format_general(3.14159265, 6), "3.14159");
        assert_eq!(format_general(0.0001, 6), "0.0001");
        assert_eq!(format_general(0.00001, 6), "1e-05");
        assert_eq!(format_general(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_general(-2.5, 6), "-2.5");
        assert_eq!(format_general(100000.0, 6), "100000");
    }

    #[test]
    fn roundtrip_keeps_all_digits() {
        assert_eq!(format_roundtrip(0.1), "0.10000000000000001");
        assert_eq!(format_roundtrip(42.0), "42");
    }
}
