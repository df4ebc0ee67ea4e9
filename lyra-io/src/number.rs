//! 属性值的数字格式：科学计数法 `1.000000e-06` 与定点 `30000.000000`。

use lyra_core::geometry::Vec2;

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("nan")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

/// 六位小数的科学计数法，指数带符号且至少两位。
pub fn format_exp(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }
    let raw = format!("{value:.6e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// 六位小数的定点表示。
pub fn format_fixed(value: f64) -> String {
    match non_finite(value) {
        Some(text) => text.to_string(),
        None => format!("{value:.6}"),
    }
}

/// `"x y"`，两个分量都用科学计数法。
pub fn format_vec2(value: Vec2) -> String {
    format!("{} {}", format_exp(value.x()), format_exp(value.y()))
}

pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

/// 恰好两个以空白分隔的浮点数。
pub fn parse_vec2(raw: &str) -> Option<Vec2> {
    let mut parts = raw.split_whitespace();
    let x = parse_f64(parts.next()?)?;
    let y = parse_f64(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec2::new(x, y))
}

/// `true`/`false` 不区分大小写，另接受 `1`/`0`。
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_has_sign_and_two_digits() {
        assert_eq!(format_exp(1e-6), "1.000000e-06");
        assert_eq!(format_exp(0.0), "0.000000e+00");
        assert_eq!(format_exp(-2500.0), "-2.500000e+03");
        assert_eq!(format_exp(1.5e-100), "1.500000e-100");
        assert_eq!(format_exp(4e-8), "4.000000e-08");
        assert_eq!(format_exp(123456789.0), "1.234568e+08");
        assert_eq!(format_exp(f64::INFINITY), "inf");
        assert_eq!(format_exp(f64::NAN), "nan");
    }

    #[test]
    fn fixed_uses_six_decimals() {
        assert_eq!(format_fixed(30000.0), "30000.000000");
        assert_eq!(format_fixed(1.0), "1.000000");
        assert_eq!(format_fixed(-12.5), "-12.500000");
        assert_eq!(format_fixed(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn parses_attribute_values() {
        assert_eq!(parse_f64(" 2.5e-3 "), Some(2.5e-3));
        assert_eq!(parse_f64("abc"), None);
        assert_eq!(
            parse_vec2("1.000000e-06 -2.000000e+00"),
            Some(Vec2::new(1e-6, -2.0))
        );
        assert_eq!(parse_vec2("1.0"), None);
        assert_eq!(parse_vec2("1 2 3"), None);
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }
}
