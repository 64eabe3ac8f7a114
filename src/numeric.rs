use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a loosely formatted number ("12", "6.32", "1,204", "24*").
/// Returns `None` for blanks, dashes and anything that doesn't reduce to a finite value.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    // Strip common decorations (not-out stars, units, thousands separators).
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Serde helper: numbers, numeric strings, blanks and null all land as an `f64` (0 when missing).
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_value).unwrap_or(0.0))
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_value))
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "*"
        ),
        _ => false,
    })
}

/// Half-up rounding to `places` decimals (ties go towards +inf, so -0.125 -> -0.12).
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor + 0.5).floor() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Whole-number percentage, clamped to 0..=100.
pub fn whole_pct(value: f64) -> u8 {
    round_to(value, 0).clamp(0.0, 100.0) as u8
}

pub fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_handles_decorations() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number(" 6.32 "), Some(6.32));
        assert_eq!(parse_number("1,204"), Some(1204.0));
        assert_eq!(parse_number("87*"), Some(87.0));
        assert!(parse_number("").is_none());
        assert!(parse_number("-").is_none());
        assert!(parse_number("n/a").is_none());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to(1.005 * 1000.0, 0), 1005.0);
        assert_eq!(round2(2.675_000_1), 2.68);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }

    #[test]
    fn ratio_guards_denominator() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(5.0, -1.0), 0.0);
        assert_eq!(ratio(5.0, 2.0), 2.5);
    }

    #[test]
    fn whole_pct_clamps() {
        assert_eq!(whole_pct(104.2), 100);
        assert_eq!(whole_pct(-3.0), 0);
        assert_eq!(whole_pct(49.5), 50);
    }
}
