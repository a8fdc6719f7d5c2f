//! Raw sort values as the external store hands them out.
//!
//! A sort attribute can arrive as a plain number, as numeric text, as a
//! fixed-point decimal, or not at all. Ranking only ever needs a finite `f64`
//! from it, so [`SortValue::coerce`] is total: anything absent or unparseable
//! collapses to `0.0`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A sort attribute value before coercion.
///
/// Deserializes untagged: `null` → `Absent`, JSON number → `Number`,
/// string → `Text`, `{ "mantissa": .., "scale": .. }` → `Decimal`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortValue {
    #[default]
    Absent,
    Number(f64),
    Text(String),
    Decimal(DecimalKey),
}

impl SortValue {
    /// Coerce to a finite number. Absent, non-finite or unparseable → `0.0`.
    pub fn coerce(&self) -> f64 {
        let n = match self {
            SortValue::Absent => return 0.0,
            SortValue::Number(n) => *n,
            SortValue::Text(s) => match parse_leading_float(s) {
                Some(n) => n,
                None => return 0.0,
            },
            SortValue::Decimal(d) => d.to_f64(),
        };
        if n.is_finite() { n } else { 0.0 }
    }

    /// Whether coercion had to fall back to the default.
    ///
    /// `Absent` is not a fallback; it is the documented default.
    pub fn is_unparseable(&self) -> bool {
        match self {
            SortValue::Absent => false,
            SortValue::Number(n) => !n.is_finite(),
            SortValue::Text(s) => !parse_leading_float(s).is_some_and(f64::is_finite),
            SortValue::Decimal(d) => !d.to_f64().is_finite(),
        }
    }
}

impl From<f64> for SortValue {
    fn from(n: f64) -> Self {
        SortValue::Number(n)
    }
}

impl From<i64> for SortValue {
    fn from(n: i64) -> Self {
        SortValue::Number(n as f64)
    }
}

impl From<i32> for SortValue {
    fn from(n: i32) -> Self {
        SortValue::Number(n as f64)
    }
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        SortValue::Text(s.to_string())
    }
}

impl From<DecimalKey> for SortValue {
    fn from(d: DecimalKey) -> Self {
        SortValue::Decimal(d)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SortValue::Absent, Into::into)
    }
}

/// Fixed-point decimal: `mantissa × 10^-scale`.
///
/// Used where the store's sort attribute is a decimal type, and for the rank
/// handed back to the commit action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DecimalKey {
    pub mantissa: i64,
    #[serde(default)]
    pub scale: u32,
}

impl DecimalKey {
    pub fn new(mantissa: i64, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// An integral decimal (scale 0), e.g. a dense rank.
    pub fn integral(n: i64) -> Self {
        Self { mantissa: n, scale: 0 }
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale.min(i32::MAX as u32) as i32)
    }
}

impl fmt::Display for DecimalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int}.{frac}")
    }
}

/// Parse the longest numeric prefix of `s`, after leading whitespace.
///
/// `"12.5px"` → `12.5`, `" -3e2 "` → `-300`, `"abc"` → `None`. An exponent
/// marker with no digits after it is not part of the prefix.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_variants() {
        assert_eq!(SortValue::Absent.coerce(), 0.0);
        assert_eq!(SortValue::Number(3.5).coerce(), 3.5);
        assert_eq!(SortValue::from("7").coerce(), 7.0);
        assert_eq!(SortValue::Decimal(DecimalKey::new(1250, 2)).coerce(), 12.5);
    }

    #[test]
    fn test_coerce_non_finite_falls_back_to_zero() {
        assert_eq!(SortValue::Number(f64::NAN).coerce(), 0.0);
        assert_eq!(SortValue::Number(f64::INFINITY).coerce(), 0.0);
        assert_eq!(SortValue::from("Infinity").coerce(), 0.0);
        assert_eq!(SortValue::from("1e999").coerce(), 0.0);
        assert!(SortValue::from("1e999").is_unparseable());
    }

    #[test]
    fn test_coerce_garbage_text_is_zero() {
        assert_eq!(SortValue::from("not a number").coerce(), 0.0);
        assert_eq!(SortValue::from("").coerce(), 0.0);
        assert!(SortValue::from("nope").is_unparseable());
        assert!(!SortValue::Absent.is_unparseable());
    }

    #[test]
    fn test_parse_leading_float_prefixes() {
        assert_eq!(parse_leading_float("12.5px"), Some(12.5));
        assert_eq!(parse_leading_float("  -3e2 "), Some(-300.0));
        assert_eq!(parse_leading_float("4e"), Some(4.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("5."), Some(5.0));
        assert_eq!(parse_leading_float("+"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("x1"), None);
    }

    #[test]
    fn test_decimal_display() {
        assert_eq!(DecimalKey::integral(5).to_string(), "5");
        assert_eq!(DecimalKey::new(1250, 2).to_string(), "12.50");
        assert_eq!(DecimalKey::new(-5, 3).to_string(), "-0.005");
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: Vec<SortValue> =
            serde_json::from_str(r#"[null, 2, "3.5", {"mantissa": 125, "scale": 1}]"#).unwrap();
        assert_eq!(
            v,
            vec![
                SortValue::Absent,
                SortValue::Number(2.0),
                SortValue::Text("3.5".into()),
                SortValue::Decimal(DecimalKey::new(125, 1)),
            ]
        );
    }
}
