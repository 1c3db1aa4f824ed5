/// Text results meaning "below detection limit".
const NOT_DETECTED: &[&str] = &["non détecté", "non detecte", "not detected", "nd", "n.d."];

/// Parse a laboratory text result into a number.
///
/// Strips comparison markers (`<`, `>`, `<=`, `>=`, `≤`, `≥`), accepts a comma
/// decimal separator and reads the leading number, so `"<0,5 mg/L"` is `0.5`.
/// A lone `<` or a "not detected" marker reads as 0.
pub fn clean_numeric_value(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s == "<" || NOT_DETECTED.contains(&s.to_lowercase().as_str()) {
        return Some(0.0);
    }

    let s = ["<=", ">=", "≤", "≥", "<", ">"]
        .iter()
        .find_map(|marker| s.strip_prefix(marker))
        .unwrap_or(s)
        .trim_start();

    let normalized = s.replacen(',', ".", 1);
    let end = numeric_prefix_len(normalized.as_bytes());

    normalized[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Length of the leading `-?digits[.digits][e[+-]digits]` run.
///
/// The exponent only counts when at least one digit follows it.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
            + start
    };

    let mut end = if bytes.first() == Some(&b'-') { 1 } else { 0 };
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_plain_number() {
        assert_eq!(clean_numeric_value("12.5"), Some(12.5));
        assert_eq!(clean_numeric_value("  7 "), Some(7.0));
    }

    #[test]
    fn test_clean_comma_decimal() {
        assert_eq!(clean_numeric_value("0,25"), Some(0.25));
    }

    #[test]
    fn test_clean_comparison_markers() {
        assert_eq!(clean_numeric_value("<0,5"), Some(0.5));
        assert_eq!(clean_numeric_value("> 100"), Some(100.0));
        assert_eq!(clean_numeric_value("<=2"), Some(2.0));
        assert_eq!(clean_numeric_value("≤ 1.5"), Some(1.5));
    }

    #[test]
    fn test_clean_trailing_unit() {
        assert_eq!(clean_numeric_value("<1 n/100mL"), Some(1.0));
    }

    #[test]
    fn test_clean_scientific_notation() {
        assert_eq!(clean_numeric_value("1.5E-02"), Some(0.015));
        assert_eq!(clean_numeric_value("<2e-3"), Some(0.002));
        assert_eq!(clean_numeric_value("1e3"), Some(1000.0));
        assert_eq!(clean_numeric_value("2,5e+1 µg/L"), Some(25.0));
    }

    #[test]
    fn test_clean_dangling_exponent_ignored() {
        assert_eq!(clean_numeric_value("3 eq/L"), Some(3.0));
        assert_eq!(clean_numeric_value("4e"), Some(4.0));
        assert_eq!(clean_numeric_value("4e-"), Some(4.0));
    }

    #[test]
    fn test_clean_not_detected() {
        assert_eq!(clean_numeric_value("<"), Some(0.0));
        assert_eq!(clean_numeric_value("Non détecté"), Some(0.0));
        assert_eq!(clean_numeric_value("ND"), Some(0.0));
    }

    #[test]
    fn test_clean_garbage() {
        assert_eq!(clean_numeric_value(""), None);
        assert_eq!(clean_numeric_value("absence"), None);
        assert_eq!(clean_numeric_value("<abc"), None);
    }
}
