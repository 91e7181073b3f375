//! Value formatting and parsing

/// Round to one decimal; whole results print without a decimal point and
/// never as `-0`. Rounding comes first, so every output parses back to a
/// value that prints the same text.
pub fn normalize_value(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{value:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// A non-negative integer. `-1` and anything unparsable are `None`.
pub fn parse_index(value: &str) -> Option<usize> {
    parse_int(value).and_then(|v| usize::try_from(v).ok())
}

pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Index written as `-1` when absent.
pub fn index_or_unset(index: Option<usize>) -> String {
    index.map_or_else(|| "-1".to_string(), |i| i.to_string())
}
