//! Free-text sanitization and lenient number parsing
//!
//! Text is escaped the way a text node serializes back to markup, so stored
//! values can be rendered into a page without being interpreted as markup.
//! Numbers are read from the longest valid leading prefix, matching how the
//! catalog pages coerce data attributes and form inputs.

/// Escape free text for safe re-rendering as markup
pub fn sanitize_input(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Parse the leading decimal number of `input`, ignoring trailing garbage.
///
/// Leading whitespace is skipped. Returns `None` when no digits are found.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let digit_run = |from: usize| {
        let mut end = from;
        while end < len && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_end = digit_run(end);
    let mut digits = int_end - end;
    end = int_end;

    if end < len && bytes[end] == b'.' {
        let frac_end = digit_run(end + 1);
        let frac_digits = frac_end - (end + 1);
        if digits > 0 || frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut exp_start = end + 1;
        if exp_start < len && matches!(bytes[exp_start], b'+' | b'-') {
            exp_start += 1;
        }
        let exp_end = digit_run(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse the leading integer of `input`, ignoring trailing garbage
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let (negative, start) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for &b in &bytes[start..] {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Coerce a price: non-numeric, negative or non-finite input becomes 0
pub fn coerce_price(input: &str) -> f64 {
    match parse_float_prefix(input) {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Coerce a quantity: non-numeric input or anything below 1 becomes 1
pub fn coerce_quantity(input: &str) -> u32 {
    match parse_int_prefix(input) {
        Some(value) if value >= 1 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 1,
    }
}
