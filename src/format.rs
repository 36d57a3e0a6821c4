//! Number rendering shared by the interpreter and the keypad.

/// Shortest decimal form: integers without a fractional part, exponent
/// notation outside `[1e-6, 1e21)`, and `NaN` / `Infinity` / `-Infinity`
/// for non-finite values.
pub fn format_number(value: f64) -> String {
    if let Some(s) = non_finite(value) {
        return s.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", value);
    }

    // Rust prints `1e21`; the display form carries an explicit sign.
    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Fixed number of decimals, e.g. `fixed(7.2222, 2) == "7.22"`.
pub fn fixed(value: f64, decimals: usize) -> String {
    match non_finite(value) {
        Some(s) => s.to_string(),
        None => format!("{:.*}", decimals, value),
    }
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}
