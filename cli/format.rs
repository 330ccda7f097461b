//! Text rendering for flat `key=value` records.

/// Renders a float the way the reference tools print them: shortest
/// round-trip digits, a trailing `.0` on integral values, and a signed
/// two-digit exponent (`1e-05`, `1e+16`) outside `[1e-4, 1e16)`.
pub fn py_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_owned() } else { "-inf".to_owned() };
    }

    let debug = format!("{v:?}");
    match debug.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => debug,
    }
}

/// Space-joined `key=value` pairs, in the given order.
pub fn record(fields: &[(&str, f64)]) -> String {
    fields.iter()
        .map(|(k, v)| format!("{k}={}", py_float(*v)))
        .collect::<Vec<_>>()
        .join(" ")
}
