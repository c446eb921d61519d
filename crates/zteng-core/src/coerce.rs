// ── Value coercion ──
//
// The firmware reports nearly every number as a string and uses "" or "-"
// for "no value". These helpers are total: anything that is not a usable
// number comes back as `None`.

use serde_json::Value;

/// Placeholder strings the router uses for an absent reading.
const PLACEHOLDERS: [&str; 2] = ["", "-"];

/// Coerce a router value to a finite `f64`.
///
/// JSON numbers pass through; numeric strings are parsed after trimming.
/// Null, placeholders, booleans, containers, junk text and non-finite
/// results all yield `None`.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            if PLACEHOLDERS.contains(&s) {
                return None;
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Coerce a router value to an integer channel number.
///
/// Accepts any JSON number, truncating fractional ones toward zero, and
/// strings holding a base-10 integer. Strings with a fraction are rejected.
pub fn as_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Whole part of a finite float, if it fits in an `i64`.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn truncate(f: f64) -> Option<i64> {
    // 2^63, exact in f64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let whole = f.trunc();
    (whole.is_finite() && (-LIMIT..LIMIT).contains(&whole)).then(|| whole as i64)
}

/// Coerce a router value to display text.
///
/// Strings are kept unless they are placeholders; numbers are rendered.
pub fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if PLACEHOLDERS.contains(&s.trim()) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Look up `field` in an optional section object.
pub(crate) fn field<'a>(section: Option<&'a Value>, field: &str) -> Option<&'a Value> {
    section?.get(field)
}
