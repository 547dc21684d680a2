//! Field formatting: turns a measurement into display text.

use serde_json::Value;
use thiserror::Error;

use crate::directive::BindingDirective;
use crate::document::Document;
use crate::frame::SectionMapping;

/// Magnitudes from here up switch to exponent notation.
const EXPONENT_LIMIT: f64 = 1e21;

/// Enough fractional digits to print any `f64` exactly.
const EXACT_DIGITS: usize = 1074;

/// Errors raised while rendering a single binding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// A fixed-precision directive met a value that is not a number
    #[error("Field {field} is not numeric (got {value}), cannot apply mf{precision}_")]
    NotNumeric {
        /// Measurement name
        field: String,
        /// Requested precision
        precision: u8,
        /// Offending value, as JSON
        value: String,
    },
}

/// A binding that failed for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatFailure {
    /// Element id
    pub element_id: String,
    /// Why it failed
    pub error: FormatError,
}

/// Render the measurement a directive asks for.
///
/// `Ok(None)` means the field is not in this mapping and the element must be
/// left alone.
pub fn render(
    mapping: &SectionMapping,
    directive: &BindingDirective,
) -> Result<Option<String>, FormatError> {
    let Some(value) = mapping.get(directive.field()) else {
        return Ok(None);
    };

    match directive {
        BindingDirective::Raw { .. } | BindingDirective::Text { .. } => {
            Ok(Some(native_string(value)))
        }
        BindingDirective::Fixed { precision, field } => {
            fixed_point(value, *precision, field).map(Some)
        }
    }
}

/// Render and write one element.
///
/// `Ok(None)` when the field is absent, otherwise whether the document
/// accepted the write.
pub fn apply<D: Document + ?Sized>(
    document: &mut D,
    element_id: &str,
    directive: &BindingDirective,
    mapping: &SectionMapping,
) -> Result<Option<bool>, FormatError> {
    Ok(render(mapping, directive)?.map(|text| document.set_content(element_id, &text)))
}

/// The value's natural display form.
pub fn native_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(float_string).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(native_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Shortest round-trip form, laid out the way a browser prints numbers:
/// plain digits for decimal exponents in `-7..21`, exponent notation
/// (`1e+21`, `1.5e-7`) outside that range.
fn float_string(v: f64) -> String {
    if v == 0.0 {
        // covers -0.0
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }

    let scientific = format!("{:e}", v.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    // Position of the decimal point relative to the start of `digits`.
    let point = exponent + 1;
    let len = digits.len() as i32;
    let body = if len <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int_part, frac) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, sign, exponent.abs())
        }
    };

    if v.is_sign_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

fn fixed_point(value: &Value, precision: u8, field: &str) -> Result<String, FormatError> {
    match value.as_f64() {
        Some(v) => Ok(to_fixed(v, usize::from(precision))),
        None => Err(FormatError::NotNumeric {
            field: field.to_string(),
            precision,
            value: value.to_string(),
        }),
    }
}

/// `digits` places after the point, exact halves rounded away from zero.
fn to_fixed(v: f64, digits: usize) -> String {
    if !v.is_finite() || v.abs() >= EXPONENT_LIMIT {
        return float_string(v);
    }

    let rounded = format!("{:.*}", digits, v);
    if !is_exact_half(v.abs(), digits) {
        return rounded;
    }

    // `{:.*}` picks the even neighbour on a tie; step to the one further
    // from zero instead.
    let exact = format!("{:.*}", EXACT_DIGITS, v.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().take(digits))
        .collect();
    increment_decimal(&mut kept);

    let split = kept.len() - digits;
    let (whole, places) = kept.split_at(split);
    let mut out = String::with_capacity(kept.len() + 2);
    if v.is_sign_negative() {
        out.push('-');
    }
    out.extend(whole.iter().map(|b| char::from(*b)));
    if digits > 0 {
        out.push('.');
        out.extend(places.iter().map(|b| char::from(*b)));
    }
    out
}

/// Whether `v` lies exactly halfway between two `digits`-place decimals.
fn is_exact_half(v: f64, digits: usize) -> bool {
    let coarse = format!("{:.*}", digits + 1, v);
    if !coarse.ends_with('5') {
        return false;
    }
    let exact = format!("{:.*}", EXACT_DIGITS, v);
    let frac = exact.split_once('.').map(|(_, f)| f).unwrap_or("");
    let mut tail = frac.bytes().skip(digits);
    tail.next() == Some(b'5') && tail.all(|b| b == b'0')
}

/// Add one unit in the last place to an ASCII digit string.
fn increment_decimal(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}
