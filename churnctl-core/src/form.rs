//! Form model: raw named field values, the field catalog, and coercion into
//! the typed [`FormInput`] record sent to the prediction service.
//!
//! Coercion deliberately follows browser form semantics instead of strict
//! parsing: a malformed number becomes not-a-number and is forwarded, the
//! service is the one that rejects it.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ChurnError, Result};

/// How a field's raw string value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Sent as the submitted string; the slice lists the options the form offers
    Categorical(&'static [&'static str]),
    /// Whole-string numeric conversion
    Integer,
    /// Longest-valid-prefix float parsing
    Float,
}

/// One entry of the field catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_ADDON: &[&str] = &["No", "Yes", "No internet service"];

/// Every FormInput field, in wire order
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "gender",
        label: "Gender",
        kind: FieldKind::Categorical(&["Female", "Male"]),
    },
    FieldSpec {
        name: "SeniorCitizen",
        label: "Senior citizen (0/1)",
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "Partner",
        label: "Has partner",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        name: "Dependents",
        label: "Has dependents",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        name: "tenure",
        label: "Tenure (months)",
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "PhoneService",
        label: "Phone service",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        name: "MultipleLines",
        label: "Multiple lines",
        kind: FieldKind::Categorical(&["No", "Yes", "No phone service"]),
    },
    FieldSpec {
        name: "InternetService",
        label: "Internet service",
        kind: FieldKind::Categorical(&["DSL", "Fiber optic", "No"]),
    },
    FieldSpec {
        name: "OnlineSecurity",
        label: "Online security",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "OnlineBackup",
        label: "Online backup",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "DeviceProtection",
        label: "Device protection",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "TechSupport",
        label: "Tech support",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "StreamingTV",
        label: "Streaming TV",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "StreamingMovies",
        label: "Streaming movies",
        kind: FieldKind::Categorical(INTERNET_ADDON),
    },
    FieldSpec {
        name: "Contract",
        label: "Contract",
        kind: FieldKind::Categorical(&["Month-to-month", "One year", "Two year"]),
    },
    FieldSpec {
        name: "PaperlessBilling",
        label: "Paperless billing",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        name: "PaymentMethod",
        label: "Payment method",
        kind: FieldKind::Categorical(&[
            "Electronic check",
            "Mailed check",
            "Bank transfer (automatic)",
            "Credit card (automatic)",
        ]),
    },
    FieldSpec {
        name: "MonthlyCharges",
        label: "Monthly charges",
        kind: FieldKind::Float,
    },
    FieldSpec {
        name: "TotalCharges",
        label: "Total charges",
        kind: FieldKind::Float,
    },
];

/// Look up a field in the catalog by its wire name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

/// Raw named field values, the way a submitted form holds them.
///
/// A field that was never set reads as absent, which is distinct from an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    entries: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value for the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parse a `NAME=VALUE` assignment. The value may be empty and may itself
    /// contain `=`.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            ChurnError::invalid_field(assignment, "expected NAME=VALUE")
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ChurnError::invalid_field(assignment, "field name is empty"));
        }
        Ok((name.to_string(), value.to_string()))
    }

    /// Apply a `NAME=VALUE` assignment
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = Self::parse_assignment(assignment)?;
        self.set(name, value);
        Ok(())
    }

    /// Build fields from a JSON object. Strings are taken verbatim, numbers
    /// and booleans are stringified, `null` leaves the field absent.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self> {
        let mut fields = Self::new();
        for (name, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => fields.set(name.clone(), s.clone()),
                Value::Number(n) => fields.set(name.clone(), n.to_string()),
                Value::Bool(b) => fields.set(name.clone(), b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ChurnError::invalid_field(
                        name.clone(),
                        "nested arrays and objects are not form values",
                    ))
                }
            }
        }
        Ok(fields)
    }

    /// Names that are not part of the field catalog
    pub fn unknown_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| field_spec(name).is_none())
            .collect()
    }
}

/// A coerced number. Serializes as a JSON integer when integral, a float when
/// fractional, and `null` when not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericValue(pub f64);

/// Largest magnitude for which every integer is exactly representable in f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl NumericValue {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }
}

impl Serialize for NumericValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let v = self.0;
        if !v.is_finite() {
            serializer.serialize_none()
        } else if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Whitespace and line terminators numeric conversion skips, besides the
/// U+2000..=U+200A run. Unlike `char::is_whitespace` this excludes U+0085 and
/// includes U+FEFF.
const FORM_WHITESPACE: &[char] = &[
    '\t', '\n', '\u{b}', '\u{c}', '\r', ' ', '\u{a0}', '\u{1680}', '\u{2028}', '\u{2029}',
    '\u{202f}', '\u{205f}', '\u{3000}', '\u{feff}',
];

fn is_form_whitespace(c: char) -> bool {
    FORM_WHITESPACE.contains(&c) || ('\u{2000}'..='\u{200a}').contains(&c)
}

/// Whole-string numeric conversion used for integer fields.
///
/// Absent or blank input is `0`. Accepts `Infinity`, `0x`/`0o`/`0b` radix
/// literals and decimal literals; everything else is NaN.
pub fn coerce_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let text = raw.trim_matches(is_form_whitespace);
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(value) = radix_literal(text) {
        return value;
    }

    let decimal_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if decimal_chars && text.chars().any(|c| c.is_ascii_digit()) {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn radix_literal(text: &str) -> Option<f64> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

/// Longest-valid-prefix float parsing used for charge fields.
///
/// Leading whitespace is skipped and trailing garbage ignored; input without
/// a numeric prefix (or absent input) is NaN.
pub fn parse_float_prefix(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return f64::NAN;
    };
    let text = raw.trim_start_matches(is_form_whitespace);
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// One customer record as the prediction service expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FormInput {
    #[serde(rename = "gender")]
    pub gender: Option<String>,
    pub senior_citizen: NumericValue,
    pub partner: Option<String>,
    pub dependents: Option<String>,
    #[serde(rename = "tenure")]
    pub tenure: NumericValue,
    pub phone_service: Option<String>,
    pub multiple_lines: Option<String>,
    pub internet_service: Option<String>,
    pub online_security: Option<String>,
    pub online_backup: Option<String>,
    pub device_protection: Option<String>,
    pub tech_support: Option<String>,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: Option<String>,
    pub streaming_movies: Option<String>,
    pub contract: Option<String>,
    pub paperless_billing: Option<String>,
    pub payment_method: Option<String>,
    pub monthly_charges: NumericValue,
    pub total_charges: NumericValue,
}

impl FormInput {
    /// Read every catalog field from `fields`, coercing the numeric ones
    pub fn from_fields(fields: &FormFields) -> Self {
        let text = |name: &str| fields.get(name).map(str::to_string);
        let integer = |name: &str| NumericValue(coerce_number(fields.get(name)));
        let float = |name: &str| NumericValue(parse_float_prefix(fields.get(name)));

        Self {
            gender: text("gender"),
            senior_citizen: integer("SeniorCitizen"),
            partner: text("Partner"),
            dependents: text("Dependents"),
            tenure: integer("tenure"),
            phone_service: text("PhoneService"),
            multiple_lines: text("MultipleLines"),
            internet_service: text("InternetService"),
            online_security: text("OnlineSecurity"),
            online_backup: text("OnlineBackup"),
            device_protection: text("DeviceProtection"),
            tech_support: text("TechSupport"),
            streaming_tv: text("StreamingTV"),
            streaming_movies: text("StreamingMovies"),
            contract: text("Contract"),
            paperless_billing: text("PaperlessBilling"),
            payment_method: text("PaymentMethod"),
            monthly_charges: float("MonthlyCharges"),
            total_charges: float("TotalCharges"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> FormFields {
        let mut fields = FormFields::new();
        for (name, value) in [
            ("gender", "Female"),
            ("SeniorCitizen", "0"),
            ("Partner", "Yes"),
            ("Dependents", "No"),
            ("tenure", "1"),
            ("PhoneService", "No"),
            ("MultipleLines", "No phone service"),
            ("InternetService", "DSL"),
            ("OnlineSecurity", "No"),
            ("OnlineBackup", "Yes"),
            ("DeviceProtection", "No"),
            ("TechSupport", "No"),
            ("StreamingTV", "No"),
            ("StreamingMovies", "No"),
            ("Contract", "Month-to-month"),
            ("PaperlessBilling", "Yes"),
            ("PaymentMethod", "Electronic check"),
            ("MonthlyCharges", "29.85"),
            ("TotalCharges", "29.85"),
        ] {
            fields.set(name, value);
        }
        fields
    }

    #[test]
    fn test_catalog_covers_all_fields_once() {
        assert_eq!(FIELDS.len(), 19);
        let input = FormInput::from_fields(&sample_fields());
        let value = serde_json::to_value(&input).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for spec in FIELDS {
            assert!(keys.contains(&spec.name), "missing {}", spec.name);
        }
        assert_eq!(keys.len(), FIELDS.len());
    }

    #[test]
    fn test_form_input_wire_shape() {
        let input = FormInput::from_fields(&sample_fields());
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["gender"], json!("Female"));
        assert_eq!(value["SeniorCitizen"], json!(0));
        assert_eq!(value["tenure"], json!(1));
        assert_eq!(value["StreamingTV"], json!("No"));
        assert_eq!(value["PaymentMethod"], json!("Electronic check"));
        assert_eq!(value["MonthlyCharges"], json!(29.85));
        assert_eq!(value["TotalCharges"], json!(29.85));
    }

    #[test]
    fn test_missing_fields() {
        let input = FormInput::from_fields(&FormFields::new());
        let value = serde_json::to_value(&input).unwrap();
        // absent categorical fields go out as null, absent integers as 0,
        // absent floats as NaN which encodes as null
        assert_eq!(value["Contract"], Value::Null);
        assert_eq!(value["tenure"], json!(0));
        assert_eq!(value["MonthlyCharges"], Value::Null);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some("12")), 12.0);
        assert_eq!(coerce_number(Some("  7\n")), 7.0);
        assert_eq!(coerce_number(Some("")), 0.0);
        assert_eq!(coerce_number(Some("   ")), 0.0);
        assert_eq!(coerce_number(None), 0.0);
        assert_eq!(coerce_number(Some("1.5")), 1.5);
        assert_eq!(coerce_number(Some("-3")), -3.0);
        assert_eq!(coerce_number(Some("1e3")), 1000.0);
        assert_eq!(coerce_number(Some(".5")), 0.5);
        assert_eq!(coerce_number(Some("0x1F")), 31.0);
        assert_eq!(coerce_number(Some("0b101")), 5.0);
        assert_eq!(coerce_number(Some("0o17")), 15.0);
        assert_eq!(coerce_number(Some("-Infinity")), f64::NEG_INFINITY);
        assert!(coerce_number(Some("12abc")).is_nan());
        assert!(coerce_number(Some("abc")).is_nan());
        assert!(coerce_number(Some("inf")).is_nan());
        assert!(coerce_number(Some("NaN")).is_nan());
        assert!(coerce_number(Some("1e")).is_nan());
        assert!(coerce_number(Some("0x")).is_nan());
        assert!(coerce_number(Some("0xZZ")).is_nan());
        assert!(coerce_number(Some("-0x10")).is_nan());
        assert!(coerce_number(Some("1.2.3")).is_nan());
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix(Some("29.85")), 29.85);
        assert_eq!(parse_float_prefix(Some("  42")), 42.0);
        assert_eq!(parse_float_prefix(Some("12abc")), 12.0);
        assert_eq!(parse_float_prefix(Some("5.")), 5.0);
        assert_eq!(parse_float_prefix(Some(".25x")), 0.25);
        assert_eq!(parse_float_prefix(Some("-1.5e2kg")), -150.0);
        assert_eq!(parse_float_prefix(Some("3e")), 3.0);
        assert_eq!(parse_float_prefix(Some("3e+")), 3.0);
        assert_eq!(parse_float_prefix(Some("0x10")), 0.0);
        assert_eq!(parse_float_prefix(Some("Infinityx")), f64::INFINITY);
        assert_eq!(parse_float_prefix(Some("-Infinity")), f64::NEG_INFINITY);
        assert!(parse_float_prefix(Some("")).is_nan());
        assert!(parse_float_prefix(Some(".")).is_nan());
        assert!(parse_float_prefix(Some("-")).is_nan());
        assert!(parse_float_prefix(Some("abc")).is_nan());
        assert!(parse_float_prefix(None).is_nan());
    }

    #[test]
    fn test_numeric_whitespace_set() {
        assert_eq!(coerce_number(Some("\u{a0}7\u{2028}")), 7.0);
        assert_eq!(coerce_number(Some("\u{feff}\t12\u{3000}")), 12.0);
        assert_eq!(parse_float_prefix(Some("\u{2003}\u{feff}29.85")), 29.85);
        // NEL is whitespace to char::is_whitespace but not to numeric conversion
        assert!(coerce_number(Some("5\u{85}")).is_nan());
        assert!(parse_float_prefix(Some("\u{85}5")).is_nan());
    }

    #[test]
    fn test_numeric_value_serialization() {
        assert_eq!(serde_json::to_string(&NumericValue(3.0)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&NumericValue(-0.0)).unwrap(), "0");
        assert_eq!(serde_json::to_string(&NumericValue(2.5)).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&NumericValue(f64::NAN)).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&NumericValue(f64::INFINITY)).unwrap(),
            "null"
        );
    }

    #[test]
    fn test_assignments() {
        let mut fields = FormFields::new();
        fields.apply_assignment("tenure=12").unwrap();
        fields.apply_assignment("PaymentMethod=Bank transfer (automatic)").unwrap();
        fields.apply_assignment("tenure=24").unwrap();
        fields.apply_assignment("TotalCharges=").unwrap();

        assert_eq!(fields.get("tenure"), Some("24"));
        assert_eq!(fields.get("PaymentMethod"), Some("Bank transfer (automatic)"));
        assert_eq!(fields.get("TotalCharges"), Some(""));
        assert_eq!(fields.len(), 3);

        assert!(fields.apply_assignment("tenure").is_err());
        assert!(fields.apply_assignment("=12").is_err());
    }

    #[test]
    fn test_from_json_object() {
        let object = json!({
            "gender": "Male",
            "SeniorCitizen": 1,
            "MonthlyCharges": 70.7,
            "Partner": null,
            "Extra": true
        });
        let fields = FormFields::from_json_object(object.as_object().unwrap()).unwrap();
        assert_eq!(fields.get("gender"), Some("Male"));
        assert_eq!(fields.get("SeniorCitizen"), Some("1"));
        assert_eq!(fields.get("MonthlyCharges"), Some("70.7"));
        assert_eq!(fields.get("Partner"), None);
        assert_eq!(fields.unknown_names(), vec!["Extra"]);

        let nested = json!({ "tenure": [1, 2] });
        assert!(FormFields::from_json_object(nested.as_object().unwrap()).is_err());
    }
}
