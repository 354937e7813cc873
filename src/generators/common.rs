//! Common utilities for document generation.
//!
//! CSV field helpers exposed to templates, plus filename sanitizing for
//! rendered output.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone};
use minijinja::value::{Value as TemplateValue, ValueKind};
use serde_json::Value;

/// Quote a CSV field when it contains a comma, quote or line break.
/// Embedded quotes are doubled.
pub fn csv_quote(value: &str) -> String {
    let needs_quote = value.contains([',', '"', '\n', '\r']);
    let escaped = if value.contains('"') {
        value.replace('"', "\"\"")
    } else {
        value.to_string()
    };

    if needs_quote {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Join fields into one CSV row, quoting each one as needed.
pub fn csv_join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| csv_quote(item.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Values that can be written as a single CSV field.
pub trait CsvField {
    fn to_csv_field(&self) -> String;
}

/// Stringify a value for CSV output: nothing becomes an empty field, timestamps
/// use RFC 3339 and floats use their shortest round-trip decimal form.
pub fn csv_string<T: CsvField + ?Sized>(value: &T) -> String {
    value.to_csv_field()
}

impl CsvField for str {
    fn to_csv_field(&self) -> String {
        self.to_string()
    }
}

impl CsvField for String {
    fn to_csv_field(&self) -> String {
        self.clone()
    }
}

impl CsvField for bool {
    fn to_csv_field(&self) -> String {
        let field = if *self { "true" } else { "false" };
        field.to_string()
    }
}

macro_rules! impl_csv_field_display {
    ($($ty:ty),*) => {
        $(
            impl CsvField for $ty {
                fn to_csv_field(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

// Display for floats already prints the shortest round-trip form without an exponent.
impl_csv_field_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<Tz: TimeZone> CsvField for DateTime<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn to_csv_field(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl CsvField for NaiveDateTime {
    fn to_csv_field(&self) -> String {
        self.and_utc().to_csv_field()
    }
}

impl<T: CsvField> CsvField for Option<T> {
    fn to_csv_field(&self) -> String {
        self.as_ref().map(CsvField::to_csv_field).unwrap_or_default()
    }
}

impl<T: CsvField + ?Sized> CsvField for &T {
    fn to_csv_field(&self) -> String {
        (**self).to_csv_field()
    }
}

impl CsvField for Value {
    fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_csv_field(),
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.to_csv_field()
                } else if let Some(u) = n.as_u64() {
                    u.to_csv_field()
                } else {
                    n.as_f64().map(|f| f.to_csv_field()).unwrap_or_default()
                }
            }
            other => other.to_string(),
        }
    }
}

impl CsvField for TemplateValue {
    fn to_csv_field(&self) -> String {
        match self.kind() {
            ValueKind::Undefined | ValueKind::None => String::new(),
            ValueKind::Bool => self.is_true().to_csv_field(),
            ValueKind::String => self.as_str().unwrap_or_default().to_string(),
            ValueKind::Number => {
                if let Some(i) = self.as_i64() {
                    i.to_csv_field()
                } else if let Ok(u) = u64::try_from(self.clone()) {
                    u.to_csv_field()
                } else if let Ok(i) = i128::try_from(self.clone()) {
                    i.to_csv_field()
                } else if let Ok(f) = f64::try_from(self.clone()) {
                    f.to_csv_field()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let result = result.trim_matches('-');
    if result.is_empty() {
        return fallback.to_string();
    }
    result.to_string()
}
