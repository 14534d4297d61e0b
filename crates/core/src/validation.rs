//! Custom field validators and error flattening for `validator` derives.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

pub const ICON_MAX_LEN: usize = 50;

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

static ICON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex"));

/// `#RRGGBB`, case-insensitive.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("hexcolor")
            .with_message(Cow::Borrowed("Must be a valid hex color (e.g., #FF0000)")))
    }
}

/// Alphanumeric plus `_` and `-`, at most 50 characters.
pub fn validate_icon(value: &str) -> Result<(), ValidationError> {
    if value.len() <= ICON_MAX_LEN && ICON_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("icon").with_message(Cow::Borrowed(
            "Must contain only letters, digits, '_' or '-' (max 50 characters)",
        )))
    }
}

/// Flatten nested validation errors into `field -> message`.
///
/// Nested structs become `outer.inner`, list items `items[2].field`. Only the
/// first message per field is kept.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    collect(errors, "", &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = format!("{prefix}{field}");
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    out.entry(path).or_insert_with(|| describe(first));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                collect(inner, &format!("{path}."), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]."), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => "This field is required".to_string(),
        "length" => "Has an invalid length".to_string(),
        "range" => "Is out of range".to_string(),
        other => format!("Is invalid ({other})"),
    }
}
