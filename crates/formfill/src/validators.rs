// File: src/validators.rs
// Purpose: Per-type field validators and the type dispatch registry

use std::collections::HashMap;

use formfill_dom::{Document, NodeId};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::datetime::{self, DatetimeKind};
use crate::error::{ErrorKind, FormError};

/// Floating-point steps tolerate this much drift from an exact multiple.
const STEP_TOLERANCE: f64 = 1e-15;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// A refused write: either a per-field validation failure routed
/// through the error policy, or a structural fault that aborts the pass
/// in every mode.
#[derive(Debug)]
pub(crate) enum Refusal {
    Invalid { kind: ErrorKind, message: String },
    Fatal(FormError),
}

impl Refusal {
    fn bad_value(message: &str) -> Self {
        Refusal::Invalid {
            kind: ErrorKind::BadValue,
            message: message.to_string(),
        }
    }
}

pub(crate) type CheckResult = Result<(), Refusal>;

/// Validators are pure predicates over the document, the target node
/// and the raw submitted value.
pub(crate) type TypeValidator = fn(&Document, NodeId, &str) -> CheckResult;

/// Dispatch table keyed by the `type` attribute. Types without an entry
/// (text, hidden, search, checkbox, radio, ...) take any value.
pub(crate) static VALIDATORS: Lazy<HashMap<&'static str, TypeValidator>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, TypeValidator> = HashMap::new();

    registry.insert("url", validate_url);
    registry.insert("email", validate_email);
    registry.insert("number", validate_number);
    registry.insert("range", validate_number);
    registry.insert("color", validate_color);
    registry.insert("datetime-local", validate_datetime);
    registry.insert("month", validate_datetime);
    registry.insert("week", validate_datetime);
    registry.insert("time", validate_datetime);

    registry
});

/// The value an element currently holds, for readonly comparison and
/// serialization: text content for textareas and generic elements, the
/// `value` attribute otherwise.
pub(crate) fn current_value(doc: &Document, node: NodeId) -> String {
    match doc.tag(node) {
        Some("input" | "select") => doc.attr(node, "value").unwrap_or_default().to_string(),
        _ => doc.text(node),
    }
}

// ============================================================================
// Constraint validators (dispatched by attribute, not type)
// ============================================================================

pub(crate) fn validate_required(_doc: &Document, _node: NodeId, value: &str) -> CheckResult {
    if value.is_empty() {
        return Err(Refusal::Invalid {
            kind: ErrorKind::ValueRequired,
            message: "Must be filled".to_string(),
        });
    }

    Ok(())
}

/// A readonly field accepts its unchanged current value; browsers
/// submit readonly fields, so an untouched resubmission must pass.
pub(crate) fn validate_readonly(doc: &Document, node: NodeId, value: &str) -> CheckResult {
    if value == current_value(doc, node) {
        return Ok(());
    }

    Err(Refusal::Invalid {
        kind: ErrorKind::Readonly,
        message: "Field is read only".to_string(),
    })
}

pub(crate) fn validate_disabled(_doc: &Document, _node: NodeId, _value: &str) -> CheckResult {
    Err(Refusal::Invalid {
        kind: ErrorKind::Disabled,
        message: "Field is disabled".to_string(),
    })
}

/// Full-match the declared `pattern` regex. A malformed pattern is a
/// fault in the form itself, not in the submitted value, and aborts the
/// pass unconditionally.
pub(crate) fn validate_pattern(doc: &Document, node: NodeId, value: &str) -> CheckResult {
    let pattern = doc.attr(node, "pattern").unwrap_or_default();

    let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
        Refusal::Fatal(FormError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
    })?;

    if !regex.is_match(value) {
        return Err(Refusal::bad_value("Value does not match specified pattern"));
    }

    Ok(())
}

// ============================================================================
// Type validators
// ============================================================================

fn validate_url(_doc: &Document, _node: NodeId, value: &str) -> CheckResult {
    if Url::parse(value).is_err() {
        return Err(Refusal::bad_value("Invalid URL"));
    }

    Ok(())
}

fn validate_email(doc: &Document, node: NodeId, value: &str) -> CheckResult {
    if doc.has_attr(node, "multiple") {
        // Comma-separated list; one bad address fails the whole value.
        if value.split(',').any(|email| !EMAIL_RE.is_match(email)) {
            return Err(Refusal::bad_value("One or more e-mail addresses are invalid"));
        }
    } else if !EMAIL_RE.is_match(value) {
        return Err(Refusal::bad_value("Invalid email address"));
    }

    Ok(())
}

fn validate_color(_doc: &Document, _node: NodeId, value: &str) -> CheckResult {
    if !COLOR_RE.is_match(value) {
        return Err(Refusal::bad_value("Not a valid color"));
    }

    Ok(())
}

fn validate_number(doc: &Document, node: NodeId, value: &str) -> CheckResult {
    let Ok(number) = value.parse::<f64>() else {
        return Err(Refusal::bad_value("Invalid number"));
    };

    if let Some(min) = doc.attr(node, "min").and_then(|raw| raw.parse::<f64>().ok()) {
        if number < min {
            return Err(Refusal::bad_value("Below minimum"));
        }
    }

    if let Some(max) = doc.attr(node, "max").and_then(|raw| raw.parse::<f64>().ok()) {
        if number > max {
            return Err(Refusal::bad_value("Above maximum"));
        }
    }

    if let Some(step_raw) = doc.attr(node, "step") {
        validate_step(step_raw, value, number)?;
    }

    Ok(())
}

/// A stepped value must be reachable from zero in whole multiples of
/// the step. Integer steps demand an exact zero remainder; fractional
/// steps accept a distance to the nearest multiple below the tolerance.
fn validate_step(step_raw: &str, value: &str, number: f64) -> CheckResult {
    if step_raw.contains('.') {
        let Ok(step) = step_raw.parse::<f64>() else {
            return Ok(());
        };

        if step <= 0.0 {
            return Ok(());
        }

        let remainder = number.abs() % step;
        let distance = remainder.min(step - remainder);

        if distance >= STEP_TOLERANCE {
            return Err(Refusal::bad_value("Out of sequence"));
        }
    } else {
        let Ok(step) = step_raw.parse::<i64>() else {
            return Ok(());
        };

        if step == 0 {
            return Ok(());
        }

        // Saturating float-to-int conversion pins huge inputs to the
        // integer limits, which the underflow guard below rejects.
        let whole = value.parse::<i64>().unwrap_or(number as i64);

        if whole == i64::MIN {
            return Err(Refusal::Fatal(FormError::NumberOutOfRange));
        }

        if whole.abs() % step != 0 {
            return Err(Refusal::bad_value("Out of sequence"));
        }
    }

    Ok(())
}

fn validate_datetime(doc: &Document, node: NodeId, value: &str) -> CheckResult {
    let type_attr = doc.attr(node, "type").unwrap_or_default();

    let Some(kind) = DatetimeKind::from_type(type_attr) else {
        // Registry dispatch guarantees a datetime type; tolerate anyway.
        return Ok(());
    };

    let format_error = || Refusal::Invalid {
        kind: ErrorKind::DatetimeFormat,
        message: "Value does not match expected format".to_string(),
    };

    let instant = datetime::parse(kind, value).ok_or_else(format_error)?;

    if let Some(raw) = doc.attr(node, "min") {
        let min = datetime::parse(kind, raw).ok_or_else(format_error)?;
        if instant < min {
            return Err(Refusal::bad_value("Below minimum"));
        }
    }

    if let Some(raw) = doc.attr(node, "max") {
        let max = datetime::parse(kind, raw).ok_or_else(format_error)?;
        if instant > max {
            return Err(Refusal::bad_value("Above maximum"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_dom::Document;

    fn input(attrs: &str) -> (Document, NodeId) {
        let doc = Document::parse(&format!("<form><input {attrs}></form>")).unwrap();
        let node = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("input"))
            .unwrap();
        (doc, node)
    }

    fn kind_of(result: CheckResult) -> ErrorKind {
        match result.unwrap_err() {
            Refusal::Invalid { kind, .. } => kind,
            Refusal::Fatal(err) => panic!("expected field error, got {err}"),
        }
    }

    #[test]
    fn url_syntax() {
        let (doc, node) = input(r#"type="url" name="u""#);

        assert!(validate_url(&doc, node, "https://youtube.com").is_ok());
        assert_eq!(
            kind_of(validate_url(&doc, node, "*** Definitely not a valid URL ***")),
            ErrorKind::BadValue
        );
    }

    #[test]
    fn email_single_and_multiple() {
        let (doc, node) = input(r#"type="email" name="e""#);
        assert!(validate_email(&doc, node, "test@example.com").is_ok());
        assert!(validate_email(&doc, node, "not an email").is_err());

        let (doc, node) = input(r#"type="email" name="bcc" multiple"#);
        assert!(validate_email(&doc, node, "a@example.com,b@example.com").is_ok());
        assert_eq!(
            kind_of(validate_email(&doc, node, "a@example.com,definitely not")),
            ErrorKind::BadValue
        );
    }

    #[test]
    fn color_is_six_hex_digits() {
        let (doc, node) = input(r#"type="color" name="c""#);

        assert!(validate_color(&doc, node, "#00ff00").is_ok());
        assert!(validate_color(&doc, node, "#00FF00").is_ok());
        assert!(validate_color(&doc, node, "invalid color").is_err());
        assert!(validate_color(&doc, node, "#00ff0").is_err());
    }

    #[test]
    fn number_bounds() {
        let (doc, node) = input(r#"type="number" name="n" min="1" max="100""#);

        assert!(validate_number(&doc, node, "50").is_ok());
        assert!(validate_number(&doc, node, "string").is_err());
        assert!(validate_number(&doc, node, "0").is_err());
        assert!(validate_number(&doc, node, "101").is_err());
    }

    #[test]
    fn integer_step_requires_exact_multiples() {
        let (doc, node) = input(r#"type="number" name="n" step="3""#);

        assert!(validate_number(&doc, node, "6").is_ok());
        assert!(validate_number(&doc, node, "-6").is_ok());
        assert!(validate_number(&doc, node, "5").is_err());
    }

    #[test]
    fn integer_step_guards_the_unrepresentable_minimum() {
        let (doc, node) = input(r#"type="number" name="n" step="3""#);

        let refusal = validate_number(&doc, node, &i64::MIN.to_string()).unwrap_err();
        assert!(matches!(refusal, Refusal::Fatal(FormError::NumberOutOfRange)));
    }

    #[test]
    fn float_step_tolerates_representation_drift() {
        let (doc, node) = input(r#"type="range" name="n" step="0.1""#);

        assert!(validate_number(&doc, node, "1.8").is_ok());
        assert!(validate_number(&doc, node, "0.3").is_ok());
        assert!(validate_number(&doc, node, "3.1415926").is_err());
    }

    #[test]
    fn pattern_full_match_and_fatal_regex() {
        let (doc, node) = input(r#"name="p" pattern="[A-Z]{2}\d{2}""#);

        assert!(validate_pattern(&doc, node, "AB12").is_ok());
        // Substring matches are not enough.
        assert!(validate_pattern(&doc, node, "xAB12x").is_err());

        let (doc, node) = input(r#"name="p" pattern="[[[not valid""#);
        let refusal = validate_pattern(&doc, node, "anything").unwrap_err();
        assert!(matches!(refusal, Refusal::Fatal(FormError::InvalidPattern { .. })));
    }

    #[test]
    fn datetime_respects_declared_bounds() {
        let (doc, node) = input(
            r#"type="datetime-local" name="d" min="2018-06-07T00:00" max="2018-06-14T00:00""#,
        );

        assert!(validate_datetime(&doc, node, "2018-06-10T12:00").is_ok());
        assert!(validate_datetime(&doc, node, "2018-06-06T00:00").is_err());
        assert!(validate_datetime(&doc, node, "2018-06-15T00:00").is_err());
        assert_eq!(
            kind_of(validate_datetime(&doc, node, "nonsense")),
            ErrorKind::DatetimeFormat
        );
    }

    #[test]
    fn readonly_accepts_unchanged_value() {
        let (doc, node) = input(r#"name="r" value="keep" readonly"#);

        assert!(validate_readonly(&doc, node, "keep").is_ok());
        assert_eq!(kind_of(validate_readonly(&doc, node, "changed")), ErrorKind::Readonly);
    }

    #[test]
    fn required_rejects_only_zero_length() {
        let (doc, node) = input(r#"name="r" required"#);

        assert_eq!(kind_of(validate_required(&doc, node, "")), ErrorKind::ValueRequired);
        assert!(validate_required(&doc, node, "0").is_ok());
    }
}
