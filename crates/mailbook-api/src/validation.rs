//! Validation of raw outgoing-record input.
//!
//! `validate` is transport-independent: it takes the decoded JSON object and
//! returns either a fully typed [`OutgoingInput`] or a field → messages map.
//! Input is checked in two passes. Coercion turns raw JSON values into typed
//! options (trimming strings, treating `null` and `""` as absent), then the
//! `validator` rules check presence, lengths and that links are http(s) URLs.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate};
use mailbook_db::models::OutgoingFields;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A validated outgoing record, not yet bound to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingInput {
    pub username: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub thanked: Option<bool>,
    pub has_been_sent: Option<bool>,
    pub occasion: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl OutgoingInput {
    /// Concrete column values, using `thanked` / `has_been_sent` as the
    /// fallback for flags that were not submitted.
    pub fn into_fields(self, thanked: bool, has_been_sent: bool) -> OutgoingFields {
        OutgoingFields {
            username: self.username,
            name: self.name,
            date: self.date,
            country: self.country,
            region: self.region,
            city: self.city,
            thanked: self.thanked.unwrap_or(thanked),
            has_been_sent: self.has_been_sent.unwrap_or(has_been_sent),
            occasion: self.occasion,
            description: self.description,
            link: self.link,
        }
    }
}

#[derive(Debug, Validate)]
struct OutgoingForm {
    #[validate(required(message = "The username field is required."), length(max = 150))]
    username: Option<String>,
    #[validate(length(max = 150))]
    name: Option<String>,
    #[validate(required(message = "The date field is required."))]
    date: Option<NaiveDate>,
    #[validate(required(message = "The country field is required."), length(max = 150))]
    country: Option<String>,
    #[validate(length(max = 150))]
    region: Option<String>,
    #[validate(length(max = 150))]
    city: Option<String>,
    thanked: Option<bool>,
    has_been_sent: Option<bool>,
    #[validate(length(max = 350))]
    occasion: Option<String>,
    #[validate(length(max = 1500))]
    description: Option<String>,
    #[validate(custom(function = "http_url"), length(max = 400))]
    link: Option<String>,
}

/// Links must be absolute `http`/`https` URLs with a host.
fn http_url(link: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(link).map_err(|_| ValidationError::new("url"))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        _ => Err(ValidationError::new("url_scheme")),
    }
}

pub fn invalid_message(field: &str) -> String {
    format!("The {} field is invalid.", field)
}

/// Validate a raw outgoing payload. Unknown keys are ignored.
pub fn validate(raw: &Map<String, Value>) -> Result<OutgoingInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let form = OutgoingForm {
        username: coerce(raw, "username", as_string, &mut errors),
        name: coerce(raw, "name", as_string, &mut errors),
        date: coerce(raw, "date", as_date, &mut errors),
        country: coerce(raw, "country", as_string, &mut errors),
        region: coerce(raw, "region", as_string, &mut errors),
        city: coerce(raw, "city", as_string, &mut errors),
        thanked: coerce(raw, "thanked", as_bool, &mut errors),
        has_been_sent: coerce(raw, "has_been_sent", as_bool, &mut errors),
        occasion: coerce(raw, "occasion", as_string, &mut errors),
        description: coerce(raw, "description", as_string, &mut errors),
        link: coerce(raw, "link", as_string, &mut errors),
    };

    if let Err(rule_errors) = form.validate() {
        for (field, field_errors) in rule_errors.field_errors() {
            let field = field.to_string();
            // A field that failed coercion already carries its message
            if errors.contains_key(&field) {
                continue;
            }
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| invalid_message(&field))
                })
                .collect();
            errors.insert(field, messages);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match (form.username, form.date, form.country) {
        (Some(username), Some(date), Some(country)) => Ok(OutgoingInput {
            username,
            name: form.name,
            date,
            country,
            region: form.region,
            city: form.city,
            thanked: form.thanked,
            has_been_sent: form.has_been_sent,
            occasion: form.occasion,
            description: form.description,
            link: form.link,
        }),
        // `required` rules above reject these before we get here
        _ => Err(errors),
    }
}

fn coerce<T>(
    raw: &Map<String, Value>,
    field: &str,
    convert: fn(&Value) -> Option<T>,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = match raw.get(field) {
        None | Some(Value::Null) => return None,
        Some(Value::String(s)) if s.trim().is_empty() => return None,
        Some(value) => value,
    };

    let converted = convert(value);
    if converted.is_none() {
        errors
            .entry(field.to_string())
            .or_default()
            .push(invalid_message(field));
    }
    converted
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.trim().to_string())
}

/// Accepts `true`, `false`, `0`, `1`, `"0"` and `"1"`.
fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose date part is kept.
/// Years outside 0000-9999 are refused so stored dates sort as text.
fn as_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .filter(|date| (0..=9999).contains(&date.year()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn minimal_payload_is_accepted() {
        let input = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01",
            "country": "US"
        })))
        .unwrap();

        assert_eq!(input.username, "alice");
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(input.thanked, None);
        assert_eq!(input.has_been_sent, None);

        let fields = input.into_fields(false, false);
        assert!(!fields.thanked);
        assert!(!fields.has_been_sent);
    }

    #[test]
    fn missing_required_fields_use_custom_messages() {
        let errors = validate(&object(json!({ "name": "Alice" }))).unwrap_err();

        assert_eq!(errors["username"], vec!["The username field is required."]);
        assert_eq!(errors["date"], vec!["The date field is required."]);
        assert_eq!(errors["country"], vec!["The country field is required."]);
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn empty_and_null_values_count_as_missing() {
        let errors = validate(&object(json!({
            "username": "   ",
            "date": null,
            "country": "US"
        })))
        .unwrap_err();

        assert_eq!(errors["username"], vec!["The username field is required."]);
        assert_eq!(errors["date"], vec!["The date field is required."]);
    }

    #[test]
    fn malformed_link_is_rejected() {
        let errors = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01",
            "country": "US",
            "link": "not-a-url"
        })))
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors["link"], vec!["The link field is invalid."]);
    }

    #[test]
    fn links_must_be_http_or_https() {
        for link in [
            "javascript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "foo:bar",
            "ftp://example.com/card",
            "https://",
        ] {
            let errors = validate(&object(json!({
                "username": "alice",
                "date": "2024-01-01",
                "country": "US",
                "link": link
            })))
            .unwrap_err();
            assert_eq!(errors["link"], vec!["The link field is invalid."], "link {}", link);
        }

        let input = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01",
            "country": "US",
            "link": "http://example.com/card?id=1"
        })))
        .unwrap();
        assert_eq!(input.link.as_deref(), Some("http://example.com/card?id=1"));
    }

    #[test]
    fn dates_beyond_four_digit_years_are_rejected() {
        for date in ["+10000-01-01", "10000-01-01", "-0001-01-01"] {
            let errors = validate(&object(json!({
                "username": "alice",
                "date": date,
                "country": "US"
            })))
            .unwrap_err();
            assert_eq!(errors["date"], vec!["The date field is invalid."], "date {}", date);
        }

        let input = validate(&object(json!({
            "username": "alice",
            "date": "9999-12-31",
            "country": "US"
        })))
        .unwrap();
        assert_eq!(input.date, NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());
    }

    #[test]
    fn length_limits_count_characters() {
        let at_limit = "é".repeat(150);
        let ok = validate(&object(json!({
            "username": at_limit,
            "date": "2024-01-01",
            "country": "US",
            "description": "x".repeat(1500)
        })));
        assert!(ok.is_ok());

        let errors = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01",
            "country": "x".repeat(151),
            "occasion": "x".repeat(351),
            "link": format!("https://example.com/{}", "a".repeat(400))
        })))
        .unwrap_err();

        assert_eq!(errors["country"], vec!["The country field is invalid."]);
        assert!(errors.contains_key("occasion"));
        assert!(errors.contains_key("link"));
    }

    #[test]
    fn wrong_types_get_one_generic_message() {
        let errors = validate(&object(json!({
            "username": 42,
            "date": "31/12/2024",
            "country": "US",
            "thanked": "yes"
        })))
        .unwrap_err();

        assert_eq!(errors["username"], vec!["The username field is invalid."]);
        assert_eq!(errors["date"], vec!["The date field is invalid."]);
        assert_eq!(errors["thanked"], vec!["The thanked field is invalid."]);
    }

    #[test]
    fn booleans_accept_numeric_forms() {
        let input = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01T10:00:00Z",
            "country": "US",
            "thanked": 1,
            "has_been_sent": "0"
        })))
        .unwrap();

        assert_eq!(input.thanked, Some(true));
        assert_eq!(input.has_been_sent, Some(false));
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn unknown_fields_are_ignored_and_strings_trimmed() {
        let input = validate(&object(json!({
            "username": "  alice ",
            "date": "2024-01-01",
            "country": "US",
            "user_id": "someone-else",
            "extra": [1, 2, 3]
        })))
        .unwrap();

        assert_eq!(input.username, "alice");
    }

    #[test]
    fn submitted_flags_override_fallbacks() {
        let input = validate(&object(json!({
            "username": "alice",
            "date": "2024-01-01",
            "country": "US",
            "thanked": true
        })))
        .unwrap();

        let fields = input.into_fields(false, true);
        assert!(fields.thanked);
        assert!(fields.has_been_sent);
    }
}
