use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{AppError, FieldError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Collects field errors for one request body and turns them into a single
/// `Validation failed` response.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// A trimmed string whose char count lies in `min..=max`. Missing values
    /// are reported as required.
    pub fn required_text(
        &mut self,
        fields: &Map<String, Value>,
        field: &str,
        min: usize,
        max: usize,
    ) -> Option<String> {
        match self.string(fields, field)? {
            Some(s) => self.bounded(field, s, min, max),
            None => {
                self.push(field, format!("{field} is required"));
                None
            }
        }
    }

    /// Like [`Checks::required_text`] but absence is fine.
    pub fn optional_text(
        &mut self,
        fields: &Map<String, Value>,
        field: &str,
        min: usize,
        max: usize,
    ) -> Option<String> {
        self.string(fields, field)?
            .and_then(|s| self.bounded(field, s, min, max))
    }

    /// A required string taken verbatim. Only emptiness and length are checked; use this
    /// for secrets, where surrounding whitespace is significant.
    pub fn required_raw(
        &mut self,
        fields: &Map<String, Value>,
        field: &str,
        max: usize,
    ) -> Option<String> {
        match self.string(fields, field)? {
            Some(s) if !s.is_empty() && s.chars().count() <= max => Some(s.to_string()),
            Some(s) if !s.is_empty() => {
                self.push(field, format!("{field} must be at most {max} characters"));
                None
            }
            _ => {
                self.push(field, format!("{field} is required"));
                None
            }
        }
    }

    /// A required, syntactically valid address, lower-cased.
    pub fn email(&mut self, fields: &Map<String, Value>, field: &str) -> Option<String> {
        let value = self.required_text(fields, field, 1, 254)?;
        if is_email(&value) {
            Some(value.to_lowercase())
        } else {
            self.push(field, "Invalid email address");
            None
        }
    }

    /// A boolean flag. Form posts send strings, so the usual spellings are
    /// accepted; absence means `false`.
    pub fn flag(&mut self, fields: &Map<String, Value>, field: &str) -> bool {
        match fields.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => match s.trim() {
                "true" | "on" | "1" | "yes" => true,
                "false" | "off" | "0" | "no" | "" => false,
                _ => {
                    self.push(field, format!("{field} must be a boolean"));
                    false
                }
            },
            Some(_) => {
                self.push(field, format!("{field} must be a boolean"));
                false
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }

    // Outer None: wrong type (already reported). Inner None: absent.
    fn string<'a>(
        &mut self,
        fields: &'a Map<String, Value>,
        field: &str,
    ) -> Option<Option<&'a str>> {
        match fields.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s.as_str())),
            Some(_) => {
                self.push(field, format!("{field} must be a string"));
                None
            }
        }
    }

    fn bounded(&mut self, field: &str, raw: &str, min: usize, max: usize) -> Option<String> {
        let value = raw.trim();
        let len = value.chars().count();
        if len < min {
            if min <= 1 {
                self.push(field, format!("{field} is required"));
            } else {
                self.push(field, format!("{field} must be at least {min} characters"));
            }
            None
        } else if len > max {
            self.push(field, format!("{field} must be at most {max} characters"));
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn email_syntax() {
        assert!(is_email("admin@test.com"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("a b@c.com"));
        assert!(!is_email("a@b"));
    }

    #[test]
    fn required_text_trims_and_bounds() {
        let fields = obj(json!({ "title": "  Loft  ", "short": "Too short", "num": 5 }));
        let mut checks = Checks::new();

        assert_eq!(checks.required_text(&fields, "title", 1, 200).as_deref(), Some("Loft"));
        assert!(checks.is_empty());

        assert_eq!(checks.required_text(&fields, "short", 20, 2000), None);
        assert_eq!(checks.required_text(&fields, "missing", 1, 10), None);
        assert_eq!(checks.required_text(&fields, "num", 1, 10), None);

        let Err(AppError::Validation(errors)) = checks.finish() else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["short", "missing", "num"]);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let fields = obj(json!({ "title": "   " }));
        let mut checks = Checks::new();
        assert_eq!(checks.required_text(&fields, "title", 1, 200), None);
        assert!(!checks.is_empty());
    }

    #[test]
    fn raw_text_keeps_surrounding_whitespace() {
        let fields = obj(json!({ "password": "  pw  ", "empty": "", "num": 1 }));
        let mut checks = Checks::new();
        assert_eq!(checks.required_raw(&fields, "password", 1024).as_deref(), Some("  pw  "));
        assert!(checks.is_empty());

        assert_eq!(checks.required_raw(&fields, "empty", 1024), None);
        assert_eq!(checks.required_raw(&fields, "missing", 1024), None);
        assert_eq!(checks.required_raw(&fields, "num", 1024), None);
        assert_eq!(checks.required_raw(&fields, "password", 3), None);

        let Err(AppError::Validation(errors)) = checks.finish() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn optional_text_allows_absence() {
        let fields = obj(json!({}));
        let mut checks = Checks::new();
        assert_eq!(checks.optional_text(&fields, "title", 1, 200), None);
        assert!(checks.finish().is_ok());
    }

    #[test]
    fn email_is_lowercased() {
        let fields = obj(json!({ "email": "Client@Example.COM" }));
        let mut checks = Checks::new();
        assert_eq!(checks.email(&fields, "email").as_deref(), Some("client@example.com"));
    }

    #[test]
    fn flags_accept_form_spellings() {
        let fields = obj(json!({ "a": true, "b": "on", "c": "false", "d": "maybe" }));
        let mut checks = Checks::new();
        assert!(checks.flag(&fields, "a"));
        assert!(checks.flag(&fields, "b"));
        assert!(!checks.flag(&fields, "c"));
        assert!(!checks.flag(&fields, "absent"));
        assert!(checks.is_empty());
        checks.flag(&fields, "d");
        assert!(!checks.is_empty());
    }
}
