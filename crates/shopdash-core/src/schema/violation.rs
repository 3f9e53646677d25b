use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// A required key was absent.
    Required,
    /// The value had the wrong JSON type.
    Type,
    /// The body was not JSON at all.
    Json,
    MinLength,
    Positive,
    Integer,
    NonNegative,
    Range,
    Url,
    Email,
    DateTime,
}

impl Constraint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Constraint::Required => "required",
            Constraint::Type => "type",
            Constraint::Json => "json",
            Constraint::MinLength => "min_length",
            Constraint::Positive => "positive",
            Constraint::Integer => "integer",
            Constraint::NonNegative => "non_negative",
            Constraint::Range => "range",
            Constraint::Url => "url",
            Constraint::Email => "email",
            Constraint::DateTime => "datetime",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path such as `products[3].reviews[0].reviewerEmail`; `$` is the root.
    pub path: String,
    pub constraint: Constraint,
    /// What was wrong with the offending value.
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.constraint, self.detail)
    }
}

/// Every violation found while parsing one value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Builds the error reported when a response body is not valid JSON.
    #[must_use]
    pub fn malformed_json(error: &serde_json::Error) -> Self {
        Self {
            violations: vec![Violation {
                path: ROOT.to_string(),
                constraint: Constraint::Json,
                detail: error.to_string(),
            }],
        }
    }

    /// Returns `true` if any violation's path ends in `field`.
    ///
    /// `mentions("price")` matches both `price` and `products[2].price`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| {
            v.path == field || v.path.ends_with(&format!(".{field}"))
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema violation(s)", self.violations.len())?;
        for (i, v) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{v}")?;
        }
        Ok(())
    }
}

pub(super) const ROOT: &str = "$";

pub(super) fn child_path(parent: &str, key: &str) -> String {
    if parent == ROOT {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

pub(super) fn index_path(parent: &str, index: usize) -> String {
    if parent == ROOT {
        format!("[{index}]")
    } else {
        format!("{parent}[{index}]")
    }
}

/// Short description of a JSON value for violation details.
pub(super) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(40).collect();
            format!("string \"{head}...\"")
        }
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// Accumulates violations while a value is walked.
///
/// Extractors return `None` whenever they record a violation, so a parse
/// that produced `Some` with no violations is complete.
#[derive(Debug, Default)]
pub(super) struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    pub(super) fn violate(&mut self, path: &str, constraint: Constraint, detail: impl Into<String>) {
        self.violations.push(Violation {
            path: path.to_string(),
            constraint,
            detail: detail.into(),
        });
    }

    pub(super) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(v) if self.violations.is_empty() => Ok(v),
            _ => Err(ValidationError {
                violations: self.violations,
            }),
        }
    }

    pub(super) fn object<'v>(
        &mut self,
        path: &str,
        value: &'v Value,
    ) -> Option<&'v Map<String, Value>> {
        if let Value::Object(map) = value {
            Some(map)
        } else {
            self.violate(path, Constraint::Type, format!("expected object, got {}", describe(value)));
            None
        }
    }

    pub(super) fn array<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v [Value]> {
        if let Value::Array(items) = value {
            Some(items)
        } else {
            self.violate(path, Constraint::Type, format!("expected array, got {}", describe(value)));
            None
        }
    }

    /// Looks up a required key, recording `required` when it is absent.
    pub(super) fn required<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        path: &str,
    ) -> Option<&'v Value> {
        let key = path.rsplit('.').next().unwrap_or(path);
        let found = map.get(key);
        if found.is_none() {
            self.violate(path, Constraint::Required, "missing");
        }
        found
    }

    pub(super) fn string(&mut self, map: &Map<String, Value>, path: &str) -> Option<String> {
        let value = self.required(map, path)?;
        self.as_string(path, value)
    }

    /// Like [`Checker::string`] but absence is allowed. `null` is still a
    /// type violation.
    pub(super) fn optional_string(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<Option<String>, ()> {
        let key = path.rsplit('.').next().unwrap_or(path);
        match map.get(key) {
            None => Ok(None),
            Some(value) => self.as_string(path, value).map(Some).ok_or(()),
        }
    }

    pub(super) fn as_string(&mut self, path: &str, value: &Value) -> Option<String> {
        if let Value::String(s) = value {
            Some(s.clone())
        } else {
            self.violate(path, Constraint::Type, format!("expected string, got {}", describe(value)));
            None
        }
    }

    pub(super) fn number(&mut self, map: &Map<String, Value>, path: &str) -> Option<f64> {
        let value = self.required(map, path)?;
        if let Some(n) = value.as_f64() {
            Some(n)
        } else {
            self.violate(path, Constraint::Type, format!("expected number, got {}", describe(value)));
            None
        }
    }

    /// Reads a non-negative integer. Numbers with a zero fractional part
    /// (`5.0`) are accepted; anything else is rejected, never truncated.
    pub(super) fn unsigned(&mut self, map: &Map<String, Value>, path: &str) -> Option<u64> {
        let value = self.required(map, path)?;
        self.as_unsigned(path, value)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    pub(super) fn as_unsigned(&mut self, path: &str, value: &Value) -> Option<u64> {
        let Value::Number(n) = value else {
            self.violate(path, Constraint::Type, format!("expected number, got {}", describe(value)));
            return None;
        };
        if let Some(u) = n.as_u64() {
            return Some(u);
        }
        if n.as_i64().is_some() {
            self.violate(path, Constraint::NonNegative, format!("got {}", describe(value)));
            return None;
        }
        match n.as_f64() {
            // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
            Some(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => Some(f as u64),
            Some(f) if f.fract() == 0.0 && f < 0.0 => {
                self.violate(path, Constraint::NonNegative, format!("got {}", describe(value)));
                None
            }
            Some(f) if f.fract() == 0.0 => {
                self.violate(
                    path,
                    Constraint::Range,
                    format!("got {}, exceeds {}", describe(value), u64::MAX),
                );
                None
            }
            _ => {
                self.violate(path, Constraint::Integer, format!("got {}", describe(value)));
                None
            }
        }
    }

    /// Parses every element of an array field with `item`, collecting
    /// violations from all elements before giving up.
    pub(super) fn list<T>(
        &mut self,
        path: &str,
        value: &Value,
        mut item: impl FnMut(&mut Self, &str, &Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let items = self.array(path, value)?;
        let mut out = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, element) in items.iter().enumerate() {
            match item(self, &index_path(path, i), element) {
                Some(parsed) if complete => out.push(parsed),
                Some(_) => {}
                None => complete = false,
            }
        }
        complete.then_some(out)
    }

    pub(super) fn list_field<T>(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
        item: impl FnMut(&mut Self, &str, &Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let value = self.required(map, path)?;
        self.list(path, value, item)
    }
}
