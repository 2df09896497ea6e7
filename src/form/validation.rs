use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use super::controller::{FormResult, FormValues};

type RulePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate that reports an error, paired with the message shown for it.
///
/// The rule *fires* when the predicate returns `true`.
#[derive(Clone)]
pub struct ValidationRule {
    predicate: RulePredicate,
    message: String,
}

impl ValidationRule {
    pub fn new(
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(|value| value.trim().is_empty(), message)
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::new(move |value| value.chars().count() < min, message)
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(move |value| value.chars().count() > max, message)
    }

    /// Fires when `accept` rejects the value.
    pub fn unless(
        accept: impl Fn(&str) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self::new(move |value| !accept(value), message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fires(&self, value: &str) -> bool {
        (self.predicate)(value)
    }
}

impl Debug for ValidationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

pub(super) fn collect_errors(rules: &[ValidationRule], value: &str) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.fires(value))
        .map(|rule| rule.message.clone())
        .collect()
}

/// Conversion between a submitted string and a typed model field.
pub trait FieldValue: Sized {
    fn parse_field(raw: &str) -> Result<Self, String>;
    fn to_field(&self) -> String;
}

impl FieldValue for String {
    fn parse_field(raw: &str) -> Result<Self, String> {
        Ok(raw.to_owned())
    }

    fn to_field(&self) -> String {
        self.clone()
    }
}

impl FieldValue for Option<String> {
    fn parse_field(raw: &str) -> Result<Self, String> {
        Ok((!raw.is_empty()).then(|| raw.to_owned()))
    }

    fn to_field(&self) -> String {
        self.clone().unwrap_or_default()
    }
}

impl FieldValue for bool {
    fn parse_field(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "" | "false" | "off" | "0" => Ok(false),
            "true" | "on" | "1" => Ok(true),
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }

    fn to_field(&self) -> String {
        self.to_string()
    }
}

macro_rules! numeric_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn parse_field(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|error| error.to_string())
                }

                fn to_field(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_field_value!(i32, i64, u32, u64, usize, f32, f64);

/// A struct whose fields map one-to-one onto named form values.
///
/// Usually derived with `#[derive(FormModel)]`.
pub trait FormModel: Sized {
    type Fields;

    const FIELD_NAMES: &'static [&'static str];

    fn fields() -> Self::Fields;
    fn from_values(values: &FormValues) -> FormResult<Self>;
    fn to_values(&self) -> FormValues;
}
