use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::ApiError;

pub const REQUIRED: &str = "This field is required.";

/// Collects per-field validation messages and turns them into one 400
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Returns the trimmed value, recording an error when it is absent or blank
    pub fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.add(field, REQUIRED);
                None
            }
        }
    }

    /// Records an error when the value is missing
    pub fn present<'a, T>(&mut self, field: &str, value: &'a Option<T>) -> Option<&'a T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value.as_ref()
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.add(field, format!("Ensure this field has no more than {max} characters."));
            }
        }
    }

    pub fn non_negative(&mut self, field: &str, negative: bool) {
        if negative {
            self.add(field, "Ensure this value is greater than or equal to 0.");
        }
    }

    /// Records an error when the value does not fit a `NUMERIC(digits, places)` column
    pub fn decimal_fits(&mut self, field: &str, value: Decimal, digits: u32, places: u32) {
        let value = value.normalize();
        let whole_digits = digits.saturating_sub(places);
        if value.scale() > places {
            self.add(field, format!("Ensure that there are no more than {places} decimal places."));
        } else if value.trunc().abs() >= Decimal::from(10_i64.pow(whole_digits)) {
            self.add(
                field,
                format!("Ensure that there are no more than {whole_digits} digits before the decimal point."),
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input.", Some(self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_first_message_per_field() {
        let mut errors = FieldErrors::new();
        let name: Option<String> = Some("   ".into());
        assert_eq!(errors.required("name", &name), None);
        errors.max_len("name", Some("x"), 0);

        let Err(ApiError::ValidationError { field_errors: Some(fields), .. }) = errors.into_result() else {
            panic!("expected validation error");
        };
        assert_eq!(fields["name"], REQUIRED);
    }

    #[test]
    fn valid_input_passes() {
        let mut errors = FieldErrors::new();
        let pincode = Some(" 110001 ".to_string());
        assert_eq!(errors.required("pincode", &pincode), Some("110001"));
        errors.max_len("pincode", Some("110001"), 10);
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn decimals_must_fit_their_column() {
        let mut errors = FieldErrors::new();
        errors.decimal_fits("weight", Decimal::new(999_999_999_999, 3), 12, 3);
        errors.decimal_fits("price", Decimal::new(12_500, 3), 12, 2);
        assert!(errors.is_empty());

        errors.decimal_fits("weight", Decimal::from(1_000_000_000_i64), 12, 3);
        errors.decimal_fits("price", Decimal::new(12_345, 3), 12, 2);
        let Err(ApiError::ValidationError { field_errors: Some(fields), .. }) = errors.into_result() else {
            panic!("expected validation error");
        };
        assert_eq!(fields["weight"], "Ensure that there are no more than 9 digits before the decimal point.");
        assert_eq!(fields["price"], "Ensure that there are no more than 2 decimal places.");
    }
}
