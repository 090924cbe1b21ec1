//! Field state and validators shared by the entry forms.

use chrono::NaiveDate;

use crate::error::domain::FieldErrors;

/// Message for an empty required field.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Message for a date not in `YYYY-MM-DD` form.
pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date in YYYY-MM-DD format.";

/// Date format the catalog API reads and writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A text input and whether the user has interacted with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
    pub value: String,
    pub touched: bool,
}

impl FormField {
    /// Sets the value and marks the field touched.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.touched = true;
    }

    /// Trimmed value, `None` when blank.
    pub fn text(&self) -> Option<&str> {
        let value = self.value.trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Records a required-field error for `name` when `field` is blank.
pub(crate) fn require(errors: &mut FieldErrors, name: &str, field: &FormField) {
    if field.text().is_none() {
        errors.insert(name, REQUIRED_MESSAGE);
    }
}

/// Parses `field` as a date. A filled but malformed value records an error
/// for `name`; a blank one is left to [`require`].
pub(crate) fn check_date(errors: &mut FieldErrors, name: &str, field: &FormField) -> Option<NaiveDate> {
    let value = field.text()?;
    let date = parse_date(value);
    if date.is_none() {
        errors.insert(name, INVALID_DATE_MESSAGE);
    }
    date
}
