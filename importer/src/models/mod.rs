//! Domain models for the customer import pipeline.
//!
//! - [`RawRow`] - One CSV row exactly as read
//! - [`Customer`] - Normalized candidate record, what the sink stores
//! - [`Field`] - Names of the validated fields
//! - [`FieldError`] - A failing field with its message
//! - [`Outcome`] - Accepted or rejected classification of a row
//! - [`Rejection`] - A rejected row ready for the error report

use serde::{Deserialize, Serialize};

/// Number of positional columns in an input row.
pub const ROW_WIDTH: usize = 5;

/// Column names of the input file, in positional order.
pub const COLUMNS: [&str; ROW_WIDTH] = ["id", "name", "email", "age", "location"];

/// Location used when the row leaves it empty.
pub const UNKNOWN_LOCATION: &str = "Unknown";

// =============================================================================
// Raw Row
// =============================================================================

/// A row as it appears in the CSV file.
///
/// Short rows are padded with empty strings, extra columns are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    fields: [String; ROW_WIDTH],
    /// 1-based line the record starts on.
    pub line: u64,
}

impl RawRow {
    /// Build a row from any number of fields.
    pub fn new<I, S>(fields: I, line: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut padded: [String; ROW_WIDTH] = Default::default();
        for (slot, value) in padded.iter_mut().zip(fields) {
            *slot = value.into();
        }
        Self { fields: padded, line }
    }

    pub fn id(&self) -> &str {
        &self.fields[0]
    }

    pub fn name(&self) -> &str {
        &self.fields[1]
    }

    pub fn email(&self) -> &str {
        &self.fields[2]
    }

    pub fn age(&self) -> &str {
        &self.fields[3]
    }

    pub fn location(&self) -> &str {
        &self.fields[4]
    }

    /// All five fields in column order.
    pub fn fields(&self) -> &[String; ROW_WIDTH] {
        &self.fields
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A normalized customer derived from a [`RawRow`].
///
/// Until it passes validation this is only a candidate: `surname` may be
/// missing and `age` may be out of range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub surname: Option<String>,
    pub email: String,
    pub age: i64,
    pub location: String,
    pub country_code: Option<String>,
}

/// Borrowed value of a single field, as seen by the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Integer(i64),
}

impl Customer {
    /// Look up a field by name.
    pub fn value(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Name => FieldValue::Text(Some(&self.name)),
            Field::Surname => FieldValue::Text(self.surname.as_deref()),
            Field::Email => FieldValue::Text(Some(&self.email)),
            Field::Age => FieldValue::Integer(self.age),
            Field::Location => FieldValue::Text(Some(&self.location)),
            Field::CountryCode => FieldValue::Text(self.country_code.as_deref()),
        }
    }
}

// =============================================================================
// Fields and errors
// =============================================================================

/// Validated fields of a [`Customer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Surname,
    Email,
    Age,
    Location,
    CountryCode,
}

impl Field {
    /// Column name used in logs and in the error report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Surname => "surname",
            Self::Email => "email",
            Self::Age => "age",
            Self::Location => "location",
            Self::CountryCode => "country_code",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// =============================================================================
// Classification
// =============================================================================

/// A row that failed validation, kept with its original values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub row: RawRow,
    pub errors: Vec<FieldError>,
}

impl Rejection {
    /// Names of the failing fields, in rule order.
    pub fn failed_fields(&self) -> Vec<Field> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

/// Result of validating one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Customer),
    Rejected(Rejection),
}
