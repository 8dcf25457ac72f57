//! Raw row -> candidate customer.
//!
//! Normalization never fails: whatever is wrong with a row is left for the
//! validator to report.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::countries::CountryIndex;
use crate::models::{Customer, RawRow, UNKNOWN_LOCATION};

/// Leading numeric prefix: optional sign, digits with optional fraction,
/// optional exponent.
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("numeric prefix pattern is valid")
});

/// Build the candidate record for a row.
///
/// - `name`/`surname`: first two whitespace-separated tokens of the name
/// - `age`: see [`coerce_age`]
/// - `location`: `"Unknown"` when empty
/// - `country_code`: looked up from the final location
pub fn normalize(row: &RawRow, countries: &CountryIndex) -> Customer {
    let mut tokens = row.name().split_whitespace();
    let name = tokens.next().unwrap_or_default().to_string();
    let surname = tokens.next().map(str::to_string);

    let location = if row.location().is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        row.location().to_string()
    };
    let country_code = countries.resolve(&location).map(str::to_string);

    Customer {
        name,
        surname,
        email: row.email().to_string(),
        age: coerce_age(row.age()),
        location,
        country_code,
    }
}

/// Lenient integer conversion.
///
/// Reads the leading number and ignores anything after it, so `"30"` is 30,
/// `" 42 years"` is 42, `"3.9"` is 3 and `"1e2"` is 100. Text without a leading
/// number is 0. Out-of-range values saturate.
pub fn coerce_age(raw: &str) -> i64 {
    let Some(number) = NUMERIC_PREFIX.captures(raw).and_then(|c| c.get(1)) else {
        return 0;
    };
    let number = number.as_str();

    if let Ok(value) = number.parse::<i64>() {
        return value;
    }

    // Fractions, exponents, or integers too long for i64. `as` truncates
    // toward zero and saturates.
    number.parse::<f64>().map(|v| v as i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn index() -> CountryIndex {
        let codes: BTreeMap<String, String> = [("FR", "FRA"), ("ES", "ESP")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let names: BTreeMap<String, String> = [("FR", "France"), ("ES", "Spain")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CountryIndex::from_maps(codes, names)
    }

    #[test]
    fn test_full_row() {
        let row = RawRow::new(["1", "John Smith", "john@example.com", "30", "France"], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.name, "John");
        assert_eq!(customer.surname.as_deref(), Some("Smith"));
        assert_eq!(customer.email, "john@example.com");
        assert_eq!(customer.age, 30);
        assert_eq!(customer.location, "France");
        assert_eq!(customer.country_code.as_deref(), Some("FRA"));
    }

    #[test]
    fn test_single_token_name_has_no_surname() {
        let row = RawRow::new(["2", "Madonna", "madonna@example.com", "40", ""], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.name, "Madonna");
        assert_eq!(customer.surname, None);
    }

    #[test]
    fn test_extra_name_tokens_dropped() {
        let row = RawRow::new(["3", "  Mary   Ann  Jones ", "m@x.io", "20", "Spain"], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.name, "Mary");
        assert_eq!(customer.surname.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_empty_name() {
        let row = RawRow::new(["4", "", "m@x.io", "20", "Spain"], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.name, "");
        assert_eq!(customer.surname, None);
    }

    #[test]
    fn test_empty_location_defaults_to_unknown() {
        let row = RawRow::new(["5", "A B", "a@b.io", "20", ""], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.location, "Unknown");
        assert_eq!(customer.country_code, None);
    }

    #[test]
    fn test_country_lookup_ignores_case() {
        let row = RawRow::new(["6", "A B", "a@b.io", "20", "sPaIn"], 2);
        let customer = normalize(&row, &index());

        assert_eq!(customer.location, "sPaIn");
        assert_eq!(customer.country_code.as_deref(), Some("ESP"));
    }

    #[test]
    fn test_coerce_age() {
        assert_eq!(coerce_age("30"), 30);
        assert_eq!(coerce_age("  42"), 42);
        assert_eq!(coerce_age("42 years"), 42);
        assert_eq!(coerce_age("+18"), 18);
        assert_eq!(coerce_age("-5"), -5);
        assert_eq!(coerce_age("3.9"), 3);
        assert_eq!(coerce_age("1e2"), 100);
        assert_eq!(coerce_age(".5"), 0);
    }

    #[test]
    fn test_coerce_age_non_numeric_is_zero() {
        assert_eq!(coerce_age(""), 0);
        assert_eq!(coerce_age("abc"), 0);
        assert_eq!(coerce_age("years 42"), 0);
        assert_eq!(coerce_age("-"), 0);
    }

    #[test]
    fn test_coerce_age_saturates() {
        assert_eq!(coerce_age("99999999999999999999999"), i64::MAX);
        assert_eq!(coerce_age("-99999999999999999999999"), i64::MIN);
    }
}
