//! Field validation for candidate customers.
//!
//! Rules are declared in a static table, [`RULES`], mapping each field to an
//! ordered list of [`Rule`]s. Every rule is a predicate over a single
//! [`FieldValue`]; the table is evaluated uniformly by [`validate`].
//!
//! | field        | rules                                    |
//! |--------------|------------------------------------------|
//! | name         | required, max 255                        |
//! | surname      | required, max 255                        |
//! | email        | required, max 255, email (syntax + DNS)  |
//! | age          | integer, between 18 and 99               |
//! | location     | required, max 255                        |
//! | country_code | nullable, max 3                          |
//!
//! # Example
//!
//! ```rust,ignore
//! let resolver = CachingResolver::new(SystemResolver::from_system_conf()?);
//! let validator = Validator::new(&countries, &resolver);
//! match validator.classify(row) {
//!     Outcome::Accepted(customer) => accepted.push(customer),
//!     Outcome::Rejected(rejection) => rejected.push(rejection),
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use hickory_resolver::config::ResolverOpts;
use hickory_resolver::Resolver;
use validator::ValidateEmail;

use crate::countries::CountryIndex;
use crate::error::ResolverError;
use crate::models::{Customer, Field, FieldError, FieldValue, Outcome, RawRow, Rejection};
use crate::transform::normalize;

/// Maximum length of text fields, in characters.
pub const MAX_LENGTH: usize = 255;

/// Youngest accepted age.
pub const MIN_AGE: i64 = 18;

/// Oldest accepted age.
pub const MAX_AGE: i64 = 99;

// =============================================================================
// Rules
// =============================================================================

/// A single constraint on a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not blank.
    Required,
    /// Absent values pass and skip the remaining rules.
    Nullable,
    /// At most this many characters.
    MaxLength(usize),
    /// RFC syntax and a domain that resolves.
    Email,
    /// Holds an integer.
    Integer,
    /// Integer within the inclusive range.
    Between(i64, i64),
}

/// The rule table.
pub static RULES: &[(Field, &[Rule])] = &[
    (Field::Name, &[Rule::Required, Rule::MaxLength(MAX_LENGTH)]),
    (Field::Surname, &[Rule::Required, Rule::MaxLength(MAX_LENGTH)]),
    (
        Field::Email,
        &[Rule::Required, Rule::MaxLength(MAX_LENGTH), Rule::Email],
    ),
    (Field::Age, &[Rule::Integer, Rule::Between(MIN_AGE, MAX_AGE)]),
    (Field::Location, &[Rule::Required, Rule::MaxLength(MAX_LENGTH)]),
    (Field::CountryCode, &[Rule::Nullable, Rule::MaxLength(3)]),
];

/// Result of one rule on one value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Check {
    Pass,
    /// Pass and stop evaluating the field.
    Stop,
    Fail(String),
}

impl Rule {
    fn check(&self, field: Field, value: FieldValue<'_>, resolver: &dyn DomainResolver) -> Check {
        match (self, value) {
            (Rule::Required, FieldValue::Text(text)) => {
                if text.is_some_and(|t| !t.trim().is_empty()) {
                    Check::Pass
                } else {
                    Check::Fail(format!("The {} field is required.", field))
                }
            }
            (Rule::Required, FieldValue::Integer(_)) => Check::Pass,

            (Rule::Nullable, FieldValue::Text(None)) => Check::Stop,
            (Rule::Nullable, _) => Check::Pass,

            (Rule::MaxLength(max), FieldValue::Text(Some(text))) => {
                if text.chars().count() <= *max {
                    Check::Pass
                } else {
                    Check::Fail(format!(
                        "The {} field must not be greater than {} characters.",
                        field, max
                    ))
                }
            }
            (Rule::MaxLength(_), _) => Check::Pass,

            (Rule::Email, FieldValue::Text(Some(text))) => {
                if is_deliverable_email(text, resolver) {
                    Check::Pass
                } else {
                    Check::Fail(format!("The {} field must be a valid email address.", field))
                }
            }
            (Rule::Email, _) => Check::Fail(format!(
                "The {} field must be a valid email address.",
                field
            )),

            (Rule::Integer, FieldValue::Integer(_)) => Check::Pass,
            (Rule::Integer, FieldValue::Text(text)) => {
                if text.is_some_and(|t| t.trim().parse::<i64>().is_ok()) {
                    Check::Pass
                } else {
                    Check::Fail(format!("The {} field must be an integer.", field))
                }
            }

            (Rule::Between(min, max), FieldValue::Integer(n)) => {
                if (*min..=*max).contains(&n) {
                    Check::Pass
                } else {
                    Check::Fail(format!(
                        "The {} field must be between {} and {}.",
                        field, min, max
                    ))
                }
            }
            (Rule::Between(min, max), FieldValue::Text(_)) => Check::Fail(format!(
                "The {} field must be between {} and {}.",
                field, min, max
            )),
        }
    }
}

/// Email syntax check followed by a DNS check of the domain part.
///
/// Only public host names are looked up. IP literals (`user@[10.0.0.1]`),
/// single-label hosts (`user@localhost`) and numeric hosts
/// (`user@2130706433`, `user@127.0.0.1`) are rejected without a query.
fn is_deliverable_email(email: &str, resolver: &dyn DomainResolver) -> bool {
    if !email.validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };

    is_public_hostname(domain) && resolver.resolves(domain)
}

/// At least two labels, and a top-level label that is not all digits.
fn is_public_hostname(domain: &str) -> bool {
    if domain.starts_with('[') {
        return false;
    }
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    match domain.rsplit_once('.') {
        Some((rest, tld)) => {
            !rest.is_empty() && !tld.is_empty() && !tld.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

// =============================================================================
// Domain resolution
// =============================================================================

/// Answers whether an email domain exists.
pub trait DomainResolver {
    fn resolves(&self, domain: &str) -> bool;
}

impl<F> DomainResolver for F
where
    F: Fn(&str) -> bool,
{
    fn resolves(&self, domain: &str) -> bool {
        self(domain)
    }
}

/// DNS lookups through the system's nameservers.
///
/// A domain exists when it has an MX record or, failing that, an A/AAAA
/// record. The hosts file is ignored and names are queried fully qualified,
/// so search domains never apply.
///
/// Lookups block on an internal runtime: call from a plain thread or
/// `spawn_blocking`, never from inside an async task.
pub struct SystemResolver {
    inner: Resolver,
}

impl SystemResolver {
    /// Build a resolver from `/etc/resolv.conf` (or the platform equivalent).
    pub fn from_system_conf() -> Result<Self, ResolverError> {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| ResolverError::SystemConfig(e.to_string()))?;
        opts.use_hosts_file = false;
        Self::with_config(config, opts)
    }

    fn with_config(
        config: hickory_resolver::config::ResolverConfig,
        opts: ResolverOpts,
    ) -> Result<Self, ResolverError> {
        let inner = Resolver::new(config, opts)?;
        Ok(Self { inner })
    }

    fn has_mx(&self, fqdn: &str) -> bool {
        self.inner
            .mx_lookup(fqdn)
            .map(|lookup| lookup.iter().next().is_some())
            .unwrap_or(false)
    }

    fn has_address(&self, fqdn: &str) -> bool {
        self.inner
            .lookup_ip(fqdn)
            .map(|lookup| lookup.iter().next().is_some())
            .unwrap_or(false)
    }
}

impl DomainResolver for SystemResolver {
    fn resolves(&self, domain: &str) -> bool {
        let fqdn = fully_qualified(domain);
        self.has_mx(&fqdn) || self.has_address(&fqdn)
    }
}

fn fully_qualified(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

/// Remembers answers per domain so each one is looked up once per run.
pub struct CachingResolver<R> {
    inner: R,
    answers: RefCell<HashMap<String, bool>>,
}

impl<R: DomainResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            answers: RefCell::new(HashMap::new()),
        }
    }
}

impl<R: DomainResolver> DomainResolver for CachingResolver<R> {
    fn resolves(&self, domain: &str) -> bool {
        let key = domain.to_lowercase();
        if let Some(answer) = self.answers.borrow().get(&key) {
            return *answer;
        }
        let answer = self.inner.resolves(domain);
        self.answers.borrow_mut().insert(key, answer);
        answer
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Evaluate the rule table against a customer.
///
/// Returns one error per failing field, in table order; empty when valid.
pub fn validate(customer: &Customer, resolver: &dyn DomainResolver) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, rules) in RULES {
        let value = customer.value(*field);
        for rule in rules.iter() {
            match rule.check(*field, value, resolver) {
                Check::Pass => continue,
                Check::Stop => break,
                Check::Fail(message) => {
                    errors.push(FieldError::new(*field, message));
                    break;
                }
            }
        }
    }

    errors
}

/// Normalizes and validates rows against a fixed country index.
pub struct Validator<'a> {
    countries: &'a CountryIndex,
    resolver: &'a dyn DomainResolver,
}

impl<'a> Validator<'a> {
    pub fn new(countries: &'a CountryIndex, resolver: &'a dyn DomainResolver) -> Self {
        Self { countries, resolver }
    }

    /// Classify a raw row as accepted or rejected.
    pub fn classify(&self, row: RawRow) -> Outcome {
        let customer = normalize(&row, self.countries);
        let mut errors = validate(&customer, self.resolver);

        if errors.is_empty() {
            return Outcome::Accepted(customer);
        }

        // A one-word name still reports under `surname`, with a clearer message.
        if customer.surname.is_none() && !customer.name.is_empty() {
            if let Some(err) = errors.iter_mut().find(|e| e.field == Field::Surname) {
                err.message = "The name has no surname token.".to_string();
            }
        }

        Outcome::Rejected(Rejection { row, errors })
    }
}
