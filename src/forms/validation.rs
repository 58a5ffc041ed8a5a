//! Declarative validation rules evaluated over a whole candidate value set
//!
//! Rules are evaluated in declaration order in a single pass. Every field gets
//! a chance to report an error, but once a field has failed, its remaining
//! rules are skipped, so each field reports only its first failure.
//! Cross-field rules are ordinary rules whose applicability predicate or
//! [`Check::Satisfies`] closure reads other fields.

use std::collections::BTreeMap;
use std::fmt;

use super::{FormMode, FormValues};

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub values: &'a FormValues,
    pub mode: FormMode,
}

impl<'a> Candidate<'a> {
    pub fn new(values: &'a FormValues, mode: FormMode) -> Self {
        Self { values, mode }
    }

    pub fn value(&self, field: &str) -> &'a str {
        self.values.get(field)
    }

    pub fn is_supplied(&self, field: &str) -> bool {
        self.values.is_supplied(field)
    }

    pub fn is_create(&self) -> bool {
        self.mode.is_create()
    }
}

pub type Predicate = fn(&Candidate<'_>) -> bool;

/// Structural string patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Structural plus ranges: `YYYY-MM-DD` digits, month 01-12, day 01-31.
    /// Never consults a calendar, so `2024-02-31` passes.
    IsoDate,
    /// `local@domain.tld` without whitespace
    Email,
}

impl Pattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Pattern::IsoDate => is_iso_date(value),
            Pattern::Email => is_email(value),
        }
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return false;
    }

    let two = |i: usize| u32::from(bytes[i] - b'0') * 10 + u32::from(bytes[i + 1] - b'0');
    let (month, day) = (two(5), two(8));
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Parse a numeric form input; blank and non-finite input is rejected
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// A single condition on one field
#[derive(Clone)]
pub enum Check {
    /// Non-empty after trimming
    Required,
    /// At least this many characters
    MinLength(usize),
    /// Parses as a finite number
    Number,
    /// Numeric value (blank counts as zero) is at least this much
    MinNumber(f64),
    /// Parses as an integer
    WholeNumber,
    Pattern(Pattern),
    OneOf(&'static [&'static str]),
    /// Arbitrary predicate over the whole candidate
    Satisfies(Predicate),
}

impl Check {
    fn passes(&self, field: &str, candidate: &Candidate<'_>) -> bool {
        let value = candidate.value(field);
        match self {
            Check::Required => !value.trim().is_empty(),
            Check::MinLength(min) => value.chars().count() >= *min,
            Check::Number => parse_number(value).is_some(),
            Check::MinNumber(min) => {
                let number = if value.trim().is_empty() {
                    Some(0.0)
                } else {
                    parse_number(value)
                };
                number.map_or(false, |n| n >= *min)
            }
            Check::WholeNumber => value.trim().parse::<i64>().is_ok(),
            Check::Pattern(pattern) => pattern.matches(value),
            Check::OneOf(options) => options.contains(&value),
            Check::Satisfies(predicate) => predicate(candidate),
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Required => f.write_str("Required"),
            Check::MinLength(n) => write!(f, "MinLength({})", n),
            Check::Number => f.write_str("Number"),
            Check::MinNumber(n) => write!(f, "MinNumber({})", n),
            Check::WholeNumber => f.write_str("WholeNumber"),
            Check::Pattern(p) => write!(f, "Pattern({:?})", p),
            Check::OneOf(options) => write!(f, "OneOf({:?})", options),
            Check::Satisfies(_) => f.write_str("Satisfies(..)"),
        }
    }
}

/// One entry of a rule set: the field errors attach to, a check and its message
#[derive(Debug, Clone)]
pub struct Rule {
    field: &'static str,
    check: Check,
    message: String,
    when: Option<Predicate>,
    skip_when_empty: bool,
}

impl Rule {
    pub fn new(field: &'static str, check: Check, message: impl Into<String>) -> Self {
        Self {
            field,
            check,
            message: message.into(),
            when: None,
            skip_when_empty: false,
        }
    }

    /// Only evaluate this rule when `predicate` holds for the candidate
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.when = Some(predicate);
        self
    }

    /// Treat a blank value as valid (the field is optional)
    pub fn if_present(mut self) -> Self {
        self.skip_when_empty = true;
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    fn applies(&self, candidate: &Candidate<'_>) -> bool {
        if self.skip_when_empty && !candidate.is_supplied(self.field) {
            return false;
        }
        self.when.map_or(true, |predicate| predicate(candidate))
    }
}

/// Ordered list of rules for one form
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `values` in one pass
    pub fn validate(&self, values: &FormValues, mode: FormMode) -> ValidationErrors {
        let candidate = Candidate::new(values, mode);
        let mut errors = ValidationErrors::default();

        for rule in &self.rules {
            if errors.contains(rule.field) || !rule.applies(&candidate) {
                continue;
            }
            if !rule.check.passes(rule.field, &candidate) {
                errors.insert(rule.field, rule.message.clone());
            }
        }

        errors
    }
}

/// First failing message per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
