//! Record validation for uploaded user rows
//!
//! Turns one raw CSV row into a `UserRecord`. Checks run in a fixed order and
//! stop at the first failure:
//! - presence of `name`, `email` and `age`
//! - `age` parses as a base-10 integer
//! - `name` is non-empty after trimming and at most 255 characters
//! - `age` lies in `0..=120`
//! - `email` is a valid address whose domain contains a dot

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

use crate::domain::csv::CsvRow;
use crate::domain::error::ValidationError;
use crate::domain::upload::RowOutcome;
use crate::domain::user::UserRecord;

pub const MIN_AGE: i64 = 0;
pub const MAX_AGE: i64 = 120;
pub const MAX_NAME_CHARS: usize = 255;

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// Validate one raw row into a typed record.
pub fn validate(row: &CsvRow) -> Result<UserRecord, ValidationError> {
    let (Some(raw_name), Some(raw_email), Some(raw_age)) =
        (row.get("name"), row.get("email"), row.get("age"))
    else {
        return Err(ValidationError::MissingFields);
    };

    // Integer coercion happens before any field check.
    let age = parse_age(raw_age)?;

    let name = raw_name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong);
    }

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange);
    }

    let email = raw_email.trim().to_string();
    if !email.validate_email() || !has_dotted_domain(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(UserRecord::from_validated(name.to_string(), email, age))
}

/// Validate a row and tag the result with its row number.
pub fn classify_row(row: &CsvRow) -> RowOutcome {
    match validate(row) {
        Ok(record) => RowOutcome::Accepted(record),
        Err(err) => RowOutcome::Rejected {
            row_number: row.row_number,
            reason: err.into(),
        },
    }
}

fn parse_age(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if !INTEGER_PATTERN.is_match(trimmed) {
        return Err(ValidationError::InvalidAge);
    }

    // Only overflow can fail here; saturate so the range check rejects it.
    Ok(trimmed.parse::<i64>().unwrap_or(if trimmed.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

fn has_dotted_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
