//! Metadata for financial statements, derived from where they are filed.
//!
//! Statements are expected at `<institution>/<account>/<statement file>`.
//! The institution and account come from the two enclosing directories;
//! the statement date is parsed from the file name using the formats
//! supplied in the parameters first and the built-in formats after that.

use super::Derivation;
use crate::error::DerivationError;
use crate::record::AnyRecord;
use crate::record::ext::{FinancialStatement, FinancialStatementDate};
use chrono::{Datelike, Month, NaiveDate};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::Path;

pub const FROM_STATEMENT: &str = "financials.from_statement";

/// File name formats used by the institutions we have statements from.
const BUILT_IN_FORMATS: &[&str] = &[
    // Ally: "Sep 2021 Ally Bank Statement.pdf"
    r"^(?P<month_name>[A-Za-z]{3}) (?P<year>\d{4}) .*Statement\.pdf$",
    // Chase: "20211002-statements-1234-.pdf"
    r"^(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})-statements",
    // Discover: "Discover-Statement-20211203-1234.pdf"
    r"-Statement-(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})",
    // ETrade: "Brokerage Statement - XXXX1234 - 202006.pdf"
    r"^Brokerage Statement - .* - (?P<year>\d{4})(?P<month>\d{2})\.pdf$",
    // Fidelity: "Statement07312021.pdf"
    r"^Statement(?P<month>\d{2})(?P<day>\d{2})(?P<year>\d{4})\.pdf$",
    // Marcus: "STMTCMB100_20190301_1234_LName_123456_654321.pdf"
    r"^STMT[A-Z0-9]*_(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})_",
    // Schwab: "BrokerageStatement0331181234.pdf", "AccountStatement033121.pdf"
    r"^[A-Za-z]+Statement(?P<month>\d{2})(?P<day>\d{2})(?P<short_year>\d{2})\d*\.pdf$",
    // Wealthfront: "STATEMENT_2020-05_abcd1234_2020-06-01T10_41_04.123-45_67.pdf"
    r"STATEMENT_(?P<year>\d{4})-(?P<month>\d{2})_",
    // Wells Fargo: "101421 WellsFargo.pdf"
    r"^(?P<month>\d{2})(?P<day>\d{2})(?P<short_year>\d{2}) ",
    // PayPal: "statement-Apr-2020.pdf"
    r"^statement-(?P<month_name>[A-Za-z]{3})-(?P<year>\d{4})\.pdf$",
];

/// Parameters accepted by [`FROM_STATEMENT`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatementParameters {
    /// Extra file name formats using `%Y`, `%y`, `%m`, `%d`, `%b` and `%B`,
    /// e.g. `"abcd-%Y-xyz-%m-xyz%d.pdf"`. Tried before the built-in formats.
    pub additional_formats: Vec<String>,
}

/// Derives a [`FinancialStatement`] for each statement file.
#[derive(Debug)]
pub struct FromStatement {
    formats: Vec<Regex>,
}

impl FromStatement {
    pub fn new(parameters: StatementParameters) -> Result<Self, DerivationError> {
        let mut formats = Vec::new();
        for format in &parameters.additional_formats {
            formats.push(compile(format, &format_to_pattern(format))?);
        }
        for pattern in BUILT_IN_FORMATS {
            formats.push(compile(pattern, pattern)?);
        }
        Ok(Self { formats })
    }

    /// Parses the statement metadata for `path`.
    pub fn statement(&self, path: &Path) -> Result<FinancialStatement, DerivationError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DerivationError::UnparsableDate(path.to_path_buf()))?;

        let date = self
            .formats
            .iter()
            .filter_map(|format| format.captures(file_name))
            .find_map(|captures| date_from_captures(&captures))
            .ok_or_else(|| DerivationError::UnparsableDate(path.to_path_buf()))?;

        let account = path.parent();
        let institution = account.and_then(Path::parent);

        Ok(FinancialStatement {
            institution: dir_name(institution, path)?,
            account: dir_name(account, path)?,
            date: FinancialStatementDate {
                year: format!("{:04}", date.year()),
                month: format!("{:02}", date.month()),
                day: format!("{:02}", date.day()),
            },
        })
    }
}

impl Derivation for FromStatement {
    fn derive(&mut self, path: &Path) -> Result<AnyRecord, DerivationError> {
        Ok(AnyRecord::pack(&self.statement(path)?)?)
    }
}

fn compile(format: &str, pattern: &str) -> Result<Regex, DerivationError> {
    Regex::new(pattern).map_err(|source| DerivationError::InvalidFormat {
        format: format.to_string(),
        source,
    })
}

fn dir_name(dir: Option<&Path>, path: &Path) -> Result<String, DerivationError> {
    dir.and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| DerivationError::Failed {
            path: path.to_path_buf(),
            message: "expected the statement under <institution>/<account>/".to_string(),
        })
}

/// Translates a strftime-style file name format into an anchored regex.
pub fn format_to_pattern(format: &str) -> String {
    let mut pattern = String::from("^");
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        }
        match chars.next() {
            Some('Y') => pattern.push_str(r"(?P<year>\d{4})"),
            Some('y') => pattern.push_str(r"(?P<short_year>\d{2})"),
            Some('m') => pattern.push_str(r"(?P<month>\d{2})"),
            Some('d') => pattern.push_str(r"(?P<day>\d{2})"),
            Some('b') => pattern.push_str(r"(?P<month_name>[A-Za-z]{3})"),
            Some('B') => pattern.push_str(r"(?P<month_name>[A-Za-z]+)"),
            Some(other) => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            None => pattern.push('%'),
        }
    }
    pattern.push('$');
    pattern
}

/// Builds a date from named captures; a missing day means the first of the month.
fn date_from_captures(captures: &Captures<'_>) -> Option<NaiveDate> {
    let number = |name: &str| captures.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = match (captures.name("year"), number("short_year")) {
        (Some(year), _) => year.as_str().parse::<i32>().ok()?,
        (None, Some(short_year)) => 2000 + short_year as i32,
        (None, None) => return None,
    };
    let month = match (number("month"), captures.name("month_name")) {
        (Some(month), _) => month,
        (None, Some(name)) => name.as_str().parse::<Month>().ok()?.number_from_month(),
        (None, None) => return None,
    };
    let day = number("day").unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
}
