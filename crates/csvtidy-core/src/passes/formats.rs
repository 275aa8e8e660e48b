use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csvtidy_parser::Table;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{CleaningPass, PassName, PassOutput};
use crate::error::{ConfigError, PassError};
use crate::options::{CleaningOptions, ColumnFormat, DateOrder, FormatKind, NullPolicy};
use crate::report::{FormatIssue, FormatProblem, ReportDelta};

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("failed to compile numeric regex")
});
static GROUPED_NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(?:[,_ ]\d{3})+(?:\.\d+)?$")
        .expect("failed to compile grouped numeric regex")
});
static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+$").expect("failed to compile integer regex"));
static WHOLE_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\.0*$").expect("failed to compile whole decimal regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s<>:]+@[^@\s<>.]+(?:\.[^@\s<>.]+)+$").expect("failed to compile email regex")
});

const CANONICAL_DATE: &str = "%Y-%m-%d";
const YEAR_FIRST_DATES: &[&str] = &["%Y/%m/%d", "%Y.%m.%d"];
const YEAR_FIRST_DATETIMES: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DAY_FIRST_DATES: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];
const MONTH_FIRST_DATES: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

/// Outcome of checking one value against a declared format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// Non-conforming, with a single deterministic replacement.
    Fixed(String),
    /// Non-conforming and left unchanged.
    Invalid,
}

/// Checks `value` against `format`. Surrounding whitespace on an otherwise
/// valid value is itself a fixable error.
pub fn check_value(value: &str, format: FormatKind, date_order: DateOrder) -> Verdict {
    let trimmed = value.trim();
    let verdict = match format {
        FormatKind::Date => check_date(trimmed, date_order),
        FormatKind::Numeric => check_numeric(trimmed),
        FormatKind::Integer => check_integer(trimmed),
        FormatKind::Email => check_email(trimmed),
        FormatKind::Boolean => check_boolean(trimmed),
    };
    match verdict {
        Verdict::Valid if trimmed != value => Verdict::Fixed(trimmed.to_string()),
        other => other,
    }
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

fn first_date(value: &str, layouts: &[&str]) -> Option<NaiveDate> {
    layouts
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
        .and_then(plausible)
}

/// `YYYYMMDD` with exactly eight digits.
fn compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(plausible)
}

fn check_date(value: &str, order: DateOrder) -> Verdict {
    if let Ok(date) = NaiveDate::parse_from_str(value, CANONICAL_DATE) {
        if plausible(date).is_some() {
            let canonical = date.format(CANONICAL_DATE).to_string();
            return if canonical == value {
                Verdict::Valid
            } else {
                Verdict::Fixed(canonical)
            };
        }
    }

    let year_first = first_date(value, YEAR_FIRST_DATES)
        .or_else(|| compact_date(value))
        .or_else(|| {
            YEAR_FIRST_DATETIMES
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
                .and_then(|dt| plausible(dt.date()))
        });
    let day_first = first_date(value, DAY_FIRST_DATES);
    let month_first = first_date(value, MONTH_FIRST_DATES);

    let mut readings: Vec<NaiveDate> = [year_first, day_first, month_first]
        .into_iter()
        .flatten()
        .collect();
    readings.sort();
    readings.dedup();

    let chosen = match readings.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => match order {
            DateOrder::Strict => None,
            DateOrder::DayFirst => day_first,
            DateOrder::MonthFirst => month_first,
        },
    };

    match chosen {
        Some(date) => Verdict::Fixed(date.format(CANONICAL_DATE).to_string()),
        None => Verdict::Invalid,
    }
}

/// Drops a leading `+` and digit-group separators, if that yields a plain number.
fn normalize_numeric(value: &str) -> Option<String> {
    let candidate = if GROUPED_NUMERIC.is_match(value) {
        value.replace([',', '_', ' '], "")
    } else {
        value.to_string()
    };
    let candidate = match candidate.strip_prefix('+') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            rest.to_string()
        }
        _ => candidate,
    };
    NUMERIC.is_match(&candidate).then_some(candidate)
}

fn check_numeric(value: &str) -> Verdict {
    if NUMERIC.is_match(value) {
        return Verdict::Valid;
    }
    match normalize_numeric(value) {
        Some(fixed) => Verdict::Fixed(fixed),
        None => Verdict::Invalid,
    }
}

fn check_integer(value: &str) -> Verdict {
    if INTEGER.is_match(value) {
        return Verdict::Valid;
    }
    let Some(numeric) = normalize_numeric(value) else {
        return Verdict::Invalid;
    };
    if INTEGER.is_match(&numeric) {
        return Verdict::Fixed(numeric);
    }
    match WHOLE_DECIMAL.captures(&numeric) {
        Some(caps) => Verdict::Fixed(caps[1].to_string()),
        None => Verdict::Invalid,
    }
}

fn check_email(value: &str) -> Verdict {
    if EMAIL.is_match(value) {
        return Verdict::Valid;
    }

    let mut candidate = value;
    if let Some(prefix) = candidate.get(..7) {
        if prefix.eq_ignore_ascii_case("mailto:") {
            candidate = &candidate[7..];
        }
    }
    if let Some(inner) = candidate
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
    {
        candidate = inner;
    }
    let candidate = candidate.trim();

    if candidate != value && EMAIL.is_match(candidate) {
        match candidate.rsplit_once('@') {
            Some((local, domain)) => {
                Verdict::Fixed(format!("{local}@{}", domain.to_ascii_lowercase()))
            }
            None => Verdict::Invalid,
        }
    } else {
        Verdict::Invalid
    }
}

fn check_boolean(value: &str) -> Verdict {
    match value {
        "true" | "false" => Verdict::Valid,
        other => match other.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" | "on" => Verdict::Fixed("true".to_string()),
            "false" | "f" | "no" | "n" | "0" | "off" => Verdict::Fixed("false".to_string()),
            _ => Verdict::Invalid,
        },
    }
}

/// Nulls, and the sentinel handleNulls wrote in their place, are not format errors.
fn is_null_slot(value: &str, options: &CleaningOptions) -> bool {
    options.is_null(value)
        || (options.handle_nulls
            && options.null_policy == NullPolicy::Substitute
            && value == options.null_sentinel)
}

pub struct ValidateFormats;

impl ValidateFormats {
    /// Resolves declarations to column positions, ordered by position.
    fn plan(
        table: &Table,
        declarations: &[ColumnFormat],
    ) -> Result<BTreeMap<usize, FormatKind>, ConfigError> {
        let mut plan = BTreeMap::new();
        for declaration in declarations {
            let idx = declaration.column.resolve(table)?;
            match plan.get(&idx) {
                Some(&existing) if existing != declaration.format => {
                    return Err(ConfigError::ConflictingFormats {
                        column: table.header()[idx].clone(),
                        first: existing,
                        second: declaration.format,
                    });
                }
                Some(_) => {}
                None => {
                    plan.insert(idx, declaration.format);
                }
            }
        }
        Ok(plan)
    }
}

impl CleaningPass for ValidateFormats {
    fn name(&self) -> PassName {
        PassName::ValidateFormats
    }

    fn enabled(&self, options: &CleaningOptions) -> bool {
        options.validate_formats
    }

    fn apply(&self, table: &Table, options: &CleaningOptions) -> Result<PassOutput, PassError> {
        let plan = Self::plan(table, &options.column_formats)
            .map_err(|err| PassError::new(PassName::ValidateFormats, err))?;
        if plan.is_empty() {
            return Ok(PassOutput::unchanged(table));
        }

        let mut delta = ReportDelta::default();
        let mut rows = Vec::with_capacity(table.row_count());

        for row in table.rows() {
            let mut fields = row.fields.clone();
            for (&column, &format) in &plan {
                let value = &fields[column];
                if is_null_slot(value, options) {
                    continue;
                }
                match check_value(value, format, options.date_order) {
                    Verdict::Valid => {}
                    Verdict::Fixed(fixed) => {
                        delta.format_errors_found += 1;
                        delta.format_errors_fixed += 1;
                        delta.issues.push(FormatIssue {
                            row: row.index,
                            column,
                            value: std::mem::replace(&mut fields[column], fixed.clone()),
                            problem: FormatProblem::Invalid(format),
                            fixed_to: Some(fixed),
                        });
                    }
                    Verdict::Invalid => {
                        delta.format_errors_found += 1;
                        delta.issues.push(FormatIssue {
                            row: row.index,
                            column,
                            value: value.clone(),
                            problem: FormatProblem::Invalid(format),
                            fixed_to: None,
                        });
                    }
                }
            }
            rows.push(row.with_fields(fields));
        }

        Ok(PassOutput {
            table: table.with_rows(rows),
            delta,
        })
    }
}
