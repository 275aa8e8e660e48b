use std::fmt;
use std::str::FromStr;

use csvtidy_parser::{ParseOptions, Table};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NullPolicy {
    /// Replace null fields with the sentinel.
    #[default]
    Substitute,
    /// Drop every row that contains a null field.
    DropRow,
}

impl FromStr for NullPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "substitute" | "sub" => Ok(NullPolicy::Substitute),
            "droprow" | "drop-row" | "drop" => Ok(NullPolicy::DropRow),
            other => Err(format!("unknown null policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseRule {
    #[default]
    Preserve,
    Lower,
    Upper,
    Title,
}

impl CaseRule {
    pub fn apply(&self, value: &str) -> String {
        match self {
            CaseRule::Preserve => value.to_string(),
            CaseRule::Lower => value.to_lowercase(),
            CaseRule::Upper => value.to_uppercase(),
            CaseRule::Title => value
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first
                            .to_uppercase()
                            .chain(chars.flat_map(char::to_lowercase))
                            .collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
        }
    }
}

impl FromStr for CaseRule {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" | "none" => Ok(CaseRule::Preserve),
            "lower" => Ok(CaseRule::Lower),
            "upper" => Ok(CaseRule::Upper),
            "title" => Ok(CaseRule::Title),
            other => Err(format!("unknown case rule '{other}'")),
        }
    }
}

/// A column addressed by header name or by 0-based position.
///
/// Deserializes from an integer or a string; strings go through the same
/// `#N` rule as the command line, so `"#2"` and `2` both mean position 2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumnRef {
    Position(usize),
    Text(String),
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawColumnRef::deserialize(deserializer)? {
            RawColumnRef::Position(position) => Ok(ColumnRef::Position(position)),
            RawColumnRef::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl ColumnRef {
    pub fn resolve(&self, table: &Table) -> Result<usize, ConfigError> {
        match self {
            ColumnRef::Position(position) if *position < table.width() => Ok(*position),
            ColumnRef::Position(position) => Err(ConfigError::ColumnOutOfRange {
                position: *position,
                width: table.width(),
            }),
            ColumnRef::Name(name) => {
                table
                    .column_index(name)
                    .ok_or_else(|| ConfigError::UnknownColumn {
                        column: self.to_string(),
                    })
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Position(position) => write!(f, "#{position}"),
            ColumnRef::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// `#3` is a position, anything else a header name.
impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("column reference must not be empty".to_string());
        }
        match trimmed.strip_prefix('#') {
            Some(digits) => digits
                .parse::<usize>()
                .map(ColumnRef::Position)
                .map_err(|err| format!("invalid column position '{trimmed}': {err}")),
            None => Ok(ColumnRef::Name(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatKind {
    Date,
    Numeric,
    Integer,
    Email,
    Boolean,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Date => "date",
            FormatKind::Numeric => "numeric",
            FormatKind::Integer => "integer",
            FormatKind::Email => "email",
            FormatKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(FormatKind::Date),
            "numeric" | "number" | "decimal" => Ok(FormatKind::Numeric),
            "integer" | "int" => Ok(FormatKind::Integer),
            "email" => Ok(FormatKind::Email),
            "boolean" | "bool" => Ok(FormatKind::Boolean),
            other => Err(format!("unknown column format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFormat {
    pub column: ColumnRef,
    pub format: FormatKind,
}

/// Parses `COLUMN=FORMAT`, splitting on the last `=`.
impl FromStr for ColumnFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (column, format) = value
            .rsplit_once('=')
            .ok_or_else(|| format!("expected COLUMN=FORMAT, got '{value}'"))?;
        Ok(ColumnFormat {
            column: column.parse()?,
            format: format.parse()?,
        })
    }
}

/// How slash- and dot-separated dates with two valid readings are fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateOrder {
    /// Ambiguous dates are flagged, never rewritten.
    #[default]
    Strict,
    DayFirst,
    MonthFirst,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(DateOrder::Strict),
            "dayfirst" | "day-first" | "dmy" => Ok(DateOrder::DayFirst),
            "monthfirst" | "month-first" | "mdy" => Ok(DateOrder::MonthFirst),
            other => Err(format!("unknown date order '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub handle_nulls: bool,
    pub standardize_text: bool,
    pub validate_formats: bool,
    pub null_policy: NullPolicy,
    pub null_sentinel: String,
    /// Extra literal values treated as null, compared case-insensitively.
    pub null_markers: Vec<String>,
    pub case_rule: CaseRule,
    /// Columns the case rule applies to; empty means every column.
    pub case_columns: Vec<ColumnRef>,
    pub column_formats: Vec<ColumnFormat>,
    pub date_order: DateOrder,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            handle_nulls: true,
            standardize_text: true,
            validate_formats: true,
            null_policy: NullPolicy::default(),
            null_sentinel: String::new(),
            null_markers: Vec::new(),
            case_rule: CaseRule::default(),
            case_columns: Vec::new(),
            column_formats: Vec::new(),
            date_order: DateOrder::default(),
        }
    }
}

impl CleaningOptions {
    /// Every pass switched off; the table passes through untouched.
    pub fn none() -> Self {
        Self {
            remove_duplicates: false,
            handle_nulls: false,
            standardize_text: false,
            validate_formats: false,
            ..Self::default()
        }
    }

    pub fn is_null(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || self
                .null_markers
                .iter()
                .any(|marker| trimmed.eq_ignore_ascii_case(marker.trim()))
    }
}

/// Everything a caller supplies besides the bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CleanRequest {
    pub options: CleaningOptions,
    pub parse: ParseOptions,
}

impl CleanRequest {
    pub fn new(options: CleaningOptions) -> Self {
        Self {
            options,
            parse: ParseOptions::default(),
        }
    }
}
