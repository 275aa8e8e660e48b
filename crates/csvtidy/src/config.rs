// crates/csvtidy/src/config.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use csvtidy_core::{
    CaseRule, CleanRequest, CleaningOptions, ColumnFormat, ColumnRef, DateOrder, Delimiter,
    NullPolicy, ParseOptions,
};
use serde::Deserialize;

/// On-disk layout: an `[options]` table of cleaning options and a `[parse]`
/// table of parser options. Both are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    options: CleaningOptions,
    #[serde(default)]
    parse: ParseOptions,
}

pub fn parse_config(content: &str) -> Result<CleanRequest> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(CleanRequest {
        options: file.options,
        parse: file.parse,
    })
}

pub fn load_config(path: &Path) -> Result<CleanRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config TOML from '{}'", path.display()))
}

/// Accepts a single ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(value: &str) -> Result<Delimiter, String> {
    match value {
        "tab" | "\\t" | "\t" => return Ok(Delimiter::TAB),
        "comma" => return Ok(Delimiter::COMMA),
        "semicolon" => return Ok(Delimiter::SEMICOLON),
        "pipe" => return Ok(Delimiter::PIPE),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Delimiter::try_from(c).map_err(|err| err.to_string()),
        _ => Err(format!("delimiter must be a single character, got '{value}'")),
    }
}

/// Flags shared by commands that run the cleaning pipeline. Anything set
/// here overrides the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// TOML file with `[options]` and `[parse]` tables
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Field delimiter; detected from the data when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<Delimiter>,

    /// Input encoding label (utf-8, windows-1252, latin1, ...)
    #[arg(long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Fail when a row has more than this many extra fields
    #[arg(long, value_name = "N")]
    pub max_extra_fields: Option<usize>,

    #[arg(long)]
    pub no_remove_duplicates: bool,

    #[arg(long)]
    pub no_handle_nulls: bool,

    #[arg(long)]
    pub no_standardize_text: bool,

    #[arg(long)]
    pub no_validate_formats: bool,

    /// substitute | drop-row
    #[arg(long, value_name = "POLICY")]
    pub null_policy: Option<NullPolicy>,

    /// Replacement written for null fields
    #[arg(long, value_name = "TEXT")]
    pub null_sentinel: Option<String>,

    /// Extra value treated as null (repeatable)
    #[arg(long = "null-marker", value_name = "TEXT")]
    pub null_markers: Vec<String>,

    /// preserve | lower | upper | title
    #[arg(long = "case", value_name = "RULE")]
    pub case_rule: Option<CaseRule>,

    /// Restrict the case rule to a column, by name or `#position` (repeatable)
    #[arg(long = "case-column", value_name = "COLUMN")]
    pub case_columns: Vec<ColumnRef>,

    /// Declare a column format, e.g. `signup=date` or `#2=integer` (repeatable)
    #[arg(long = "format", value_name = "COLUMN=FORMAT")]
    pub formats: Vec<ColumnFormat>,

    /// strict | day-first | month-first
    #[arg(long, value_name = "ORDER")]
    pub date_order: Option<DateOrder>,
}

impl OptionArgs {
    pub fn resolve(&self) -> Result<CleanRequest> {
        let mut request = match &self.config {
            Some(path) => load_config(path)?,
            None => CleanRequest::default(),
        };
        self.apply(&mut request);
        Ok(request)
    }

    pub fn apply(&self, request: &mut CleanRequest) {
        let parse = &mut request.parse;
        if self.delimiter.is_some() {
            parse.delimiter = self.delimiter;
        }
        if let Some(encoding) = &self.encoding {
            parse.encoding = Some(encoding.clone());
        }
        if self.max_extra_fields.is_some() {
            parse.max_extra_fields = self.max_extra_fields;
        }

        let options = &mut request.options;
        if self.no_remove_duplicates {
            options.remove_duplicates = false;
        }
        if self.no_handle_nulls {
            options.handle_nulls = false;
        }
        if self.no_standardize_text {
            options.standardize_text = false;
        }
        if self.no_validate_formats {
            options.validate_formats = false;
        }
        if let Some(policy) = self.null_policy {
            options.null_policy = policy;
        }
        if let Some(sentinel) = &self.null_sentinel {
            options.null_sentinel = sentinel.clone();
        }
        if !self.null_markers.is_empty() {
            options.null_markers = self.null_markers.clone();
        }
        if let Some(rule) = self.case_rule {
            options.case_rule = rule;
        }
        if !self.case_columns.is_empty() {
            options.case_columns = self.case_columns.clone();
        }
        if !self.formats.is_empty() {
            options.column_formats = self.formats.clone();
        }
        if let Some(order) = self.date_order {
            options.date_order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use csvtidy_core::FormatKind;
    use std::io::Write;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        args: OptionArgs,
    }

    fn flags(argv: &[&str]) -> OptionArgs {
        Harness::try_parse_from(std::iter::once("csvtidy").chain(argv.iter().copied()))
            .expect("flags should parse")
            .args
    }

    const SAMPLE: &str = r#"
[options]
removeDuplicates = false
nullPolicy = "dropRow"
nullMarkers = ["NULL", "n/a"]
caseRule = "title"
caseColumns = ["name", 2]
dateOrder = "dayFirst"
columnFormats = [
    { column = "signup", format = "date" },
    { column = 3, format = "integer" },
]

[parse]
delimiter = ";"
encoding = "windows-1252"
maxExtraFields = 2
"#;

    #[test]
    fn parses_options_and_parse_tables() {
        let request = parse_config(SAMPLE).expect("sample config parses");
        let options = &request.options;

        assert!(!options.remove_duplicates);
        assert!(options.handle_nulls);
        assert_eq!(options.null_policy, NullPolicy::DropRow);
        assert_eq!(options.null_markers, ["NULL", "n/a"]);
        assert_eq!(options.case_rule, CaseRule::Title);
        assert_eq!(
            options.case_columns,
            [ColumnRef::Name("name".into()), ColumnRef::Position(2)]
        );
        assert_eq!(options.date_order, DateOrder::DayFirst);
        assert_eq!(options.column_formats[1].column, ColumnRef::Position(3));
        assert_eq!(options.column_formats[1].format, FormatKind::Integer);

        assert_eq!(request.parse.delimiter, Some(Delimiter::SEMICOLON));
        assert_eq!(request.parse.encoding.as_deref(), Some("windows-1252"));
        assert_eq!(request.parse.max_extra_fields, Some(2));
    }

    #[test]
    fn empty_config_means_defaults() {
        let request = parse_config("").expect("empty config parses");
        assert_eq!(request, CleanRequest::default());
    }

    #[test]
    fn unknown_table_is_rejected() {
        let err = parse_config("[cleaning]\nremoveDuplicates = false\n")
            .expect_err("unknown table should fail");
        assert!(err.to_string().contains("cleaning"));
    }

    #[test]
    fn misspelled_option_key_is_rejected() {
        let err = parse_config("[options]\nremoveDuplicate = false\n")
            .expect_err("unknown key should fail");
        assert!(format!("{err:#}").contains("removeDuplicate"));
    }

    #[test]
    fn flags_override_the_config_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        let path = file.path().to_string_lossy().into_owned();

        let args = flags(&[
            "--config",
            path.as_str(),
            "--delimiter",
            "tab",
            "--no-handle-nulls",
            "--null-sentinel",
            "N/A",
            "--format",
            "age=int",
            "--date-order",
            "strict",
        ]);
        let request = args.resolve()?;

        assert_eq!(request.parse.delimiter, Some(Delimiter::TAB));
        assert_eq!(request.parse.encoding.as_deref(), Some("windows-1252"));
        assert!(!request.options.remove_duplicates);
        assert!(!request.options.handle_nulls);
        assert_eq!(request.options.null_sentinel, "N/A");
        assert_eq!(request.options.date_order, DateOrder::Strict);
        assert_eq!(
            request.options.column_formats,
            [ColumnFormat {
                column: ColumnRef::Name("age".into()),
                format: FormatKind::Integer,
            }]
        );
        assert_eq!(request.options.null_markers, ["NULL", "n/a"]);
        Ok(())
    }

    #[test]
    fn flags_without_config_start_from_defaults() -> Result<()> {
        let request = flags(&["--case", "upper", "--case-column", "#0"]).resolve()?;
        assert_eq!(request.options.case_rule, CaseRule::Upper);
        assert_eq!(request.options.case_columns, [ColumnRef::Position(0)]);
        assert!(request.options.remove_duplicates);
        Ok(())
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = flags(&["--config", "/definitely/not/here.toml"]);
        let err = args.resolve().expect_err("missing file should fail");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn delimiter_flag_values() {
        assert_eq!(parse_delimiter(";"), Ok(Delimiter::SEMICOLON));
        assert_eq!(parse_delimiter("\\t"), Ok(Delimiter::TAB));
        assert_eq!(parse_delimiter("pipe"), Ok(Delimiter::PIPE));
        assert!(parse_delimiter("\"").is_err());
        assert!(parse_delimiter(";;").is_err());
    }
}
