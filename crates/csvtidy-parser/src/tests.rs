use std::fs;
use std::path::PathBuf;

use crate::errors::{EncodingError, ParserError};
use crate::model::{Delimiter, ParseOptions, Table};
use crate::{parse_table, write_table};

fn fixture(path: &str) -> Vec<u8> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn parse_default(bytes: &[u8]) -> Result<crate::ParsedTable, ParserError> {
    parse_table(bytes, &ParseOptions::default())
}

#[test]
fn parses_quoted_fields_and_embedded_newlines() {
    let parsed = parse_default(&fixture("customers.csv")).expect("customers parse failed");
    let table = &parsed.table;

    assert_eq!(parsed.delimiter, Delimiter::COMMA);
    assert_eq!(parsed.encoding, "UTF-8");
    assert_eq!(table.header(), ["id", "name", "email", "notes"]);
    assert_eq!(table.row_count(), 4);

    let first = &table.rows()[0];
    assert_eq!(first.index, 0);
    assert_eq!(first.get(1), Some("Smith, Jane"));
    assert_eq!(first.get(3), Some("Said \"hi\""));

    assert_eq!(table.rows()[1].get(3), Some("line one\nline two"));
    assert!(table.rows().iter().all(|row| row.len() == table.width()));
}

#[test]
fn pads_short_rows_and_records_overflow() {
    let parsed = parse_default(&fixture("customers.csv")).expect("customers parse failed");

    assert_eq!(parsed.padded_rows, 1);
    assert_eq!(parsed.table.rows()[2].get(3), Some(""));

    assert_eq!(parsed.overflow.len(), 1);
    let overflow = &parsed.overflow[0];
    assert_eq!(overflow.row, 3);
    assert_eq!(overflow.column, 4);
    assert_eq!(overflow.value, "overflow");
    assert_eq!(parsed.table.rows()[3].get(3), Some("extra"));
}

#[test]
fn detects_semicolon_delimiter() {
    let parsed = parse_default(&fixture("semicolon.csv")).expect("semicolon parse failed");

    assert_eq!(parsed.delimiter, Delimiter::SEMICOLON);
    assert_eq!(parsed.table.header(), ["name", "city", "score"]);
    assert_eq!(parsed.table.rows()[1].get(2), Some("7,5"));
}

#[test]
fn configured_delimiter_skips_detection() {
    let options = ParseOptions {
        delimiter: Some(Delimiter::PIPE),
        ..ParseOptions::default()
    };
    let parsed = parse_table(b"a,b|c\n1,2|3\n", &options).expect("pipe parse failed");

    assert_eq!(parsed.delimiter, Delimiter::PIPE);
    assert_eq!(parsed.table.header(), ["a,b", "c"]);
}

#[test]
fn single_column_input_falls_back_to_comma() {
    let parsed = parse_default(b"name\nAna\nRui\n").expect("single column parse failed");
    assert_eq!(parsed.delimiter, Delimiter::COMMA);
    assert_eq!(parsed.table.width(), 1);
    assert_eq!(parsed.table.row_count(), 2);
}

#[test]
fn rejects_empty_input() {
    assert!(matches!(parse_default(b""), Err(ParserError::EmptyInput)));
    assert!(matches!(parse_default(b"  \n\n"), Err(ParserError::EmptyInput)));
    assert!(matches!(
        parse_default(b"\xEF\xBB\xBF"),
        Err(ParserError::EmptyInput)
    ));
}

#[test]
fn header_only_input_has_no_rows() {
    let parsed = parse_default(b"a,b,c\n").expect("header-only parse failed");
    assert_eq!(parsed.table.width(), 3);
    assert_eq!(parsed.table.row_count(), 0);
}

#[test]
fn skips_blank_lines() {
    let parsed = parse_default(b"a,b\n\n1,2\n\n3,4\n").expect("blank line parse failed");
    assert_eq!(parsed.table.row_count(), 2);
    assert_eq!(parsed.table.rows()[1].index, 1);
}

#[test]
fn reports_unterminated_quote_line() {
    let err = parse_default(b"a,b\n1,\"open\n2,3\n").unwrap_err();
    assert!(matches!(err, ParserError::UnterminatedQuote { line: 2 }));
}

#[test]
fn quotes_inside_unquoted_fields_are_literal() {
    let parsed = parse_default(b"a,b\n5\" pipe,x\n").expect("literal quote parse failed");
    assert_eq!(parsed.table.rows()[0].get(0), Some("5\" pipe"));
}

#[test]
fn rejects_invalid_utf8_with_offset() {
    let err = parse_default(b"a,b\n1,\xff\n").unwrap_err();
    match err {
        ParserError::Encoding(EncodingError::Undecodable { encoding, offset }) => {
            assert_eq!(encoding, "UTF-8");
            assert_eq!(offset, Some(6));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decodes_declared_single_byte_encoding() {
    let options = ParseOptions {
        encoding: Some("windows-1252".into()),
        ..ParseOptions::default()
    };
    let parsed = parse_table(b"name\nJos\xe9\n", &options).expect("cp1252 parse failed");

    assert_eq!(parsed.encoding, "windows-1252");
    assert_eq!(parsed.table.rows()[0].get(0), Some("José"));
}

#[test]
fn rejects_unknown_encoding_label() {
    let options = ParseOptions {
        encoding: Some("klingon".into()),
        ..ParseOptions::default()
    };
    let err = parse_table(b"a\n1\n", &options).unwrap_err();
    assert!(matches!(
        err,
        ParserError::Encoding(EncodingError::UnknownLabel { .. })
    ));
}

#[test]
fn rejects_bom_that_contradicts_declared_encoding() {
    let options = ParseOptions {
        encoding: Some("utf-8".into()),
        ..ParseOptions::default()
    };
    let err = parse_table(b"\xFF\xFEa\x00\n\x00", &options).unwrap_err();
    match err {
        ParserError::InconsistentEncoding { declared, detected } => {
            assert_eq!(declared, "UTF-8");
            assert_eq!(detected, "UTF-16LE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strips_utf8_bom_from_header() {
    let parsed = parse_default(b"\xEF\xBB\xBFid,name\n1,a\n").expect("BOM parse failed");
    assert_eq!(parsed.table.header()[0], "id");
}

#[test]
fn enforces_extra_field_tolerance() {
    let options = ParseOptions {
        max_extra_fields: Some(1),
        ..ParseOptions::default()
    };
    let err = parse_table(b"a,b\n1,2,3,4\n", &options).unwrap_err();
    assert!(matches!(
        err,
        ParserError::InconsistentColumns {
            row: 0,
            expected: 2,
            found: 4,
            tolerance: 1
        }
    ));

    let parsed = parse_table(b"a,b\n1,2,3\n", &options).expect("within tolerance");
    assert_eq!(parsed.overflow.len(), 1);
}

#[test]
fn parsing_is_restartable() {
    let bytes = fixture("customers.csv");
    let first = parse_default(&bytes).expect("first parse");
    let second = parse_default(&bytes).expect("second parse");
    assert_eq!(first.table, second.table);
    assert_eq!(first.overflow, second.overflow);
}

#[test]
fn written_output_parses_back_to_same_table() {
    let parsed = parse_default(&fixture("customers.csv")).expect("customers parse failed");
    let bytes = write_table(&parsed.table, parsed.delimiter).expect("write failed");

    let options = ParseOptions {
        delimiter: Some(parsed.delimiter),
        ..ParseOptions::default()
    };
    let reparsed = parse_table(&bytes, &options).expect("reparse failed");

    assert_eq!(reparsed.table, parsed.table);
    assert!(reparsed.overflow.is_empty());
    assert_eq!(reparsed.padded_rows, 0);
}

#[test]
fn writer_keeps_input_delimiter() {
    let parsed = parse_default(&fixture("semicolon.csv")).expect("semicolon parse failed");
    let bytes = write_table(&parsed.table, parsed.delimiter).expect("write failed");
    let text = String::from_utf8(bytes).expect("utf8 output");

    assert!(text.starts_with("name;city;score\n"));
    assert!(text.contains("Rui;Porto;7,5\n"));
}

#[test]
fn delimiter_rejects_quote_and_line_breaks() {
    assert!(Delimiter::try_from('"').is_err());
    assert!(Delimiter::try_from('\n').is_err());
    assert!(Delimiter::try_from('é').is_err());
    assert_eq!(Delimiter::try_from('\t').map(|d| d.as_byte()).ok(), Some(b'\t'));
}

#[test]
fn column_lookup_falls_back_to_case_insensitive_match() {
    let table = Table::new(vec!["Id".into(), " Email ".into()], Vec::new());
    assert_eq!(table.column_index("Id"), Some(0));
    assert_eq!(table.column_index("email"), Some(1));
    assert_eq!(table.column_index("missing"), None);
}
