use csv::ReaderBuilder;
use tracing::debug;

use crate::errors::ParserError;
use crate::model::Delimiter;

const SNIFF_RECORDS: usize = 20;

/// Picks the candidate delimiter whose first records agree most often on a
/// field count greater than one. Ties keep the earlier candidate, so comma
/// wins whenever nothing else is clearly better.
pub(crate) fn detect_delimiter(text: &str) -> Delimiter {
    let mut best = Delimiter::COMMA;
    let mut best_score = (0usize, 0usize);

    for candidate in Delimiter::CANDIDATES {
        let score = score_candidate(text, candidate);
        debug!(
            delimiter = %candidate,
            consistent_rows = score.0,
            width = score.1,
            "scored delimiter candidate"
        );
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }

    best
}

fn score_candidate(text: &str, candidate: Delimiter) -> (usize, usize) {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(candidate.as_byte())
        .from_reader(text.as_bytes());

    let widths: Vec<usize> = reader
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect();

    let Some(&width) = widths.first() else {
        return (0, 0);
    };
    if width < 2 {
        return (0, 0);
    }

    let consistent = widths.iter().filter(|w| **w == width).count();
    (consistent, width)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Walks the text with RFC 4180 quoting rules and fails if a quoted field is
/// still open at the end of input. Quotes inside unquoted fields are literal.
pub(crate) fn check_quotes(text: &str, delimiter: Delimiter) -> Result<(), ParserError> {
    let delim = delimiter.as_char();
    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    let mut opened_on = 1;

    for ch in text.chars() {
        state = match state {
            QuoteState::FieldStart if ch == '"' => {
                opened_on = line;
                QuoteState::Quoted
            }
            QuoteState::FieldStart | QuoteState::Unquoted => {
                if ch == delim || ch == '\n' || ch == '\r' {
                    QuoteState::FieldStart
                } else {
                    QuoteState::Unquoted
                }
            }
            QuoteState::Quoted if ch == '"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if ch == '"' => QuoteState::Quoted,
            QuoteState::QuoteInQuoted => {
                if ch == delim || ch == '\n' || ch == '\r' {
                    QuoteState::FieldStart
                } else {
                    QuoteState::Unquoted
                }
            }
        };
        if ch == '\n' {
            line += 1;
        }
    }

    if state == QuoteState::Quoted {
        return Err(ParserError::UnterminatedQuote { line: opened_on });
    }
    Ok(())
}
