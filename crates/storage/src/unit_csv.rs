//! Parsing of unit files.
//!
//! A unit file is CSV with a header row naming `No`, `EN` and `JA` columns.
//! Column order is free and extra columns are ignored.

use csv::{ReaderBuilder, StringRecord, Trim};
use phrase_core::model::{PhraseRecord, UnitId};
use thiserror::Error;

const ORDINAL_COLUMN: &str = "No";
const ENGLISH_COLUMN: &str = "EN";
const JAPANESE_COLUMN: &str = "JA";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("missing `{0}` column")]
    MissingColumn(&'static str),

    #[error("malformed csv: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err.to_string())
    }
}

struct Columns {
    ordinal: Option<usize>,
    english: usize,
    japanese: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, ParseError> {
        let find = |name: &str| headers.iter().position(|header| header == name);
        Ok(Self {
            ordinal: find(ORDINAL_COLUMN),
            english: find(ENGLISH_COLUMN).ok_or(ParseError::MissingColumn(ENGLISH_COLUMN))?,
            japanese: find(JAPANESE_COLUMN).ok_or(ParseError::MissingColumn(JAPANESE_COLUMN))?,
        })
    }
}

/// Parse the phrases of one unit, keeping file order.
///
/// Rows with an empty English or Japanese field are dropped.
///
/// # Errors
///
/// Returns `ParseError::MissingColumn` if the header lacks `EN` or `JA`, or
/// `ParseError::Csv` if the text is not readable CSV.
pub fn parse_unit_csv(unit: UnitId, text: &str) -> Result<Vec<PhraseRecord>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::locate(reader.headers()?)?;
    let mut phrases = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let english = record.get(columns.english).unwrap_or_default();
        let japanese = record.get(columns.japanese).unwrap_or_default();
        if english.is_empty() || japanese.is_empty() {
            continue;
        }
        let ordinal = columns
            .ordinal
            .and_then(|idx| record.get(idx))
            .filter(|value| !value.is_empty())
            .map_or_else(|| (row + 1).to_string(), str::to_owned);
        phrases.push(PhraseRecord::new(unit, ordinal, japanese, english));
    }

    Ok(phrases)
}
