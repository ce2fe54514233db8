//! CSV Candle Reader
//!
//! Reads daily candle files of the form:
//!
//! ```text
//! dateTime,open,low,high,close
//! 03.01.2001,0.9507,0.9262,0.9569,0.9271
//! 04.01.2001,0.9271,0.9269,0.9515,0.9507
//! ```
//!
//! The header line is skipped. Close prices only depend on the fifth
//! column; a blank close cell yields NaN, which the statistics ignore. Rows
//! that fail to parse are yielded as `FeedError::Parse` items so the
//! consumer decides how to stop.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ports::{FeedError, PriceEvent};

/// Date format used by the `dateTime` column
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const DATE_COLUMN: usize = 0;
const OPEN_COLUMN: usize = 1;
const LOW_COLUMN: usize = 2;
const HIGH_COLUMN: usize = 3;
const CLOSE_COLUMN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub low: f64,
    pub high: f64,
    pub close: f64,
}

/// Iterator over close prices of a candle file
pub struct ClosePrices<R> {
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: io::Read> Iterator for ClosePrices<R> {
    type Item = PriceEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(from_csv_error).and_then(|r| {
            let line = line_of(&r);
            price_cell(&r, CLOSE_COLUMN, line)
        }))
    }
}

/// Iterator over full candle records
pub struct Candles<R> {
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: io::Read> Iterator for Candles<R> {
    type Item = Result<Candle, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(from_csv_error).and_then(|r| parse_candle(&r)))
    }
}

pub fn parse_close_prices<R: io::Read>(reader: R) -> ClosePrices<R> {
    ClosePrices {
        records: csv_reader(reader).into_records(),
    }
}

pub fn read_close_prices(path: impl AsRef<Path>) -> Result<ClosePrices<File>, FeedError> {
    Ok(parse_close_prices(open(path.as_ref())?))
}

pub fn parse_candles<R: io::Read>(reader: R) -> Candles<R> {
    Candles {
        records: csv_reader(reader).into_records(),
    }
}

pub fn read_candles(path: impl AsRef<Path>) -> Result<Candles<File>, FeedError> {
    Ok(parse_candles(open(path.as_ref())?))
}

fn open(path: &Path) -> Result<File, FeedError> {
    File::open(path).map_err(|e| FeedError::Io(format!("{}: {}", path.display(), e)))
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_candle(record: &csv::StringRecord) -> Result<Candle, FeedError> {
    let line = line_of(record);
    let raw_date = record.get(DATE_COLUMN).unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| FeedError::Parse {
        record: line,
        message: format!("invalid date {:?}: {}", raw_date, e),
    })?;

    Ok(Candle {
        date,
        open: price_cell(record, OPEN_COLUMN, line)?,
        low: price_cell(record, LOW_COLUMN, line)?,
        high: price_cell(record, HIGH_COLUMN, line)?,
        close: price_cell(record, CLOSE_COLUMN, line)?,
    })
}

fn price_cell(record: &csv::StringRecord, column: usize, line: u64) -> Result<f64, FeedError> {
    let cell = record.get(column).ok_or_else(|| FeedError::Parse {
        record: line,
        message: format!("expected {} columns, found {}", column + 1, record.len()),
    })?;

    if cell.is_empty() {
        return Ok(f64::NAN);
    }

    cell.parse::<f64>().map_err(|e| FeedError::Parse {
        record: line,
        message: format!("invalid price {:?}: {}", cell, e),
    })
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn from_csv_error(e: csv::Error) -> FeedError {
    let line = e.position().map(|p| p.line()).unwrap_or_default();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => FeedError::Io(io.to_string()),
        kind => FeedError::Parse {
            record: line,
            message: format!("{:?}", kind),
        },
    }
}
