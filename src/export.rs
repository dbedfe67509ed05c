//! CSV export of the telex table.
//!
//! Semicolon-delimited, one header row, one row per telex. Missing values
//! are written as `-`. Telex numbers are flattened onto a single line.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{self, TelexRecord};

pub const HEADER: [&str; 8] = [
    "No.",
    "Nomor Telex",
    "Status",
    "Widebody",
    "Narrowbody",
    "Remark",
    "Waktu Selesai",
    "Waktu Dibuat",
];

const MISSING: &str = "-";

/// A rendered export, ready to send as an attachment.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// `data_telex_<YYYYMMDD_HHMMSS>.csv`
pub fn filename(now: DateTime<Utc>) -> String {
    format!("data_telex_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Drop carriage returns and turn line feeds into spaces, so a CRLF pair
/// becomes exactly one space.
pub fn single_line(s: &str) -> String {
    s.replace('\r', "").replace('\n', " ")
}

fn or_missing(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(MISSING)
}

/// Status is written with the same Indonesian label as the listing page,
/// matching the header language.
pub fn render(records: &[TelexRecord], now: DateTime<Utc>) -> Result<CsvExport> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for record in records {
        let completed = record
            .completed_at
            .map(model::format_display)
            .unwrap_or_else(|| MISSING.to_string());
        writer.write_record([
            record.id.to_string().as_str(),
            single_line(&record.telex_number).as_str(),
            record.status.label(),
            or_missing(record.assignee_widebody.as_deref()),
            or_missing(record.assignee_narrowbody.as_deref()),
            or_missing(record.remark.as_deref()),
            completed.as_str(),
            model::format_display(record.created_at).as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Other(format!("failed to flush csv writer: {}", e.error())))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| Error::Other(format!("csv output is not utf-8: {e}")))?;

    Ok(CsvExport {
        filename: filename(now),
        body,
    })
}
