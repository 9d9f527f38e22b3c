//! Delimited text (CSV and tab-separated) readers.

use brg_core::{CellValue, RawTable};
use csv::ReaderBuilder;

/// Reads delimited text with a header row.
///
/// Rows may be shorter or longer than the header; they are padded or cut
/// to the header width. Headers and cells are trimmed, and rows whose cells
/// are all blank are skipped.
pub(crate) fn read_delimited(text: &str, delimiter: u8) -> Result<RawTable, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    let mut table = RawTable::with_headers(headers);
    for record in reader.records() {
        let record = record?;
        let cells: Vec<CellValue> = record
            .iter()
            .map(|value| CellValue::from_text(value.trim()))
            .collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}
