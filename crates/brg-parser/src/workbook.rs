//! Excel workbook reader.

use brg_core::{CellValue, RawTable};
use calamine::{Data, Reader, open_workbook_auto};
use camino::Utf8Path;

use crate::error::ParseError;

/// Reads the first worksheet of a workbook.
///
/// The first row is the header. Rows whose cells are all empty are skipped.
/// Both `.xlsx` and legacy `.xls` workbooks are accepted.
pub(crate) fn read_first_sheet(path: &Utf8Path) -> Result<RawTable, ParseError> {
    let xlsx_err = |source| ParseError::Xlsx {
        path: path.to_owned(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(xlsx_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::NoTabularData {
            path: path.to_owned(),
        })?
        .map_err(xlsx_err)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_owned())
        .collect();

    let mut table = RawTable::with_headers(headers);
    for data_row in rows {
        let cells: Vec<CellValue> = data_row.iter().map(cell_value).collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

/// Converts a worksheet cell into a [`CellValue`].
pub(crate) fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Float(f) => CellValue::Number(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::String(s) => CellValue::from_text(s.trim()),
        other => CellValue::from_text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(cell_value(&Data::Float(52.0)), CellValue::Number(52.0));
        assert_eq!(cell_value(&Data::Int(15)), CellValue::Number(15.0));
        assert_eq!(
            cell_value(&Data::String(" 6205 ".to_owned())),
            CellValue::Text("6205".to_owned())
        );
        assert_eq!(cell_value(&Data::String("   ".to_owned())), CellValue::Null);
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Text("true".to_owned()));
    }

    fn fixture(name: &str) -> camino::Utf8PathBuf {
        camino::Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_reads_first_sheet() {
        let table = read_first_sheet(&fixture("price_list.xlsx")).unwrap();

        assert_eq!(table.headers, vec!["Артикул", "Бренд", "D", "d", "H"]);
        // Row 3 of the sheet is empty.
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Text("6205".to_owned()),
                CellValue::Text("SKF".to_owned()),
                CellValue::Number(52.0),
                CellValue::Number(25.0),
                CellValue::Number(15.0),
            ]
        );
        assert_eq!(table.rows[1][1], CellValue::Text("FAG".to_owned()));
        assert_eq!(table.rows[1][4], CellValue::Number(16.0));
    }

    #[test]
    fn test_corrupt_workbook_is_xlsx_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(tmp.path().join("broken.xlsx")).unwrap();
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = read_first_sheet(&path).unwrap_err();
        assert!(matches!(err, ParseError::Xlsx { .. }));
    }
}
