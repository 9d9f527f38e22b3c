//! Builds a table from rows that each carry their own keys.

use brg_core::{CellValue, FxHashMap, RawTable, fx_hash_map};

/// Accumulates `(key, value)` rows into a [`RawTable`].
///
/// Headers are the union of all keys in first-seen order. Cells for keys a
/// row does not carry are null.
#[derive(Debug, Default)]
pub(crate) struct KeyedRows {
    headers: Vec<String>,
    index: FxHashMap<String, usize>,
    rows: Vec<Vec<(usize, CellValue)>>,
}

impl KeyedRows {
    pub(crate) fn new() -> Self {
        Self {
            headers: Vec::new(),
            index: fx_hash_map(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, CellValue)>,
    {
        let row = entries
            .into_iter()
            .map(|(key, value)| {
                let next = self.headers.len();
                let idx = *self.index.entry(key.clone()).or_insert(next);
                if idx == next {
                    self.headers.push(key);
                }
                (idx, value)
            })
            .collect();
        self.rows.push(row);
    }

    pub(crate) fn into_table(self) -> RawTable {
        let width = self.headers.len();
        let mut table = RawTable::with_headers(self.headers);
        for entries in self.rows {
            let mut cells = vec![CellValue::Null; width];
            for (idx, value) in entries {
                cells[idx] = value;
            }
            table.push_row(cells);
        }
        table
    }
}
