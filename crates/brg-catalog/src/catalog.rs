//! The canonical bearing catalog.
//!
//! This module provides [`CatalogManager`], which owns the in-memory table of
//! [`CatalogRecord`]s, normalizes incoming rows, applies the dedup and
//! conflict rule, and persists the table as a CSV file plus a JSON mirror.
//!
//! # Dedup Rule
//!
//! Rows are keyed by [`DedupKey`] (article plus optional brand):
//!
//! - **No existing row with the key**: the row is added
//! - **An existing row has the same `(D, d, H)`**: the row is skipped
//! - **Existing rows all differ in `(D, d, H)`**: the row is added anyway and
//!   a [`Conflict`] listing every existing triple is reported
//!
//! Rows without an article are skipped.
//!
//! # Examples
//!
//! ```
//! use brg_catalog::CatalogManager;
//! use brg_core::{CanonicalField, CanonicalRow, CellValue, Config};
//!
//! let tmp = tempfile::tempdir().unwrap();
//! let root = camino::Utf8Path::from_path(tmp.path()).unwrap();
//! let config = Config::default().rooted_at(root);
//!
//! let mut catalog = CatalogManager::from_config(&config);
//! let rows = vec![
//!     CanonicalRow::new()
//!         .with(CanonicalField::Article, CellValue::from_text("6205"))
//!         .with(CanonicalField::Brand, CellValue::from_text("skf"))
//!         .with(CanonicalField::Height, CellValue::from_text("15")),
//! ];
//! let summary = catalog.add_records(catalog.normalize_data(&rows));
//! assert_eq!(summary.added, 1);
//!
//! catalog.save()?;
//! assert_eq!(CatalogManager::from_config(&config).len(), 1);
//! # Ok::<(), brg_catalog::CatalogError>(())
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use brg_core::{
    CanonicalField, CanonicalRow, CatalogRecord, CellValue, Config, Conflict, DedupKey,
    DirListing, FsError, FxHashMap, NormalizationConfig, atomic_write, fx_hash_map,
    normalize_brand, normalize_number, normalize_text,
};
use brg_parser::{DataParser, ParseError};
use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;

use crate::error::CatalogError;

/// Result of merging a batch of rows into the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddSummary {
    /// Rows appended to the catalog, conflicting ones included.
    pub added: usize,
    /// Exact duplicates and rows without an article.
    pub skipped: usize,
    /// One descriptor per row added despite differing dimensions.
    pub conflicts: Vec<Conflict>,
}

impl AddSummary {
    /// Returns the number of conflicting rows.
    #[inline]
    #[must_use]
    pub fn n_conflicts(&self) -> usize {
        self.conflicts.len()
    }
}

/// Result of [`CatalogManager::rebuild_from_processed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Archived files that were parsed and merged.
    pub files: usize,
    /// Records added across all files.
    pub records: usize,
}

/// Owner of the canonical catalog.
///
/// The CSV file is the source of truth; the JSON file is a mirror written on
/// every [`save`](Self::save). Both are replaced atomically.
#[derive(Debug)]
pub struct CatalogManager {
    csv_path: Utf8PathBuf,
    json_path: Utf8PathBuf,
    normalization: NormalizationConfig,
    brand_aliases: BTreeMap<String, String>,
    records: Vec<CatalogRecord>,
    /// Record positions per dedup key.
    index: FxHashMap<DedupKey, SmallVec<[usize; 2]>>,
}

impl CatalogManager {
    /// Opens the catalog at `csv_path`, loading existing rows.
    ///
    /// A missing file yields an empty catalog. An unreadable file is logged
    /// and also yields an empty catalog, since the catalog can always be
    /// rebuilt from the processed archive.
    #[must_use]
    pub fn open(
        csv_path: impl Into<Utf8PathBuf>,
        json_path: impl Into<Utf8PathBuf>,
        normalization: NormalizationConfig,
        brand_aliases: BTreeMap<String, String>,
    ) -> Self {
        let mut catalog = Self {
            csv_path: csv_path.into(),
            json_path: json_path.into(),
            normalization,
            brand_aliases,
            records: Vec::new(),
            index: fx_hash_map(),
        };

        match catalog.load() {
            Ok(()) => {
                tracing::debug!(file = %catalog.csv_path, n_records = catalog.len(), "catalog loaded");
            }
            Err(e) => {
                tracing::warn!(file = %catalog.csv_path, error = %e, "catalog unreadable, starting empty");
                catalog.records.clear();
                catalog.reindex();
            }
        }
        catalog
    }

    /// Opens the catalog at the paths named by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::open(
            config.paths.catalog_csv(),
            config.paths.catalog_json(),
            config.normalization.clone(),
            config.brand_aliases.clone(),
        )
    }

    /// Returns the records in their current order.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the catalog has no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the path of the catalog CSV.
    #[inline]
    #[must_use]
    pub fn csv_path(&self) -> &Utf8Path {
        &self.csv_path
    }

    /// Returns the path of the JSON mirror.
    #[inline]
    #[must_use]
    pub fn json_path(&self) -> &Utf8Path {
        &self.json_path
    }

    /// Normalizes one canonical row into a record.
    ///
    /// Text fields are cleaned and have the configured replacements applied;
    /// the brand is additionally resolved through the alias table and
    /// re-cased. Dimension fields that do not parse become `None`.
    #[must_use]
    pub fn normalize_row(&self, row: &CanonicalRow) -> CatalogRecord {
        let text = |field| self.text_field(row.get(field));
        let number = |field| row.get(field).and_then(normalize_number);

        let brand = text(CanonicalField::Brand).and_then(|brand| {
            normalize_brand(&brand, &self.brand_aliases, self.normalization.brand_format)
        });

        CatalogRecord {
            name: text(CanonicalField::Name),
            article: text(CanonicalField::Article),
            analog: text(CanonicalField::Analog),
            brand,
            outer: number(CanonicalField::OuterDiameter),
            inner: number(CanonicalField::InnerDiameter),
            height: number(CanonicalField::Height),
            mass: number(CanonicalField::Mass),
        }
    }

    /// Normalizes a batch of canonical rows.
    #[must_use]
    pub fn normalize_data(&self, rows: &[CanonicalRow]) -> Vec<CatalogRecord> {
        rows.iter().map(|row| self.normalize_row(row)).collect()
    }

    /// Merges records into the catalog using the dedup rule.
    ///
    /// Each added record is immediately visible to the records after it, so
    /// duplicates inside one batch are suppressed too.
    pub fn add_records(&mut self, records: Vec<CatalogRecord>) -> AddSummary {
        let mut summary = AddSummary::default();

        for record in records {
            let Some(key) = record.dedup_key() else {
                summary.skipped += 1;
                continue;
            };

            let dims = record.dimensions();
            let existing = self.index.get(&key).map(|positions| {
                positions
                    .iter()
                    .map(|&i| self.records[i].dimensions())
                    .collect::<SmallVec<[_; 2]>>()
            });

            match existing {
                Some(existing) if existing.contains(&dims) => {
                    tracing::trace!(article = %key.article, "exact duplicate skipped");
                    summary.skipped += 1;
                    continue;
                }
                Some(existing) => summary.conflicts.push(Conflict {
                    article: key.article.clone(),
                    brand: key.brand.clone(),
                    new_dimensions: dims,
                    existing_dimensions: existing,
                }),
                None => {}
            }

            self.index.entry(key).or_default().push(self.records.len());
            self.records.push(record);
            summary.added += 1;
        }

        summary
    }

    /// Writes the catalog CSV and JSON mirror, sorted by brand then article.
    ///
    /// Both files are replaced atomically. If the CSV write fails the
    /// previous JSON mirror is put back. The in-memory order is only
    /// updated once both writes succeed, so a failed save can be undone
    /// with [`truncate`](Self::truncate).
    pub fn save(&mut self) -> Result<(), CatalogError> {
        let mut sorted: Vec<&CatalogRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| compare_records(a, b));

        let json = serde_json::to_vec_pretty(&sorted)?;
        let csv = encode_csv(&sorted)?;

        let previous_json = match std::fs::read(&self.json_path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(FsError::io(&self.json_path, e).into()),
        };

        atomic_write(&self.json_path, &json)?;
        if let Err(e) = atomic_write(&self.csv_path, &csv) {
            self.restore_json(previous_json.as_deref());
            return Err(e.into());
        }

        self.records.sort_by(compare_records);
        self.reindex();

        tracing::debug!(file = %self.csv_path, n_records = self.len(), "catalog saved");
        Ok(())
    }

    fn restore_json(&self, previous: Option<&[u8]>) {
        let restored = match previous {
            Some(bytes) => atomic_write(&self.json_path, bytes),
            None => std::fs::remove_file(&self.json_path)
                .map_err(|e| FsError::io(&self.json_path, e)),
        };
        if let Err(e) = restored {
            tracing::warn!(file = %self.json_path, error = %e, "could not restore catalog mirror");
        }
    }

    /// Drops every record after the first `len`.
    ///
    /// Used to undo an [`add_records`](Self::add_records) whose save failed.
    pub fn truncate(&mut self, len: usize) {
        if len < self.records.len() {
            self.records.truncate(len);
            self.reindex();
        }
    }

    /// Rebuilds the catalog from the files in the processed archive.
    ///
    /// The catalog is cleared and every archived file is replayed in file
    /// name order. Files with an unknown extension or that fail to parse are
    /// skipped. The rebuilt catalog is saved before returning.
    pub fn rebuild_from_processed(
        &mut self,
        dir: &Utf8Path,
        parser: &DataParser,
    ) -> Result<RebuildSummary, CatalogError> {
        self.records.clear();
        self.reindex();

        let files = if dir.as_std_path().is_dir() {
            DirListing::new(dir).collect_files()?
        } else {
            tracing::debug!(dir = %dir, "processed directory missing, rebuilding empty catalog");
            Vec::new()
        };

        let mut summary = RebuildSummary::default();
        for path in &files {
            let rows = match parser.parse_path(path) {
                Ok(rows) => rows,
                Err(ParseError::UnsupportedFileType(_)) => {
                    tracing::debug!(file = %path, "skipping file with unsupported extension");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(file = %path, error = %e, "skipping unparseable archived file");
                    continue;
                }
            };

            let added = self.add_records(self.normalize_data(&rows)).added;
            tracing::debug!(file = %path, n_added = added, "replayed archived file");
            summary.files += 1;
            summary.records += added;
        }

        self.save()?;
        Ok(summary)
    }

    fn text_field(&self, cell: Option<&CellValue>) -> Option<String> {
        let text = cell?.as_text()?;
        let normalized = normalize_text(&text, &self.normalization.dimension_replacements);
        (!normalized.is_empty()).then_some(normalized)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            if let Some(key) = record.dedup_key() {
                self.index.entry(key).or_default().push(i);
            }
        }
    }

    fn load(&mut self) -> Result<(), CatalogError> {
        let bytes = match std::fs::read(&self.csv_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(FsError::io(&self.csv_path, e).into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());

        let columns: Vec<(usize, CanonicalField)> = reader
            .headers()?
            .iter()
            .enumerate()
            .filter_map(|(i, header)| Some((i, header.trim().parse().ok()?)))
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = CanonicalRow::new();
            for &(i, field) in &columns {
                if let Some(value) = record.get(i) {
                    row.set(field, CellValue::from_text(value));
                }
            }
            rows.push(row);
        }

        let records = self.normalize_data(&rows);
        self.records = records;
        self.reindex();
        Ok(())
    }
}

/// Orders by brand, then article; absent values sort last.
fn compare_records(a: &CatalogRecord, b: &CatalogRecord) -> Ordering {
    nulls_last(&a.brand, &b.brand).then_with(|| nulls_last(&a.article, &b.article))
}

fn nulls_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn encode_csv(records: &[&CatalogRecord]) -> Result<Vec<u8>, CatalogError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CanonicalField::ALL.iter().map(|field| field.header()))?;
    for record in records {
        writer.write_record(CanonicalField::ALL.iter().map(|&field| record.field_text(field)))?;
    }
    writer
        .into_inner()
        .map_err(|e| CatalogError::Csv(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brg_core::{BrandFormat, Dimensions, ParsingRules};

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: Utf8PathBuf,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
            let mut config = Config::default().rooted_at(&root);
            config
                .brand_aliases
                .insert("скф".to_owned(), "SKF".to_owned());
            Self {
                _tmp: tmp,
                root,
                config,
            }
        }

        fn catalog(&self) -> CatalogManager {
            CatalogManager::from_config(&self.config)
        }
    }

    fn row(article: &str, brand: &str, d_outer: &str, d_inner: &str, h: &str) -> CanonicalRow {
        CanonicalRow::new()
            .with(CanonicalField::Article, CellValue::from_text(article))
            .with(CanonicalField::Brand, CellValue::from_text(brand))
            .with(CanonicalField::OuterDiameter, CellValue::from_text(d_outer))
            .with(CanonicalField::InnerDiameter, CellValue::from_text(d_inner))
            .with(CanonicalField::Height, CellValue::from_text(h))
    }

    #[test]
    fn test_normalize_row() {
        let fx = Fixture::new();
        let catalog = fx.catalog();
        let raw = row("  6205-2RS ", "Скф", "52", "25,0", "1 5")
            .with(CanonicalField::Name, CellValue::from_text("Подшипник\t 25×52×15"))
            .with(CanonicalField::Mass, CellValue::from_text("n/a"));

        let record = catalog.normalize_row(&raw);
        assert_eq!(record.article.as_deref(), Some("6205-2RS"));
        assert_eq!(record.brand.as_deref(), Some("SKF"));
        assert_eq!(record.name.as_deref(), Some("Подшипник 25x52x15"));
        assert_eq!(record.outer, Some(52.0));
        assert_eq!(record.inner, Some(25.0));
        assert_eq!(record.height, Some(15.0));
        assert_eq!(record.mass, None);
        assert_eq!(record.analog, None);
    }

    #[test]
    fn test_normalize_numeric_cells() {
        let fx = Fixture::new();
        let catalog = fx.catalog();
        let raw = CanonicalRow::new()
            .with(CanonicalField::Article, CellValue::Number(6205.0))
            .with(CanonicalField::OuterDiameter, CellValue::Number(52.0));
        let record = catalog.normalize_row(&raw);
        assert_eq!(record.article.as_deref(), Some("6205"));
        assert_eq!(record.outer, Some(52.0));
    }

    #[test]
    fn test_brand_format_title() {
        let mut fx = Fixture::new();
        fx.config.normalization.brand_format = BrandFormat::Title;
        let catalog = fx.catalog();
        let record = catalog.normalize_row(&row("6205", "NACHI", "", "", ""));
        assert_eq!(record.brand.as_deref(), Some("Nachi"));
    }

    #[test]
    fn test_empty_catalog_adds_first_record() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        assert!(catalog.is_empty());

        let summary = catalog.add_records(catalog.normalize_data(&[row("6205", "", "", "", "")]));
        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 0);
        assert!(summary.conflicts.is_empty());
    }

    #[test]
    fn test_exact_duplicate_is_skipped() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let rows = [
            row("6205", "SKF", "52", "25", "15"),
            row("6205", "skf", "52.0", "25", "15"),
        ];
        let summary = catalog.add_records(catalog.normalize_data(&rows));
        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_conflict_adds_row() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));

        let summary =
            catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "18")]));
        assert_eq!(summary.added, 1);
        assert_eq!(summary.n_conflicts(), 1);
        assert_eq!(catalog.len(), 2);

        let conflict = &summary.conflicts[0];
        assert_eq!(conflict.article, "6205");
        assert_eq!(conflict.brand.as_deref(), Some("SKF"));
        assert_eq!(conflict.new_dimensions.height, Some(18.0));
        assert_eq!(conflict.existing_dimensions.len(), 1);
        assert_eq!(conflict.existing_dimensions[0].height, Some(15.0));
    }

    #[test]
    fn test_conflict_lists_every_existing_variant() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let rows = [
            row("6205", "SKF", "52", "25", "15"),
            row("6205", "SKF", "52", "25", "18"),
            row("6205", "SKF", "52", "25", "20"),
        ];
        let summary = catalog.add_records(catalog.normalize_data(&rows));
        assert_eq!(summary.added, 3);
        assert_eq!(summary.n_conflicts(), 2);
        let heights: Vec<_> = summary.conflicts[1]
            .existing_dimensions
            .iter()
            .map(|d| d.height)
            .collect();
        assert_eq!(heights, vec![Some(15.0), Some(18.0)]);
    }

    #[test]
    fn test_brandless_key_only_matches_brandless_rows() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));

        let summary =
            catalog.add_records(catalog.normalize_data(&[row("6205", "", "52", "25", "18")]));
        assert_eq!(summary.added, 1);
        assert!(summary.conflicts.is_empty());
    }

    #[test]
    fn test_missing_dimensions_compare_equal() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let rows = [row("6205", "", "", "", ""), row("6205", "", "", "", "")];
        let summary = catalog.add_records(catalog.normalize_data(&rows));
        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(catalog.records()[0].dimensions(), Dimensions::default());
    }

    #[test]
    fn test_missing_article_is_skipped() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let summary = catalog.add_records(catalog.normalize_data(&[row(" ", "SKF", "52", "25", "15")]));
        assert_eq!(summary.added, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_save_sorts_and_reloads() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let rows = [
            row("6305", "", "62", "25", "17"),
            row("6206", "FAG", "62", "30", "16"),
            row("6205", "SKF", "52", "25", "15"),
            row("6201", "FAG", "32", "12", "10"),
        ];
        catalog.add_records(catalog.normalize_data(&rows));
        catalog.save().unwrap();

        let order: Vec<_> = catalog
            .records()
            .iter()
            .map(|r| r.article.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["6201", "6206", "6205", "6305"]);

        let reloaded = fx.catalog();
        assert_eq!(reloaded.records(), catalog.records());

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(catalog.json_path()).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert!(json[3]["Бренд"].is_null());
    }

    #[test]
    fn test_csv_header() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.save().unwrap();
        let text = std::fs::read_to_string(catalog.csv_path()).unwrap();
        insta::assert_snapshot!(text.trim_end(), @"Наименование,Артикул,Аналог,Бренд,D,d,H,m");
    }

    #[test]
    fn test_reload_preserves_dedup_index() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));
        catalog.save().unwrap();

        let mut reloaded = fx.catalog();
        let summary =
            reloaded.add_records(reloaded.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_failed_save_can_be_rolled_back() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));
        catalog.save().unwrap();

        // A directory in place of the CSV makes the final rename fail.
        std::fs::remove_file(catalog.csv_path()).unwrap();
        std::fs::create_dir(catalog.csv_path()).unwrap();

        let before = catalog.len();
        catalog.add_records(catalog.normalize_data(&[row("6206", "FAG", "62", "30", "16")]));
        assert!(catalog.save().is_err());

        catalog.truncate(before);
        assert_eq!(catalog.len(), 1);
        let summary =
            catalog.add_records(catalog.normalize_data(&[row("6206", "FAG", "62", "30", "16")]));
        assert_eq!(summary.added, 1);
    }

    #[test]
    fn test_failed_save_keeps_previous_mirror() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));
        catalog.save().unwrap();
        let mirror = std::fs::read(catalog.json_path()).unwrap();

        std::fs::remove_file(catalog.csv_path()).unwrap();
        std::fs::create_dir(catalog.csv_path()).unwrap();

        catalog.add_records(catalog.normalize_data(&[row("6206", "FAG", "62", "30", "16")]));
        assert!(catalog.save().is_err());
        assert_eq!(std::fs::read(catalog.json_path()).unwrap(), mirror);
    }

    #[test]
    fn test_failed_first_save_leaves_no_mirror() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        std::fs::create_dir_all(catalog.csv_path()).unwrap();

        catalog.add_records(catalog.normalize_data(&[row("6205", "SKF", "52", "25", "15")]));
        assert!(catalog.save().is_err());
        assert!(!catalog.json_path().as_std_path().exists());
    }

    #[test]
    fn test_unreadable_catalog_starts_empty() {
        let fx = Fixture::new();
        let csv_path = fx.config.paths.catalog_csv();
        std::fs::create_dir_all(csv_path.parent().unwrap()).unwrap();
        std::fs::write(&csv_path, [0xFF, 0xFE, b'\n', b'"']).unwrap();

        let catalog = fx.catalog();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_rebuild_from_processed() {
        let fx = Fixture::new();
        let processed = fx.root.join("processed");
        std::fs::create_dir_all(&processed).unwrap();
        std::fs::write(
            processed.join("20240101_000000__a__1__aaaaaaaa.csv"),
            "Артикул,Бренд,D,d,H\n6205,SKF,52,25,15\n",
        )
        .unwrap();
        std::fs::write(
            processed.join("20240102_000000__b__2__bbbbbbbb.csv"),
            "Артикул,Бренд,D,d,H\n6205,SKF,52,25,15\n6206,FAG,62,30,16\n",
        )
        .unwrap();
        std::fs::write(processed.join("notes.pdf"), "x").unwrap();
        std::fs::write(processed.join("broken.json"), "{").unwrap();

        let mut catalog = fx.catalog();
        catalog.add_records(catalog.normalize_data(&[row("9999", "", "", "", "")]));

        let parser = DataParser::new(&ParsingRules::default()).unwrap();
        let summary = catalog.rebuild_from_processed(&processed, &parser).unwrap();

        assert_eq!(summary, RebuildSummary { files: 2, records: 2 });
        assert_eq!(catalog.len(), 2);
        assert_eq!(fx.catalog().len(), 2);
    }

    #[test]
    fn test_rebuild_missing_directory_is_empty() {
        let fx = Fixture::new();
        let mut catalog = fx.catalog();
        let parser = DataParser::new(&ParsingRules::default()).unwrap();
        let summary = catalog
            .rebuild_from_processed(&fx.root.join("nowhere"), &parser)
            .unwrap();
        assert_eq!(summary, RebuildSummary::default());
        assert!(catalog.csv_path().exists());
    }
}
