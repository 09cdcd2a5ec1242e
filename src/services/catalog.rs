//! Parquet catalog reader.

use std::fs::File;
use std::path::{Path, PathBuf};

use parquet::file::reader::{FileReader, SerializedFileReader};
use tracing::debug;

use crate::error::CatalogError;
use crate::models::{CatalogConfig, Record};

/// Reads catalog rows from a parquet file.
pub struct CatalogReader {
    path: PathBuf,
    reader: SerializedFileReader<File>,
}

impl CatalogReader {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = SerializedFileReader::new(file)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader,
        })
    }

    pub fn num_rows(&self) -> u64 {
        self.reader.metadata().file_metadata().num_rows().max(0) as u64
    }

    /// Read every row into memory, in file order.
    pub fn read_records(&self, layout: &CatalogConfig) -> Result<Vec<Record>, CatalogError> {
        debug!(path = %self.path.display(), rows = self.num_rows(), "reading catalog");

        let mut records = Vec::with_capacity(self.num_rows() as usize);
        for (position, row) in self.reader.get_row_iter(None)?.enumerate() {
            let row = row?.to_json_value();
            records.push(Record::from_json_row(position, &row, layout)?);
        }
        Ok(records)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::write_catalog_fixture;
    use super::*;
    use crate::models::PayloadValue;
    use tempfile::tempdir;

    #[test]
    fn test_reads_rows_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        write_catalog_fixture(&path, &[(1, "Strap top"), (2, "Dress"), (3, "Socks")]);

        let reader = CatalogReader::open(&path).unwrap();
        assert_eq!(reader.num_rows(), 3);

        let records = reader.read_records(&CatalogConfig::default()).unwrap();
        let names: Vec<_> = records
            .iter()
            .map(|r| r.fields.get("prod_name").cloned().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                PayloadValue::Text("Strap top".to_string()),
                PayloadValue::Text("Dress".to_string()),
                PayloadValue::Text("Socks".to_string()),
            ]
        );
        assert_eq!(records[2].position, 2);
        assert_eq!(
            records[0].fields.get("product_code"),
            Some(&PayloadValue::Integer(1))
        );
        // columns absent from the file
        assert_eq!(records[0].fields.get("image_url"), Some(&PayloadValue::Null));
        assert!(records.iter().all(|r| r.dense.is_none() && r.sparse.is_none()));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.parquet");
        let err = CatalogReader::open(&path).err().unwrap();
        assert!(matches!(err, CatalogError::Open { .. }));
        assert!(err.to_string().contains("missing.parquet"));
    }

    #[test]
    fn test_non_parquet_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.parquet");
        std::fs::write(&path, b"not parquet").unwrap();
        assert!(matches!(
            CatalogReader::open(&path),
            Err(CatalogError::Parquet(_))
        ));
    }
}
