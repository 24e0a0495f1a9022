use super::{AssetRecord, DataError, PersonalityRecord, Result, TRAIT_COLUMNS};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;

pub struct DataLoader;

impl DataLoader {
    fn verify_required_columns(headers: &[String], required: &[&str]) -> Result<()> {
        let headers_set: HashSet<_> = headers.iter().map(|s| s.to_lowercase()).collect();

        for column in required {
            if !headers_set.contains(&column.to_lowercase()) {
                return Err(DataError::MissingColumn(column.to_string()));
            }
        }
        Ok(())
    }

    /// Load the asset holdings file fully into memory, validating the header
    /// before any row is deserialized so a malformed export fails fast.
    pub fn load_assets<P: AsRef<Path>>(path: P) -> Result<Vec<AssetRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        Self::verify_required_columns(
            &headers,
            &["_id", "asset_currency", "asset_allocation", "asset_value"],
        )?;

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: AssetRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Load the personality survey file fully into memory. Requires the
    /// identifier column plus all five trait columns.
    pub fn load_personality<P: AsRef<Path>>(path: P) -> Result<Vec<PersonalityRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        let mut required = vec!["_id"];
        required.extend_from_slice(&TRAIT_COLUMNS);
        Self::verify_required_columns(&headers, &required)?;

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: PersonalityRecord = result?;
            records.push(record);
        }
        Ok(records)
    }
}
