use reqwest::blocking::Client;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Remote returned status {status}: {body}")]
    Transport { status: u16, body: String },
    #[error("Response was not a JSON array of objects")]
    MalformedBody,
    #[error("Remote returned an empty result set")]
    EmptyResult,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Issue one blocking GET against the REST data store and parse the body as
/// a JSON array of objects. No retries and no pagination: the endpoint is
/// expected to return the full result set in a single response.
pub fn fetch_assets(base_url: &str, api_key: &str) -> Result<Vec<Map<String, Value>>> {
    let endpoint = format!("{}/rest/v1/assets?select=*", base_url);
    info!(endpoint = %endpoint, "fetching asset records");

    let response = Client::new()
        .get(&endpoint)
        .header("apikey", api_key)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Accept", "application/json")
        .send()?;

    let status = response.status().as_u16();
    let body = response.text()?;
    if status != 200 {
        return Err(IngestError::Transport { status, body });
    }

    let parsed: Value = serde_json::from_str(&body).map_err(|_| IngestError::MalformedBody)?;
    let records = match parsed {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                _ => Err(IngestError::MalformedBody),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(IngestError::MalformedBody),
    };

    Ok(records)
}

/// Render one JSON value as a CSV field. Strings pass through unquoted;
/// everything else keeps its JSON text, so numbers are never re-parsed and
/// re-formatted on the way to disk.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write fetched records as delimited text. The header row is the key set of
/// the first record in its original order; all records are assumed to share
/// that key set.
pub fn write_records<W: Write>(records: &[Map<String, Value>], writer: W) -> Result<()> {
    let first = records.first().ok_or(IngestError::EmptyResult)?;
    let columns: Vec<&String> = first.keys().collect();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|col| record.get(*col).map(field_text).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write fetched records to a file. No file is created when the result set
/// is empty.
pub fn export_csv<P: AsRef<Path>>(records: &[Map<String, Value>], path: P) -> Result<()> {
    if records.is_empty() {
        return Err(IngestError::EmptyResult);
    }
    let file = std::fs::File::create(&path)?;
    write_records(records, file)?;
    info!(
        rows = records.len(),
        path = %path.as_ref().display(),
        "asset records exported"
    );
    Ok(())
}
