//! Reading property CSV and boundary `GeoJSON` files.
//!
//! These helpers only decode files into [`RawRow`]s and raw feature
//! objects; admission happens in [`crate::rows`] and [`crate::boundaries`].

use std::path::Path;

use serde_json::Value;

use crate::{IngestError, RawRow};

/// Decodes CSV bytes with a header row into raw rows.
///
/// Cells are trimmed. Rows shorter than the header simply lack the
/// trailing columns; extra cells are ignored. Invalid UTF-8 in a cell is
/// replaced with U+FFFD so the row still reaches admission.
///
/// # Errors
///
/// * [`IngestError::Csv`] if the data is not valid CSV
pub fn parse_property_rows(bytes: &[u8]) -> Result<Vec<RawRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|column| String::from_utf8_lossy(column).into_owned())
        .collect();
    let mut rows = Vec::new();

    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        if std::str::from_utf8(record.as_slice()).is_err() {
            log::warn!("CSV row {index} contains invalid UTF-8; replacing bad bytes");
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| {
                (column.clone(), String::from_utf8_lossy(value).into_owned())
            })
            .collect();
        rows.push(row);
    }

    log::debug!("Parsed {} CSV rows with {} columns", rows.len(), headers.len());

    Ok(rows)
}

/// Reads a property CSV file.
///
/// # Errors
///
/// * [`IngestError::Io`] if the file cannot be read
/// * [`IngestError::Csv`] if its content is not valid CSV
pub async fn read_property_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>, IngestError> {
    let path = path.as_ref();
    log::info!("Reading properties from {}", path.display());
    let bytes = tokio::fs::read(path).await?;
    parse_property_rows(&bytes)
}

/// Splits a `GeoJSON` `FeatureCollection` into its raw feature objects.
///
/// Features are left undecoded so that one bad feature cannot fail the
/// whole collection.
///
/// # Errors
///
/// * [`IngestError::Json`] if the text is not valid JSON
/// * [`IngestError::NotFeatureCollection`] if it is not a feature
///   collection
/// * [`IngestError::MissingFeatures`] if the collection has no `features`
///   array
pub fn parse_feature_collection(text: &str) -> Result<Vec<Value>, IngestError> {
    let Value::Object(mut document) = serde_json::from_str(text)? else {
        return Err(IngestError::NotFeatureCollection {
            found: "non-object".to_string(),
        });
    };

    let kind = document
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if kind != "FeatureCollection" {
        return Err(IngestError::NotFeatureCollection {
            found: kind.to_string(),
        });
    }

    match document.remove("features") {
        Some(Value::Array(features)) => Ok(features),
        _ => Err(IngestError::MissingFeatures),
    }
}

/// Reads a boundary `GeoJSON` file.
///
/// # Errors
///
/// * [`IngestError::Io`] if the file cannot be read
/// * [`IngestError::Json`], [`IngestError::NotFeatureCollection`] or
///   [`IngestError::MissingFeatures`] if its content is not a feature
///   collection
pub async fn read_boundary_features(path: impl AsRef<Path>) -> Result<Vec<Value>, IngestError> {
    let path = path.as_ref();
    log::info!("Reading boundaries from {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    parse_feature_collection(&text)
}
