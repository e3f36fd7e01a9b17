//! Property row admission.
//!
//! A row is admitted iff its latitude, longitude and reference-year price
//! all parse as finite numbers. The remaining columns are read leniently:
//! a missing or unparseable count becomes `0`, a missing size becomes
//! `0.0` (which later keeps the row out of per-unit averages), and missing
//! text becomes an empty string.

use std::collections::{BTreeMap, BTreeSet};

use estate_map_ingest_models::{
    ADDRESS_COLUMN, BATHROOMS_COLUMN, BEDROOMS_COLUMN, IngestConfig, IngestSummary,
    IngestWarning, LATITUDE_COLUMN, LONGITUDE_COLUMN, NAME_COLUMN, RowDropReason, SIZE_COLUMN,
    TYPE_COLUMN,
};
use estate_map_property_models::{PropertyRecord, Year};

/// One parsed row: column name to raw cell text.
pub type RawRow = BTreeMap<String, String>;

/// Converts raw rows into property records.
///
/// Rows failing admission are dropped and counted. Rows whose name was
/// already seen are kept (each is its own marker) and reported as
/// [`IngestWarning::DuplicatePropertyName`].
#[must_use]
pub fn admit_rows(rows: &[RawRow], config: &IngestConfig) -> (Vec<PropertyRecord>, IngestSummary) {
    let mut summary = IngestSummary::default();
    let mut records = Vec::with_capacity(rows.len());
    let mut seen_names = BTreeSet::new();

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;

        match admit_row(row, config) {
            Ok(record) => {
                if !seen_names.insert(record.name.clone()) {
                    summary.warnings.push(IngestWarning::DuplicatePropertyName {
                        row: line,
                        name: record.name.clone(),
                    });
                }
                records.push(record);
            }
            Err(reason) => {
                log::debug!("Dropping property row {line}: {reason}");
                summary.drop_row(line, reason);
            }
        }
    }

    summary.admitted = records.len();

    log::info!(
        "Admitted {} of {} property rows ({} dropped)",
        summary.admitted,
        summary.total(),
        summary.dropped
    );

    (records, summary)
}

/// Converts a single row, or reports why it cannot be admitted.
///
/// # Errors
///
/// Returns the [`RowDropReason`] for the first required column that is
/// missing or not a finite number.
pub fn admit_row(row: &RawRow, config: &IngestConfig) -> Result<PropertyRecord, RowDropReason> {
    let latitude = parse_finite(row.get(LATITUDE_COLUMN)).ok_or(RowDropReason::InvalidLatitude)?;
    let longitude =
        parse_finite(row.get(LONGITUDE_COLUMN)).ok_or(RowDropReason::InvalidLongitude)?;
    let price = parse_finite(row.get(&year_column(config.reference_year)))
        .ok_or(RowDropReason::InvalidReferencePrice)?;

    let yearly_prices = config
        .years
        .years()
        .filter_map(|year| parse_finite(row.get(&year_column(year))).map(|p| (year, p)))
        .collect();

    Ok(PropertyRecord {
        name: text(row, NAME_COLUMN),
        latitude,
        longitude,
        price,
        bedrooms: parse_count(row.get(BEDROOMS_COLUMN)),
        bathrooms: parse_count(row.get(BATHROOMS_COLUMN)),
        size_units: parse_finite(row.get(SIZE_COLUMN)).unwrap_or(0.0),
        property_type: text(row, TYPE_COLUMN),
        address: text(row, ADDRESS_COLUMN),
        yearly_prices,
    })
}

/// Column name for a year's price (e.g. `"2025"`).
#[must_use]
pub fn year_column(year: Year) -> String {
    year.to_string()
}

/// Parses a cell as a finite `f64`. Returns `None` if missing, blank,
/// unparseable, `NaN` or infinite.
#[must_use]
pub fn parse_finite(value: Option<&String>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses a whole-number count, truncating fractional input (`"3.5"` is
/// `3`). Missing, negative or unparseable cells become `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(value: Option<&String>) -> u32 {
    if let Some(n) = value.and_then(|v| v.trim().parse::<u32>().ok()) {
        return n;
    }
    parse_finite(value)
        .filter(|n| *n >= 0.0)
        .map_or(0, |n| n.trunc() as u32)
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_map_property_models::YearRange;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn full_row(name: &str) -> RawRow {
        row(&[
            ("name", name),
            ("latitude", "25.1972"),
            ("longitude", "55.2744"),
            ("no_bedrooms", "3"),
            ("no_bathrooms", "4"),
            ("area", "2700"),
            ("type", "Luxury Villa"),
            ("address", "Downtown Dubai"),
            ("2015", "300000"),
            ("2020", ""),
            ("2025", "500000"),
            ("2026", "520000"),
        ])
    }

    #[test]
    fn admits_complete_row() {
        let record = admit_row(&full_row("Burj Vista"), &IngestConfig::default()).unwrap();

        assert_eq!(record.name, "Burj Vista");
        assert!((record.latitude - 25.1972).abs() < 1e-9);
        assert!((record.longitude - 55.2744).abs() < 1e-9);
        assert!((record.price - 500_000.0).abs() < f64::EPSILON);
        assert_eq!(record.bedrooms, 3);
        assert_eq!(record.bathrooms, 4);
        assert!((record.size_units - 2_700.0).abs() < f64::EPSILON);
        assert_eq!(record.property_type, "Luxury Villa");
        assert_eq!(record.address, "Downtown Dubai");
        assert_eq!(
            record.yearly_prices.keys().copied().collect::<Vec<_>>(),
            vec![2015, 2025, 2026],
            "blank 2020 cell must not enter the history"
        );
    }

    #[test]
    fn drops_rows_missing_required_numbers() {
        let config = IngestConfig::default();

        let mut no_lat = full_row("a");
        no_lat.remove("latitude");
        assert_eq!(
            admit_row(&no_lat, &config),
            Err(RowDropReason::InvalidLatitude)
        );

        let mut bad_lng = full_row("b");
        bad_lng.insert("longitude".to_string(), "east".to_string());
        assert_eq!(
            admit_row(&bad_lng, &config),
            Err(RowDropReason::InvalidLongitude)
        );

        let mut inf_price = full_row("c");
        inf_price.insert("2025".to_string(), "inf".to_string());
        assert_eq!(
            admit_row(&inf_price, &config),
            Err(RowDropReason::InvalidReferencePrice)
        );
    }

    #[test]
    fn lenient_columns_fall_back_to_defaults() {
        let sparse = row(&[
            ("latitude", "25.0"),
            ("longitude", "55.0"),
            ("2025", "1000"),
            ("no_bedrooms", "studio"),
            ("no_bathrooms", "1.5"),
        ]);
        let record = admit_row(&sparse, &IngestConfig::default()).unwrap();

        assert_eq!(record.name, "");
        assert_eq!(record.bedrooms, 0);
        assert_eq!(record.bathrooms, 1);
        assert!(record.size_units.abs() < f64::EPSILON);
        assert_eq!(record.property_type, "");
        assert_eq!(record.yearly_prices.len(), 1);
    }

    #[test]
    fn honors_configured_reference_year_and_range() {
        let config = IngestConfig {
            reference_year: 2015,
            years: YearRange::new(2015, 2020),
        };
        let record = admit_row(&full_row("x"), &config).unwrap();

        assert!((record.price - 300_000.0).abs() < f64::EPSILON);
        assert_eq!(
            record.yearly_prices.keys().copied().collect::<Vec<_>>(),
            vec![2015]
        );
    }

    #[test]
    fn admit_rows_counts_drops_and_reports_duplicates() {
        let mut bad = full_row("broken");
        bad.insert("latitude".to_string(), String::new());

        let rows = vec![full_row("Twin"), bad, full_row("Twin"), full_row("Solo")];
        let (records, summary) = admit_rows(&rows, &IngestConfig::default());

        assert_eq!(records.len(), 3);
        assert_eq!(summary.admitted, 3);
        assert_eq!(summary.dropped, 1);
        assert_eq!(
            summary.warnings,
            vec![
                IngestWarning::RowDropped {
                    row: 2,
                    reason: RowDropReason::InvalidLatitude,
                },
                IngestWarning::DuplicatePropertyName {
                    row: 3,
                    name: "Twin".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_input_is_a_valid_empty_dataset() {
        let (records, summary) = admit_rows(&[], &IngestConfig::default());
        assert!(records.is_empty());
        assert_eq!(summary, IngestSummary::default());
    }

    #[test]
    fn parse_count_truncates_and_rejects_negatives() {
        assert_eq!(parse_count(Some(&"7".to_string())), 7);
        assert_eq!(parse_count(Some(&" 2.9 ".to_string())), 2);
        assert_eq!(parse_count(Some(&"-3".to_string())), 0);
        assert_eq!(parse_count(None), 0);
    }
}
