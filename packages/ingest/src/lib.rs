#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Admits raw property rows and boundary features into the typed record
//! model.
//!
//! This is the single validation boundary of the system: everything past
//! it works on [`PropertyRecord`](estate_map_property_models::PropertyRecord)
//! and [`AreaFeature`](estate_map_property_models::AreaFeature) values.
//! Bad records never abort a load; they are dropped and reported in an
//! [`IngestSummary`](estate_map_ingest_models::IngestSummary).
//!
//! The [`files`] module holds thin async helpers that turn CSV and
//! `GeoJSON` files into the already-parsed inputs the admission functions
//! consume.

pub mod boundaries;
pub mod files;
pub mod rows;

pub use boundaries::admit_features;
pub use rows::{RawRow, admit_rows};

/// Errors that can occur while reading input files.
///
/// Per-record problems are never errors; see
/// [`IngestWarning`](estate_map_ingest_models::IngestWarning).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The boundary file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but is not a `GeoJSON` feature collection.
    #[error("Expected a GeoJSON FeatureCollection, found {found}")]
    NotFeatureCollection {
        /// The `type` member of the document, or the JSON kind when it is
        /// not an object.
        found: String,
    },

    /// A feature collection without a `features` array.
    #[error("FeatureCollection has no features array")]
    MissingFeatures,
}
