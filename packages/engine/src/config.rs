//! Engine configuration, read from TOML.
//!
//! Every field has a default, so an empty document is a valid
//! configuration:
//!
//! ```toml
//! reference_year = 2025
//!
//! [years]
//! first = 2015
//! last = 2026
//!
//! [growth]
//! start_year = 2015
//! end_year = 2025
//!
//! [map]
//! center = [25.2048, 55.2708]
//! zoom = 12
//! ```

use estate_map_analytics_models::{GrowthWindow, StatisticsConfig};
use estate_map_ingest_models::IngestConfig;
use estate_map_property_models::{Year, YearRange};
use serde::{Deserialize, Serialize};

/// Errors that can occur while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The tracked year range is empty.
    #[error("Year range {first}..={last} is empty")]
    EmptyYearRange {
        /// First year.
        first: Year,
        /// Last year.
        last: Year,
    },

    /// A configured year lies outside the tracked range.
    #[error("{field} {year} is outside the tracked years {first}..={last}")]
    YearOutOfRange {
        /// Name of the offending setting.
        field: &'static str,
        /// The configured year.
        year: Year,
        /// First tracked year.
        first: Year,
        /// Last tracked year.
        last: Year,
    },

    /// The growth window does not move forward in time.
    #[error("Growth start year {start_year} must be before end year {end_year}")]
    InvalidGrowthWindow {
        /// Configured start year.
        start_year: Year,
        /// Configured end year.
        end_year: Year,
    },
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[latitude, longitude]` of the initial center.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [25.2048, 55.2708],
            zoom: 12,
        }
    }
}

/// Settings shared by ingestion, statistics and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Year column used as the current price.
    pub reference_year: Year,
    /// Tracked year columns.
    pub years: YearRange,
    /// Years compared for growth.
    pub growth: GrowthWindow,
    /// Initial map viewport.
    pub map: MapView,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let ingest = IngestConfig::default();
        Self {
            reference_year: ingest.reference_year,
            years: ingest.years,
            growth: GrowthWindow::default(),
            map: MapView::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Toml`] if the document is not valid TOML or has
    ///   unknown keys
    /// * any validation error from [`Self::validate`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the year settings are consistent.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let YearRange { first, last } = self.years;
        if self.years.is_empty() {
            return Err(ConfigError::EmptyYearRange { first, last });
        }

        for (field, year) in [
            ("reference_year", self.reference_year),
            ("growth.start_year", self.growth.start_year),
            ("growth.end_year", self.growth.end_year),
        ] {
            if !self.years.contains(year) {
                return Err(ConfigError::YearOutOfRange {
                    field,
                    year,
                    first,
                    last,
                });
            }
        }

        if self.growth.start_year >= self.growth.end_year {
            return Err(ConfigError::InvalidGrowthWindow {
                start_year: self.growth.start_year,
                end_year: self.growth.end_year,
            });
        }

        Ok(())
    }

    /// Row admission settings.
    #[must_use]
    pub const fn ingest(&self) -> IngestConfig {
        IngestConfig {
            reference_year: self.reference_year,
            years: self.years,
        }
    }

    /// Statistics settings.
    #[must_use]
    pub const fn statistics(&self) -> StatisticsConfig {
        StatisticsConfig {
            years: self.years,
            growth: self.growth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.reference_year, 2025);
        assert_eq!(config.years, YearRange::new(2015, 2026));
        assert_eq!(config.map.zoom, 12);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = EngineConfig::from_toml_str(
            "reference_year = 2024\n[years]\nlast = 2030\n[map]\nzoom = 10\n",
        )
        .unwrap();

        assert_eq!(config.reference_year, 2024);
        assert_eq!(config.years, YearRange::new(2015, 2030));
        assert_eq!(config.growth, GrowthWindow::default());
        assert_eq!(config.map.zoom, 10);
        assert!((config.map.center[0] - 25.2048).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            EngineConfig::from_toml_str("refrence_year = 2025"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_years() {
        assert!(matches!(
            EngineConfig::from_toml_str("[years]\nfirst = 2026\nlast = 2015"),
            Err(ConfigError::EmptyYearRange { .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("reference_year = 2040"),
            Err(ConfigError::YearOutOfRange {
                field: "reference_year",
                ..
            })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[growth]\nstart_year = 2025\nend_year = 2020"),
            Err(ConfigError::InvalidGrowthWindow { .. })
        ));
    }

    #[test]
    fn derived_settings_share_years() {
        let config = EngineConfig::default();
        assert_eq!(config.ingest().years, config.statistics().years);
        assert_eq!(config.ingest().reference_year, 2025);
    }
}
