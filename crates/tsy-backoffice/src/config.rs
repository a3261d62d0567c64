//! Configuration for the back-office runner.
//!
//! Loaded from a TOML file with CLI overrides layered on top; every field
//! has a sensible default so the binary runs with no config at all.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tsy_common::BucketedSector;

/// Top-level runner configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackofficeConfig {
    /// Directory holding the input files.
    pub data_dir: PathBuf,

    /// Directory the output files are written to.
    pub out_dir: PathBuf,

    /// Default log level when RUST_LOG is unset.
    pub log_level: String,

    /// GUI throttle knobs.
    pub gui: GuiSettings,

    /// Risk roll-up sectors.
    pub sectors: Vec<SectorConfig>,
}

/// Throttle settings for the human-readable price file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuiSettings {
    pub max_lines: u32,
    pub min_interval_ms: u64,
}

impl Default for GuiSettings {
    fn default() -> Self {
        Self { max_lines: 100, min_interval_ms: 300 }
    }
}

impl GuiSettings {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// One named risk sector.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectorConfig {
    pub name: String,
    pub products: Vec<String>,
}

impl SectorConfig {
    pub fn to_sector(&self) -> BucketedSector {
        BucketedSector::new(self.name.clone(), self.products.clone())
    }
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            log_level: "info".to_string(),
            gui: GuiSettings::default(),
            sectors: vec![
                SectorConfig {
                    name: "FrontEnd".to_string(),
                    products: vec!["T2Y".to_string(), "T3Y".to_string()],
                },
                SectorConfig {
                    name: "Belly".to_string(),
                    products: vec!["T5Y".to_string(), "T7Y".to_string(), "T10Y".to_string()],
                },
                SectorConfig {
                    name: "LongEnd".to_string(),
                    products: vec!["T20Y".to_string(), "T30Y".to_string()],
                },
            ],
        }
    }
}

impl BackofficeConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let config: BackofficeConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Layer CLI flags over the file values.
    pub fn apply_cli_overrides(&mut self, data_dir: Option<PathBuf>, out_dir: Option<PathBuf>) {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = out_dir {
            self.out_dir = dir;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.gui.max_lines == 0 {
            bail!("gui.max_lines must be positive");
        }
        for sector in &self.sectors {
            if sector.products.is_empty() {
                bail!("sector {:?} has no products", sector.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_three_sectors() {
        let config = BackofficeConfig::default();
        assert_eq!(config.sectors.len(), 3);
        assert_eq!(config.gui.max_lines, 100);
        assert_eq!(config.gui.min_interval(), Duration::from_millis(300));
        config.validate().unwrap();
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let text = r#"
            data_dir = "inputs"

            [gui]
            max_lines = 10
        "#;
        let config: BackofficeConfig = toml::from_str(text).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("inputs"));
        assert_eq!(config.gui.max_lines, 10);
        // Untouched fields keep their defaults.
        assert_eq!(config.gui.min_interval_ms, 300);
        assert_eq!(config.sectors.len(), 3);
    }

    #[test]
    fn rejects_empty_sector() {
        let text = r#"
            [[sectors]]
            name = "Empty"
            products = []
        "#;
        let config: BackofficeConfig = toml::from_str(text).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut config = BackofficeConfig::default();
        config.apply_cli_overrides(Some(PathBuf::from("a")), None);
        assert_eq!(config.data_dir, PathBuf::from("a"));
        assert_eq!(config.out_dir, PathBuf::from("."));
    }
}
