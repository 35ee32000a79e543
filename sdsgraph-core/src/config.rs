use crate::error::Result;
use crate::types::Supplier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_footer_threshold() -> f64 {
    125.0 // points above the bottom page edge
}

fn default_merge_threshold() -> f64 {
    12.5 // points between row tops
}

fn default_confidence_threshold() -> f64 {
    0.9
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Which rule set and field registry to use
    #[serde(default)]
    pub supplier: Supplier,
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    #[serde(default)]
    pub tables: TableConfig,
    #[serde(default)]
    pub pictograms: PictogramConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Elements whose page-space bottom edge is below this are treated as footer and dropped
    #[serde(default = "default_footer_threshold")]
    pub footer_threshold: f64,
    /// Maximum x0 difference (points) still treated as the same indentation level
    #[serde(default)]
    pub indent_tolerance: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            footer_threshold: default_footer_threshold(),
            indent_tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Rows whose tops are closer than this are merged into one logical row
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,
    /// Copy the last non-empty value of a column down into blank cells
    #[serde(default = "default_true")]
    pub cascade_blank_cells: bool,
    /// Move trailing "Remarks" rows into side annotations
    #[serde(default = "default_true")]
    pub extract_remarks: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            merge_threshold: default_merge_threshold(),
            cascade_blank_cells: true,
            extract_remarks: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PictogramConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Detections at or below this confidence are discarded
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl Default for PictogramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Also run the field mapper and emit the field table
    #[serde(default)]
    pub include_fields: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            include_fields: false,
        }
    }
}

impl ParsingConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ParsingConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}, using defaults", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

/// Configuration per supplier family. Suppliers without a loaded file get the
/// defaults with their own `supplier` tag.
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    configs: HashMap<Supplier, ParsingConfig>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_config(&self, supplier: Supplier) -> ParsingConfig {
        self.configs
            .get(&supplier)
            .cloned()
            .unwrap_or_else(|| ParsingConfig {
                supplier,
                ..ParsingConfig::default()
            })
    }

    /// Replaces the config for whichever supplier the file names.
    pub fn load_config_from_file(&mut self, path: &str) -> Result<Supplier> {
        let config = ParsingConfig::load_from_file(path)?;
        let supplier = config.supplier;
        self.configs.insert(supplier, config);
        Ok(supplier)
    }

    /// Config for a run: the file's supplier and settings when `path` loads,
    /// otherwise the defaults of the default supplier.
    pub fn resolve(&mut self, path: Option<&str>) -> ParsingConfig {
        let supplier = match path {
            Some(p) => self.load_config_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}, using defaults", p, e);
                Supplier::default()
            }),
            None => Supplier::default(),
        };
        self.get_config(supplier)
    }
}
