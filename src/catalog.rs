//! Static report catalog
//!
//! WeGene has no endpoint listing its report types, so the catalog is a
//! curated JSON file loaded once at startup and trusted as-is.

use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Profile, ReportDefinition};

/// Immutable list of report definitions plus the raw JSON they came from
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    reports: Vec<ReportDefinition>,
    raw: Value,
}

impl ReportCatalog {
    /// Load the catalog from a JSON array file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!("Loaded {} report definitions from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse the catalog; any malformed entry rejects the whole catalog
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| Error::Catalog(format!("invalid JSON: {}", e)))?;

        let entries = raw
            .as_array()
            .ok_or_else(|| Error::Catalog("catalog must be a JSON array".into()))?;

        let reports = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                serde_json::from_value::<ReportDefinition>(entry.clone())
                    .map_err(|e| Error::Catalog(format!("entry {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { reports, raw })
    }

    pub fn reports(&self) -> &[ReportDefinition] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports that apply to the given profile's sex
    pub fn for_profile<'a>(
        &'a self,
        profile: &'a Profile,
    ) -> impl Iterator<Item = &'a ReportDefinition> + 'a {
        self.reports.iter().filter(move |r| r.applies_to(profile))
    }

    /// The catalog exactly as loaded, serialized back to JSON text.
    /// Key order follows the file.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.raw)?)
    }
}
