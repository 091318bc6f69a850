use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use exam_billing::{
    merge_mappings, BillingError, BillingResult, Clinic, CustomMapping, MappingStore,
    SpecialistPrice, StoredMapping,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};
use crate::row_source::extension;

/// Price and mapping catalog kept in a single JSON or YAML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub clinics: Vec<Clinic>,
    pub specialist_prices: Vec<SpecialistPrice>,
    pub custom_mappings: Vec<StoredMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    fn of(path: &Path) -> OpsResult<Self> {
        match extension(path).as_deref() {
            Some("json") => Ok(CatalogFormat::Json),
            Some("yaml" | "yml") => Ok(CatalogFormat::Yaml),
            _ => Err(OpsError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl Catalog {
    pub fn load(path: &Path) -> OpsResult<Self> {
        let format = CatalogFormat::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| OpsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match format {
            CatalogFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            CatalogFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| OpsError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn save(&self, path: &Path) -> OpsResult<()> {
        let rendered = match CatalogFormat::of(path)? {
            CatalogFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            CatalogFormat::Yaml => serde_yaml::to_string(self).map_err(|e| e.to_string()),
        }
        .map_err(|message| OpsError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        std::fs::write(path, rendered).map_err(|source| OpsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Mapping store backed by a catalog file; every upsert rewrites the file.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
    mappings: BTreeMap<String, StoredMapping>,
}

impl CatalogStore {
    pub fn open(path: impl AsRef<Path>) -> OpsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let catalog = Catalog::load(&path)?;
        let mappings = catalog
            .custom_mappings
            .iter()
            .map(|stored| (stored.original_name.clone(), stored.clone()))
            .collect();

        debug!(
            path = %path.display(),
            clinics = catalog.clinics.len(),
            specialist_prices = catalog.specialist_prices.len(),
            "Catalog opened"
        );
        Ok(Self {
            path,
            catalog,
            mappings,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl MappingStore for CatalogStore {
    fn load_all(&self) -> BillingResult<Vec<StoredMapping>> {
        Ok(self.mappings.values().cloned().collect())
    }

    fn upsert_many(&mut self, mappings: &[CustomMapping]) -> BillingResult<()> {
        let mut merged = self.mappings.clone();
        merge_mappings(&mut merged, mappings);

        let mut catalog = self.catalog.clone();
        catalog.custom_mappings = merged.values().cloned().collect();
        catalog
            .save(&self.path)
            .map_err(|e| BillingError::Store(e.to_string()))?;

        info!(
            path = %self.path.display(),
            saved = mappings.len(),
            total = merged.len(),
            "Custom mappings saved"
        );
        self.catalog = catalog;
        self.mappings = merged;
        Ok(())
    }
}
