//! Module registry access.
//!
//! The registry is the authority on which module identifiers exist. It is an
//! external collaborator: when it cannot be read the tracker carries on with an
//! empty registry rather than failing.

use crate::error::RegistryError;
use crate::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::types::ModuleId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Descriptive metadata a registry publishes for a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleMeta {
    pub label: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Registry listing in registry order.
pub type ModuleMap = IndexMap<ModuleId, ModuleMeta>;

/// Source of the currently known module identifiers.
pub trait RegistryProvider: Send + Sync {
    /// List all known modules. An unavailable registry yields an empty map.
    fn list_modules(&self) -> ModuleMap;
}

/// Registry backed by a TOML manifest:
///
/// ```toml
/// [modules.vc_row]
/// label = "Row"
/// category = "Structure"
///
/// [modules.vc_column_text]
/// ```
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    modules: ModuleMap,
}

impl ManifestRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the manifest, surfacing why it is unavailable.
    pub fn load(&self) -> Result<ModuleMap, RegistryError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;
        let manifest: Manifest = toml::from_str(&content).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(manifest.modules)
    }
}

impl RegistryProvider for ManifestRegistry {
    fn list_modules(&self) -> ModuleMap {
        match self.load() {
            Ok(modules) => {
                tracing::debug!("Loaded {} modules from {}", modules.len(), self.path.display());
                modules
            }
            Err(e) => {
                tracing::warn!("Module registry unavailable, continuing with none: {}", e);
                ModuleMap::new()
            }
        }
    }
}

/// Registry with a fixed module listing.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    modules: ModuleMap,
}

impl StaticRegistry {
    pub fn new(modules: ModuleMap) -> Self {
        Self { modules }
    }

    /// Build a registry of bare identifiers with no metadata.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: names
                .into_iter()
                .map(|name| (ModuleId::new(name), ModuleMeta::default()))
                .collect(),
        }
    }
}

impl RegistryProvider for StaticRegistry {
    fn list_modules(&self) -> ModuleMap {
        self.modules.clone()
    }
}

/// Digest of the registry's identifiers, in order.
pub fn registry_fingerprint(modules: &ModuleMap) -> Fingerprint {
    let mut builder = FingerprintBuilder::new();
    builder.u64(modules.len() as u64);
    for id in modules.keys() {
        builder.str(id.as_str());
    }
    builder.finish()
}
