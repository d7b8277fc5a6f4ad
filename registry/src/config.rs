//! Registry configuration.
//!
//! Names the definition files and directories a registry is assembled from,
//! and the schema definitions to leave out.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! definitions:
//!   - schemas/common/
//!   - schemas/users.yml
//! exclude:
//!   - Legacy
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level registry configuration.
///
/// # Examples
///
/// ```no_run
/// use record_schema_core::Functions;
/// use record_schema_registry::{RegistryConfig, SchemaRegistry};
///
/// let config = RegistryConfig::load("records.yml").unwrap();
/// let registry = SchemaRegistry::from_config(&config, Functions::builtin()).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Definition files or directories, loaded in order.
    #[serde(default)]
    pub definitions: Vec<PathBuf>,
    /// Schema names to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `schema` is in the exclusion list.
    pub fn is_excluded(&self, schema: &str) -> bool {
        self.exclude.iter().any(|s| s == schema)
    }
}
