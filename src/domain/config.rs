use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors returned when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    /// The configuration file is not valid TOML, or has unexpected fields.
    #[error("Failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

/// Configuration for building classification trees.
///
/// Controls the synthetic root node, how deep trees are built by default, and
/// where the classification table is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Label of the synthetic root node.
    root_label: String,

    /// Description of the synthetic root node.
    root_description: String,

    /// The default maximum number of edges between the root and any node.
    max_depth: usize,

    /// Path to the classification table (`.xlsx`, `.csv` or `.json`).
    ///
    /// Relative paths are resolved against the working directory.
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
            root_description: default_root_description(),
            max_depth: default_max_depth(),
            source: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(Error::Read)?;
        toml::from_str(&content).map_err(Error::Parse)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        std::fs::write(path, self.to_toml()?).map_err(Error::Write)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(Error::Serialize)
    }

    /// Returns the label of the synthetic root node.
    #[must_use]
    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Returns the description of the synthetic root node.
    #[must_use]
    pub fn root_description(&self) -> &str {
        &self.root_description
    }

    /// Returns the default maximum tree depth.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Sets the default maximum tree depth.
    pub const fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Sets the label and description of the synthetic root node.
    pub fn set_root(&mut self, label: impl Into<String>, description: impl Into<String>) {
        self.root_label = label.into();
        self.root_description = description.into();
    }
}

fn default_root_label() -> String {
    "NAICS 2022".to_string()
}

fn default_root_description() -> String {
    "Categorisation tree for NAICS 2022 industry classifications".to_string()
}

const fn default_max_depth() -> usize {
    20
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_root_label")]
        root_label: String,

        #[serde(default = "default_root_description")]
        root_description: String,

        /// The maximum number of edges between the root and any node.
        #[serde(default = "default_max_depth")]
        max_depth: usize,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<PathBuf>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                root_label,
                root_description,
                max_depth,
                source,
            } => Self {
                root_label,
                root_description,
                max_depth,
                source,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            root_label: config.root_label,
            root_description: config.root_description,
            max_depth: config.max_depth,
            source: config.source,
        }
    }
}
