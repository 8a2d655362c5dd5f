//! Builder configuration, loadable from TOML.

use std::path::Path;

use chisel_kernel_mesh::MeshKernelConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ChiselError, ChiselResult};

/// Settings shared by every node of a chain.
///
/// ```
/// use chisel::Config;
///
/// let config = Config::from_toml_str("tolerance = 1e-3\n[mesh]\ncircle_segments = 32\n").unwrap();
/// assert_eq!(config.tolerance, 1e-3);
/// assert_eq!(config.mesh.circle_segments, 32);
/// assert_eq!(config.selector_tolerance, 1e-4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Linear tolerance of the build context.
    pub tolerance: f64,
    /// Tolerance of directional selectors parsed from strings.
    pub selector_tolerance: f64,
    /// Settings of the reference mesh kernel.
    pub mesh: MeshKernelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            selector_tolerance: chisel_select::DEFAULT_TOLERANCE,
            mesh: MeshKernelConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ChiselResult<Self> {
        let config: Config = toml::from_str(text).map_err(|e| ChiselError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ChiselResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChiselError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> ChiselResult<()> {
        if self.tolerance <= 0.0 || self.selector_tolerance <= 0.0 {
            return Err(ChiselError::Config("tolerances must be positive".into()));
        }
        if self.mesh.circle_segments < 3 {
            return Err(ChiselError::Config("mesh.circle_segments must be at least 3".into()));
        }
        Ok(())
    }
}
