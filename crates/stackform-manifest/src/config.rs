//! stackform.toml deploy configuration parser.
//!
//! Holds the identity a manifest is deployed under: application,
//! environment, account and region.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ManifestError, ManifestResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    pub app: AppConfig,
    pub env: EnvConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Apex domain of the application, if it has one.
    pub domain: Option<String>,
    /// ARN of the account principal that owns the application.
    pub account_principal_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    pub name: String,
    pub account_id: String,
    pub region: String,
}

impl DeployConfig {
    pub fn from_file(path: &Path) -> ManifestResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ManifestError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ManifestResult<String> {
        toml::to_string_pretty(self).map_err(|e| ManifestError::Config(e.to_string()))
    }

    /// Scaffold a minimal stackform.toml.
    pub fn scaffold(app: &str, env: &str, region: &str) -> Self {
        DeployConfig {
            app: AppConfig {
                name: app.to_string(),
                domain: None,
                account_principal_arn: None,
            },
            env: EnvConfig {
                name: env.to_string(),
                account_id: "000000000000".to_string(),
                region: region.to_string(),
            },
        }
    }
}
