//! Sidecar containers that run next to the main container.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::strings::{CommandOverride, EntryPointOverride, scalar_string, scalar_string_map};

/// Container name → condition, e.g. `{"nginx": "start"}`.
pub type DependsOn = BTreeMap<String, String>;

/// Configuration of a single sidecar; the sidecar's name is its map key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SidecarConfig {
    /// `"<port>"` or `"<port>/<protocol>"`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub port: Option<String>,
    pub image: Option<String>,
    pub essential: Option<bool>,
    #[serde(rename = "credentialsParameter")]
    pub creds_param: Option<String>,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub variables: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub secrets: BTreeMap<String, String>,
    pub mount_points: Option<Vec<SidecarMountPoint>>,
    #[serde(default, rename = "labels", deserialize_with = "scalar_string_map")]
    pub docker_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub depends_on: DependsOn,
    #[serde(rename = "entrypoint")]
    pub entry_point: Option<EntryPointOverride>,
    pub command: Option<CommandOverride>,
}

impl SidecarConfig {
    /// Sidecars are essential unless explicitly marked otherwise.
    pub fn is_essential(&self) -> bool {
        self.essential.unwrap_or(true)
    }
}

/// A volume mounted into a sidecar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SidecarMountPoint {
    pub source_volume: Option<String>,
    #[serde(rename = "path")]
    pub container_path: Option<String>,
    pub read_only: Option<bool>,
}
