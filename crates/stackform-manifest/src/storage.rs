//! Task storage: ephemeral size and named volumes.

use std::collections::BTreeMap;

use serde::Deserialize;

/// `storage:` section of a workload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Storage {
    /// Ephemeral storage size in GiB.
    pub ephemeral: Option<u32>,
    #[serde(default)]
    pub volumes: BTreeMap<String, Volume>,
}

impl Storage {
    pub fn is_empty(&self) -> bool {
        self.ephemeral.is_none() && self.volumes.is_empty()
    }
}

/// A named volume mounted into the main container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Volume {
    pub efs: Option<EfsConfigOrBool>,
    /// Path inside the container.
    #[serde(rename = "path")]
    pub container_path: Option<String>,
    pub read_only: Option<bool>,
}

impl Volume {
    /// True when no EFS configuration is present or EFS is turned off;
    /// such a volume is backed by task scratch space.
    pub fn empty_volume(&self) -> bool {
        self.efs
            .as_ref()
            .is_none_or(|efs| efs.is_empty() || efs.disabled())
    }
}

/// `efs:` is either a boolean (managed filesystem on/off) or an explicit
/// [`EfsVolumeConfiguration`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EfsConfigOrBool {
    Enabled(bool),
    Advanced(EfsVolumeConfiguration),
}

impl EfsConfigOrBool {
    pub fn is_empty(&self) -> bool {
        match self {
            EfsConfigOrBool::Enabled(_) => false,
            EfsConfigOrBool::Advanced(cfg) => cfg.is_empty(),
        }
    }

    /// True when EFS was explicitly turned off with `efs: false`.
    pub fn disabled(&self) -> bool {
        matches!(self, EfsConfigOrBool::Enabled(false))
    }

    /// True when the platform should create the filesystem: either
    /// `efs: true`, or only uid/gid were given without a filesystem id.
    pub fn use_managed_fs(&self) -> bool {
        match self {
            EfsConfigOrBool::Enabled(enabled) => *enabled,
            EfsConfigOrBool::Advanced(cfg) => {
                cfg.file_system_id.is_none() && (cfg.uid.is_some() || cfg.gid.is_some())
            }
        }
    }

    /// Explicit configuration, if any.
    pub fn advanced(&self) -> Option<&EfsVolumeConfiguration> {
        match self {
            EfsConfigOrBool::Advanced(cfg) => Some(cfg),
            EfsConfigOrBool::Enabled(_) => None,
        }
    }
}

/// Explicit EFS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EfsVolumeConfiguration {
    #[serde(rename = "id")]
    pub file_system_id: Option<String>,
    #[serde(rename = "root_dir")]
    pub root_directory: Option<String>,
    #[serde(rename = "auth")]
    pub auth_config: Option<AuthorizationConfig>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl EfsVolumeConfiguration {
    pub fn is_empty(&self) -> bool {
        self.file_system_id.is_none()
            && self.root_directory.is_none()
            && self.auth_config.is_none()
            && self.uid.is_none()
            && self.gid.is_none()
    }
}

/// EFS access authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorizationConfig {
    pub iam: Option<bool>,
    pub access_point_id: Option<String>,
}
