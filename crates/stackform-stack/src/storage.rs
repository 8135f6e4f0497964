//! Storage deriver: volumes, mount points, EFS permissions, the managed
//! filesystem descriptor and ephemeral storage size.

use std::collections::BTreeMap;

use tracing::debug;

use stackform_manifest::{EfsConfigOrBool, SidecarMountPoint, Storage, Volume};
use stackform_template as template;

use crate::error::{ConvertError, ConvertResult};
use crate::validate::validate_storage_config;

pub const ENABLED: &str = "ENABLED";
pub const DISABLED: &str = "DISABLED";
pub const DEFAULT_ROOT_DIRECTORY: &str = "/";

/// Smallest ephemeral size that may be requested explicitly, in GiB.
pub const EPHEMERAL_MIN_GIB: u32 = 21;
/// Largest ephemeral size, in GiB.
pub const EPHEMERAL_MAX_GIB: u32 = 200;
/// Platform default ephemeral size, in GiB.
pub const EPHEMERAL_DEFAULT_GIB: u32 = 20;

const DEFAULT_READ_ONLY: bool = true;
const DEFAULT_WRITE_PERMISSION: bool = false;

/// Convert the `storage:` section. `None` when the workload has none.
pub fn convert_storage_opts(
    workload_name: &str,
    storage: Option<&Storage>,
) -> ConvertResult<Option<template::StorageOpts>> {
    let Some(storage) = storage else {
        return Ok(None);
    };
    validate_storage_config(storage)?;
    let managed_volume_info = convert_managed_fs_info(workload_name, &storage.volumes)?;
    let opts = template::StorageOpts {
        ephemeral: convert_ephemeral(storage.ephemeral)?,
        volumes: convert_volumes(&storage.volumes),
        mount_points: convert_mount_points(&storage.volumes),
        efs_perms: convert_efs_permissions(&storage.volumes),
        managed_volume_info,
    };
    debug!(
        workload = workload_name,
        volumes = opts.volumes.len(),
        managed = opts.managed_volume_info.is_some(),
        "converted storage"
    );
    Ok(Some(opts))
}

/// The platform default of 20 GiB is dropped so the renderer omits the
/// setting entirely.
pub fn convert_ephemeral(ephemeral: Option<u32>) -> ConvertResult<Option<u32>> {
    match ephemeral {
        None | Some(EPHEMERAL_DEFAULT_GIB) => Ok(None),
        Some(size) if (EPHEMERAL_MIN_GIB..=EPHEMERAL_MAX_GIB).contains(&size) => Ok(Some(size)),
        Some(_) => Err(ConvertError::EphemeralBadSize),
    }
}

/// One mount point per volume, including managed ones.
pub fn convert_mount_points(volumes: &BTreeMap<String, Volume>) -> Vec<template::MountPoint> {
    volumes
        .iter()
        .map(|(name, v)| {
            convert_mount_point(Some(name.as_str()), v.container_path.as_deref(), v.read_only)
        })
        .collect()
}

pub fn convert_sidecar_mount_points(mount_points: &[SidecarMountPoint]) -> Vec<template::MountPoint> {
    mount_points
        .iter()
        .map(|mp| {
            convert_mount_point(
                mp.source_volume.as_deref(),
                mp.container_path.as_deref(),
                mp.read_only,
            )
        })
        .collect()
}

pub fn convert_mount_point(
    source_volume: Option<&str>,
    container_path: Option<&str>,
    read_only: Option<bool>,
) -> template::MountPoint {
    template::MountPoint {
        container_path: container_path.map(str::to_string),
        read_only: read_only.unwrap_or(DEFAULT_READ_ONLY),
        source_volume: source_volume.map(str::to_string),
    }
}

/// Permissions for user-supplied filesystems only. Scratch, disabled and
/// managed volumes get none; managed permissions are rendered separately.
pub fn convert_efs_permissions(volumes: &BTreeMap<String, Volume>) -> Vec<template::EfsPermission> {
    volumes
        .values()
        .filter_map(|v| {
            let efs = explicit_efs(v)?;
            let cfg = efs.advanced()?;
            Some(template::EfsPermission {
                filesystem_id: cfg.file_system_id.clone(),
                access_point_id: cfg
                    .auth_config
                    .as_ref()
                    .and_then(|auth| auth.access_point_id.clone()),
                write: v.read_only.map_or(DEFAULT_WRITE_PERMISSION, |ro| !ro),
            })
        })
        .collect()
}

/// The single platform-managed filesystem, if any volume asks for one.
pub fn convert_managed_fs_info(
    workload_name: &str,
    volumes: &BTreeMap<String, Volume>,
) -> ConvertResult<Option<template::ManagedVolumeCreationInfo>> {
    let mut managed = volumes.iter().filter(|(_, v)| {
        !v.empty_volume() && v.efs.as_ref().is_some_and(EfsConfigOrBool::use_managed_fs)
    });
    let Some((name, volume)) = managed.next() else {
        return Ok(None);
    };
    if managed.next().is_some() {
        return Err(ConvertError::MultipleManagedVolumes);
    }

    let cfg = volume.efs.as_ref().and_then(EfsConfigOrBool::advanced);
    let (uid, gid) = match cfg.map(|c| (c.uid, c.gid)) {
        Some((Some(uid), Some(gid))) => (uid, gid),
        Some((Some(uid), None)) => (uid, uid),
        Some((None, Some(gid))) => (gid, gid),
        _ => {
            let id = managed_volume_id(workload_name);
            (id, id)
        }
    };
    Ok(Some(template::ManagedVolumeCreationInfo {
        name: name.clone(),
        dir_name: workload_name.to_string(),
        uid,
        gid,
    }))
}

/// Default POSIX uid/gid for a managed access point: the CRC-32 (IEEE) of
/// the workload name. Collisions between workloads are possible and
/// tolerated.
pub fn managed_volume_id(workload_name: &str) -> u32 {
    crc32fast::hash(workload_name.as_bytes())
}

/// Task volumes. Scratch volumes carry only a name; managed volumes are
/// left to the renderer.
pub fn convert_volumes(volumes: &BTreeMap<String, Volume>) -> Vec<template::Volume> {
    volumes
        .iter()
        .filter_map(|(name, v)| {
            if v.empty_volume() {
                return Some(template::Volume {
                    name: name.clone(),
                    efs: None,
                });
            }
            let cfg = explicit_efs(v)?.advanced()?;
            Some(template::Volume {
                name: name.clone(),
                efs: Some(convert_efs_configuration(cfg)),
            })
        })
        .collect()
}

pub fn convert_efs_configuration(
    cfg: &stackform_manifest::EfsVolumeConfiguration,
) -> template::EfsVolumeConfiguration {
    let root_directory = cfg
        .root_directory
        .as_deref()
        .filter(|dir| !dir.is_empty())
        .unwrap_or(DEFAULT_ROOT_DIRECTORY)
        .to_string();
    let auth = cfg.auth_config.as_ref();
    let iam = if auth.and_then(|a| a.iam).unwrap_or(false) {
        ENABLED
    } else {
        DISABLED
    };
    template::EfsVolumeConfiguration {
        filesystem: cfg.file_system_id.clone(),
        root_directory,
        iam: iam.to_string(),
        access_point_id: auth.and_then(|a| a.access_point_id.clone()),
    }
}

/// EFS settings of a volume backed by a user-supplied filesystem.
fn explicit_efs(v: &Volume) -> Option<&EfsConfigOrBool> {
    if v.empty_volume() {
        return None;
    }
    v.efs.as_ref().filter(|efs| !efs.disabled() && !efs.use_managed_fs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stackform_manifest::{AuthorizationConfig, EfsVolumeConfiguration};

    fn volumes(entries: Vec<(&str, Volume)>) -> BTreeMap<String, Volume> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn scratch(path: &str) -> Volume {
        Volume {
            container_path: Some(path.to_string()),
            ..Default::default()
        }
    }

    fn managed(path: &str) -> Volume {
        Volume {
            efs: Some(EfsConfigOrBool::Enabled(true)),
            container_path: Some(path.to_string()),
            read_only: None,
        }
    }

    fn explicit(path: &str, id: &str, read_only: Option<bool>) -> Volume {
        Volume {
            efs: Some(EfsConfigOrBool::Advanced(EfsVolumeConfiguration {
                file_system_id: Some(id.to_string()),
                auth_config: Some(AuthorizationConfig {
                    iam: Some(true),
                    access_point_id: Some("fsap-1".to_string()),
                }),
                ..Default::default()
            })),
            container_path: Some(path.to_string()),
            read_only,
        }
    }

    #[test]
    fn ephemeral_boundaries() {
        assert_eq!(convert_ephemeral(None).unwrap(), None);
        assert_eq!(convert_ephemeral(Some(20)).unwrap(), None);
        assert_eq!(convert_ephemeral(Some(21)).unwrap(), Some(21));
        assert_eq!(convert_ephemeral(Some(200)).unwrap(), Some(200));
        assert!(matches!(
            convert_ephemeral(Some(201)),
            Err(ConvertError::EphemeralBadSize)
        ));
        assert!(matches!(
            convert_ephemeral(Some(19)),
            Err(ConvertError::EphemeralBadSize)
        ));
    }

    proptest! {
        #[test]
        fn ephemeral_in_range_is_unchanged(size in 21u32..=200) {
            prop_assert_eq!(convert_ephemeral(Some(size)).unwrap(), Some(size));
        }

        #[test]
        fn ephemeral_out_of_range_fails(size in prop_oneof![0u32..20, 201u32..=u32::MAX]) {
            prop_assert!(convert_ephemeral(Some(size)).is_err());
        }

        #[test]
        fn managed_volume_id_is_deterministic(name in "[a-z][a-z0-9-]{1,30}") {
            prop_assert_eq!(managed_volume_id(&name), managed_volume_id(&name));
        }
    }

    #[test]
    fn managed_volume_id_is_crc32_ieee() {
        // Well-known CRC-32/ISO-HDLC check value.
        assert_eq!(managed_volume_id("123456789"), 0xCBF4_3926);
        assert_ne!(managed_volume_id("frontend"), managed_volume_id("backend"));
    }

    #[test]
    fn mount_points_default_read_only() {
        let vols = volumes(vec![
            ("cache", scratch("/cache")),
            ("data", explicit("/data", "fs-1", Some(false))),
        ]);
        let mps = convert_mount_points(&vols);
        assert_eq!(mps.len(), 2);
        assert_eq!(mps[0].source_volume.as_deref(), Some("cache"));
        assert!(mps[0].read_only);
        assert!(!mps[1].read_only);
    }

    #[test]
    fn permissions_only_for_explicit_filesystems() {
        let vols = volumes(vec![
            ("cache", scratch("/cache")),
            ("managed", managed("/managed")),
            (
                "off",
                Volume {
                    efs: Some(EfsConfigOrBool::Enabled(false)),
                    container_path: Some("/off".to_string()),
                    read_only: None,
                },
            ),
            ("ro", explicit("/ro", "fs-ro", None)),
            ("rw", explicit("/rw", "fs-rw", Some(false))),
        ]);
        let perms = convert_efs_permissions(&vols);
        assert_eq!(perms.len(), 2);
        assert_eq!(perms[0].filesystem_id.as_deref(), Some("fs-ro"));
        assert!(!perms[0].write);
        assert_eq!(perms[0].access_point_id.as_deref(), Some("fsap-1"));
        assert_eq!(perms[1].filesystem_id.as_deref(), Some("fs-rw"));
        assert!(perms[1].write);
    }

    #[test]
    fn volumes_skip_managed() {
        let vols = volumes(vec![
            ("cache", scratch("/cache")),
            ("managed", managed("/managed")),
            ("shared", explicit("/shared", "fs-1", None)),
        ]);
        let out = convert_volumes(&vols);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "cache");
        assert!(out[0].efs.is_none());
        let efs = out[1].efs.as_ref().unwrap();
        assert_eq!(efs.filesystem.as_deref(), Some("fs-1"));
        assert_eq!(efs.root_directory, "/");
        assert_eq!(efs.iam, ENABLED);
    }

    #[test]
    fn efs_configuration_defaults() {
        let cfg = EfsVolumeConfiguration {
            file_system_id: Some("fs-1".to_string()),
            root_directory: Some(String::new()),
            ..Default::default()
        };
        let out = convert_efs_configuration(&cfg);
        assert_eq!(out.root_directory, DEFAULT_ROOT_DIRECTORY);
        assert_eq!(out.iam, DISABLED);
        assert!(out.access_point_id.is_none());
    }

    #[test]
    fn managed_info_defaults_ids_to_checksum() {
        let vols = volumes(vec![("wp", managed("/var/www"))]);
        let info = convert_managed_fs_info("frontend", &vols).unwrap().unwrap();
        let id = managed_volume_id("frontend");
        assert_eq!(info.name, "wp");
        assert_eq!(info.dir_name, "frontend");
        assert_eq!((info.uid, info.gid), (id, id));
    }

    #[test]
    fn managed_info_keeps_supplied_ids() {
        let v = Volume {
            efs: Some(EfsConfigOrBool::Advanced(EfsVolumeConfiguration {
                uid: Some(1000),
                gid: Some(100),
                ..Default::default()
            })),
            container_path: Some("/data".to_string()),
            read_only: None,
        };
        let info = convert_managed_fs_info("api", &volumes(vec![("data", v)]))
            .unwrap()
            .unwrap();
        assert_eq!((info.uid, info.gid), (1000, 100));
    }

    #[test]
    fn second_managed_volume_is_rejected() {
        let vols = volumes(vec![("a", managed("/a")), ("b", managed("/b"))]);
        assert!(matches!(
            convert_managed_fs_info("api", &vols),
            Err(ConvertError::MultipleManagedVolumes)
        ));
    }

    #[test]
    fn storage_opts_end_to_end() {
        let storage = Storage {
            ephemeral: Some(20),
            volumes: volumes(vec![("wp", managed("/var/www"))]),
        };
        let opts = convert_storage_opts("frontend", Some(&storage))
            .unwrap()
            .unwrap();
        assert_eq!(opts.ephemeral, None);
        assert!(opts.volumes.is_empty());
        assert_eq!(opts.mount_points.len(), 1);
        assert!(opts.efs_perms.is_empty());
        assert!(opts.managed_volume_info.is_some());

        assert!(convert_storage_opts("frontend", None).unwrap().is_none());
    }

    #[test]
    fn storage_opts_validates_paths() {
        let storage = Storage {
            ephemeral: None,
            volumes: volumes(vec![("bad", scratch("/no spaces"))]),
        };
        assert!(matches!(
            convert_storage_opts("frontend", Some(&storage)),
            Err(ConvertError::InvalidStorage { .. })
        ));
    }
}
