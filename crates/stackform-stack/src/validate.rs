//! Validation primitives shared by the derivers.
//!
//! Every check is a standalone predicate over borrowed manifest data and
//! returns the first violation it finds.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use stackform_manifest::{
    DeadLetterQueue, DependsOn, EfsConfigOrBool, SidecarConfig, SidecarMountPoint, Storage,
    TopicSubscription,
};

use crate::error::{ConvertError, ConvertResult};

static PUBSUB_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static pubsub pattern"));

static WORKLOAD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9\-]+$").expect("static workload name pattern"));

static CONTAINER_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-._/]+$").expect("static container path pattern"));

const MAX_WORKLOAD_NAME_LEN: usize = 255;
const MAX_CONTAINER_PATH_LEN: usize = 242;

/// Conditions a container may wait on.
pub const DEPENDS_ON_STATUSES: [&str; 4] = ["START", "COMPLETE", "SUCCESS", "HEALTHY"];
/// Conditions allowed when the dependency is an essential container,
/// which never exits successfully.
pub const ESSENTIAL_DEPENDS_ON_STATUSES: [&str; 2] = ["START", "HEALTHY"];

// ── Names ─────────────────────────────────────────────────────────

/// Topic names: letters, digits, underscores and hyphens.
pub fn validate_pubsub_name(name: &str) -> ConvertResult<()> {
    let invalid = |reason: &str| ConvertError::InvalidName {
        kind: "topic",
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if !PUBSUB_NAME.is_match(name) {
        return Err(invalid(
            "name can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Workload names: lower-case, start with a letter, no double or trailing
/// hyphen.
pub fn validate_workload_name(kind: &'static str, name: &str) -> ConvertResult<()> {
    let invalid = |reason: &str| ConvertError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.len() > MAX_WORKLOAD_NAME_LEN {
        return Err(invalid("name must not exceed 255 characters"));
    }
    if !WORKLOAD_NAME.is_match(name) || name.contains("--") || name.ends_with('-') {
        return Err(invalid(
            "name must start with a letter, contain only lower-case letters, numbers, and hyphens, and have no consecutive or trailing hyphen",
        ));
    }
    Ok(())
}

pub fn validate_worker_names(names: &[String]) -> ConvertResult<()> {
    for name in names {
        validate_workload_name("worker", name)?;
    }
    Ok(())
}

pub fn validate_topic_subscription(ts: &TopicSubscription) -> ConvertResult<()> {
    validate_pubsub_name(&ts.name)?;
    validate_workload_name("service", &ts.service)
}

// ── Durations ─────────────────────────────────────────────────────

/// Inclusive bounds check.
pub fn validate_time(t: Duration, floor: Duration, ceiling: Duration) -> ConvertResult<()> {
    if t < floor || t > ceiling {
        return Err(ConvertError::OutOfBounds {
            value: t.as_secs(),
            min: floor.as_secs(),
            max: ceiling.as_secs(),
        });
    }
    Ok(())
}

/// The retry count must be present and non-negative.
pub fn validate_dead_letter(d: &DeadLetterQueue) -> ConvertResult<()> {
    match d.tries {
        None => Err(ConvertError::InvalidDeadLetter(
            "`tries` must be specified".to_string(),
        )),
        Some(tries) if tries < 0 => Err(ConvertError::InvalidDeadLetter(format!(
            "`tries` must not be negative, got {tries}"
        ))),
        Some(tries) if u32::try_from(tries).is_err() => Err(ConvertError::InvalidDeadLetter(
            format!("`tries` {tries} is too large"),
        )),
        Some(_) => Ok(()),
    }
}

// ── Mount points and storage ──────────────────────────────────────

pub fn validate_container_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path must not be empty".to_string());
    }
    if path.len() >= MAX_CONTAINER_PATH_LEN {
        return Err(format!("path must be shorter than {MAX_CONTAINER_PATH_LEN} characters"));
    }
    if !CONTAINER_PATH.is_match(path) {
        return Err(format!(
            "path {path:?} can only contain letters, numbers, hyphens, periods, underscores, and slashes"
        ));
    }
    Ok(())
}

pub fn validate_sidecar_mount_points(mount_points: &[SidecarMountPoint]) -> ConvertResult<()> {
    for mp in mount_points {
        if mp.source_volume.as_deref().is_none_or(str::is_empty) {
            return Err(ConvertError::InvalidMountPoint(
                "`source_volume` must be specified".to_string(),
            ));
        }
        let path = mp.container_path.as_deref().ok_or_else(|| {
            ConvertError::InvalidMountPoint("`path` must be specified".to_string())
        })?;
        validate_container_path(path).map_err(ConvertError::InvalidMountPoint)?;
    }
    Ok(())
}

/// Check every volume's path and EFS settings.
pub fn validate_storage_config(storage: &Storage) -> ConvertResult<()> {
    for (name, volume) in &storage.volumes {
        let invalid = |reason: String| ConvertError::InvalidStorage {
            volume: name.clone(),
            reason,
        };
        let path = volume
            .container_path
            .as_deref()
            .ok_or_else(|| invalid("`path` must be specified".to_string()))?;
        validate_container_path(path).map_err(invalid)?;

        let Some(EfsConfigOrBool::Advanced(cfg)) = &volume.efs else {
            continue;
        };
        if cfg.is_empty() {
            continue;
        }
        let has_ids = cfg.uid.is_some() || cfg.gid.is_some();
        if cfg.uid.is_some() != cfg.gid.is_some() {
            return Err(invalid("`uid` and `gid` must be specified together".to_string()));
        }
        if cfg.uid == Some(0) {
            return Err(invalid("`uid` 0 is reserved for the root user".to_string()));
        }
        if has_ids && cfg.file_system_id.is_some() {
            return Err(invalid("`uid` and `gid` cannot be specified with `id`".to_string()));
        }
        if has_ids && (cfg.root_directory.is_some() || cfg.auth_config.is_some()) {
            return Err(invalid(
                "`root_dir` and `auth` cannot be specified for a managed filesystem".to_string(),
            ));
        }
        if !has_ids && cfg.file_system_id.is_none() {
            return Err(invalid("`id` must be specified".to_string()));
        }
        if let Some(auth) = &cfg.auth_config
            && auth.access_point_id.is_some()
        {
            if auth.iam != Some(true) {
                return Err(invalid(
                    "`iam` must be true when `access_point_id` is set".to_string(),
                ));
            }
            if !matches!(cfg.root_directory.as_deref(), None | Some("") | Some("/")) {
                return Err(invalid(
                    "`root_dir` must be empty or \"/\" when `access_point_id` is set".to_string(),
                ));
            }
        }
    }
    Ok(())
}

// ── Container dependencies ────────────────────────────────────────

/// Fail if the dependency graph of the sidecars and the main container
/// (named `workload_name`) has a cycle. Self-dependencies count.
///
/// The reported container list is sorted, so the error is stable.
pub fn validate_no_circular_dependencies(
    sidecars: &BTreeMap<String, SidecarConfig>,
    image_depends_on: &DependsOn,
    workload_name: &str,
) -> ConvertResult<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    graph.add_node(workload_name);
    for dep in image_depends_on.keys() {
        graph.add_edge(workload_name, dep.as_str(), ());
    }
    for (name, sidecar) in sidecars {
        graph.add_node(name.as_str());
        for dep in sidecar.depends_on.keys() {
            graph.add_edge(name.as_str(), dep.as_str(), ());
        }
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.contains_edge(n, n));
        if cyclic {
            let mut names: Vec<String> = component.iter().map(|n| n.to_string()).collect();
            names.sort();
            return Err(ConvertError::CircularDependency(names));
        }
    }
    Ok(())
}

/// Validate one container's dependencies. `depends_on` must already be
/// upper-cased.
pub fn validate_sidecar_depends_on(
    name: &str,
    depends_on: &DependsOn,
    sidecars: &BTreeMap<String, SidecarConfig>,
    workload_name: &str,
) -> ConvertResult<()> {
    for (dependency, status) in depends_on {
        if dependency == name {
            return Err(ConvertError::SelfDependency(name.to_string()));
        }
        let essential = if dependency == workload_name {
            true
        } else {
            match sidecars.get(dependency) {
                Some(sidecar) => sidecar.is_essential(),
                None => {
                    return Err(ConvertError::UnknownDependency {
                        container: name.to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        };
        validate_depends_on_status(name, dependency, status, essential)?;
    }
    Ok(())
}

/// Validate the main container's dependencies, which may only name
/// sidecars. `depends_on` must already be upper-cased.
pub fn validate_image_depends_on(
    depends_on: &DependsOn,
    sidecars: &BTreeMap<String, SidecarConfig>,
    workload_name: &str,
) -> ConvertResult<()> {
    for (dependency, status) in depends_on {
        if dependency == workload_name {
            return Err(ConvertError::SelfDependency(workload_name.to_string()));
        }
        let sidecar = sidecars
            .get(dependency)
            .ok_or_else(|| ConvertError::UnknownDependency {
                container: workload_name.to_string(),
                dependency: dependency.clone(),
            })?;
        validate_depends_on_status(workload_name, dependency, status, sidecar.is_essential())?;
    }
    Ok(())
}

fn validate_depends_on_status(
    container: &str,
    dependency: &str,
    status: &str,
    essential: bool,
) -> ConvertResult<()> {
    let invalid = |reason| ConvertError::InvalidDependsOnStatus {
        container: container.to_string(),
        dependency: dependency.to_string(),
        status: status.to_string(),
        reason,
    };
    if !DEPENDS_ON_STATUSES.contains(&status) {
        return Err(invalid("must be one of START, COMPLETE, SUCCESS, HEALTHY"));
    }
    if essential && !ESSENTIAL_DEPENDS_ON_STATUSES.contains(&status) {
        return Err(invalid("essential containers can only have status START or HEALTHY"));
    }
    Ok(())
}
