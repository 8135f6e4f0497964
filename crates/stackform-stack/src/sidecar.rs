//! Sidecar conversion and container dependency normalization.

use std::collections::BTreeMap;

use tracing::debug;

use stackform_manifest::{DependsOn, Image, SidecarConfig};
use stackform_template::SidecarOpts;

use crate::error::{ConvertError, ConvertResult};
use crate::fields::{convert_command, convert_entry_point};
use crate::storage::convert_sidecar_mount_points;
use crate::validate::{
    validate_image_depends_on, validate_no_circular_dependencies, validate_sidecar_depends_on,
    validate_sidecar_mount_points,
};

/// Inputs shared by sidecar and main-container dependency conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertSidecarOpts<'a> {
    pub sidecars: &'a BTreeMap<String, SidecarConfig>,
    pub image: &'a Image,
    /// Name of the main container.
    pub workload_name: &'a str,
}

/// Convert the sidecar map into renderer sidecars, ordered by name.
///
/// Dependency statuses are upper-cased before validation, so `start` and
/// `START` are equivalent, and the upper-case form is what is emitted.
pub fn convert_sidecars(opts: ConvertSidecarOpts<'_>) -> ConvertResult<Vec<SidecarOpts>> {
    if opts.sidecars.is_empty() {
        return Ok(Vec::new());
    }
    let sidecars = normalize_sidecars(opts.sidecars);
    let image_depends_on = convert_depends_on_status(&opts.image.depends_on);
    validate_no_circular_dependencies(&sidecars, &image_depends_on, opts.workload_name)?;

    let mut out = Vec::with_capacity(sidecars.len());
    for (name, config) in &sidecars {
        let (port, protocol) = parse_port_mapping(config.port.as_deref())?;
        let mount_points = config.mount_points.as_deref().unwrap_or_default();
        validate_sidecar_mount_points(mount_points)?;
        validate_sidecar_depends_on(name, &config.depends_on, &sidecars, opts.workload_name)?;
        let entry_point = convert_entry_point(config.entry_point.as_ref())?;
        let command = convert_command(config.command.as_ref())?;

        out.push(SidecarOpts {
            name: name.clone(),
            image: config.image.clone(),
            essential: config.essential,
            port,
            protocol,
            creds_param: config.creds_param.clone(),
            secrets: config.secrets.clone(),
            variables: config.variables.clone(),
            mount_points: convert_sidecar_mount_points(mount_points),
            docker_labels: config.docker_labels.clone(),
            depends_on: config.depends_on.clone(),
            entry_point,
            command,
        });
    }
    debug!(workload = opts.workload_name, count = out.len(), "converted sidecars");
    Ok(out)
}

/// Upper-case every status in a dependency map.
pub fn convert_depends_on_status(depends_on: &DependsOn) -> DependsOn {
    depends_on
        .iter()
        .map(|(name, status)| (name.clone(), status.to_uppercase()))
        .collect()
}

/// Normalize and validate the main container's dependencies. `None` when
/// it has none.
pub fn convert_image_depends_on(opts: ConvertSidecarOpts<'_>) -> ConvertResult<Option<DependsOn>> {
    if opts.image.depends_on.is_empty() {
        return Ok(None);
    }
    let depends_on = convert_depends_on_status(&opts.image.depends_on);
    let sidecars = normalize_sidecars(opts.sidecars);
    validate_image_depends_on(&depends_on, &sidecars, opts.workload_name)?;
    Ok(Some(depends_on))
}

fn normalize_sidecars(sidecars: &BTreeMap<String, SidecarConfig>) -> BTreeMap<String, SidecarConfig> {
    sidecars
        .iter()
        .map(|(name, config)| {
            let mut config = config.clone();
            config.depends_on = convert_depends_on_status(&config.depends_on);
            (name.clone(), config)
        })
        .collect()
}

/// Parse `"2000"` or `"2000/udp"` into port and protocol.
pub fn parse_port_mapping(s: Option<&str>) -> ConvertResult<(Option<String>, Option<String>)> {
    let Some(s) = s else {
        return Ok((None, None));
    };
    let parts: Vec<&str> = s.split('/').collect();
    match parts.as_slice() {
        [port] => Ok((Some(port.to_string()), None)),
        [port, protocol] => Ok((Some(port.to_string()), Some(protocol.to_string()))),
        _ => Err(ConvertError::PortMapping(s.to_string())),
    }
}
