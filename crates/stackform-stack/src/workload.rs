//! Whole-workload conversion: runs every deriver over its slice of the
//! manifest and assembles the renderer options.

use tracing::{debug, info};

use stackform_manifest::{Workload, WorkloadType};
use stackform_template::WorkloadOpts;

use crate::context::ConvertContext;
use crate::count::convert_advanced_count;
use crate::error::ConvertResult;
use crate::fields::{
    convert_alias, convert_app_information, convert_command, convert_entry_point,
    convert_execute_command, convert_http_health_check, convert_logging, convert_network_config,
};
use crate::overrides::convert_task_def_override_rules;
use crate::pubsub::{convert_publish, convert_subscribe};
use crate::region::RegionResolver;
use crate::sidecar::{ConvertSidecarOpts, convert_image_depends_on, convert_sidecars};
use crate::storage::convert_storage_opts;
use crate::validate::validate_workload_name;

/// Convert a manifest with environment overrides already applied. The
/// first failing deriver aborts the conversion.
pub fn convert_workload(
    workload: &Workload,
    ctx: &ConvertContext,
    resolver: &dyn RegionResolver,
) -> ConvertResult<WorkloadOpts> {
    let name = workload.name();
    validate_workload_name("workload", name)?;
    let cfg = &workload.config;

    let sidecar_opts = ConvertSidecarOpts {
        sidecars: &cfg.sidecars,
        image: &cfg.image,
        workload_name: name,
    };
    let sidecars = convert_sidecars(sidecar_opts)?;
    let depends_on = convert_image_depends_on(sidecar_opts)?;

    let (desired_count, advanced_count) = match &cfg.count {
        Some(count) => (count.value, convert_advanced_count(&count.advanced)?),
        None => (None, None),
    };

    let storage = convert_storage_opts(name, cfg.storage.as_ref())?;

    let http = cfg.http.as_ref();
    let health_check = (workload.workload_type == Some(WorkloadType::LoadBalancedWebService)
        || http.is_some())
    .then(|| convert_http_health_check(http.and_then(|h| h.health_check.as_ref())));
    let alias = convert_alias(http.and_then(|h| h.alias.as_ref()))?;

    let publish = convert_publish(workload.publish(), ctx, name, resolver)?;
    let subscribe = convert_subscribe(cfg.subscribe.as_ref(), ctx, name, resolver)?;

    let task_def_overrides = cfg
        .taskdef_overrides
        .as_deref()
        .map(convert_task_def_override_rules)
        .unwrap_or_default();
    let (dns_delegation_role, dns_name) = convert_app_information(&ctx.app_info);

    let opts = WorkloadOpts {
        name: name.to_string(),
        image: cfg.image.location.clone(),
        port: cfg.image.port,
        cpu: cfg.cpu,
        memory: cfg.memory,
        desired_count,
        entry_point: convert_entry_point(cfg.entry_point.as_ref())?,
        command: convert_command(cfg.command.as_ref())?,
        variables: cfg.variables.clone(),
        secrets: cfg.secrets.clone(),
        docker_labels: cfg.image.docker_labels.clone(),
        depends_on,
        sidecars,
        storage,
        network: convert_network_config(cfg.network.as_ref()),
        advanced_count,
        health_check,
        alias,
        exec_command: convert_execute_command(cfg.exec.as_ref()),
        log_config: convert_logging(cfg.logging.as_ref()),
        publish,
        subscribe,
        dns_delegation_role,
        dns_name,
        task_def_overrides,
    };
    debug!(
        workload = name,
        sidecars = opts.sidecars.len(),
        overrides = opts.task_def_overrides.len(),
        "assembled workload options"
    );
    info!(
        workload = name,
        app = %ctx.app,
        env = %ctx.env,
        region = %ctx.region,
        "converted workload"
    );
    Ok(opts)
}
