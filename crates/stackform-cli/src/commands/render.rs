//! `stackform render` — convert a manifest into renderer options.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use stackform_manifest::{DeployConfig, Workload};
use stackform_stack::{AppInformation, ConvertContext, StaticRegionResolver, convert_workload};
use stackform_template::WorkloadOpts;

pub fn render(manifest: &str, env: Option<&str>, config: &str, format: &str) -> Result<()> {
    let opts = render_opts(Path::new(manifest), env, Path::new(config))?;
    println!("{}", to_format(&opts, format)?);
    Ok(())
}

/// Load the manifest and deploy config, apply environment overrides and
/// convert.
pub fn render_opts(manifest: &Path, env: Option<&str>, config: &Path) -> Result<WorkloadOpts> {
    let deploy = DeployConfig::from_file(config)
        .with_context(|| format!("loading {}", config.display()))?;
    let workload = Workload::from_file(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;

    let env_name = env.unwrap_or(deploy.env.name.as_str());
    let workload = workload.apply_env(env_name);
    let ctx = context_for(&deploy, env_name);

    info!(workload = workload.name(), env = env_name, "rendering manifest");
    convert_workload(&workload, &ctx, &StaticRegionResolver)
        .with_context(|| format!("converting manifest {}", manifest.display()))
}

fn context_for(deploy: &DeployConfig, env_name: &str) -> ConvertContext {
    ConvertContext::new(
        &deploy.app.name,
        env_name,
        &deploy.env.account_id,
        &deploy.env.region,
    )
    .with_app_info(AppInformation {
        name: deploy.app.name.clone(),
        dns_name: deploy.app.domain.clone().unwrap_or_default(),
        account_principal_arn: deploy.app.account_principal_arn.clone().unwrap_or_default(),
    })
}

pub fn to_format<T: Serialize>(value: &T, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(value)?),
        "yaml" => Ok(serde_yaml::to_string(value)?),
        other => bail!("unsupported output format: {other} (expected json or yaml)"),
    }
}
