//! `stackform overrides` — show the task definition override rules.

use std::path::Path;

use anyhow::{Context, Result};

use stackform_manifest::Workload;
use stackform_stack::overrides::convert_task_def_override_rules;
use stackform_template::Rule;

pub fn overrides(manifest: &str, env: Option<&str>) -> Result<()> {
    let rules = override_rules(Path::new(manifest), env)?;
    if rules.is_empty() {
        eprintln!("No task definition overrides.");
        return Ok(());
    }
    print!("{}", serde_yaml::to_string(&rules)?);
    Ok(())
}

/// Rules rooted under the task definition, protected paths removed.
pub fn override_rules(manifest: &Path, env: Option<&str>) -> Result<Vec<Rule>> {
    let mut workload = Workload::from_file(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    if let Some(env) = env {
        workload = workload.apply_env(env);
    }
    Ok(workload
        .config
        .taskdef_overrides
        .as_deref()
        .map(convert_task_def_override_rules)
        .unwrap_or_default())
}
