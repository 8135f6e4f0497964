//! Task definition override rules.
//!
//! Rules are rooted under the task definition's properties. Rules that
//! would rename the task family or a container are dropped without an
//! error; the rest of the stack refers to those names.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use stackform_manifest::OverrideRule;
use stackform_template::{PATH_SEGMENT_SEPARATOR, Rule};

/// Segments every task definition override path is nested under.
pub const TASK_DEF_OVERRIDE_RULE_PREFIXES: [&str; 3] = ["Resources", "TaskDefinition", "Properties"];

static PROTECTED_TASK_DEF_PATHS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"Family", r"ContainerDefinitions\[\d+\].Name"]
        .into_iter()
        .map(|p| Regex::new(&format!("^{p}$")).expect("static override pattern"))
        .collect()
});

pub fn convert_task_def_override_rules(rules: &[OverrideRule]) -> Vec<Rule> {
    let prefix = TASK_DEF_OVERRIDE_RULE_PREFIXES.join(PATH_SEGMENT_SEPARATOR);
    rules
        .iter()
        .filter(|r| {
            let keep = is_valid_task_def_override_path(&r.path);
            if !keep {
                debug!(path = %r.path, "dropping protected override rule");
            }
            keep
        })
        .map(|r| Rule {
            path: [prefix.as_str(), r.path.as_str()].join(PATH_SEGMENT_SEPARATOR),
            value: r.value.clone(),
        })
        .collect()
}

/// False for paths that target protected task definition fields.
pub fn is_valid_task_def_override_path(path: &str) -> bool {
    !PROTECTED_TASK_DEF_PATHS.iter().any(|re| re.is_match(path))
}
