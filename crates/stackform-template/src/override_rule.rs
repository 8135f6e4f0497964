//! Override rules handed to the template patch engine.

use serde::Serialize;

/// Separator between path segments, e.g. `Resources.TaskDefinition`.
pub const PATH_SEGMENT_SEPARATOR: &str = ".";

/// A path into the rendered template and the value to put there.
/// Applying rules is the patch engine's job; this is only the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rule {
    pub path: String,
    pub value: serde_yaml::Value,
}
