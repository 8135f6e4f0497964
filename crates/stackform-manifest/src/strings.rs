//! Fields that accept either a single shell-style string or a list, and
//! string fields that also accept bare YAML scalars.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::{ManifestError, ManifestResult};

/// A value written either as `"npm start --port 80"` or as
/// `["npm", "start", "--port", "80"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringOrSlice {
    String(String),
    Slice(Vec<String>),
}

/// Container entrypoint override.
pub type EntryPointOverride = StringOrSlice;

/// Container command override.
pub type CommandOverride = StringOrSlice;

/// Additional DNS names for an HTTP service.
pub type Alias = StringOrSlice;

impl StringOrSlice {
    /// Convert to a list of arguments. The string form is split with
    /// shell-word rules, so quoted arguments stay together.
    pub fn to_string_slice(&self) -> ManifestResult<Vec<String>> {
        match self {
            StringOrSlice::Slice(items) => Ok(items.clone()),
            StringOrSlice::String(s) => shell_words::split(s).map_err(|e| {
                ManifestError::StringSlice {
                    input: s.clone(),
                    reason: e.to_string(),
                }
            }),
        }
    }
}

// ── Scalars read as strings ─────────────────────────────────────

/// Any YAML scalar. Numbers and booleans keep their YAML spelling, so
/// `port: 9901` and `port: "9901"` read the same.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::String(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Uint(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// `deserialize_with` helper for an optional string field.
pub fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

/// `deserialize_with` helper for a string-valued map such as `variables`.
pub fn scalar_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Scalar>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}
