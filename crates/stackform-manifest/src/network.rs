//! Network placement, HTTP routing, health checks, logging and exec.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::strings::{Alias, scalar_string_map};

/// Subnet placement that assigns public IPs.
pub const PUBLIC_SUBNET_PLACEMENT: &str = "public";
/// Subnet placement without public IPs.
pub const PRIVATE_SUBNET_PLACEMENT: &str = "private";

/// Default health check path for load-balanced services.
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/";
/// Default health check grace period in seconds.
pub const DEFAULT_HEALTH_CHECK_GRACE_PERIOD: i64 = 60;

/// Default FireLens log router image.
pub const DEFAULT_FLUENTBIT_IMAGE: &str =
    "public.ecr.aws/aws-observability/aws-for-fluent-bit:latest";

/// `network:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    pub vpc: Option<VpcConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VpcConfig {
    pub placement: Option<String>,
    pub security_groups: Option<Vec<String>>,
}

/// `http:` section of a load-balanced service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoutingRule {
    pub path: Option<String>,
    #[serde(rename = "healthcheck")]
    pub health_check: Option<HealthCheckArgsOrString>,
    pub stickiness: Option<bool>,
    pub alias: Option<Alias>,
    #[serde(default, with = "humantime_serde")]
    pub deregistration_delay: Option<Duration>,
    pub target_container: Option<String>,
    pub allowed_source_ips: Option<Vec<String>>,
}

/// `healthcheck:` is either a bare path or a map of arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HealthCheckArgsOrString {
    Path(String),
    Args(HttpHealthCheckArgs),
}

impl HealthCheckArgsOrString {
    pub fn path(&self) -> Option<&str> {
        match self {
            HealthCheckArgsOrString::Path(p) => Some(p),
            HealthCheckArgsOrString::Args(args) => args.path.as_deref(),
        }
    }

    pub fn args(&self) -> Option<&HttpHealthCheckArgs> {
        match self {
            HealthCheckArgsOrString::Args(args) => Some(args),
            HealthCheckArgsOrString::Path(_) => None,
        }
    }
}

/// Load balancer target health check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HttpHealthCheckArgs {
    pub path: Option<String>,
    pub success_codes: Option<String>,
    pub healthy_threshold: Option<i64>,
    pub unhealthy_threshold: Option<i64>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub grace_period: Option<Duration>,
}

/// `logging:` section; routes container logs through FireLens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Logging {
    pub image: Option<String>,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub destination: BTreeMap<String, String>,
    #[serde(rename = "enableMetadata")]
    pub enable_metadata: Option<bool>,
    #[serde(default, rename = "secretOptions", deserialize_with = "scalar_string_map")]
    pub secret_options: BTreeMap<String, String>,
    #[serde(rename = "configFilePath")]
    pub config_file: Option<String>,
}

impl Logging {
    pub fn log_image(&self) -> String {
        self.image
            .clone()
            .unwrap_or_else(|| DEFAULT_FLUENTBIT_IMAGE.to_string())
    }

    /// Metadata is attached unless explicitly disabled.
    pub fn enable_metadata_value(&self) -> String {
        self.enable_metadata.unwrap_or(true).to_string()
    }
}

/// `exec:` is either a boolean or a config map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExecuteCommand {
    Enable(bool),
    Config(ExecuteCommandConfig),
}

impl Default for ExecuteCommand {
    fn default() -> Self {
        ExecuteCommand::Enable(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecuteCommandConfig {
    pub enable: Option<bool>,
}

impl ExecuteCommandConfig {
    pub fn is_empty(&self) -> bool {
        self.enable.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_as_string() {
        let hc: HealthCheckArgsOrString = serde_yaml::from_str("/healthz").unwrap();
        assert_eq!(hc.path(), Some("/healthz"));
        assert!(hc.args().is_none());
    }

    #[test]
    fn health_check_as_args() {
        let hc: HealthCheckArgsOrString =
            serde_yaml::from_str("path: /ping\ninterval: 10s\nhealthy_threshold: 3\n").unwrap();
        let args = hc.args().unwrap();
        assert_eq!(args.interval, Some(Duration::from_secs(10)));
        assert_eq!(args.healthy_threshold, Some(3));
        assert_eq!(hc.path(), Some("/ping"));
    }

    #[test]
    fn exec_accepts_bool_and_map() {
        let b: ExecuteCommand = serde_yaml::from_str("true").unwrap();
        assert_eq!(b, ExecuteCommand::Enable(true));
        let m: ExecuteCommand = serde_yaml::from_str("enable: true").unwrap();
        assert_eq!(
            m,
            ExecuteCommand::Config(ExecuteCommandConfig { enable: Some(true) })
        );
    }

    #[test]
    fn logging_defaults() {
        let l = Logging::default();
        assert_eq!(l.log_image(), DEFAULT_FLUENTBIT_IMAGE);
        assert_eq!(l.enable_metadata_value(), "true");
    }
}
