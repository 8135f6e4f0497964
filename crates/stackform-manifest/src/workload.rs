//! The workload manifest and its per-environment overrides.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::count::Count;
use crate::env::Overridable;
use crate::error::{ManifestError, ManifestResult};
use crate::network::{
    DEFAULT_HEALTH_CHECK_PATH, ExecuteCommand, HealthCheckArgsOrString, Logging, NetworkConfig,
    PUBLIC_SUBNET_PLACEMENT, RoutingRule, VpcConfig,
};
use crate::pubsub::{PublishConfig, SubscribeConfig, Topic};
use crate::sidecar::{DependsOn, SidecarConfig};
use crate::storage::Storage;
use crate::strings::{CommandOverride, EntryPointOverride, scalar_string_map};

/// Kind of workload described by a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WorkloadType {
    #[serde(rename = "Load Balanced Web Service")]
    LoadBalancedWebService,
    #[serde(rename = "Backend Service")]
    BackendService,
    #[serde(rename = "Worker Service")]
    WorkerService,
}

/// A workload manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Workload {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub workload_type: Option<WorkloadType>,
    #[serde(flatten)]
    pub config: WorkloadConfig,
    /// Fields to override per environment.
    #[serde(default)]
    pub environments: BTreeMap<String, WorkloadConfig>,
}

/// Everything in a manifest that an environment may override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkloadConfig {
    #[serde(default)]
    pub image: Image,
    #[serde(rename = "entrypoint")]
    pub entry_point: Option<EntryPointOverride>,
    pub command: Option<CommandOverride>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub count: Option<Count>,
    pub exec: Option<ExecuteCommand>,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub variables: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub secrets: BTreeMap<String, String>,
    pub storage: Option<Storage>,
    pub http: Option<RoutingRule>,
    pub logging: Option<Logging>,
    #[serde(default)]
    pub sidecars: BTreeMap<String, SidecarConfig>,
    pub network: Option<NetworkConfig>,
    pub publish: Option<PublishConfig>,
    pub subscribe: Option<SubscribeConfig>,
    pub taskdef_overrides: Option<Vec<OverrideRule>>,
}

/// The main container image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub location: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub depends_on: DependsOn,
    #[serde(default, rename = "labels", deserialize_with = "scalar_string_map")]
    pub docker_labels: BTreeMap<String, String>,
}

/// A path/value patch applied to the rendered task definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverrideRule {
    pub path: String,
    pub value: serde_yaml::Value,
}

/// Inputs for [`new_load_balanced_web_service`].
#[derive(Debug, Clone, Default)]
pub struct LoadBalancedWebServiceProps {
    pub name: String,
    pub image: String,
    pub path: String,
    pub port: u16,
}

/// Platform defaults for a load-balanced web service: 256 CPU units,
/// 512 MiB, one task, exec off, a `/` health check and public placement.
fn load_balanced_web_service_defaults() -> WorkloadConfig {
    WorkloadConfig {
        cpu: Some(256),
        memory: Some(512),
        count: Some(Count::fixed(1)),
        exec: Some(ExecuteCommand::Enable(false)),
        http: Some(RoutingRule {
            health_check: Some(HealthCheckArgsOrString::Path(
                DEFAULT_HEALTH_CHECK_PATH.to_string(),
            )),
            ..Default::default()
        }),
        network: Some(NetworkConfig {
            vpc: Some(VpcConfig {
                placement: Some(PUBLIC_SUBNET_PLACEMENT.to_string()),
                security_groups: None,
            }),
        }),
        ..Default::default()
    }
}

/// Build a load-balanced web service manifest with the platform defaults
/// and the given name, image, route path and port.
pub fn new_load_balanced_web_service(props: &LoadBalancedWebServiceProps) -> Workload {
    let mut config = load_balanced_web_service_defaults();
    config.image = Image {
        location: Some(props.image.clone()),
        port: Some(props.port),
        ..Default::default()
    };
    if let Some(http) = config.http.as_mut() {
        http.path = Some(props.path.clone());
    }
    Workload {
        name: Some(props.name.clone()),
        workload_type: Some(WorkloadType::LoadBalancedWebService),
        config,
        environments: BTreeMap::new(),
    }
}

impl Workload {
    /// Parse a manifest. A load-balanced web service is laid over the
    /// platform defaults, so fields it leaves out keep their default value.
    pub fn from_yaml(content: &str) -> ManifestResult<Self> {
        let mut workload: Workload =
            serde_yaml::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))?;
        if workload.workload_type == Some(WorkloadType::LoadBalancedWebService) {
            let mut config = load_balanced_web_service_defaults();
            config.apply_override(&workload.config);
            workload.config = config;
        }
        Ok(workload)
    }

    pub fn from_file(path: &Path) -> ManifestResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Workload name, or the empty string when unset.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The exposed port of the main container, if any.
    pub fn port(&self) -> Option<u16> {
        self.config.image.port
    }

    /// Topics this workload publishes to.
    pub fn publish(&self) -> &[Topic] {
        self.config
            .publish
            .as_ref()
            .map(|p| p.topics.as_slice())
            .unwrap_or_default()
    }

    /// Return the manifest with the named environment's overrides applied.
    /// An unknown environment yields an unchanged copy. The result never
    /// carries further environment overrides.
    pub fn apply_env(&self, env_name: &str) -> Workload {
        let mut merged = self.clone();
        if let Some(overrides) = self.environments.get(env_name) {
            merged.config.apply_override(overrides);
        }
        merged.environments.clear();
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
name: frontend
type: Load Balanced Web Service
image:
  location: nginx:latest
  port: 80
http:
  path: /
  healthcheck: /healthz
cpu: 256
memory: 512
count: 1
variables:
  LOG_LEVEL: info
sidecars:
  xray:
    image: amazon/aws-xray-daemon
    port: 2000/udp
taskdef_overrides:
  - path: ContainerDefinitions[0].Ulimits[-]
    value:
      Name: nofile
      SoftLimit: 1024
environments:
  prod:
    count:
      range: 2-10
      cpu_percentage: 70
    variables:
      LOG_LEVEL: warn
"#;

    #[test]
    fn parses_manifest() {
        let w = Workload::from_yaml(MANIFEST).unwrap();
        assert_eq!(w.name(), "frontend");
        assert_eq!(w.workload_type, Some(WorkloadType::LoadBalancedWebService));
        assert_eq!(w.port(), Some(80));
        assert_eq!(w.config.count, Some(Count::fixed(1)));
        assert!(w.config.sidecars.contains_key("xray"));
        assert_eq!(w.config.taskdef_overrides.as_ref().unwrap().len(), 1);
        assert!(w.environments.contains_key("prod"));
    }

    #[test]
    fn apply_env_merges_overrides() {
        let w = Workload::from_yaml(MANIFEST).unwrap();
        let prod = w.apply_env("prod");
        let count = prod.config.count.unwrap();
        assert_eq!(count.value, None);
        assert_eq!(count.advanced.cpu, Some(70));
        assert_eq!(prod.config.variables["LOG_LEVEL"], "warn");
        assert_eq!(prod.config.cpu, Some(256));
        assert!(prod.environments.is_empty());
    }

    #[test]
    fn apply_unknown_env_is_identity() {
        let w = Workload::from_yaml(MANIFEST).unwrap();
        let other = w.apply_env("staging");
        assert_eq!(other.config, w.config);
        assert!(other.environments.is_empty());
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        assert!(matches!(
            Workload::from_yaml("count: [oops"),
            Err(ManifestError::Parse(_))
        ));
    }

    #[test]
    fn load_balanced_defaults() {
        let w = new_load_balanced_web_service(&LoadBalancedWebServiceProps {
            name: "api".to_string(),
            image: "api:v1".to_string(),
            path: "/api".to_string(),
            port: 8080,
        });
        assert_eq!(w.config.cpu, Some(256));
        assert_eq!(w.config.memory, Some(512));
        assert_eq!(w.config.count, Some(Count::fixed(1)));
        assert_eq!(w.port(), Some(8080));
        let http = w.config.http.unwrap();
        assert_eq!(http.path.as_deref(), Some("/api"));
        assert_eq!(http.health_check.unwrap().path(), Some("/"));
    }

    #[test]
    fn load_balanced_manifest_keeps_unset_defaults() {
        let w = Workload::from_yaml(
            r#"
name: web
type: Load Balanced Web Service
image:
  location: web:v1
  port: 80
network:
  vpc:
    security_groups: [sg-1]
"#,
        )
        .unwrap();
        assert_eq!(w.config.cpu, Some(256));
        assert_eq!(w.config.memory, Some(512));
        assert_eq!(w.config.count, Some(Count::fixed(1)));
        assert_eq!(w.config.exec, Some(ExecuteCommand::Enable(false)));
        let vpc = w.config.network.unwrap().vpc.unwrap();
        assert_eq!(vpc.placement.as_deref(), Some(PUBLIC_SUBNET_PLACEMENT));
        assert_eq!(vpc.security_groups, Some(vec!["sg-1".to_string()]));
        let hc = w.config.http.unwrap().health_check.unwrap();
        assert_eq!(hc.path(), Some(DEFAULT_HEALTH_CHECK_PATH));
    }

    #[test]
    fn backend_manifest_has_no_defaults() {
        let w = Workload::from_yaml("name: api\ntype: Backend Service\n").unwrap();
        assert_eq!(w.config.cpu, None);
        assert_eq!(w.config.count, None);
        assert!(w.config.network.is_none());
    }

    #[test]
    fn bare_scalar_values_parse() {
        let w = Workload::from_yaml(
            r#"
name: api
type: Backend Service
variables:
  WORKERS: 4
sidecars:
  envoy:
    image: envoy
    port: 9901
"#,
        )
        .unwrap();
        assert_eq!(w.config.variables["WORKERS"], "4");
        assert_eq!(w.config.sidecars["envoy"].port.as_deref(), Some("9901"));
    }

    #[test]
    fn from_file_reads_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.yml");
        std::fs::write(&path, MANIFEST).unwrap();
        assert_eq!(Workload::from_file(&path).unwrap().name(), "frontend");
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let err = Workload::from_file(Path::new("/nonexistent/manifest.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
