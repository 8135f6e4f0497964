//! Option structures handed to the template renderer.
//!
//! Field names serialize in PascalCase, the names the renderer's
//! templates reference. Values are fully resolved: defaults are applied
//! and durations are already whole or fractional seconds.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::override_rule::Rule;

/// `AssignPublicIp` value for public placement.
pub const ENABLE_PUBLIC_IP: &str = "ENABLED";
/// `AssignPublicIp` value for private placement.
pub const DISABLE_PUBLIC_IP: &str = "DISABLED";
/// Subnet group for public placement.
pub const PUBLIC_SUBNETS_PLACEMENT: &str = "PublicSubnets";
/// Subnet group for private placement.
pub const PRIVATE_SUBNETS_PLACEMENT: &str = "PrivateSubnets";

/// Everything the renderer needs for one workload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkloadOpts {
    pub name: String,
    pub image: Option<String>,
    pub port: Option<u16>,
    pub cpu: Option<u32>,
    pub memory: Option<u32>,
    pub desired_count: Option<u32>,
    pub entry_point: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
    pub variables: BTreeMap<String, String>,
    pub secrets: BTreeMap<String, String>,
    pub docker_labels: BTreeMap<String, String>,
    pub depends_on: Option<BTreeMap<String, String>>,
    pub sidecars: Vec<SidecarOpts>,
    pub storage: Option<StorageOpts>,
    pub network: NetworkOpts,
    pub advanced_count: Option<AdvancedCountOpts>,
    pub health_check: Option<HttpHealthCheckOpts>,
    pub alias: Option<Vec<String>>,
    pub exec_command: Option<ExecuteCommandOpts>,
    pub log_config: Option<LogConfigOpts>,
    pub publish: Option<PublishOpts>,
    pub subscribe: Option<SubscribeOpts>,
    pub dns_delegation_role: Option<String>,
    pub dns_name: Option<String>,
    pub task_def_overrides: Vec<Rule>,
}

// ── Sidecars ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SidecarOpts {
    pub name: String,
    pub image: Option<String>,
    pub essential: Option<bool>,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub creds_param: Option<String>,
    pub secrets: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
    pub mount_points: Vec<MountPoint>,
    pub docker_labels: BTreeMap<String, String>,
    /// Container name → upper-case condition.
    pub depends_on: BTreeMap<String, String>,
    pub entry_point: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountPoint {
    pub container_path: Option<String>,
    pub read_only: bool,
    pub source_volume: Option<String>,
}

// ── Storage ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageOpts {
    /// Ephemeral size in GiB; `None` keeps the platform default.
    pub ephemeral: Option<u32>,
    pub volumes: Vec<Volume>,
    pub mount_points: Vec<MountPoint>,
    #[serde(rename = "EFSPerms")]
    pub efs_perms: Vec<EfsPermission>,
    pub managed_volume_info: Option<ManagedVolumeCreationInfo>,
}

/// A task volume. Without `efs` it is backed by task scratch space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Volume {
    pub name: String,
    #[serde(rename = "EFS")]
    pub efs: Option<EfsVolumeConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EfsVolumeConfiguration {
    pub filesystem: Option<String>,
    pub root_directory: String,
    /// `"ENABLED"` or `"DISABLED"`.
    #[serde(rename = "IAM")]
    pub iam: String,
    #[serde(rename = "AccessPointID")]
    pub access_point_id: Option<String>,
}

/// IAM permission the task role needs on a user-supplied filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EfsPermission {
    #[serde(rename = "FilesystemID")]
    pub filesystem_id: Option<String>,
    #[serde(rename = "AccessPointID")]
    pub access_point_id: Option<String>,
    pub write: bool,
}

/// Parameters for creating a platform-managed filesystem access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagedVolumeCreationInfo {
    pub name: String,
    pub dir_name: String,
    #[serde(rename = "UID")]
    pub uid: u32,
    #[serde(rename = "GID")]
    pub gid: u32,
}

// ── Capacity ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdvancedCountOpts {
    pub spot: Option<u32>,
    pub autoscaling: Option<AutoscalingOpts>,
    pub cps: Vec<CapacityProviderStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoscalingOpts {
    pub min_capacity: u32,
    pub max_capacity: u32,
    #[serde(rename = "CPU")]
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub requests: Option<f64>,
    /// Target response time in seconds.
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapacityProviderStrategy {
    pub base: Option<u32>,
    pub weight: u32,
    pub capacity_provider: String,
}

// ── Routing, logging, network ──────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpHealthCheckOpts {
    pub health_check_path: String,
    pub success_codes: Option<String>,
    pub healthy_threshold: Option<i64>,
    pub unhealthy_threshold: Option<i64>,
    pub interval: Option<i64>,
    pub timeout: Option<i64>,
    pub grace_period: i64,
}

/// Present when ECS Exec is enabled; carries no settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecuteCommandOpts {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogConfigOpts {
    pub image: String,
    pub destination: BTreeMap<String, String>,
    pub enable_metadata: String,
    pub secret_options: BTreeMap<String, String>,
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkOpts {
    pub assign_public_ip: String,
    pub subnets_type: String,
    pub security_groups: Vec<String>,
}

impl Default for NetworkOpts {
    fn default() -> Self {
        NetworkOpts {
            assign_public_ip: ENABLE_PUBLIC_IP.to_string(),
            subnets_type: PUBLIC_SUBNETS_PLACEMENT.to_string(),
            security_groups: Vec::new(),
        }
    }
}

// ── Messaging ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishOpts {
    pub topics: Vec<Topic>,
}

/// A topic enriched with the identity of the publishing workload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Topic {
    pub name: String,
    pub allowed_workers: Vec<String>,
    #[serde(rename = "AccountID")]
    pub account_id: String,
    pub partition: String,
    pub region: String,
    pub app: String,
    pub env: String,
    pub svc: String,
}

impl Topic {
    /// ARN of the topic once created.
    pub fn arn(&self) -> String {
        format!(
            "arn:{}:sns:{}:{}:{}-{}-{}-{}",
            self.partition, self.region, self.account_id, self.app, self.env, self.svc, self.name
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscribeOpts {
    pub topics: Vec<TopicSubscription>,
    pub queue: Option<SqsQueue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicSubscription {
    pub name: String,
    pub service: String,
    pub queue: Option<SqsQueue>,
}

/// Queue settings in whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqsQueue {
    pub retention: Option<u64>,
    pub delay: Option<u64>,
    pub timeout: Option<u64>,
    pub dead_letter: Option<DeadLetterQueue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeadLetterQueue {
    pub tries: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_arn_format() {
        let t = Topic {
            name: "orders".to_string(),
            allowed_workers: vec![],
            account_id: "123456789012".to_string(),
            partition: "aws".to_string(),
            region: "us-west-2".to_string(),
            app: "shop".to_string(),
            env: "prod".to_string(),
            svc: "api".to_string(),
        };
        assert_eq!(
            t.arn(),
            "arn:aws:sns:us-west-2:123456789012:shop-prod-api-orders"
        );
    }

    #[test]
    fn serializes_renderer_field_names() {
        let storage = StorageOpts {
            ephemeral: Some(50),
            efs_perms: vec![EfsPermission {
                filesystem_id: Some("fs-1".to_string()),
                access_point_id: None,
                write: true,
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&storage).unwrap();
        assert_eq!(json["Ephemeral"], 50);
        assert_eq!(json["EFSPerms"][0]["FilesystemID"], "fs-1");
        assert_eq!(json["EFSPerms"][0]["Write"], true);
    }

    #[test]
    fn default_network_is_public() {
        let n = NetworkOpts::default();
        assert_eq!(n.assign_public_ip, ENABLE_PUBLIC_IP);
        assert_eq!(n.subnets_type, PUBLIC_SUBNETS_PLACEMENT);
    }
}
