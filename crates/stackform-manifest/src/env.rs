//! Per-environment override merging.
//!
//! Each manifest type spells out how an override value combines with the
//! base value, using a small set of field rules:
//!
//! - **scalar** (`Option<T>`): `Some` replaces, `None` leaves the base alone.
//!   Union-typed fields (string-or-list, bool-or-config) are scalars.
//! - **list** (`Option<Vec<T>>`): `Some` replaces wholesale, including
//!   `Some(vec![])`.
//! - **nested** (`Option<T: Overridable>`): merged field by field when both
//!   sides are present, otherwise the override replaces.
//! - **map**: per key; struct values merge recursively, string values
//!   replace. Keys absent from the override are kept.

use std::collections::BTreeMap;

use crate::count::{AdvancedCount, Count, Range, RangeConfig};
use crate::network::{HttpHealthCheckArgs, Logging, NetworkConfig, RoutingRule, VpcConfig};
use crate::pubsub::{DeadLetterQueue, SqsQueue, SubscribeConfig};
use crate::sidecar::SidecarConfig;
use crate::storage::{Storage, Volume};
use crate::workload::{Image, WorkloadConfig};

/// A type whose values can be overlaid with an environment override.
pub trait Overridable {
    fn apply_override(&mut self, other: &Self);
}

fn override_scalar<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(v) = src {
        *dst = Some(v.clone());
    }
}

fn override_nested<T: Overridable + Clone>(dst: &mut Option<T>, src: &Option<T>) {
    match (dst.as_mut(), src) {
        (Some(base), Some(over)) => base.apply_override(over),
        (None, Some(over)) => *dst = Some(over.clone()),
        (_, None) => {}
    }
}

fn override_map<T: Overridable + Clone>(dst: &mut BTreeMap<String, T>, src: &BTreeMap<String, T>) {
    for (key, over) in src {
        match dst.get_mut(key) {
            Some(base) => base.apply_override(over),
            None => {
                dst.insert(key.clone(), over.clone());
            }
        }
    }
}

fn override_string_map(dst: &mut BTreeMap<String, String>, src: &BTreeMap<String, String>) {
    dst.extend(src.iter().map(|(k, v)| (k.clone(), v.clone())));
}

impl Overridable for WorkloadConfig {
    fn apply_override(&mut self, other: &Self) {
        self.image.apply_override(&other.image);
        override_scalar(&mut self.entry_point, &other.entry_point);
        override_scalar(&mut self.command, &other.command);
        override_scalar(&mut self.cpu, &other.cpu);
        override_scalar(&mut self.memory, &other.memory);
        override_nested(&mut self.count, &other.count);
        override_scalar(&mut self.exec, &other.exec);
        override_string_map(&mut self.variables, &other.variables);
        override_string_map(&mut self.secrets, &other.secrets);
        override_nested(&mut self.storage, &other.storage);
        override_nested(&mut self.http, &other.http);
        override_nested(&mut self.logging, &other.logging);
        override_map(&mut self.sidecars, &other.sidecars);
        override_nested(&mut self.network, &other.network);
        override_scalar(&mut self.publish, &other.publish);
        override_nested(&mut self.subscribe, &other.subscribe);
        override_scalar(&mut self.taskdef_overrides, &other.taskdef_overrides);
    }
}

impl Overridable for Image {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.location, &other.location);
        override_scalar(&mut self.port, &other.port);
        override_string_map(&mut self.depends_on, &other.depends_on);
        override_string_map(&mut self.docker_labels, &other.docker_labels);
    }
}

impl Overridable for Count {
    /// A plain value and an advanced count exclude each other: whichever
    /// form the override uses clears the other form on the base.
    fn apply_override(&mut self, other: &Self) {
        if other.value.is_some() {
            self.value = other.value;
            self.advanced = AdvancedCount::default();
        } else if !other.advanced.is_empty() {
            self.value = None;
            self.advanced.apply_override(&other.advanced);
        }
    }
}

impl Overridable for AdvancedCount {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.spot, &other.spot);
        override_nested(&mut self.range, &other.range);
        override_scalar(&mut self.cpu, &other.cpu);
        override_scalar(&mut self.memory, &other.memory);
        override_scalar(&mut self.requests, &other.requests);
        override_scalar(&mut self.response_time, &other.response_time);
    }
}

impl Overridable for Range {
    /// Band and structured forms exclude each other, like [`Count`].
    fn apply_override(&mut self, other: &Self) {
        if other.value.is_some() {
            self.value = other.value.clone();
            self.range_config = RangeConfig::default();
        } else if !other.range_config.is_empty() {
            self.value = None;
            override_scalar(&mut self.range_config.min, &other.range_config.min);
            override_scalar(&mut self.range_config.max, &other.range_config.max);
            override_scalar(&mut self.range_config.spot_from, &other.range_config.spot_from);
        }
    }
}

impl Overridable for Storage {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.ephemeral, &other.ephemeral);
        override_map(&mut self.volumes, &other.volumes);
    }
}

impl Overridable for Volume {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.efs, &other.efs);
        override_scalar(&mut self.container_path, &other.container_path);
        override_scalar(&mut self.read_only, &other.read_only);
    }
}

impl Overridable for SidecarConfig {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.port, &other.port);
        override_scalar(&mut self.image, &other.image);
        override_scalar(&mut self.essential, &other.essential);
        override_scalar(&mut self.creds_param, &other.creds_param);
        override_string_map(&mut self.variables, &other.variables);
        override_string_map(&mut self.secrets, &other.secrets);
        override_scalar(&mut self.mount_points, &other.mount_points);
        override_string_map(&mut self.docker_labels, &other.docker_labels);
        override_string_map(&mut self.depends_on, &other.depends_on);
        override_scalar(&mut self.entry_point, &other.entry_point);
        override_scalar(&mut self.command, &other.command);
    }
}

impl Overridable for RoutingRule {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.path, &other.path);
        override_scalar(&mut self.health_check, &other.health_check);
        override_scalar(&mut self.stickiness, &other.stickiness);
        override_scalar(&mut self.alias, &other.alias);
        override_scalar(&mut self.deregistration_delay, &other.deregistration_delay);
        override_scalar(&mut self.target_container, &other.target_container);
        override_scalar(&mut self.allowed_source_ips, &other.allowed_source_ips);
    }
}

impl Overridable for HttpHealthCheckArgs {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.path, &other.path);
        override_scalar(&mut self.success_codes, &other.success_codes);
        override_scalar(&mut self.healthy_threshold, &other.healthy_threshold);
        override_scalar(&mut self.unhealthy_threshold, &other.unhealthy_threshold);
        override_scalar(&mut self.timeout, &other.timeout);
        override_scalar(&mut self.interval, &other.interval);
        override_scalar(&mut self.grace_period, &other.grace_period);
    }
}

impl Overridable for Logging {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.image, &other.image);
        override_string_map(&mut self.destination, &other.destination);
        override_scalar(&mut self.enable_metadata, &other.enable_metadata);
        override_string_map(&mut self.secret_options, &other.secret_options);
        override_scalar(&mut self.config_file, &other.config_file);
    }
}

impl Overridable for NetworkConfig {
    fn apply_override(&mut self, other: &Self) {
        override_nested(&mut self.vpc, &other.vpc);
    }
}

impl Overridable for VpcConfig {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.placement, &other.placement);
        override_scalar(&mut self.security_groups, &other.security_groups);
    }
}

impl Overridable for SubscribeConfig {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.topics, &other.topics);
        override_nested(&mut self.queue, &other.queue);
    }
}

impl Overridable for SqsQueue {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.retention, &other.retention);
        override_scalar(&mut self.delay, &other.delay);
        override_scalar(&mut self.timeout, &other.timeout);
        override_nested(&mut self.dead_letter, &other.dead_letter);
    }
}

impl Overridable for DeadLetterQueue {
    fn apply_override(&mut self, other: &Self) {
        override_scalar(&mut self.tries, &other.tries);
    }
}
