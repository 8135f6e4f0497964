//! stackform-manifest — the workload manifest data model.
//!
//! Types mirror the YAML manifest a user writes. Every optional field is
//! an `Option`, so "unset" stays distinct from zero or empty all the way
//! to conversion. Maps are `BTreeMap`s, which gives every derived list a
//! stable, sorted order.

pub mod config;
pub mod count;
pub mod env;
pub mod error;
pub mod network;
pub mod pubsub;
pub mod sidecar;
pub mod storage;
pub mod strings;
pub mod workload;

pub use config::DeployConfig;
pub use count::{AdvancedCount, Count, IntRangeBand, Range, RangeConfig};
pub use env::Overridable;
pub use error::{ManifestError, ManifestResult};
pub use network::*;
pub use pubsub::*;
pub use sidecar::{DependsOn, SidecarConfig, SidecarMountPoint};
pub use storage::*;
pub use strings::{Alias, CommandOverride, EntryPointOverride, StringOrSlice};
pub use workload::*;
