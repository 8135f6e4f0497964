//! stackform-stack — converts workload manifests into template renderer options.
//!
//! Each deriver handles one slice of the manifest: capacity, storage,
//! messaging, sidecars, override rules, and the single-field conversions.
//! [`convert_workload`] runs them all and assembles a
//! [`WorkloadOpts`](stackform_template::WorkloadOpts).
//!
//! # Architecture
//!
//! Conversion is a set of synchronous pure functions over borrowed
//! manifest data. Validation runs before any output is built, and the
//! first error aborts the conversion; there are no partial results.
//! Map-keyed inputs (sidecars, volumes) are emitted in key order.
//!
//! Region lookups go through the [`RegionResolver`] trait so callers can
//! supply their own partition data.

pub mod context;
pub mod count;
pub mod error;
pub mod fields;
pub mod overrides;
pub mod pubsub;
pub mod region;
pub mod sidecar;
pub mod storage;
pub mod validate;
pub mod workload;

pub use context::ConvertContext;
pub use error::{ConvertError, ConvertResult};
pub use fields::AppInformation;
pub use region::{Endpoint, Partition, RegionResolver, StaticRegionResolver};
pub use workload::convert_workload;
