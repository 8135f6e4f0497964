//! stackform-template — inputs of the infrastructure-template renderer.
//!
//! Rendering itself happens outside this workspace. These types are the
//! contract: `stackform-stack` builds them from a manifest, and the
//! renderer reads them by field name.

pub mod opts;
pub mod override_rule;

pub use opts::*;
pub use override_rule::{PATH_SEGMENT_SEPARATOR, Rule};
