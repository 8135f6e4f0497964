//! Error types for manifest conversion.

use thiserror::Error;

use stackform_manifest::ManifestError;

/// Result type alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that abort a conversion. None are retried; a failure in any
/// deriver fails the whole workload.
#[derive(Debug, Error)]
pub enum ConvertError {
    // Conflicting configuration.
    #[error("\"count.spot\" and \"count.range\" cannot be specified together")]
    SpotWithRange,

    #[error("cannot specify more than one managed volume per service")]
    MultipleManagedVolumes,

    // Out-of-bounds values.
    #[error("ephemeral storage must be between 20 GiB and 200 GiB")]
    EphemeralBadSize,

    #[error("{value}s must be between {min}s and {max}s")]
    OutOfBounds { value: u64, min: u64, max: u64 },

    // Malformed fields.
    #[error("cannot parse port mapping from {0}")]
    PortMapping(String),

    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("container {container} depends on {dependency}, which is neither a sidecar nor the main container")]
    UnknownDependency {
        container: String,
        dependency: String,
    },

    #[error("container {0} cannot depend on itself")]
    SelfDependency(String),

    #[error("circular container dependency chain includes the following containers: {0:?}")]
    CircularDependency(Vec<String>),

    #[error("container {container} has invalid status {status:?} for dependency {dependency}: {reason}")]
    InvalidDependsOnStatus {
        container: String,
        dependency: String,
        status: String,
        reason: &'static str,
    },

    #[error("invalid mount point: {0}")]
    InvalidMountPoint(String),

    #[error("invalid storage for volume {volume}: {reason}")]
    InvalidStorage { volume: String, reason: String },

    #[error("dead letter queue: {0}")]
    InvalidDeadLetter(String),

    #[error("convert {field:?} to string slice: {source}")]
    StringSlice {
        field: &'static str,
        #[source]
        source: ManifestError,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    // Unresolvable lookups.
    #[error("find the partition for region {0}")]
    PartitionNotFound(String),

    #[error("resolve {service} endpoint for region {region}")]
    EndpointNotFound { service: String, region: String },

    #[error("invalid S3 URL {url}: {reason}")]
    S3Url { url: String, reason: String },

    // Context wrappers.
    #[error("`{field}` {source}")]
    Queue {
        field: &'static str,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("invalid topic subscription {name:?}: {source}")]
    TopicSubscription {
        name: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    pub(crate) fn in_queue_field(field: &'static str) -> impl FnOnce(ConvertError) -> ConvertError {
        move |source| ConvertError::Queue {
            field,
            source: Box::new(source),
        }
    }

    pub(crate) fn in_subscription(name: &str) -> impl FnOnce(ConvertError) -> ConvertError + '_ {
        move |source| ConvertError::TopicSubscription {
            name: name.to_string(),
            source: Box::new(source),
        }
    }
}
