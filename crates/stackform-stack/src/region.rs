//! Partition and service endpoint lookup by region name.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConvertError, ConvertResult};

pub const SQS_SERVICE_ID: &str = "sqs";

/// A group of regions sharing an ARN partition and DNS suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// ARN partition, e.g. `aws-cn`.
    pub id: String,
    pub dns_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
}

/// Resolves partitions and service endpoints for a region.
pub trait RegionResolver: Send + Sync {
    fn partition_for_region(&self, region: &str) -> Option<Partition>;

    fn endpoint_for(&self, service: &str, region: &str) -> ConvertResult<Endpoint>;
}

struct PartitionPattern {
    id: &'static str,
    dns_suffix: &'static str,
    regions: Regex,
}

// More specific US prefixes come first.
static PARTITIONS: LazyLock<Vec<PartitionPattern>> = LazyLock::new(|| {
    [
        ("aws-us-gov", "amazonaws.com", r"^us-gov-\w+-\d+$"),
        ("aws-iso-b", "sc2s.sgov.gov", r"^us-isob-\w+-\d+$"),
        ("aws-iso", "c2s.ic.gov", r"^us-iso-\w+-\d+$"),
        ("aws-cn", "amazonaws.com.cn", r"^cn-\w+-\d+$"),
        ("aws", "amazonaws.com", r"^(us|eu|ap|sa|ca|me|af|il|mx)-\w+-\d+$"),
    ]
    .into_iter()
    .map(|(id, dns_suffix, pattern)| PartitionPattern {
        id,
        dns_suffix,
        regions: Regex::new(pattern).expect("static partition pattern"),
    })
    .collect()
});

/// Resolver backed by the built-in region naming rules of each partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRegionResolver;

impl RegionResolver for StaticRegionResolver {
    fn partition_for_region(&self, region: &str) -> Option<Partition> {
        PARTITIONS
            .iter()
            .find(|p| p.regions.is_match(region))
            .map(|p| Partition {
                id: p.id.to_string(),
                dns_suffix: p.dns_suffix.to_string(),
            })
    }

    fn endpoint_for(&self, service: &str, region: &str) -> ConvertResult<Endpoint> {
        let partition =
            self.partition_for_region(region)
                .ok_or_else(|| ConvertError::EndpointNotFound {
                    service: service.to_string(),
                    region: region.to_string(),
                })?;
        Ok(Endpoint {
            url: format!("https://{service}.{region}.{}", partition.dns_suffix),
        })
    }
}
