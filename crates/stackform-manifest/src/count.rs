//! Task count: a fixed number, or an autoscaling/spot specification.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ManifestError, ManifestResult};

static RANGE_BAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)-(\d+)$").expect("static range pattern")
});

/// `count:` is either an integer or an [`AdvancedCount`] map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "CountRepr")]
pub struct Count {
    pub value: Option<u32>,
    pub advanced: AdvancedCount,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Value(u32),
    Advanced(AdvancedCount),
}

impl From<CountRepr> for Count {
    fn from(repr: CountRepr) -> Self {
        match repr {
            CountRepr::Value(v) => Count {
                value: Some(v),
                advanced: AdvancedCount::default(),
            },
            CountRepr::Advanced(advanced) => Count {
                value: None,
                advanced,
            },
        }
    }
}

impl Count {
    /// Count with a fixed number of tasks.
    pub fn fixed(value: u32) -> Self {
        Count {
            value: Some(value),
            advanced: AdvancedCount::default(),
        }
    }
}

/// Autoscaling and spot capacity settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdvancedCount {
    pub spot: Option<u32>,
    pub range: Option<Range>,
    #[serde(rename = "cpu_percentage")]
    pub cpu: Option<u32>,
    #[serde(rename = "memory_percentage")]
    pub memory: Option<u32>,
    pub requests: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub response_time: Option<Duration>,
}

impl AdvancedCount {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.spot.is_none()
            && self.range.as_ref().is_none_or(Range::is_empty)
            && self.cpu.is_none()
            && self.memory.is_none()
            && self.requests.is_none()
            && self.response_time.is_none()
    }

    /// Parse the autoscaling bounds. Fails if no range is set.
    pub fn parse_range(&self) -> ManifestResult<(u32, u32)> {
        match &self.range {
            Some(range) if !range.is_empty() => range.parse(),
            _ => Err(ManifestError::MissingRange),
        }
    }
}

/// `range:` is either a band string (`"1-10"`) or a [`RangeConfig`] map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RangeRepr")]
pub struct Range {
    pub value: Option<IntRangeBand>,
    pub range_config: RangeConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeRepr {
    Band(String),
    Config(RangeConfig),
}

impl From<RangeRepr> for Range {
    fn from(repr: RangeRepr) -> Self {
        match repr {
            RangeRepr::Band(s) => Range {
                value: Some(IntRangeBand(s)),
                range_config: RangeConfig::default(),
            },
            RangeRepr::Config(range_config) => Range {
                value: None,
                range_config,
            },
        }
    }
}

impl Range {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.range_config.is_empty()
    }

    /// Return the `(min, max)` bounds of the range.
    pub fn parse(&self) -> ManifestResult<(u32, u32)> {
        if let Some(band) = &self.value {
            return band.parse();
        }
        match (self.range_config.min, self.range_config.max) {
            (Some(min), Some(max)) if min > max => {
                Err(ManifestError::InvalidRangeBounds { min, max })
            }
            (Some(min), Some(max)) => Ok((min, max)),
            _ => Err(ManifestError::IncompleteRange),
        }
    }
}

/// A `"<min>-<max>"` range string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct IntRangeBand(pub String);

impl IntRangeBand {
    pub fn parse(&self) -> ManifestResult<(u32, u32)> {
        let caps = RANGE_BAND
            .captures(&self.0)
            .ok_or_else(|| ManifestError::InvalidRangeFormat(self.0.clone()))?;
        let min: u32 = caps[1]
            .parse()
            .map_err(|_| ManifestError::InvalidRangeFormat(self.0.clone()))?;
        let max: u32 = caps[2]
            .parse()
            .map_err(|_| ManifestError::InvalidRangeFormat(self.0.clone()))?;
        if min > max {
            return Err(ManifestError::InvalidRangeBounds { min, max });
        }
        Ok((min, max))
    }
}

/// Structured autoscaling range with an optional spot threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RangeConfig {
    pub min: Option<u32>,
    pub max: Option<u32>,
    /// Task number from which new tasks are placed on spot capacity.
    pub spot_from: Option<u32>,
}

impl RangeConfig {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.spot_from.is_none()
    }
}
