//! Capacity and autoscaling deriver.
//!
//! Spot placement is expressed as a capacity provider strategy. With a
//! `spot_from` threshold the first `spot_from - 1` tasks are pinned to
//! on-demand Fargate through the strategy base, and every further task
//! lands on Fargate Spot.

use tracing::debug;

use stackform_manifest::AdvancedCount;
use stackform_template::{AdvancedCountOpts, AutoscalingOpts, CapacityProviderStrategy};

use crate::error::{ConvertError, ConvertResult};

pub const FARGATE_SPOT: &str = "FARGATE_SPOT";
pub const FARGATE: &str = "FARGATE";

/// Convert an advanced count. `None` when nothing is set, leaving the
/// renderer's defaults in place.
pub fn convert_advanced_count(count: &AdvancedCount) -> ConvertResult<Option<AdvancedCountOpts>> {
    if count.is_empty() {
        return Ok(None);
    }
    validate_advanced_count(count)?;
    let autoscaling = convert_autoscaling(count)?;
    let cps = convert_capacity_providers(count)?;
    debug!(
        spot = ?count.spot,
        autoscaling = autoscaling.is_some(),
        providers = cps.len(),
        "converted advanced count"
    );
    Ok(Some(AdvancedCountOpts {
        spot: count.spot,
        autoscaling,
        cps,
    }))
}

fn validate_advanced_count(count: &AdvancedCount) -> ConvertResult<()> {
    let band = count.range.as_ref().and_then(|r| r.value.as_ref());
    if count.spot.is_some() && band.is_some() {
        return Err(ConvertError::SpotWithRange);
    }
    Ok(())
}

/// Capacity provider entries. Empty unless `spot` is set.
pub fn convert_capacity_providers(count: &AdvancedCount) -> ConvertResult<Vec<CapacityProviderStrategy>> {
    if count.is_empty() || count.spot.is_none() {
        return Ok(Vec::new());
    }
    validate_advanced_count(count)?;

    let mut cps = vec![CapacityProviderStrategy {
        base: None,
        weight: 1,
        capacity_provider: FARGATE_SPOT.to_string(),
    }];
    let Some(rc) = count.range.as_ref().map(|r| &r.range_config) else {
        return Ok(cps);
    };
    if rc.is_empty() {
        return Ok(cps);
    }
    let spot_from = rc.spot_from.unwrap_or(0);
    let min = rc.min.unwrap_or(0);
    if spot_from > min {
        cps.push(CapacityProviderStrategy {
            base: Some(spot_from - 1),
            weight: 0,
            capacity_provider: FARGATE.to_string(),
        });
    }
    Ok(cps)
}

/// Autoscaling policy. `None` when `spot` is set or nothing is set.
pub fn convert_autoscaling(count: &AdvancedCount) -> ConvertResult<Option<AutoscalingOpts>> {
    if count.is_empty() || count.spot.is_some() {
        return Ok(None);
    }
    let (min_capacity, max_capacity) = count.parse_range()?;
    Ok(Some(AutoscalingOpts {
        min_capacity,
        max_capacity,
        cpu: count.cpu.map(f64::from),
        memory: count.memory.map(f64::from),
        requests: count.requests.map(f64::from),
        response_time: count.response_time.map(|d| d.as_secs_f64()),
    }))
}
