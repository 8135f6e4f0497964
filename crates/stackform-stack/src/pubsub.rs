//! Messaging deriver: published topics and subscription queues.

use std::time::Duration;

use tracing::debug;

use stackform_manifest as manifest;
use stackform_template::{DeadLetterQueue, PublishOpts, SqsQueue, SubscribeOpts, Topic, TopicSubscription};

use crate::context::ConvertContext;
use crate::error::{ConvertError, ConvertResult};
use crate::region::{RegionResolver, SQS_SERVICE_ID};
use crate::validate::{
    validate_dead_letter, validate_pubsub_name, validate_time, validate_topic_subscription,
    validate_worker_names,
};

pub const RETENTION_MIN: Duration = Duration::from_secs(0);
/// 14 days.
pub const RETENTION_MAX: Duration = Duration::from_secs(1_209_600);
pub const DELAY_MIN: Duration = Duration::from_secs(0);
/// 15 minutes.
pub const DELAY_MAX: Duration = Duration::from_secs(900);
pub const TIMEOUT_MIN: Duration = Duration::from_secs(0);
/// 12 hours.
pub const TIMEOUT_MAX: Duration = Duration::from_secs(43_200);

/// Topics published by `workload`, enriched with where they live.
pub fn convert_publish(
    topics: &[manifest::Topic],
    ctx: &ConvertContext,
    workload: &str,
    resolver: &dyn RegionResolver,
) -> ConvertResult<Option<PublishOpts>> {
    if topics.is_empty() {
        return Ok(None);
    }
    let partition = resolver
        .partition_for_region(&ctx.region)
        .ok_or_else(|| ConvertError::PartitionNotFound(ctx.region.clone()))?;
    let topics = topics
        .iter()
        .map(|t| convert_topic(t, ctx, &partition.id, workload))
        .collect::<ConvertResult<Vec<_>>>()?;
    debug!(workload, partition = %partition.id, topics = topics.len(), "converted publish topics");
    Ok(Some(PublishOpts { topics }))
}

pub fn convert_topic(
    topic: &manifest::Topic,
    ctx: &ConvertContext,
    partition: &str,
    workload: &str,
) -> ConvertResult<Topic> {
    let name = topic.name.clone().unwrap_or_default();
    validate_pubsub_name(&name)?;
    validate_worker_names(&topic.allowed_workers)?;
    Ok(Topic {
        name,
        allowed_workers: topic.allowed_workers.clone(),
        account_id: ctx.account_id.clone(),
        partition: partition.to_string(),
        region: ctx.region.clone(),
        app: ctx.app.clone(),
        env: ctx.env.clone(),
        svc: workload.to_string(),
    })
}

/// Subscriptions and the shared default queue. `None` when the workload
/// subscribes to nothing.
pub fn convert_subscribe(
    config: Option<&manifest::SubscribeConfig>,
    ctx: &ConvertContext,
    workload: &str,
    resolver: &dyn RegionResolver,
) -> ConvertResult<Option<SubscribeOpts>> {
    let Some(config) = config else {
        return Ok(None);
    };
    let Some(subscriptions) = &config.topics else {
        return Ok(None);
    };
    let endpoint = resolver.endpoint_for(SQS_SERVICE_ID, &ctx.region)?;

    let topics = subscriptions
        .iter()
        .map(convert_topic_subscription)
        .collect::<ConvertResult<Vec<_>>>()?;
    let queue = convert_queue(config.queue.as_ref())?;
    debug!(
        workload,
        endpoint = %endpoint.url,
        subscriptions = topics.len(),
        "converted subscriptions"
    );
    Ok(Some(SubscribeOpts { topics, queue }))
}

pub fn convert_topic_subscription(ts: &manifest::TopicSubscription) -> ConvertResult<TopicSubscription> {
    validate_topic_subscription(ts).map_err(ConvertError::in_subscription(&ts.name))?;
    let queue = convert_queue(ts.queue.as_ref()).map_err(ConvertError::in_subscription(&ts.name))?;
    Ok(TopicSubscription {
        name: ts.name.clone(),
        service: ts.service.clone(),
        queue,
    })
}

pub fn convert_queue(queue: Option<&manifest::SqsQueue>) -> ConvertResult<Option<SqsQueue>> {
    let Some(q) = queue else {
        return Ok(None);
    };
    Ok(Some(SqsQueue {
        retention: convert_retention(q.retention).map_err(ConvertError::in_queue_field("retention"))?,
        delay: convert_delay(q.delay).map_err(ConvertError::in_queue_field("delay"))?,
        timeout: convert_timeout(q.timeout).map_err(ConvertError::in_queue_field("timeout"))?,
        dead_letter: convert_dead_letter(q.dead_letter.as_ref())?,
    }))
}

/// Whole seconds of `t` once it is within `[floor, ceiling]`.
fn convert_time(t: Option<Duration>, floor: Duration, ceiling: Duration) -> ConvertResult<Option<u64>> {
    let Some(t) = t else {
        return Ok(None);
    };
    validate_time(t, floor, ceiling)?;
    Ok(Some(t.as_secs()))
}

pub fn convert_retention(t: Option<Duration>) -> ConvertResult<Option<u64>> {
    convert_time(t, RETENTION_MIN, RETENTION_MAX)
}

pub fn convert_delay(t: Option<Duration>) -> ConvertResult<Option<u64>> {
    convert_time(t, DELAY_MIN, DELAY_MAX)
}

pub fn convert_timeout(t: Option<Duration>) -> ConvertResult<Option<u64>> {
    convert_time(t, TIMEOUT_MIN, TIMEOUT_MAX)
}

pub fn convert_dead_letter(d: Option<&manifest::DeadLetterQueue>) -> ConvertResult<Option<DeadLetterQueue>> {
    let Some(d) = d else {
        return Ok(None);
    };
    validate_dead_letter(d)?;
    let tries = d
        .tries
        .and_then(|t| u32::try_from(t).ok())
        .ok_or_else(|| ConvertError::InvalidDeadLetter("`tries` is out of range".to_string()))?;
    Ok(Some(DeadLetterQueue { tries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::StaticRegionResolver;

    fn ctx() -> ConvertContext {
        ConvertContext::new("shop", "prod", "123456789012", "us-west-2")
    }

    fn secs(s: u64) -> Option<Duration> {
        Some(Duration::from_secs(s))
    }

    #[test]
    fn queue_bounds_are_inclusive() {
        assert_eq!(convert_retention(secs(1_209_600)).unwrap(), Some(1_209_600));
        assert!(convert_retention(secs(1_209_601)).is_err());
        assert_eq!(convert_delay(secs(900)).unwrap(), Some(900));
        assert!(convert_delay(secs(901)).is_err());
        assert_eq!(convert_timeout(secs(43_200)).unwrap(), Some(43_200));
        assert!(convert_timeout(secs(43_201)).is_err());
    }

    #[test]
    fn unset_durations_pass_through() {
        assert_eq!(convert_retention(None).unwrap(), None);
        assert_eq!(convert_delay(None).unwrap(), None);
        assert_eq!(convert_timeout(None).unwrap(), None);
    }

    #[test]
    fn queue_errors_name_the_field() {
        let q = manifest::SqsQueue {
            delay: secs(901),
            ..Default::default()
        };
        let err = convert_queue(Some(&q)).unwrap_err();
        assert!(matches!(err, ConvertError::Queue { field: "delay", .. }));
        assert_eq!(err.to_string(), "`delay` 901s must be between 0s and 900s");
    }

    #[test]
    fn dead_letter_requires_tries() {
        assert!(convert_dead_letter(None).unwrap().is_none());
        let ok = manifest::DeadLetterQueue { tries: Some(5) };
        assert_eq!(convert_dead_letter(Some(&ok)).unwrap(), Some(DeadLetterQueue { tries: 5 }));
        let missing = manifest::DeadLetterQueue { tries: None };
        assert!(convert_dead_letter(Some(&missing)).is_err());
        let negative = manifest::DeadLetterQueue { tries: Some(-1) };
        assert!(convert_dead_letter(Some(&negative)).is_err());
    }

    #[test]
    fn publish_enriches_topics() {
        let topics = vec![manifest::Topic {
            name: Some("orders".to_string()),
            allowed_workers: vec!["fulfillment".to_string()],
        }];
        let opts = convert_publish(&topics, &ctx(), "api", &StaticRegionResolver)
            .unwrap()
            .unwrap();
        let t = &opts.topics[0];
        assert_eq!(t.partition, "aws");
        assert_eq!(t.svc, "api");
        assert_eq!(t.arn(), "arn:aws:sns:us-west-2:123456789012:shop-prod-api-orders");
    }

    #[test]
    fn publish_rejects_bad_names() {
        let bad_topic = vec![manifest::Topic {
            name: Some("orders!".to_string()),
            allowed_workers: vec![],
        }];
        assert!(matches!(
            convert_publish(&bad_topic, &ctx(), "api", &StaticRegionResolver),
            Err(ConvertError::InvalidName { kind: "topic", .. })
        ));
        let bad_worker = vec![manifest::Topic {
            name: Some("orders".to_string()),
            allowed_workers: vec!["Fulfillment".to_string()],
        }];
        assert!(convert_publish(&bad_worker, &ctx(), "api", &StaticRegionResolver).is_err());
    }

    #[test]
    fn publish_needs_a_partition() {
        let topics = vec![manifest::Topic {
            name: Some("orders".to_string()),
            allowed_workers: vec![],
        }];
        let mut ctx = ctx();
        ctx.region = "mars-east-1".to_string();
        assert!(matches!(
            convert_publish(&topics, &ctx, "api", &StaticRegionResolver),
            Err(ConvertError::PartitionNotFound(_))
        ));
        assert!(convert_publish(&[], &ctx, "api", &StaticRegionResolver).unwrap().is_none());
    }

    #[test]
    fn subscribe_converts_queues() {
        let config = manifest::SubscribeConfig {
            topics: Some(vec![manifest::TopicSubscription {
                name: "orders".to_string(),
                service: "checkout".to_string(),
                queue: Some(manifest::SqsQueue {
                    retention: secs(345_600),
                    dead_letter: Some(manifest::DeadLetterQueue { tries: Some(3) }),
                    ..Default::default()
                }),
            }]),
            queue: Some(manifest::SqsQueue {
                timeout: secs(60),
                ..Default::default()
            }),
        };
        let opts = convert_subscribe(Some(&config), &ctx(), "worker", &StaticRegionResolver)
            .unwrap()
            .unwrap();
        let queue = opts.topics[0].queue.as_ref().unwrap();
        assert_eq!(queue.retention, Some(345_600));
        assert_eq!(queue.dead_letter, Some(DeadLetterQueue { tries: 3 }));
        assert_eq!(opts.queue.unwrap().timeout, Some(60));
    }

    #[test]
    fn subscribe_without_topics_is_none() {
        let config = manifest::SubscribeConfig::default();
        assert!(
            convert_subscribe(Some(&config), &ctx(), "worker", &StaticRegionResolver)
                .unwrap()
                .is_none()
        );
        assert!(
            convert_subscribe(None, &ctx(), "worker", &StaticRegionResolver)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn subscription_errors_carry_the_topic() {
        let config = manifest::SubscribeConfig {
            topics: Some(vec![manifest::TopicSubscription {
                name: "orders".to_string(),
                service: "checkout".to_string(),
                queue: Some(manifest::SqsQueue {
                    timeout: secs(43_201),
                    ..Default::default()
                }),
            }]),
            queue: None,
        };
        let err = convert_subscribe(Some(&config), &ctx(), "worker", &StaticRegionResolver)
            .unwrap_err();
        assert!(matches!(err, ConvertError::TopicSubscription { ref name, .. } if name == "orders"));
    }
}
