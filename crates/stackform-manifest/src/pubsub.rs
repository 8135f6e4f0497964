//! Publish/subscribe messaging: SNS-style topics and SQS-style queues.

use std::time::Duration;

use serde::Deserialize;

/// `publish:` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// A topic the workload publishes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Topic {
    pub name: Option<String>,
    /// Worker services allowed to subscribe to this topic.
    #[serde(default)]
    pub allowed_workers: Vec<String>,
}

/// `subscribe:` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubscribeConfig {
    pub topics: Option<Vec<TopicSubscription>>,
    /// Default queue shared by subscriptions without their own queue.
    pub queue: Option<SqsQueue>,
}

/// Subscription to a topic published by another service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopicSubscription {
    pub name: String,
    pub service: String,
    pub queue: Option<SqsQueue>,
}

/// Queue settings. Every duration is optional; unset means the
/// platform default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SqsQueue {
    #[serde(default, with = "humantime_serde")]
    pub retention: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub delay: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub dead_letter: Option<DeadLetterQueue>,
}

/// Redrive policy for messages that keep failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeadLetterQueue {
    /// Receives before a message moves to the dead-letter queue.
    pub tries: Option<i64>,
}
